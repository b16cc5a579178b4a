//! # Autonomy module
//!
//! The autonomy system turns routes (waypoint lists plus kinematic limits)
//! into time-parameterised trajectories, and follows them with closed-loop
//! trajectory control.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod traj;
pub mod traj_ctrl;
