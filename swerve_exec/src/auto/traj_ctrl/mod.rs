//! # Trajectory control module
//!
//! Trajectory control is responsible for keeping the robot on the target
//! trajectory. Three loops run side by side: proportional(-integral-
//! derivative) controllers on the X and Y position errors, whose outputs are
//! added to the trajectory's feedforward velocity, and a motion-profiled
//! heading controller whose setpoint sweeps towards the route's terminal
//! heading under rate and acceleration limits. Heading errors are always
//! normalised into (-pi, pi], so the correction rotates the short way round.
//!
//! Execution is a state machine: `Idle` until a route is begun, `Running`
//! while the trajectory is sampled and followed once per control cycle, and
//! `Finished` once the trajectory's duration has elapsed or an abort was
//! requested. The transition into `Finished` always emits a single stop
//! command with all chassis velocity components zero.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod controllers;
pub mod params;
pub mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use controllers::*;
pub use params::Params;
pub use state::*;
