//! Manual control module
//!
//! Converts raw joystick axes into chassis velocity commands for locomotion
//! control. This is the manual-driving counterpart of trajectory control,
//! and shares the locomotion kinematics rather than duplicating them.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ManualCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum ManualCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),
}
