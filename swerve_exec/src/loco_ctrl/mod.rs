//! Locomotion control module

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calc_holonomic;
mod kinematics;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::{eqpt::mech::ActId, tc::drive::DriveCmd};

// Internal
pub use kinematics::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of swerve modules on the robot.
pub const NUM_MODULES: usize = 4;

/// The drive and steer actuator IDs of each module, in module index order.
///
/// Module index order is front left, front right, rear left, rear right, and
/// is fixed for the lifetime of the robot - index `i` always refers to the
/// same physical corner.
pub const MODULE_ACT_IDS: [(ActId, ActId); NUM_MODULES] = [
    (ActId::DrvFL, ActId::StrFL),
    (ActId::DrvFR, ActId::StrFR),
    (ActId::DrvRL, ActId::StrRL),
    (ActId::DrvRR, ActId::StrRR),
];

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during LocoCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum LocoCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("The configured module geometry is singular and cannot be inverted")]
    SingularGeometry,

    #[error("The module has not been initialised")]
    NotInit,

    #[error("Recieved an invalid drive command: {0:#?}")]
    InvalidDriveCmd(DriveCmd),
}
