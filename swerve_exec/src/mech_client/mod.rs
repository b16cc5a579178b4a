//! # Mechanisms client
//!
//! The mechanisms client is the boundary between the control software and
//! the drive hardware layer. The control software only ever talks to the
//! [`MechInterface`] trait - the concrete layer behind it (a physical motor
//! server, or the in-process simulation used by tests and the demo
//! executable) is injected at startup.
//!
//! A failed send is surfaced to the caller and never retried: the control
//! loop is open-loop in time, and masking a bad cycle behind a retry would
//! desynchronise the trajectory from the physical robot.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod sim;

pub use sim::SimMech;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use thiserror::Error;

// Internal
use comms_if::eqpt::mech::{MechDems, MechDemsResponse, MechSensData};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// The capability of the drive hardware layer as seen by the control
/// software.
pub trait MechInterface {
    /// Send actuator demands to the mechanisms layer.
    fn send_demands(&mut self, dems: &MechDems)
        -> Result<MechDemsResponse, MechClientError>;

    /// Get the measured actuator states from the mechanisms layer.
    fn get_sens_data(&mut self) -> Result<MechSensData, MechClientError>;
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors at the mechanisms boundary.
#[derive(Debug, Error)]
pub enum MechClientError {
    #[error("Not connected to the mechanisms layer")]
    NotConnected,

    #[error("Error recieving data from the mechanisms layer: {0}")]
    RecvError(String),
}
