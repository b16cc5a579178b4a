//! # Telecommand processor module
//!
//! The telecommand processor handles TCs coming from any source.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;

// Internal
use crate::data_store::DataStore;
use comms_if::tc::Tc;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the datastore to send commands to different modules.
pub fn exec(ds: &mut DataStore, tc: &Tc) {

    // Handle different Tcs
    match tc {
        Tc::Drive(cmd) => {
            debug!("Recieved Drive command: {:?}", cmd);
            ds.loco_ctrl_input.cmd = Some(*cmd);
        },
        Tc::Joystick { axes } => {
            ds.manual_ctrl_input.axes = Some(*axes);
        },
        Tc::Auto(cmd) => {
            debug!("Recieved Auto command: {:?}", cmd);
            ds.auto_cmd = Some(cmd.clone());
        }
    }

}
