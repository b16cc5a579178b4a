//! # Telecommand module
//!
//! This module provides telecommand definitions for the communications
//! interface.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod auto;
pub mod drive;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Serialize, Deserialize};
use thiserror::Error;

// Internal
use auto::AutoCmd;
use drive::DriveCmd;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the robot by an operator or a
/// script.
///
/// The variant is used by the telecommand processor to determine which module
/// the command is routed to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Tc {
    /// A drive command to be executed directly by locomotion control.
    Drive(DriveCmd),

    /// Raw joystick axes for manual driving, in the order
    /// `[strafe_x, strafe_y, rotation]`, each normalised into [-1, +1].
    Joystick { axes: [f64; 3] },

    /// A command for the autonomy system.
    Auto(AutoCmd),
}

/// Errors which can occur when parsing a TC.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("The TC is not valid JSON: {0}")]
    JsonError(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {
    /// Parse a TC from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        serde_json::from_str(json_str).map_err(TcParseError::JsonError)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_tc_from_json() {
        let tc = Tc::from_json(
            r#"{"Drive": {"Holonomic": {
                "v_x_ms": 1.0,
                "v_y_ms": 0.0,
                "omega_rads": 0.5,
                "field_relative": true}}}"#,
        )
        .unwrap();

        match tc {
            Tc::Drive(DriveCmd::Holonomic { v_x_ms, .. }) => {
                assert!((v_x_ms - 1.0).abs() < f64::EPSILON)
            }
            _ => panic!("Wrong TC variant parsed"),
        }

        assert!(Tc::from_json("not a tc").is_err());
    }
}
