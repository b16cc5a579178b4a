//! # Mechanisms Equipment Commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// IDs of all steer actuators
pub const STR_IDS: [ActId; 4] = [ActId::StrFL, ActId::StrFR, ActId::StrRL, ActId::StrRR];

/// IDs of all drive actuators
pub const DRV_IDS: [ActId; 4] = [ActId::DrvFL, ActId::DrvFR, ActId::DrvRL, ActId::DrvRR];

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands that are sent to the mechanisms layer.
///
/// Steer actuators are demanded in absolute position, drive actuators in
/// rate.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MechDems {
    /// The demanded position of an actuator in radians.
    pub pos_rad: HashMap<ActId, f64>,

    /// The demanded speed of an actuator in radians/second.
    pub speed_rads: HashMap<ActId, f64>
}

/// Sensor data returned by the mechanisms layer.
///
/// Contains the measured state of each actuator, in the same convention as
/// [`MechDems`] - steer positions and drive rates.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MechSensData {
    /// The measured position of an actuator in radians.
    pub pos_rad: HashMap<ActId, f64>,

    /// The measured speed of an actuator in radians/second.
    pub speed_rads: HashMap<ActId, f64>
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of all actuators available to the robot
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum ActId {
    DrvFL,
    DrvFR,
    DrvRL,
    DrvRR,
    StrFL,
    StrFR,
    StrRL,
    StrRR
}

/// Response from the mechanisms layer based on the demands sent to it.
#[derive(Serialize, Deserialize, Debug)]
pub enum MechDemsResponse {
    /// Demands were valid and will be executed
    DemsOk,

    /// Demands were invalid and have been rejected
    DemsInvalid,

    /// Equipment is invalid so demands cannot be actuated
    EqptInvalid
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl Default for MechDems {
    fn default() -> Self {
        let mut pos_rad = HashMap::new();
        let mut speed_rads = HashMap::new();

        for id in &STR_IDS {
            pos_rad.insert(*id, 0.0);
        }
        for id in &DRV_IDS {
            speed_rads.insert(*id, 0.0);
        }

        Self {
            pos_rad,
            speed_rads
        }
    }
}

impl Default for MechSensData {
    fn default() -> Self {
        let mut pos_rad = HashMap::new();
        let mut speed_rads = HashMap::new();

        for id in &STR_IDS {
            pos_rad.insert(*id, 0.0);
        }
        for id in &DRV_IDS {
            speed_rads.insert(*id, 0.0);
        }

        Self {
            pos_rad,
            speed_rads
        }
    }
}
