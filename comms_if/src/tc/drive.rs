//! # Drive telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A drive command that can be executed by locomotion control.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub enum DriveCmd {
    /// A generic holonomic velocity command.
    ///
    /// A holonomic command moves the chassis with independent translational
    /// and rotational velocities, which locomotion control resolves into
    /// individual module speed and azimuth demands.
    Holonomic {
        /// The demanded velocity along the X axis in meters/second.
        ///
        /// In the robot body frame when `field_relative` is false, in the
        /// local map frame when it is true.
        v_x_ms: f64,

        /// The demanded velocity along the Y axis in meters/second.
        ///
        /// In the robot body frame when `field_relative` is false, in the
        /// local map frame when it is true.
        v_y_ms: f64,

        /// The demanded angular velocity in radians/second.
        ///
        /// Follows the right hand rule about the robot's Z+ (upwards) axis,
        /// so that a positive rate rotates the robot to the left.
        omega_rads: f64,

        /// If true the translational components are given in the local map
        /// frame and shall be rotated into the body frame using the current
        /// measured heading before the kinematics are applied.
        field_relative: bool,
    },

    /// Stop the robot, maintaining the current module azimuths but setting
    /// all drive rates to zero.
    Stop,
}
