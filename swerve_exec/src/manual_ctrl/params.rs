//! Parameters structure for ManualCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Manual control.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Params {

    /// Deadband applied to each joystick axis. Axis values whose magnitude
    /// is below this are treated as zero, and the remaining range is
    /// rescaled so the output is continuous at the deadband edge.
    pub axis_deadband: f64,

    /// Translational speed demanded at full joystick deflection.
    ///
    /// Units: meters/second
    pub max_speed_ms: f64,

    /// Angular rate demanded at full rotation-axis deflection.
    ///
    /// Units: radians/second
    pub max_rate_rads: f64,
}
