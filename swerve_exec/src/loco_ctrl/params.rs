//! Parameters structure for LocoCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use super::NUM_MODULES;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Locomotion control.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Params {

    // ---- GEOMETRY ----

    /// The radius of the robot's wheels.
    ///
    /// Units: meters
    pub wheel_radius_m: f64,

    /// The position of each module's steer axis relative to the robot's
    /// centre of rotation, in module index order (see
    /// [`super::MODULE_ACT_IDS`]).
    ///
    /// Units: meters,
    /// Frame: Robot body
    pub module_pos_m_rb: [[f64; 2]; NUM_MODULES],

    // ---- CAPABILITIES ----

    /// Maximum drive axis rate (highest positive value).
    ///
    /// Units: radians/second
    pub drv_max_abs_rate_rads: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// The maximum attainable linear speed of a single module.
    ///
    /// Units: meters/second
    pub fn max_module_speed_ms(&self) -> f64 {
        self.drv_max_abs_rate_rads * self.wheel_radius_m
    }
}
