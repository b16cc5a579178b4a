//! Trajectory control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for trajectory control
#[derive(Deserialize, Debug, Clone)]
pub struct Params {

    /// X position controller proportional gain
    pub x_k_p: f64,

    /// X position controller integral gain
    pub x_k_i: f64,

    /// X position controller derivative gain
    pub x_k_d: f64,

    /// Y position controller proportional gain
    pub y_k_p: f64,

    /// Y position controller integral gain
    pub y_k_i: f64,

    /// Y position controller derivative gain
    pub y_k_d: f64,

    /// Heading controller proportional gain
    pub head_k_p: f64,

    /// Heading controller integral gain
    pub head_k_i: f64,

    /// Heading controller derivative gain
    pub head_k_d: f64,

    /// Maximum rate of the heading setpoint profile.
    ///
    /// Units: radians/second
    pub head_max_rate_rads: f64,

    /// Maximum acceleration of the heading setpoint profile.
    ///
    /// Units: radians/second^2
    pub head_max_accel_radss: f64,

    /// Limit on each translational velocity demand component.
    ///
    /// Units: meters/second
    pub max_speed_dem_ms: f64,

    /// Limit on the angular velocity demand.
    ///
    /// Units: radians/second
    pub max_omega_dem_rads: f64,
}
