//! # Autonomy Telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command that can be performed by the autonomy system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AutoCmd {
    /// Generate a trajectory from the given route and follow it to
    /// completion.
    Follow(RouteSpec),

    /// Abort the currently executing route.
    ///
    /// The robot is always brought to a full stop by an abort.
    Abort,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Specification of a route to be followed by the autonomy system.
///
/// The route is converted into a time-parameterised trajectory at the moment
/// the `Follow` command is executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSpec {
    /// The waypoints of the route as `[x_m, y_m, heading_rad]` triplets in
    /// the local map frame. At least two waypoints are required and
    /// consecutive waypoints must not coincide.
    pub waypoints: Vec<[f64; 3]>,

    /// Maximum speed along the route in meters/second.
    pub max_speed_ms: f64,

    /// Maximum acceleration along the route in meters/second^2.
    pub max_accel_mss: f64,

    /// Optional maximum centripetal acceleration in meters/second^2, used to
    /// slow the robot on tight turns.
    pub max_centrip_mss: Option<f64>,
}
