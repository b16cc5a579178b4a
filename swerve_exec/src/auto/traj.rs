//! # Trajectory
//!
//! This module defines the time-parameterised trajectory followed by the
//! autonomy system.
//!
//! A trajectory is generated once per routine from a [`RouteSpec`]: a smooth
//! path is fitted through the waypoint positions (a Catmull-Rom spline,
//! densified to roughly 5 cm sample separation), each sample is assigned a
//! curvature, and a speed profile is laid over the samples which ramps up
//! from rest, holds, and ramps back down to rest without exceeding the
//! route's speed and acceleration limits. Tight turns are further slowed by
//! the optional centripetal acceleration limit. Time stamps follow from the
//! speed profile, making the trajectory samplable by elapsed time.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use crate::loc::Pose;
use comms_if::tc::auto::RouteSpec;
use util::maths::{ang_dist_pi, wrap_to_pi};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target separation between generated path samples.
///
/// Units: meters
const SAMPLE_SEP_M: f64 = 0.05;

/// Minimum separation between consecutive waypoints. Below this the segment
/// is treated as zero-length and the route is rejected.
///
/// Units: meters
const MIN_WAYPOINT_SEP_M: f64 = 1e-3;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A single state along a trajectory.
///
/// States are produced by sampling a [`Trajectory`] and are never mutated
/// after creation.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrajectoryState {
    /// Time since the start of the trajectory at which this state applies.
    ///
    /// Units: seconds
    pub time_s: f64,

    /// The desired pose at this state. The heading is the route heading
    /// interpolated between the surrounding waypoints by arc length.
    pub pose: Pose,

    /// The planned (feedforward) velocity at this state.
    ///
    /// Units: meters/second,
    /// Frame: Local map
    pub vel_ms_lm: Vector2<f64>,

    /// The curvature of the path at this state.
    ///
    /// Units: 1/meters
    pub curv_m: f64,

    /// The heading target for the feedback controller. Holonomic rotation is
    /// profiled independently of the direction of travel, so every state of
    /// a route carries the route's terminal heading.
    ///
    /// Units: radians
    pub head_target_rad: f64,
}

/// An immutable, time-parameterised trajectory.
#[derive(Debug, Clone, Serialize)]
pub struct Trajectory {
    /// The states of the trajectory, in strictly increasing time order.
    states: Vec<TrajectoryState>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which make a route infeasible. A trajectory cannot be generated
/// from an infeasible route and the routine shall not start.
#[derive(Debug, thiserror::Error)]
pub enum TrajError {
    #[error("A route needs at least 2 waypoints, got {0}")]
    TooFewWaypoints(usize),

    #[error("Waypoints {0} and {1} coincide, the path between them is undefined")]
    CoincidentWaypoints(usize, usize),

    #[error("Route limits must be positive")]
    NonPositiveLimit,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Trajectory {
    /// Generate a trajectory from the given route.
    pub fn generate(route: &RouteSpec) -> Result<Self, TrajError> {

        // ---- VALIDATION ----

        if route.waypoints.len() < 2 {
            return Err(TrajError::TooFewWaypoints(route.waypoints.len()));
        }

        if route.max_speed_ms <= 0.0
            || route.max_accel_mss <= 0.0
            || matches!(route.max_centrip_mss, Some(c) if c <= 0.0)
        {
            return Err(TrajError::NonPositiveLimit);
        }

        let wpt_pos: Vec<Vector2<f64>> = route
            .waypoints
            .iter()
            .map(|w| Vector2::new(w[0], w[1]))
            .collect();
        let wpt_head: Vec<f64> = route.waypoints.iter().map(|w| w[2]).collect();

        for i in 1..wpt_pos.len() {
            if (wpt_pos[i] - wpt_pos[i - 1]).norm() < MIN_WAYPOINT_SEP_M {
                return Err(TrajError::CoincidentWaypoints(i - 1, i));
            }
        }

        // ---- PATH FITTING ----

        // Densify a Catmull-Rom spline through the waypoints. Ghost control
        // points mirror the first and last chords so the spline starts and
        // ends exactly on the terminal waypoints.
        let num_wpts = wpt_pos.len();
        let mut points: Vec<Vector2<f64>> = Vec::new();
        let mut point_seg: Vec<usize> = Vec::new();

        for seg in 0..(num_wpts - 1) {
            let p0 = if seg == 0 {
                2.0 * wpt_pos[0] - wpt_pos[1]
            }
            else {
                wpt_pos[seg - 1]
            };
            let p1 = wpt_pos[seg];
            let p2 = wpt_pos[seg + 1];
            let p3 = if seg + 2 < num_wpts {
                wpt_pos[seg + 2]
            }
            else {
                2.0 * wpt_pos[num_wpts - 1] - wpt_pos[num_wpts - 2]
            };

            let chord_m = (p2 - p1).norm();
            let num_samples = ((chord_m / SAMPLE_SEP_M).ceil() as usize).max(2);

            for k in 0..num_samples {
                let u = k as f64 / num_samples as f64;
                let point = catmull_rom(&p0, &p1, &p2, &p3, u);

                // Skip degenerate (near-duplicate) samples
                if let Some(prev) = points.last() {
                    if (point - prev).norm() < 1e-9 {
                        continue;
                    }
                }

                points.push(point);
                point_seg.push(seg);
            }
        }

        points.push(wpt_pos[num_wpts - 1]);
        point_seg.push(num_wpts - 2);

        let num_points = points.len();

        // Arc length at each sample
        let mut arc_m = vec![0.0; num_points];
        for i in 1..num_points {
            arc_m[i] = arc_m[i - 1] + (points[i] - points[i - 1]).norm();
        }
        let total_arc_m = arc_m[num_points - 1];

        // Arc length at the start of each waypoint segment
        let mut seg_start_m = vec![0.0; num_wpts - 1];
        for i in 0..num_points {
            let seg = point_seg[i];
            if seg > 0 && seg_start_m[seg] == 0.0 {
                seg_start_m[seg] = arc_m[i];
            }
        }

        // Signed curvature at each sample from the three-point formula
        let mut curv_m = vec![0.0; num_points];
        for i in 1..(num_points - 1) {
            curv_m[i] = menger_curvature(&points[i - 1], &points[i], &points[i + 1]);
        }
        curv_m[0] = curv_m[1];
        curv_m[num_points - 1] = curv_m[num_points - 2];

        // ---- SPEED PROFILE ----

        // Per-sample speed cap from the route's speed limit and, on curved
        // sections, the centripetal acceleration limit
        let mut speed_ms = vec![route.max_speed_ms; num_points];
        if let Some(max_centrip_mss) = route.max_centrip_mss {
            for i in 0..num_points {
                if curv_m[i].abs() > f64::EPSILON {
                    speed_ms[i] =
                        speed_ms[i].min((max_centrip_mss / curv_m[i].abs()).sqrt());
                }
            }
        }

        // Forward pass: ramp up from rest within the acceleration limit
        speed_ms[0] = 0.0;
        for i in 1..num_points {
            let ds_m = arc_m[i] - arc_m[i - 1];
            let reachable_ms =
                (speed_ms[i - 1].powi(2) + 2.0 * route.max_accel_mss * ds_m).sqrt();
            speed_ms[i] = speed_ms[i].min(reachable_ms);
        }

        // Backward pass: ramp down to rest at the end of the route
        speed_ms[num_points - 1] = 0.0;
        for i in (0..(num_points - 1)).rev() {
            let ds_m = arc_m[i + 1] - arc_m[i];
            let reachable_ms =
                (speed_ms[i + 1].powi(2) + 2.0 * route.max_accel_mss * ds_m).sqrt();
            speed_ms[i] = speed_ms[i].min(reachable_ms);
        }

        // ---- TIME PARAMETERISATION ----

        let mut time_s = vec![0.0; num_points];
        for i in 1..num_points {
            let ds_m = arc_m[i] - arc_m[i - 1];
            let pair_speed_ms = speed_ms[i - 1] + speed_ms[i];

            // Trapezoidal integration of the speed profile. The degenerate
            // rest-to-rest case falls back to pure acceleration timing.
            let dt_s = if pair_speed_ms > f64::EPSILON {
                2.0 * ds_m / pair_speed_ms
            }
            else {
                (2.0 * ds_m / route.max_accel_mss).sqrt()
            };

            time_s[i] = time_s[i - 1] + dt_s;
        }

        // ---- ASSEMBLE STATES ----

        let head_target_rad = wrap_to_pi(wpt_head[num_wpts - 1]);

        let mut states = Vec::with_capacity(num_points);
        for i in 0..num_points {
            // Route heading interpolated across the waypoint segment by arc
            // length, taking the shortest angular direction
            let seg = point_seg[i];
            let seg_end_m = if seg + 2 < num_wpts {
                seg_start_m[seg + 1]
            }
            else {
                total_arc_m
            };
            let seg_len_m = (seg_end_m - seg_start_m[seg]).max(f64::EPSILON);
            let frac = ((arc_m[i] - seg_start_m[seg]) / seg_len_m).clamp(0.0, 1.0);
            let heading_rad = wrap_to_pi(
                wpt_head[seg] + frac * ang_dist_pi(wpt_head[seg], wpt_head[seg + 1]),
            );

            // Path tangent by central difference
            let tangent = if i == 0 {
                points[1] - points[0]
            }
            else if i == num_points - 1 {
                points[i] - points[i - 1]
            }
            else {
                points[i + 1] - points[i - 1]
            };
            let tangent = tangent / tangent.norm().max(f64::EPSILON);

            states.push(TrajectoryState {
                time_s: time_s[i],
                pose: Pose {
                    position_m_lm: points[i],
                    heading_rad,
                },
                vel_ms_lm: speed_ms[i] * tangent,
                curv_m: curv_m[i],
                head_target_rad,
            });
        }

        Ok(Trajectory { states })
    }

    /// Sample the trajectory at the given elapsed time.
    ///
    /// Sampling is clamped: times before the start return the first state,
    /// times after [`Self::total_duration_s`] return the last state. This is
    /// what lets the execution loop treat "past the end" uniformly.
    pub fn sample(&self, time_s: f64) -> TrajectoryState {
        let first = self.states.first().unwrap();
        let last = self.states.last().unwrap();

        if time_s <= first.time_s {
            return *first;
        }
        if time_s >= last.time_s {
            return *last;
        }

        // Index of the first state beyond the sample time. The clamping
        // above guarantees 0 < idx < len.
        let idx = self
            .states
            .partition_point(|state| state.time_s <= time_s);

        let s0 = &self.states[idx - 1];
        let s1 = &self.states[idx];

        let dt_s = (s1.time_s - s0.time_s).max(f64::EPSILON);
        let frac = (time_s - s0.time_s) / dt_s;

        TrajectoryState {
            time_s,
            pose: Pose {
                position_m_lm: s0.pose.position_m_lm
                    + frac * (s1.pose.position_m_lm - s0.pose.position_m_lm),
                heading_rad: wrap_to_pi(
                    s0.pose.heading_rad
                        + frac * ang_dist_pi(s0.pose.heading_rad, s1.pose.heading_rad),
                ),
            },
            vel_ms_lm: s0.vel_ms_lm + frac * (s1.vel_ms_lm - s0.vel_ms_lm),
            curv_m: s0.curv_m + frac * (s1.curv_m - s0.curv_m),
            head_target_rad: s0.head_target_rad,
        }
    }

    /// The pose the robot is expected to be in at the start of the
    /// trajectory.
    pub fn initial_pose(&self) -> Pose {
        self.states.first().unwrap().pose
    }

    /// The total duration of the trajectory.
    ///
    /// Units: seconds
    pub fn total_duration_s(&self) -> f64 {
        self.states.last().unwrap().time_s
    }

    /// Get the number of states in the trajectory
    pub fn get_num_states(&self) -> usize {
        self.states.len()
    }
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Evaluate a Catmull-Rom spline segment between `p1` and `p2` at parameter
/// `u` in [0, 1].
fn catmull_rom(
    p0: &Vector2<f64>,
    p1: &Vector2<f64>,
    p2: &Vector2<f64>,
    p3: &Vector2<f64>,
    u: f64,
) -> Vector2<f64> {
    0.5 * ((2.0 * p1)
        + (p2 - p0) * u
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * u.powi(2)
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * u.powi(3))
}

/// Signed curvature of the circle through three points (Menger curvature).
///
/// Positive curvature turns to the left (right hand rule about the upwards
/// axis).
fn menger_curvature(a: &Vector2<f64>, b: &Vector2<f64>, c: &Vector2<f64>) -> f64 {
    let ab = b - a;
    let bc = c - b;
    let ac = c - a;

    let cross = ab[0] * bc[1] - ab[1] * bc[0];
    let denom = ab.norm() * bc.norm() * ac.norm();

    if denom < f64::EPSILON {
        0.0
    }
    else {
        2.0 * cross / denom
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn test_route() -> RouteSpec {
        RouteSpec {
            waypoints: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, FRAC_PI_2],
                [2.0, 1.0, PI],
            ],
            max_speed_ms: 2.0,
            max_accel_mss: 1.5,
            max_centrip_mss: Some(2.0),
        }
    }

    #[test]
    fn test_validation() {
        let mut route = test_route();
        route.waypoints.truncate(1);
        assert!(matches!(
            Trajectory::generate(&route),
            Err(TrajError::TooFewWaypoints(1))
        ));

        let mut route = test_route();
        let first_wpt = route.waypoints[0];
        route.waypoints[1] = first_wpt;
        assert!(matches!(
            Trajectory::generate(&route),
            Err(TrajError::CoincidentWaypoints(0, 1))
        ));

        let mut route = test_route();
        route.max_accel_mss = 0.0;
        assert!(matches!(
            Trajectory::generate(&route),
            Err(TrajError::NonPositiveLimit)
        ));
    }

    #[test]
    fn test_sample_clamping() {
        let traj = Trajectory::generate(&test_route()).unwrap();
        let duration_s = traj.total_duration_s();

        let start = traj.sample(0.0);
        let before = traj.sample(-10.0);
        assert!((before.pose.position_m_lm - start.pose.position_m_lm).norm() < 1e-12);
        assert!((before.vel_ms_lm - start.vel_ms_lm).norm() < 1e-12);

        let end = traj.sample(duration_s);
        let after = traj.sample(duration_s + 10.0);
        assert!((after.pose.position_m_lm - end.pose.position_m_lm).norm() < 1e-12);
        assert!((after.vel_ms_lm - end.vel_ms_lm).norm() < 1e-12);
    }

    #[test]
    fn test_terminal_states_at_rest() {
        let traj = Trajectory::generate(&test_route()).unwrap();

        assert!(traj.sample(0.0).vel_ms_lm.norm() < 1e-12);
        assert!(traj.sample(traj.total_duration_s()).vel_ms_lm.norm() < 1e-12);
    }

    #[test]
    fn test_endpoints_hit_waypoints() {
        let route = test_route();
        let traj = Trajectory::generate(&route).unwrap();

        let initial = traj.initial_pose();
        assert!((initial.position_m_lm - Vector2::new(0.0, 0.0)).norm() < 1e-9);
        assert!(initial.heading_rad.abs() < 1e-9);

        let end = traj.sample(traj.total_duration_s());
        assert!((end.pose.position_m_lm - Vector2::new(2.0, 1.0)).norm() < 1e-9);
        assert!(ang_dist_pi(end.pose.heading_rad, PI).abs() < 1e-9);
    }

    #[test]
    fn test_speed_limits_respected() {
        let route = test_route();
        let traj = Trajectory::generate(&route).unwrap();
        let duration_s = traj.total_duration_s();

        let num_probes = 200;
        let mut prev: Option<TrajectoryState> = None;

        for i in 0..=num_probes {
            let state = traj.sample(duration_s * i as f64 / num_probes as f64);
            let speed_ms = state.vel_ms_lm.norm();

            assert!(speed_ms <= route.max_speed_ms + 1e-9);

            // Acceleration between successive probes stays near the limit.
            // The tolerance absorbs interpolation error at profile corners.
            if let Some(p) = prev {
                let dt_s = state.time_s - p.time_s;
                if dt_s > 1e-6 {
                    let accel_mss = (speed_ms - p.vel_ms_lm.norm()) / dt_s;
                    assert!(accel_mss.abs() <= route.max_accel_mss + 0.5);
                }
            }
            prev = Some(state);
        }
    }

    #[test]
    fn test_time_strictly_increasing() {
        let traj = Trajectory::generate(&test_route()).unwrap();

        let mut t = -1.0;
        for i in 0..traj.get_num_states() {
            let state_t = traj.states[i].time_s;
            assert!(state_t > t);
            t = state_t;
        }
    }
}
