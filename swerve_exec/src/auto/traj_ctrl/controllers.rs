//! # Trajectory controllers module
//!
//! This module provides the controllers used for TrajCtrl, including their
//! error calculations.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use crate::auto::traj::TrajectoryState;
use crate::loc::Pose;
use comms_if::tc::drive::DriveCmd;
use util::maths::{ang_dist_pi, wrap_to_pi};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller.
///
/// The controller is stepped once per control cycle with the cycle's
/// timestep. A zero timestep (the first cycle of a routine) contributes
/// neither integral nor derivative action.
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64
}

/// Motion-profiled heading controller.
///
/// The controller's setpoint sweeps towards the target heading under rate
/// and acceleration limits, preventing abrupt rotational commands, and a PID
/// controller corrects the measured heading onto the setpoint. The profile
/// rate is fed forward into the output demand.
///
/// Both the error and the setpoint-to-target distance are normalised into
/// (-pi, pi], so the rotation always takes the short way round.
#[derive(Debug, Serialize, Clone)]
pub struct HeadingController {
    pid: PidController,

    /// Maximum rate of the setpoint profile
    max_rate_rads: f64,

    /// Maximum acceleration of the setpoint profile
    max_accel_radss: f64,

    /// The profiled setpoint
    setpoint_rad: f64,

    /// The current rate of the setpoint profile
    setpoint_rate_rads: f64,
}

/// The trajectory controllers
#[derive(Debug, Serialize, Clone)]
pub struct TrajControllers {
    /// X position error controller
    x_ctrl: PidController,

    /// Y position error controller
    y_ctrl: PidController,

    /// Heading error controller
    head_ctrl: HeadingController
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {

    /// Create a new controller with the given gains.
    pub fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            k_p, k_i, k_d,
            integral: 0f64,
            prev_error: None
        }
    }

    /// Get the value of the controller for the given error and timestep.
    ///
    /// The internal state advances exactly once per call - one call per
    /// control cycle.
    pub fn get(&mut self, error: f64, dt_s: f64) -> f64 {
        // Accumulate the integral term.
        //
        // If there's no time difference then we don't accumulate the
        // integral. The other option is to add on the error and that will
        // produce a large spike in integral compared to normal operation, so
        // we don't do this.
        if dt_s > 0f64 {
            self.integral += error * dt_s;
        }

        // Calculate the derivative.
        //
        // If there's no time difference, or no previous error, again we
        // assume no derivative, for the same reasons as for integral.
        let deriv = match self.prev_error {
            Some(e) if dt_s > 0f64 => (error - e) / dt_s,
            _ => 0f64
        };

        // Calculate the output
        let out =
            self.k_p * error
            + self.k_i * self.integral
            + self.k_d * deriv;

        // Remember the previous error
        self.prev_error = Some(error);

        // Return
        out
    }

    /// Clear the accumulated state of the controller.
    pub fn reset(&mut self) {
        self.integral = 0f64;
        self.prev_error = None;
    }
}

impl HeadingController {

    /// Create a new controller from the parameters.
    pub fn new(params: &super::Params) -> Self {
        Self {
            pid: PidController::new(
                params.head_k_p, params.head_k_i, params.head_k_d
            ),
            max_rate_rads: params.head_max_rate_rads,
            max_accel_radss: params.head_max_accel_radss,
            setpoint_rad: 0f64,
            setpoint_rate_rads: 0f64,
        }
    }

    /// Reset the profile so the setpoint starts at the given heading, at
    /// rest.
    pub fn reset(&mut self, heading_rad: f64) {
        self.setpoint_rad = wrap_to_pi(heading_rad);
        self.setpoint_rate_rads = 0f64;
        self.pid.reset();
    }

    /// Advance the profiled setpoint one control cycle towards the target
    /// and return the angular velocity demand.
    ///
    /// The profile state advances exactly once per call - calling out of
    /// cadence desynchronises the profile.
    pub fn get(&mut self, target_rad: f64, measured_rad: f64, dt_s: f64) -> f64 {
        if dt_s > 0f64 {
            // Distance from the setpoint to the target, the short way round
            let dist_rad = ang_dist_pi(self.setpoint_rad, target_rad);

            // The highest rate from which the profile can still stop at the
            // target within the acceleration limit. The final bound lands
            // the setpoint exactly on the target rather than approaching it
            // asymptotically.
            let stop_rate_rads =
                (2.0 * self.max_accel_radss * dist_rad.abs()).sqrt();
            let desired_rate_rads = dist_rad.signum()
                * stop_rate_rads
                    .min(self.max_rate_rads)
                    .min(dist_rad.abs() / dt_s);

            // Move the profile rate towards the desired rate within the
            // acceleration limit, then advance the setpoint
            let max_delta_rads = self.max_accel_radss * dt_s;
            let delta_rads = (desired_rate_rads - self.setpoint_rate_rads)
                .clamp(-max_delta_rads, max_delta_rads);

            self.setpoint_rate_rads += delta_rads;
            self.setpoint_rad =
                wrap_to_pi(self.setpoint_rad + self.setpoint_rate_rads * dt_s);
        }

        // Wrapped error between the measured heading and the setpoint
        let error_rad = ang_dist_pi(measured_rad, self.setpoint_rad);

        self.setpoint_rate_rads + self.pid.get(error_rad, dt_s)
    }

    /// The current profiled setpoint.
    pub fn setpoint_rad(&self) -> f64 {
        self.setpoint_rad
    }
}

impl TrajControllers {

    /// Create a new instance of the controllers from the parameters
    pub fn new(params: &super::Params) -> Self {
        Self {
            x_ctrl: PidController::new(
                params.x_k_p, params.x_k_i, params.x_k_d
            ),
            y_ctrl: PidController::new(
                params.y_k_p, params.y_k_i, params.y_k_d
            ),
            head_ctrl: HeadingController::new(params)
        }
    }

    /// Reset all controllers for a new routine starting at the given pose.
    pub fn reset(&mut self, pose: &Pose) {
        self.x_ctrl.reset();
        self.y_ctrl.reset();
        self.head_ctrl.reset(pose.heading_rad);
    }

    /// Get the drive command for the given trajectory state and measured
    /// pose.
    pub fn get_drive_cmd(
        &mut self,
        desired: &TrajectoryState,
        pose: &Pose,
        dt_s: f64,
        report: &mut super::StatusReport,
        params: &super::Params
    ) -> DriveCmd {

        // Position errors in the LM frame
        let x_err_m = desired.pose.position_m_lm[0] - pose.position_m_lm[0];
        let y_err_m = desired.pose.position_m_lm[1] - pose.position_m_lm[1];
        report.x_error_m = x_err_m;
        report.y_error_m = y_err_m;

        // Wrapped heading error to the controller's target
        report.head_error_rad = ang_dist_pi(pose.heading_rad, desired.head_target_rad);

        // Feedforward velocity plus the feedback corrections
        let mut v_x_ms = desired.vel_ms_lm[0] + self.x_ctrl.get(x_err_m, dt_s);
        let mut v_y_ms = desired.vel_ms_lm[1] + self.y_ctrl.get(y_err_m, dt_s);
        let mut omega_rads =
            self.head_ctrl
                .get(desired.head_target_rad, pose.heading_rad, dt_s);

        // Apply demand limits
        v_x_ms = v_x_ms.clamp(-params.max_speed_dem_ms, params.max_speed_dem_ms);
        v_y_ms = v_y_ms.clamp(-params.max_speed_dem_ms, params.max_speed_dem_ms);
        omega_rads =
            omega_rads.clamp(-params.max_omega_dem_rads, params.max_omega_dem_rads);

        DriveCmd::Holonomic {
            v_x_ms,
            v_y_ms,
            omega_rads,
            field_relative: true,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    fn test_params() -> crate::auto::traj_ctrl::Params {
        crate::auto::traj_ctrl::Params {
            x_k_p: 1.0,
            x_k_i: 0.0,
            x_k_d: 0.0,
            y_k_p: 1.0,
            y_k_i: 0.0,
            y_k_d: 0.0,
            head_k_p: 1.0,
            head_k_i: 0.0,
            head_k_d: 0.0,
            head_max_rate_rads: PI,
            head_max_accel_radss: PI,
            max_speed_dem_ms: 3.0,
            max_omega_dem_rads: PI,
        }
    }

    #[test]
    fn test_pid_proportional_only() {
        let mut pid = PidController::new(2.0, 0.0, 0.0);

        assert!((pid.get(1.5, 0.02) - 3.0).abs() < 1e-12);
        assert!((pid.get(-0.5, 0.02) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pid_first_cycle_has_no_memory_terms() {
        let mut pid = PidController::new(0.0, 1.0, 1.0);

        // Zero timestep contributes neither integral nor derivative
        assert!(pid.get(1.0, 0.0).abs() < 1e-12);

        // From the second call both terms are active
        let out = pid.get(2.0, 0.5);
        let expected = 1.0 * (2.0 * 0.5) + 1.0 * ((2.0 - 1.0) / 0.5);
        assert!((out - expected).abs() < 1e-12);
    }

    #[test]
    fn test_heading_error_wraps_short_way() {
        let params = test_params();
        let mut head_ctrl = HeadingController::new(&params);

        let measured_rad = -170f64.to_radians();
        let desired_rad = 170f64.to_radians();

        head_ctrl.reset(measured_rad);

        // First cycle: setpoint still at the measured heading, so the whole
        // demand comes from the profile stepping towards the target. The
        // short way from -170 deg to +170 deg is negative (clockwise
        // through the +/-pi boundary).
        let omega_rads = head_ctrl.get(desired_rad, measured_rad, 0.02);
        assert!(omega_rads < 0.0);

        // And the wrapped distance magnitude is 20 deg, not 340 deg
        let dist_rad = ang_dist_pi(measured_rad, desired_rad);
        assert!((dist_rad.abs() - 20f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn test_heading_profile_converges() {
        let params = test_params();
        let mut head_ctrl = HeadingController::new(&params);

        head_ctrl.reset(0.0);

        // Sweep to pi under the profile limits. The sweep of pi radians
        // takes 2 s at these limits, leave margin beyond that.
        let dt_s = 0.02;
        let mut measured_rad: f64 = 0.0;

        for _ in 0..150 {
            let omega_rads = head_ctrl.get(PI, measured_rad, dt_s);

            // The demand never exceeds the profile rate limit plus the
            // feedback correction on a converged error, which is small
            assert!(omega_rads.abs() < params.head_max_rate_rads + 0.1);

            measured_rad = wrap_to_pi(measured_rad + omega_rads * dt_s);
        }

        assert!(ang_dist_pi(measured_rad, PI).abs() < 1f64.to_radians());
    }

    #[test]
    fn test_setpoint_rate_within_profile_limits() {
        let params = test_params();
        let mut head_ctrl = HeadingController::new(&params);
        head_ctrl.reset(0.0);

        let dt_s = 0.02;
        let mut prev_setpoint_rad = head_ctrl.setpoint_rad();

        for _ in 0..200 {
            head_ctrl.get(PI, prev_setpoint_rad, dt_s);

            let setpoint_rad = head_ctrl.setpoint_rad();
            let rate_rads = ang_dist_pi(prev_setpoint_rad, setpoint_rad) / dt_s;
            assert!(rate_rads.abs() <= params.head_max_rate_rads + 1e-9);

            prev_setpoint_rad = setpoint_rad;
        }
    }
}
