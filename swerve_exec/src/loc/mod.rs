//! # Localisation module
//!
//! This module provides localisation for the robot in the form of wheel
//! odometry: the measured module states are run backwards through the swerve
//! kinematics and the resulting chassis velocity is integrated into a
//! running pose estimate.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal
use crate::loco_ctrl::{
    self, LocoCtrlError, ModuleState, SwerveKinematics, MODULE_ACT_IDS, NUM_MODULES,
};
use comms_if::eqpt::mech::{ActId, MechSensData};
use util::{maths::wrap_to_pi, params};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The current pose (position and heading in the LM frame) of the robot.
///
/// More specifically this represents the Robot Body (RB) frame in the Local
/// Map (LM) frame.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, Default)]
pub struct Pose {

    /// The position in the LM frame.
    ///
    /// Units: meters
    pub position_m_lm: Vector2<f64>,

    /// The heading of the robot in the LM frame - the angle between the
    /// body X axis and the LM X axis, normalised into (-pi, pi].
    ///
    /// Units: radians
    pub heading_rad: f64,
}

/// Wheel odometry pose estimator.
///
/// The estimate shall be updated exactly once per control cycle, and reset
/// to the trajectory's initial pose at the start of each autonomous routine.
/// Skipped updates desynchronise the estimate from the robot.
pub struct Odometry {
    kinematics: SwerveKinematics,

    wheel_radius_m: f64,

    pose: Pose,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during localisation.
#[derive(Debug, thiserror::Error)]
pub enum LocError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(params::LoadError),

    #[error("Could not build the kinematics: {0}")]
    KinematicsError(LocoCtrlError),

    #[error("Measurement set is missing actuator {0:?}")]
    MissingActuator(ActId),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    pub fn new(x_m: f64, y_m: f64, heading_rad: f64) -> Self {
        Self {
            position_m_lm: Vector2::new(x_m, y_m),
            heading_rad: wrap_to_pi(heading_rad),
        }
    }

    /// Return the unit vector pointing in the robot's forward direction (in
    /// 2D).
    pub fn forward2(&self) -> Vector2<f64> {
        Vector2::new(self.heading_rad.cos(), self.heading_rad.sin())
    }
}

impl Odometry {
    /// Initialise the odometry.
    ///
    /// Expected init data is the path to the locomotion control parameter
    /// file, which provides the module geometry.
    pub fn init(params_path: &str) -> Result<Self, LocError> {
        let params: loco_ctrl::Params =
            params::load(params_path).map_err(LocError::ParamLoadError)?;

        Self::with_params(&params)
    }

    /// Create an odometry instance directly from a parameter set.
    pub fn with_params(params: &loco_ctrl::Params) -> Result<Self, LocError> {
        Ok(Self {
            kinematics: SwerveKinematics::new(params)
                .map_err(LocError::KinematicsError)?,
            wheel_radius_m: params.wheel_radius_m,
            pose: Pose::default(),
        })
    }

    /// Reset the pose estimate to the given pose.
    pub fn reset(&mut self, pose: Pose) {
        self.pose = pose;
    }

    /// Get the current pose estimate.
    pub fn current_pose(&self) -> Pose {
        self.pose
    }

    /// Integrate the measured module states over `dt_s` and advance the
    /// pose estimate.
    pub fn update(&mut self, sens: &MechSensData, dt_s: f64) -> Result<Pose, LocError> {
        // Assemble module states from the measurement set
        let mut states = [ModuleState::default(); NUM_MODULES];

        for (i, (drv_id, str_id)) in MODULE_ACT_IDS.iter().enumerate() {
            let rate_rads = sens
                .speed_rads
                .get(drv_id)
                .ok_or(LocError::MissingActuator(*drv_id))?;
            let angle_rad = sens
                .pos_rad
                .get(str_id)
                .ok_or(LocError::MissingActuator(*str_id))?;

            states[i] = ModuleState {
                speed_ms: rate_rads * self.wheel_radius_m,
                angle_rad: *angle_rad,
            };
        }

        // Recover the chassis velocity (in the body frame) and integrate it
        // in the LM frame, composing the rotation and translation increments.
        let vel = self.kinematics.to_chassis_vel(&states);

        let (sin_h, cos_h) = self.pose.heading_rad.sin_cos();

        self.pose.position_m_lm[0] += (vel.v_x_ms * cos_h - vel.v_y_ms * sin_h) * dt_s;
        self.pose.position_m_lm[1] += (vel.v_x_ms * sin_h + vel.v_y_ms * cos_h) * dt_s;
        self.pose.heading_rad =
            wrap_to_pi(self.pose.heading_rad + vel.omega_rads * dt_s);

        Ok(self.pose)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::mech::{DRV_IDS, STR_IDS};

    fn test_odometry() -> Odometry {
        Odometry::with_params(&loco_ctrl::Params {
            wheel_radius_m: 0.05,
            module_pos_m_rb: [
                [0.29, 0.29],
                [0.29, -0.29],
                [-0.29, 0.29],
                [-0.29, -0.29],
            ],
            drv_max_abs_rate_rads: 70.0,
        })
        .unwrap()
    }

    /// Build a measurement set with all modules at the given azimuth and
    /// wheel rate.
    fn uniform_sens(angle_rad: f64, rate_rads: f64) -> MechSensData {
        let mut sens = MechSensData::default();
        for id in STR_IDS.iter() {
            sens.pos_rad.insert(*id, angle_rad);
        }
        for id in DRV_IDS.iter() {
            sens.speed_rads.insert(*id, rate_rads);
        }
        sens
    }

    #[test]
    fn test_straight_line_integration() {
        let mut odom = test_odometry();
        odom.reset(Pose::new(1.0, 2.0, 0.0));

        // 1 m/s forwards (20 rad/s at 0.05 m wheel radius) for 100 cycles of
        // 20 ms is 2 m of travel
        let sens = uniform_sens(0.0, 20.0);
        for _ in 0..100 {
            odom.update(&sens, 0.02).unwrap();
        }

        let pose = odom.current_pose();
        assert!((pose.position_m_lm[0] - 3.0).abs() < 1e-9);
        assert!((pose.position_m_lm[1] - 2.0).abs() < 1e-9);
        assert!(pose.heading_rad.abs() < 1e-9);
    }

    #[test]
    fn test_strafe_with_heading() {
        let mut odom = test_odometry();
        odom.reset(Pose::new(0.0, 0.0, std::f64::consts::FRAC_PI_2));

        // Modules pointing along the body X axis while the robot faces LM +Y
        // means all motion is along LM +Y
        let sens = uniform_sens(0.0, 20.0);
        for _ in 0..50 {
            odom.update(&sens, 0.02).unwrap();
        }

        let pose = odom.current_pose();
        assert!(pose.position_m_lm[0].abs() < 1e-9);
        assert!((pose.position_m_lm[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_actuator() {
        let mut odom = test_odometry();

        let mut sens = uniform_sens(0.0, 0.0);
        sens.speed_rads.remove(&ActId::DrvRL);

        assert!(matches!(
            odom.update(&sens, 0.02),
            Err(LocError::MissingActuator(ActId::DrvRL))
        ));
    }
}
