//! # Swerve kinematics
//!
//! This module provides the transform between a single chassis velocity and
//! the individual module (speed, azimuth) states, and its inverse. The
//! forward transform is the vector sum of the chassis translational velocity
//! and the tangential velocity induced by rotation at each module's offset.
//! The inverse is the least-squares solution of the overdetermined module
//! velocity system, precomputed as a pseudo-inverse at construction.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{SMatrix, SVector, Vector2};
use serde::Serialize;

// Internal
use super::{LocoCtrlError, Params, NUM_MODULES};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Module speed below which the azimuth demand is held at its previous value.
///
/// Without the hold a zero velocity command would send every azimuth to an
/// arbitrary default, chattering the wheels at rest.
///
/// Units: meters/second
pub const SPEED_HOLD_THRESHOLD_MS: f64 = 1e-4;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A chassis velocity demand or estimate.
///
/// Frame: Robot body - X forwards, Y to the left, positive omega rotating
/// the robot to the left (right hand rule about the upwards Z axis).
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct ChassisVel {
    /// Velocity along the body X axis.
    ///
    /// Units: meters/second
    pub v_x_ms: f64,

    /// Velocity along the body Y axis.
    ///
    /// Units: meters/second
    pub v_y_ms: f64,

    /// Angular velocity about the body Z axis.
    ///
    /// Units: radians/second
    pub omega_rads: f64,
}

/// The state of a single swerve module.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct ModuleState {
    /// Signed linear speed of the wheel.
    ///
    /// Units: meters/second
    pub speed_ms: f64,

    /// Azimuth of the wheel relative to the body X axis.
    ///
    /// Units: radians
    pub angle_rad: f64,
}

/// Kinematics of the swerve drive.
///
/// Constructed once from the fixed module geometry. The struct carries the
/// previous commanded azimuths so that near-zero speed demands hold the
/// wheels at their last angle.
pub struct SwerveKinematics {
    /// Position of each module in the robot body frame.
    module_pos_m_rb: [Vector2<f64>; NUM_MODULES],

    /// Pseudo-inverse of the forward kinematics matrix, used to recover a
    /// chassis velocity from measured module states.
    inv_matrix: SMatrix<f64, 3, 8>,

    /// The previously commanded azimuth of each module.
    prev_angles_rad: [f64; NUM_MODULES],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SwerveKinematics {

    /// Create a new kinematics instance from the given parameters.
    pub fn new(params: &Params) -> Result<Self, LocoCtrlError> {
        let mut module_pos_m_rb = [Vector2::zeros(); NUM_MODULES];
        for i in 0..NUM_MODULES {
            module_pos_m_rb[i] = Vector2::new(
                params.module_pos_m_rb[i][0],
                params.module_pos_m_rb[i][1],
            );
        }

        // Forward kinematics matrix. Each module contributes two rows:
        //
        //   v_ix = v_x - omega * y_i
        //   v_iy = v_y + omega * x_i
        let mut fwd_matrix = SMatrix::<f64, 8, 3>::zeros();
        for i in 0..NUM_MODULES {
            fwd_matrix[(2 * i, 0)] = 1.0;
            fwd_matrix[(2 * i, 2)] = -module_pos_m_rb[i][1];
            fwd_matrix[(2 * i + 1, 1)] = 1.0;
            fwd_matrix[(2 * i + 1, 2)] = module_pos_m_rb[i][0];
        }

        let inv_matrix = fwd_matrix
            .pseudo_inverse(1e-10)
            .map_err(|_| LocoCtrlError::SingularGeometry)?;

        Ok(Self {
            module_pos_m_rb,
            inv_matrix,
            prev_angles_rad: [0.0; NUM_MODULES],
        })
    }

    /// Convert a chassis velocity into module states.
    ///
    /// Modules whose required speed is below [`SPEED_HOLD_THRESHOLD_MS`] keep
    /// their previous azimuth with zero speed.
    pub fn to_module_states(&mut self, vel: &ChassisVel) -> [ModuleState; NUM_MODULES] {
        let mut states = [ModuleState::default(); NUM_MODULES];

        for i in 0..NUM_MODULES {
            let v_x = vel.v_x_ms - vel.omega_rads * self.module_pos_m_rb[i][1];
            let v_y = vel.v_y_ms + vel.omega_rads * self.module_pos_m_rb[i][0];

            let speed_ms = v_x.hypot(v_y);

            if speed_ms < SPEED_HOLD_THRESHOLD_MS {
                states[i] = ModuleState {
                    speed_ms: 0.0,
                    angle_rad: self.prev_angles_rad[i],
                };
            }
            else {
                let angle_rad = v_y.atan2(v_x);
                self.prev_angles_rad[i] = angle_rad;
                states[i] = ModuleState { speed_ms, angle_rad };
            }
        }

        states
    }

    /// Recover the chassis velocity from a set of module states.
    ///
    /// This is the exact inverse of [`Self::to_module_states`] when the
    /// states are consistent, and the least-squares estimate otherwise. Used
    /// by odometry to turn measured module states into a velocity estimate.
    pub fn to_chassis_vel(&self, states: &[ModuleState; NUM_MODULES]) -> ChassisVel {
        let mut module_vels = SVector::<f64, 8>::zeros();

        for i in 0..NUM_MODULES {
            module_vels[2 * i] = states[i].speed_ms * states[i].angle_rad.cos();
            module_vels[2 * i + 1] = states[i].speed_ms * states[i].angle_rad.sin();
        }

        let vel = self.inv_matrix * module_vels;

        ChassisVel {
            v_x_ms: vel[0],
            v_y_ms: vel[1],
            omega_rads: vel[2],
        }
    }

    /// Scale all module speeds so that none exceeds the attainable maximum.
    ///
    /// All speeds are scaled by the same factor, preserving the commanded
    /// velocity direction. Returns the applied factor, or `None` if no
    /// scaling was required.
    pub fn desaturate(
        states: &mut [ModuleState; NUM_MODULES],
        max_speed_ms: f64,
    ) -> Option<f64> {
        let max_mag = states
            .iter()
            .map(|s| s.speed_ms.abs())
            .fold(0.0, f64::max);

        if max_mag > max_speed_ms && max_mag > 0.0 {
            let factor = max_speed_ms / max_mag;

            for state in states.iter_mut() {
                state.speed_ms *= factor;
            }

            Some(factor)
        }
        else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_params() -> Params {
        Params {
            wheel_radius_m: 0.05,
            module_pos_m_rb: [
                [0.29, 0.29],
                [0.29, -0.29],
                [-0.29, 0.29],
                [-0.29, -0.29],
            ],
            drv_max_abs_rate_rads: 70.0,
        }
    }

    #[test]
    fn test_round_trip() {
        let mut kin = SwerveKinematics::new(&test_params()).unwrap();

        let vels = [
            ChassisVel { v_x_ms: 1.0, v_y_ms: 0.0, omega_rads: 0.0 },
            ChassisVel { v_x_ms: 0.0, v_y_ms: -2.0, omega_rads: 0.0 },
            ChassisVel { v_x_ms: 0.0, v_y_ms: 0.0, omega_rads: 1.5 },
            ChassisVel { v_x_ms: 1.2, v_y_ms: -0.3, omega_rads: -0.8 },
        ];

        for vel in vels.iter() {
            let states = kin.to_module_states(vel);
            let recovered = kin.to_chassis_vel(&states);

            assert!((recovered.v_x_ms - vel.v_x_ms).abs() < 1e-9);
            assert!((recovered.v_y_ms - vel.v_y_ms).abs() < 1e-9);
            assert!((recovered.omega_rads - vel.omega_rads).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_speed_holds_azimuth() {
        let mut kin = SwerveKinematics::new(&test_params()).unwrap();

        // Drive diagonally to swing all the azimuths away from zero
        let states = kin.to_module_states(&ChassisVel {
            v_x_ms: 1.0,
            v_y_ms: 1.0,
            omega_rads: 0.0,
        });
        let angles: Vec<f64> = states.iter().map(|s| s.angle_rad).collect();

        // Command zero velocity - azimuths must not move
        let stopped = kin.to_module_states(&ChassisVel::default());

        for (state, angle) in stopped.iter().zip(angles.iter()) {
            assert!((state.speed_ms).abs() < f64::EPSILON);
            assert!((state.angle_rad - angle).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_desaturation_preserves_direction() {
        let mut kin = SwerveKinematics::new(&test_params()).unwrap();
        let max_speed_ms = 2.0;

        // A combined translation and rotation demand well over the max speed
        let mut states = kin.to_module_states(&ChassisVel {
            v_x_ms: 3.0,
            v_y_ms: 0.0,
            omega_rads: 4.0,
        });
        let unscaled = states.clone();

        let factor = SwerveKinematics::desaturate(&mut states, max_speed_ms)
            .expect("Demand should have required desaturation");

        assert!(factor <= 1.0);

        let max_mag = states
            .iter()
            .map(|s| s.speed_ms.abs())
            .fold(0.0, f64::max);
        assert!(max_mag <= max_speed_ms + 1e-12);

        // Pairwise ratios between module speeds are unchanged by the scaling
        for i in 0..NUM_MODULES {
            for j in 0..NUM_MODULES {
                let before = unscaled[i].speed_ms / unscaled[j].speed_ms;
                let after = states[i].speed_ms / states[j].speed_ms;
                assert!((before - after).abs() < 1e-9);
            }
            assert!((states[i].angle_rad - unscaled[i].angle_rad).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_no_desaturation_below_max() {
        let mut kin = SwerveKinematics::new(&test_params()).unwrap();

        let mut states = kin.to_module_states(&ChassisVel {
            v_x_ms: 0.5,
            v_y_ms: 0.0,
            omega_rads: 0.0,
        });

        assert!(SwerveKinematics::desaturate(&mut states, 2.0).is_none());
    }
}
