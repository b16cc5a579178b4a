//! Holonomic maneuver calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;

// Internal
use super::*;
use comms_if::eqpt::mech::MechDems;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LocoCtrl {
    /// Perform the holonomic command calculations.
    ///
    /// A holonomic manouvre drives the chassis with independent
    /// translational and rotational velocity. Each module's velocity is the
    /// vector sum of the translational demand and the tangential velocity
    /// induced by the rotational demand at that module's position, which the
    /// kinematics resolve into a (speed, azimuth) pair per module.
    ///
    /// If any module's speed demand exceeds the attainable maximum, all
    /// module speeds are scaled down by a common factor so the commanded
    /// velocity direction is preserved.
    pub(crate) fn calc_holonomic(
        &mut self,
        v_x_ms: f64,
        v_y_ms: f64,
        omega_rads: f64,
        field_relative: bool,
        heading_rad: f64,
    ) -> Result<(), super::LocoCtrlError> {
        // Resolve field-relative commands into the body frame by rotating
        // the translational demand by the inverse of the current heading.
        let (v_x_rb_ms, v_y_rb_ms) = if field_relative {
            let (sin_h, cos_h) = heading_rad.sin_cos();
            (
                v_x_ms * cos_h + v_y_ms * sin_h,
                -v_x_ms * sin_h + v_y_ms * cos_h,
            )
        }
        else {
            (v_x_ms, v_y_ms)
        };

        let kinematics = match self.kinematics {
            Some(ref mut k) => k,
            None => return Err(super::LocoCtrlError::NotInit),
        };

        let mut module_states = kinematics.to_module_states(&ChassisVel {
            v_x_ms: v_x_rb_ms,
            v_y_ms: v_y_rb_ms,
            omega_rads,
        });

        // Limit the demand to the robot's capabilities
        if let Some(factor) = SwerveKinematics::desaturate(
            &mut module_states,
            self.params.max_module_speed_ms(),
        ) {
            self.report.desaturated = true;
            self.report.desaturation_factor = factor;

            debug!("Module speeds desaturated by factor {:.3}", factor);
        }

        // Convert the module states into actuator demands, with the drive
        // rates converted from linear wheel speed into angular rate.
        let mut dems = MechDems::default();

        for (i, (drv_id, str_id)) in MODULE_ACT_IDS.iter().enumerate() {
            dems.pos_rad.insert(*str_id, module_states[i].angle_rad);
            dems.speed_rads.insert(
                *drv_id,
                module_states[i].speed_ms / self.params.wheel_radius_m,
            );
        }

        self.output = Some(dems);

        Ok(())
    }
}
