//! Implementations for the LocoCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{LocoCtrlError, Params, SwerveKinematics};
use comms_if::{eqpt::mech::MechDems, tc::drive::DriveCmd};
use util::{
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Locomotion control module state
#[derive(Default)]
pub struct LocoCtrl {

    pub(crate) params: Params,

    pub(crate) kinematics: Option<SwerveKinematics>,

    pub(crate) report: StatusReport,

    pub(crate) current_cmd: Option<DriveCmd>,

    pub(crate) output: Option<MechDems>,
}

/// Input data to Locomotion Control.
#[derive(Default)]
pub struct InputData {
    /// The drive command to be executed, or `None` if there is no new
    /// command on this cycle. A `None` continues the previous command.
    pub cmd: Option<DriveCmd>,

    /// The current measured heading of the robot, used to resolve
    /// field-relative commands into the body frame.
    ///
    /// Units: radians
    pub heading_rad: f64,
}

/// Status report for LocoCtrl processing.
#[derive(Clone, Copy, Serialize, Debug)]
pub struct StatusReport {
    /// True if the demanded module speeds exceeded the attainable maximum
    /// and were scaled down.
    pub desaturated: bool,

    /// The factor all module speeds were scaled by. 1.0 if no desaturation
    /// occured.
    pub desaturation_factor: f64,
}

impl Default for StatusReport {
    fn default() -> Self {
        StatusReport {
            desaturated: false,
            desaturation_factor: 1.0,
        }
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for LocoCtrl {
    type InitData = &'static str;
    type InitError = LocoCtrlError;

    type InputData = InputData;
    type OutputData = MechDems;
    type StatusReport = StatusReport;
    type ProcError = LocoCtrlError;

    /// Initialise the LocoCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        // Load the parameters
        self.params = match params::load(init_data) {
            Ok(p) => p,
            Err(e) => return Err(LocoCtrlError::ParamLoadError(e))
        };

        // Build the kinematics from the module geometry
        self.kinematics = Some(SwerveKinematics::new(&self.params)?);

        Ok(())
    }

    /// Perform cyclic processing of Locomotion Control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report
        self.report = StatusReport::default();

        // Check to see if there's a new command
        if let Some(cmd) = input_data.cmd {
            if !cmd_is_valid(&cmd) {
                return Err(LocoCtrlError::InvalidDriveCmd(cmd));
            }

            // Update the internal copy of the command
            self.current_cmd = Some(cmd);
        }

        // Calculate the output for the current command. Commands persist
        // between cycles, and field-relative commands must be resolved
        // against the latest heading, so the calculation is repeated every
        // cycle rather than only when a new command arrives.
        match self.current_cmd {
            Some(DriveCmd::Holonomic {
                v_x_ms,
                v_y_ms,
                omega_rads,
                field_relative,
            }) => self.calc_holonomic(
                v_x_ms,
                v_y_ms,
                omega_rads,
                field_relative,
                input_data.heading_rad,
            )?,
            Some(DriveCmd::Stop) => self.calc_stop(),
            None => (),
        }

        // If no output has ever been produced use the default (zero rate,
        // zero azimuth) demands.
        let output = match self.output {
            Some(ref o) => o.clone(),
            None => MechDems::default()
        };

        trace!(
            "LocoCtrl output:\n    drv: {:?}\n    str: {:?}",
            output.speed_rads,
            output.pos_rad
        );

        // Update the output in self
        self.output = Some(output.clone());

        Ok((output, self.report))
    }
}

impl LocoCtrl {

    /// Create a LocoCtrl directly from a parameter set.
    pub fn with_params(params: Params) -> Result<Self, LocoCtrlError> {
        let kinematics = SwerveKinematics::new(&params)?;

        Ok(Self {
            params,
            kinematics: Some(kinematics),
            ..Default::default()
        })
    }

    /// Perform the stop command calculations.
    ///
    /// The stop command shall:
    ///     1. Maintain the current module azimuths
    ///     2. Set all drive axes to zero rate.
    ///
    /// Stop shall never error and must always succeed in bringing the robot
    /// to a full and complete stop.
    pub(crate) fn calc_stop(&mut self) {

        // Get the current output or the default (all zero) demands if no
        // output has been produced yet.
        //
        // Modify it to have all drive rates set at zero.
        let output = match self.output {
            Some(ref o) => {
                let mut o = o.clone();

                for (_, speed) in o.speed_rads.iter_mut() {
                    *speed = 0.0;
                }

                o
            },
            None => MechDems::default()
        };

        self.output = Some(output);
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Determine if the command is valid (i.e. contains only finite values).
fn cmd_is_valid(cmd: &DriveCmd) -> bool {
    match cmd {
        DriveCmd::Holonomic {
            v_x_ms,
            v_y_ms,
            omega_rads,
            ..
        } => v_x_ms.is_finite() && v_y_ms.is_finite() && omega_rads.is_finite(),
        DriveCmd::Stop => true,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::mech::{DRV_IDS, STR_IDS};

    fn test_loco_ctrl() -> LocoCtrl {
        LocoCtrl::with_params(Params {
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

    #[test]
    fn test_stop_zeros_rates_and_holds_azimuths() {
        let mut loco_ctrl = test_loco_ctrl();

        // Drive sideways to swing the azimuths
        let (dems, _) = loco_ctrl
            .proc(&InputData {
                cmd: Some(DriveCmd::Holonomic {
                    v_x_ms: 0.0,
                    v_y_ms: 1.0,
                    omega_rads: 0.0,
                    field_relative: false,
                }),
                heading_rad: 0.0,
            })
            .unwrap();

        let azimuths: Vec<f64> = STR_IDS.iter().map(|id| dems.pos_rad[id]).collect();
        assert!(dems.speed_rads.values().any(|s| s.abs() > 0.0));

        // Stop - rates must be zero, azimuths unchanged
        let (dems, _) = loco_ctrl
            .proc(&InputData {
                cmd: Some(DriveCmd::Stop),
                heading_rad: 0.0,
            })
            .unwrap();

        for id in DRV_IDS.iter() {
            assert!((dems.speed_rads[id]).abs() < f64::EPSILON);
        }
        for (id, azimuth) in STR_IDS.iter().zip(azimuths.iter()) {
            assert!((dems.pos_rad[id] - azimuth).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_field_relative_resolution() {
        let mut loco_ctrl = test_loco_ctrl();

        // A field-relative +X command with the robot facing +Y must drive
        // the modules towards the body -Y direction
        let (dems, _) = loco_ctrl
            .proc(&InputData {
                cmd: Some(DriveCmd::Holonomic {
                    v_x_ms: 1.0,
                    v_y_ms: 0.0,
                    omega_rads: 0.0,
                    field_relative: true,
                }),
                heading_rad: std::f64::consts::FRAC_PI_2,
            })
            .unwrap();

        for id in STR_IDS.iter() {
            assert!(
                (dems.pos_rad[id] + std::f64::consts::FRAC_PI_2).abs() < 1e-9
            );
        }
    }

    #[test]
    fn test_invalid_cmd_rejected() {
        let mut loco_ctrl = test_loco_ctrl();

        let result = loco_ctrl.proc(&InputData {
            cmd: Some(DriveCmd::Holonomic {
                v_x_ms: f64::NAN,
                v_y_ms: 0.0,
                omega_rads: 0.0,
                field_relative: false,
            }),
            heading_rad: 0.0,
        });

        assert!(matches!(result, Err(LocoCtrlError::InvalidDriveCmd(_))));
    }

    #[test]
    fn test_desaturation_reported() {
        let mut loco_ctrl = test_loco_ctrl();

        // Max module speed is 3.5 m/s, this demand is well beyond it
        let (dems, report) = loco_ctrl
            .proc(&InputData {
                cmd: Some(DriveCmd::Holonomic {
                    v_x_ms: 5.0,
                    v_y_ms: 0.0,
                    omega_rads: 0.0,
                    field_relative: false,
                }),
                heading_rad: 0.0,
            })
            .unwrap();

        assert!(report.desaturated);
        assert!(report.desaturation_factor < 1.0);

        // All demanded rates are within the drive axis capability
        for rate in dems.speed_rads.values() {
            assert!(rate.abs() <= 70.0 + 1e-9);
        }
    }
}
