//! Implementations for the ManualCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{ManualCtrlError, Params};
use comms_if::tc::drive::DriveCmd;
use util::{
    maths::lin_map,
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Manual control module state
#[derive(Default)]
pub struct ManualCtrl {

    pub(crate) params: Params,

    pub(crate) report: StatusReport,
}

/// Input data to Manual Control.
#[derive(Default)]
pub struct InputData {
    /// The joystick axes for this cycle in the order
    /// `[strafe_x, strafe_y, rotation]`, each normalised into [-1, +1], or
    /// `None` if no joystick input arrived this cycle.
    pub axes: Option<[f64; 3]>,
}

/// Status report for ManualCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// True if all axes were inside the deadband.
    pub in_deadband: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for ManualCtrl {
    type InitData = &'static str;
    type InitError = ManualCtrlError;

    type InputData = InputData;
    type OutputData = Option<DriveCmd>;
    type StatusReport = StatusReport;
    type ProcError = ManualCtrlError;

    /// Initialise the ManualCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        self.params = match params::load(init_data) {
            Ok(p) => p,
            Err(e) => return Err(ManualCtrlError::ParamLoadError(e))
        };

        Ok(())
    }

    /// Perform cyclic processing of Manual Control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        self.report = StatusReport::default();

        // No joystick input this cycle, no command - the previous locomotion
        // behaviour continues.
        let axes = match input_data.axes {
            Some(a) => a,
            None => return Ok((None, self.report))
        };

        let shaped: Vec<f64> = axes
            .iter()
            .map(|a| apply_deadband(*a, self.params.axis_deadband))
            .collect();

        // With all axes inside the deadband command a stop rather than a
        // zero velocity, holding the module azimuths.
        if shaped.iter().all(|a| *a == 0.0) {
            self.report.in_deadband = true;
            return Ok((Some(DriveCmd::Stop), self.report));
        }

        let cmd = DriveCmd::Holonomic {
            v_x_ms: shaped[0] * self.params.max_speed_ms,
            v_y_ms: shaped[1] * self.params.max_speed_ms,
            omega_rads: shaped[2] * self.params.max_rate_rads,
            field_relative: true,
        };

        Ok((Some(cmd), self.report))
    }
}

impl ManualCtrl {
    /// Create a ManualCtrl directly from a parameter set.
    pub fn with_params(params: Params) -> Self {
        Self {
            params,
            report: StatusReport::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Apply a deadband to a single axis value.
///
/// Values inside the deadband map to zero, and the remaining range is
/// rescaled onto [0, 1] so there is no step at the deadband edge.
fn apply_deadband(axis: f64, deadband: f64) -> f64 {
    if axis.abs() < deadband {
        0.0
    }
    else {
        axis.signum() * lin_map((deadband, 1.0), (0.0, 1.0), axis.abs())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_manual_ctrl() -> ManualCtrl {
        ManualCtrl::with_params(Params {
            axis_deadband: 0.1,
            max_speed_ms: 3.0,
            max_rate_rads: std::f64::consts::PI,
        })
    }

    #[test]
    fn test_no_axes_no_cmd() {
        let mut manual_ctrl = test_manual_ctrl();

        let (cmd, _) = manual_ctrl.proc(&InputData { axes: None }).unwrap();
        assert!(cmd.is_none());
    }

    #[test]
    fn test_deadband_commands_stop() {
        let mut manual_ctrl = test_manual_ctrl();

        let (cmd, report) = manual_ctrl
            .proc(&InputData {
                axes: Some([0.05, -0.02, 0.0]),
            })
            .unwrap();

        assert!(matches!(cmd, Some(DriveCmd::Stop)));
        assert!(report.in_deadband);
    }

    #[test]
    fn test_full_deflection_commands_max() {
        let mut manual_ctrl = test_manual_ctrl();

        let (cmd, _) = manual_ctrl
            .proc(&InputData {
                axes: Some([1.0, -1.0, 1.0]),
            })
            .unwrap();

        match cmd {
            Some(DriveCmd::Holonomic {
                v_x_ms,
                v_y_ms,
                omega_rads,
                field_relative,
            }) => {
                assert!((v_x_ms - 3.0).abs() < 1e-12);
                assert!((v_y_ms + 3.0).abs() < 1e-12);
                assert!((omega_rads - std::f64::consts::PI).abs() < 1e-12);
                assert!(field_relative);
            }
            _ => panic!("Expected a holonomic command"),
        }
    }

    #[test]
    fn test_deadband_edge_is_continuous() {
        let mut manual_ctrl = test_manual_ctrl();

        let (cmd, _) = manual_ctrl
            .proc(&InputData {
                axes: Some([0.100001, 0.0, 0.0]),
            })
            .unwrap();

        match cmd {
            Some(DriveCmd::Holonomic { v_x_ms, .. }) => {
                assert!(v_x_ms.abs() < 1e-3);
            }
            _ => panic!("Expected a holonomic command"),
        }
    }
}
