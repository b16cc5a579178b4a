//! Trajectory control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;
use serde::Serialize;

// Internal
use super::*;
use crate::auto::traj::Trajectory;
use crate::loc::Pose;
use comms_if::tc::drive::DriveCmd;
use util::params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

pub struct TrajCtrl {
    params: Params,

    /// Executing mode
    mode: TrajCtrlMode,

    /// The trajectory being executed, if any.
    trajectory: Option<Trajectory>,

    /// The session time at which the routine started. Latched on the first
    /// `Running` cycle; elapsed trajectory time is always derived from this,
    /// so missed cycles are never caught up.
    start_time_s: Option<f64>,

    /// The session time of the previous processed cycle, used to derive the
    /// controller timestep.
    last_time_s: Option<f64>,

    /// True if an abort has been requested for the current routine.
    abort_requested: bool,

    /// Controller objects used to calculate drive commands
    controllers: TrajControllers,

    report: StatusReport,
}

/// The status report containing monitoring quantities for the current cycle.
#[derive(Default, Copy, Clone, Serialize)]
pub struct StatusReport {
    /// Time elapsed since the start of the routine.
    pub elapsed_s: f64,

    /// Error between the desired and measured X position.
    pub x_error_m: f64,

    /// Error between the desired and measured Y position.
    pub y_error_m: f64,

    /// Wrapped error between the heading target and the measured heading.
    pub head_error_rad: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Potential errors that can occur during processing of the module.
#[derive(Debug, thiserror::Error)]
pub enum TrajCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(params::LoadError),

    /// A route is already executing. This error occurs when attempting to
    /// begin a new route before the current one has finished.
    #[error("Attempted to begin a route while one is already executing")]
    RouteAlreadyRunning,

    /// The module is in `Running` mode but no trajectory is loaded.
    #[error("No trajectory has been set")]
    NoTrajectory,
}

/// The possible modes of execution of TrajCtrl.
///
/// `Finished` is terminal for a routine instance - a new routine requires a
/// new trajectory and a new call to [`TrajCtrl::begin_route`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum TrajCtrlMode {
    Idle,
    Running,
    Finished
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajCtrl {
    /// Intiailise the TrajCtrl module.
    ///
    /// Expected init data is a path to the parameter file.
    pub fn init(params_path: &str) -> Result<Self, TrajCtrlError> {
        // Load the parameters
        let params = match params::load(params_path) {
            Ok(p) => p,
            Err(e) => return Err(TrajCtrlError::ParamLoadError(e))
        };

        Ok(Self::with_params(params))
    }

    /// Create a TrajCtrl directly from a parameter set.
    pub fn with_params(params: Params) -> Self {
        // Initialise the controllers
        let controllers = TrajControllers::new(&params);

        Self {
            params,
            mode: TrajCtrlMode::Idle,
            trajectory: None,
            start_time_s: None,
            last_time_s: None,
            abort_requested: false,
            controllers,
            report: StatusReport::default(),
        }
    }

    /// Begin executing a trajectory.
    ///
    /// Execution will begin on the next call to `proc`. The caller is
    /// responsible for resetting odometry to the trajectory's initial pose
    /// at this moment; `pose` shall be that initial pose, and seeds the
    /// heading profile.
    ///
    /// Beginning a new route before the current one has finished results in
    /// an error. To stop a route whilst it's executing use [`Self::abort`].
    pub fn begin_route(
        &mut self,
        trajectory: Trajectory,
        pose: &Pose,
    ) -> Result<(), TrajCtrlError> {

        // Check to see if there's already a route executing
        if self.mode == TrajCtrlMode::Running {
            return Err(TrajCtrlError::RouteAlreadyRunning)
        }

        self.controllers.reset(pose);

        self.trajectory = Some(trajectory);
        self.start_time_s = None;
        self.last_time_s = None;
        self.abort_requested = false;

        self.mode = TrajCtrlMode::Running;

        Ok(())
    }

    /// Abort the currently executing route.
    ///
    /// On the next call to `proc` the stop command is issued and the mode
    /// moves to `Finished` - an abort never skips the stop dispatch.
    pub fn abort(&mut self) {
        if self.mode == TrajCtrlMode::Running {
            self.abort_requested = true;
        }
    }

    /// The current mode of the module.
    pub fn mode(&self) -> TrajCtrlMode {
        self.mode
    }

    /// True while a route is executing.
    pub fn is_executing(&self) -> bool {
        self.mode == TrajCtrlMode::Running
    }

    /// Process trajectory control for one cycle.
    ///
    /// `time_s` is the session time of this cycle. Shall be called exactly
    /// once per control cycle - the heading profile advances once per call.
    pub fn proc(
        &mut self,
        pose: &Pose,
        time_s: f64,
    ) -> Result<(Option<DriveCmd>, StatusReport), TrajCtrlError> {

        // Setup cycle data
        self.report = StatusReport::default();

        match self.mode {
            // No actions in Idle, and Finished is terminal for the routine -
            // the stop command has already been issued on the transition.
            TrajCtrlMode::Idle | TrajCtrlMode::Finished => {
                Ok((None, self.report))
            }
            TrajCtrlMode::Running => self.proc_running(pose, time_s),
        }
    }

    /// Process one `Running` cycle.
    fn proc_running(
        &mut self,
        pose: &Pose,
        time_s: f64,
    ) -> Result<(Option<DriveCmd>, StatusReport), TrajCtrlError> {

        // Latch the start time on the first running cycle
        let start_time_s = *self.start_time_s.get_or_insert(time_s);

        // Controller timestep from the previous cycle. The first cycle has
        // no previous cycle and uses a zero timestep.
        let dt_s = match self.last_time_s {
            Some(t) => (time_s - t).max(0.0),
            None => 0.0,
        };
        self.last_time_s = Some(time_s);

        let elapsed_s = time_s - start_time_s;
        self.report.elapsed_s = elapsed_s;

        let (total_duration_s, desired) = match self.trajectory {
            Some(ref t) => (t.total_duration_s(), t.sample(elapsed_s)),
            None => return Err(TrajCtrlError::NoTrajectory),
        };

        // Terminal transition: the trajectory's duration has elapsed, or an
        // abort was requested. The stop command is always dispatched here,
        // whichever path led to the transition.
        if self.abort_requested || elapsed_s >= total_duration_s {
            info!(
                "Route {} after {:.2} s, issuing stop",
                if self.abort_requested { "aborted" } else { "complete" },
                elapsed_s
            );

            self.trajectory = None;
            self.abort_requested = false;
            self.mode = TrajCtrlMode::Finished;

            return Ok((Some(DriveCmd::Stop), self.report));
        }

        // Get the command for this cycle
        let cmd = self.controllers.get_drive_cmd(
            &desired,
            pose,
            dt_s,
            &mut self.report,
            &self.params,
        );

        Ok((Some(cmd), self.report))
    }
}
