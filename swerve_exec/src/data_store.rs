//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::{eqpt::mech::MechDems, tc::auto::AutoCmd};

use crate::{auto::traj_ctrl, loc::Pose, loco_ctrl, manual_ctrl};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time at the start of this cycle
    pub cycle_time_s: f64,

    // Localisation
    pub rov_pose_lm: Option<Pose>,

    // LocoCtrl
    pub loco_ctrl: loco_ctrl::LocoCtrl,
    pub loco_ctrl_input: loco_ctrl::InputData,
    pub loco_ctrl_output: MechDems,
    pub loco_ctrl_status_rpt: loco_ctrl::StatusReport,

    // ManualCtrl
    pub manual_ctrl: manual_ctrl::ManualCtrl,
    pub manual_ctrl_input: manual_ctrl::InputData,

    // Autonomy
    pub auto_cmd: Option<AutoCmd>,

    pub traj_ctrl_status_rpt: Option<traj_ctrl::StatusReport>,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and
    /// sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        if self.num_cycles % (cycle_frequency_hz as u128) == 0 {
            self.is_1_hz_cycle = true;
        } else {
            self.is_1_hz_cycle = false;
        }

        self.loco_ctrl_input = loco_ctrl::InputData::default();
        self.loco_ctrl_output = MechDems::default();
        self.loco_ctrl_status_rpt = loco_ctrl::StatusReport::default();
        self.manual_ctrl_input = manual_ctrl::InputData::default();

        self.cycle_time_s = util::session::get_elapsed_seconds();
    }
}
