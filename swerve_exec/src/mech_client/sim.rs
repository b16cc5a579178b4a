//! Simulated mechanisms layer

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{MechClientError, MechInterface};
use comms_if::eqpt::mech::{
    MechDems, MechDemsResponse, MechSensData, DRV_IDS, STR_IDS,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A perfect-response simulated mechanisms layer.
///
/// Demands are actuated instantly: the sensor data returned on the next
/// cycle is exactly the previously demanded actuator state. This is the
/// layer used by the demo executable and the closed-loop tests.
pub struct SimMech {
    sens: MechSensData,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SimMech {
    fn default() -> Self {
        Self {
            sens: MechSensData::default(),
        }
    }
}

impl MechInterface for SimMech {
    fn send_demands(
        &mut self,
        dems: &MechDems,
    ) -> Result<MechDemsResponse, MechClientError> {
        // Reject incomplete demand sets
        let complete = STR_IDS.iter().all(|id| dems.pos_rad.contains_key(id))
            && DRV_IDS.iter().all(|id| dems.speed_rads.contains_key(id));

        if !complete {
            return Ok(MechDemsResponse::DemsInvalid);
        }

        for id in STR_IDS.iter() {
            self.sens.pos_rad.insert(*id, dems.pos_rad[id]);
        }
        for id in DRV_IDS.iter() {
            self.sens.speed_rads.insert(*id, dems.speed_rads[id]);
        }

        Ok(MechDemsResponse::DemsOk)
    }

    fn get_sens_data(&mut self) -> Result<MechSensData, MechClientError> {
        Ok(self.sens.clone())
    }
}
