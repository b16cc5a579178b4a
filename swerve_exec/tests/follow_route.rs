//! Closed-loop route following test.
//!
//! Runs the full autonomy pipeline - trajectory generation, trajectory
//! control, locomotion control, the simulated mechanisms layer and odometry
//! - cycle by cycle to completion, and checks the robot arrives at the final
//! waypoint, at rest.

use std::f64::consts::PI;

use comms_if::{
    eqpt::mech::{MechDemsResponse, DRV_IDS},
    tc::{auto::RouteSpec, drive::DriveCmd},
};
use swerve_lib::{
    auto::{
        traj::Trajectory,
        traj_ctrl::{Params as TrajCtrlParams, TrajCtrl, TrajCtrlMode},
    },
    loc::Odometry,
    loco_ctrl::{InputData, LocoCtrl, Params as LocoCtrlParams},
    mech_client::{MechInterface, SimMech},
};
use util::maths::ang_dist_pi;
use util::module::State;

/// The control cycle period used by the executive.
const CYCLE_PERIOD_S: f64 = 0.02;

fn loco_ctrl_params() -> LocoCtrlParams {
    LocoCtrlParams {
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

fn traj_ctrl_params() -> TrajCtrlParams {
    TrajCtrlParams {
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
fn test_follow_route_to_completion() {
    let route = RouteSpec {
        waypoints: vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 45f64.to_radians()],
            [1.0, -1.0, 135f64.to_radians()],
            [2.0, -1.0, 180f64.to_radians()],
        ],
        max_speed_ms: 3.0,
        max_accel_mss: 3.0,
        max_centrip_mss: None,
    };

    let loco_params = loco_ctrl_params();
    let mut loco_ctrl = LocoCtrl::with_params(loco_params.clone()).unwrap();
    let mut odometry = Odometry::with_params(&loco_params).unwrap();
    let mut traj_ctrl = TrajCtrl::with_params(traj_ctrl_params());
    let mut mech = SimMech::default();

    let trajectory = Trajectory::generate(&route).unwrap();
    let duration_s = trajectory.total_duration_s();
    let start_pose = trajectory.initial_pose();

    odometry.reset(start_pose);
    traj_ctrl.begin_route(trajectory, &start_pose).unwrap();

    let mut last_cmd = None;

    // Run the loop in the executive's strict per-cycle order: sensing and
    // odometry, trajectory control, locomotion control, dispatch. Cap the
    // cycle count well beyond the trajectory duration.
    let max_cycles = (3.0 * duration_s / CYCLE_PERIOD_S) as usize;
    for cycle in 0..max_cycles {
        let time_s = cycle as f64 * CYCLE_PERIOD_S;

        let sens = mech.get_sens_data().unwrap();
        let pose = odometry.update(&sens, CYCLE_PERIOD_S).unwrap();

        let (cmd, _report) = traj_ctrl.proc(&pose, time_s).unwrap();
        if let Some(cmd) = cmd {
            last_cmd = Some(cmd);
        }

        let (dems, _report) = loco_ctrl
            .proc(&InputData {
                cmd,
                heading_rad: pose.heading_rad,
            })
            .unwrap();

        assert!(matches!(
            mech.send_demands(&dems).unwrap(),
            MechDemsResponse::DemsOk
        ));

        if traj_ctrl.mode() == TrajCtrlMode::Finished {
            break;
        }
    }

    // The route completed and the terminal action was a full stop
    assert_eq!(traj_ctrl.mode(), TrajCtrlMode::Finished);
    assert!(matches!(last_cmd, Some(DriveCmd::Stop)));

    // The dispatched stop zeroed every drive rate
    let sens = mech.get_sens_data().unwrap();
    for id in DRV_IDS.iter() {
        assert!(sens.speed_rads[id].abs() < f64::EPSILON);
    }

    // The odometry estimate is on the final waypoint: within 5 cm and 2 deg
    let final_pose = odometry.current_pose();
    let pos_err_m =
        ((final_pose.position_m_lm[0] - 2.0).powi(2)
            + (final_pose.position_m_lm[1] + 1.0).powi(2))
        .sqrt();
    let head_err_rad = ang_dist_pi(final_pose.heading_rad, PI);

    assert!(
        pos_err_m < 0.05,
        "Final position error {:.3} m exceeds 5 cm",
        pos_err_m
    );
    assert!(
        head_err_rad.abs() < 2f64.to_radians(),
        "Final heading error {:.2} deg exceeds 2 deg",
        head_err_rad.to_degrees()
    );
}

#[test]
fn test_abort_stops_the_robot() {
    let route = RouteSpec {
        waypoints: vec![[0.0, 0.0, 0.0], [3.0, 0.0, 0.0]],
        max_speed_ms: 2.0,
        max_accel_mss: 2.0,
        max_centrip_mss: None,
    };

    let loco_params = loco_ctrl_params();
    let mut loco_ctrl = LocoCtrl::with_params(loco_params.clone()).unwrap();
    let mut odometry = Odometry::with_params(&loco_params).unwrap();
    let mut traj_ctrl = TrajCtrl::with_params(traj_ctrl_params());
    let mut mech = SimMech::default();

    let trajectory = Trajectory::generate(&route).unwrap();
    let start_pose = trajectory.initial_pose();

    odometry.reset(start_pose);
    traj_ctrl.begin_route(trajectory, &start_pose).unwrap();

    // Run half a second of cycles, abort, then run one more cycle
    let mut last_cmd = None;
    for cycle in 0..26 {
        let time_s = cycle as f64 * CYCLE_PERIOD_S;

        if cycle == 25 {
            traj_ctrl.abort();
        }

        let sens = mech.get_sens_data().unwrap();
        let pose = odometry.update(&sens, CYCLE_PERIOD_S).unwrap();

        let (cmd, _) = traj_ctrl.proc(&pose, time_s).unwrap();
        if let Some(cmd) = cmd {
            last_cmd = Some(cmd);
        }

        let (dems, _) = loco_ctrl
            .proc(&InputData {
                cmd,
                heading_rad: pose.heading_rad,
            })
            .unwrap();
        mech.send_demands(&dems).unwrap();
    }

    // The abort transitioned to Finished via a stop dispatch, even though
    // the robot was moving mid-route
    assert_eq!(traj_ctrl.mode(), TrajCtrlMode::Finished);
    assert!(matches!(last_cmd, Some(DriveCmd::Stop)));

    let sens = mech.get_sens_data().unwrap();
    for id in DRV_IDS.iter() {
        assert!(sens.speed_rads[id].abs() < f64::EPSILON);
    }
}
