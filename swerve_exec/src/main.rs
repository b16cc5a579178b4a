//! Main robot-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop (fixed 20 ms cycle):
//!         - Mechanisms sensing and odometry update
//!         - Telecommand processing and handling
//!         - Autonomy processing (trajectory generation and control)
//!         - Manual control processing
//!         - Locomotion control processing
//!         - Demand dispatch to the mechanisms layer
//!
//! The loop runs against the in-process simulated mechanisms layer, with
//! telecommands provided by a timed script - the same pipeline a physical
//! robot would run with a hardware mechanisms layer and a live operator.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use comms_if::{eqpt::mech::MechDemsResponse, tc::auto::AutoCmd};
use swerve_lib::{
    auto::{traj::Trajectory, traj_ctrl::TrajCtrl},
    data_store::DataStore,
    loc::Odometry,
    mech_client::{MechInterface, SimMech},
    tc_processor,
};
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.02;

/// Number of cycles per second
const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "swerve_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Swerve Robot Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- INITIALISE TC SCRIPT ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let mut script_interpreter: ScriptInterpreter;

    // If we have a single argument use it as the script path
    if args.len() == 2 {
        info!("Loading script from \"{}\"", &args[1]);

        // Load the script interpreter
        script_interpreter = ScriptInterpreter::new(&args[1])
            .wrap_err("Failed to load script")?;

        // Display some info
        info!(
            "Loaded script lasts {:.02} s and contains {} TCs\n",
            script_interpreter.get_duration(),
            script_interpreter.get_num_tcs()
        );
    }
    // Otherwise error out
    else {
        return Err(eyre!("Expected path to TC script as only argument"));
    }

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    ds.loco_ctrl.init("loco_ctrl.toml", &session)
        .wrap_err("Failed to initialise LocoCtrl")?;
    info!("LocoCtrl init complete");

    ds.manual_ctrl.init("manual_ctrl.toml", &session)
        .wrap_err("Failed to initialise ManualCtrl")?;
    info!("ManualCtrl init complete");

    let mut traj_ctrl = TrajCtrl::init("traj_ctrl.toml")
        .wrap_err("Failed to initialise TrajCtrl")?;
    info!("TrajCtrl init complete");

    // Odometry shares the locomotion geometry parameters
    let mut odometry = Odometry::init("loco_ctrl.toml")
        .wrap_err("Failed to initialise Odometry")?;
    info!("Odometry init complete");

    // The mechanisms layer behind the MechInterface boundary. Hardware
    // drivers are not this software's concern - the simulated layer actuates
    // demands perfectly.
    let mut mech = SimMech::default();

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut end_of_script = false;

    loop {

        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(CYCLE_FREQUENCY_HZ);

        // ---- SENSING & LOCALISATION ----

        // The pose estimate is written here, once, before any reader in the
        // rest of the cycle.
        match mech.get_sens_data() {
            Ok(sens) => match odometry.update(&sens, CYCLE_PERIOD_S) {
                Ok(pose) => ds.rov_pose_lm = Some(pose),
                Err(e) => warn!("Odometry update failed: {}", e),
            },
            Err(e) => warn!("Could not get mechanisms sensor data: {}", e),
        }

        // ---- TELECOMMAND PROCESSING ----

        if !end_of_script {
            match script_interpreter.get_pending_tcs() {
                PendingTcs::None => (),
                PendingTcs::Some(tc_vec) => {
                    for tc in tc_vec.iter() {
                        tc_processor::exec(&mut ds, tc);
                    }
                }
                // Note the end of the script, the exec will stop once the
                // autonomy system has finished any executing route.
                PendingTcs::EndOfScript => {
                    info!("End of TC script reached");
                    end_of_script = true;
                }
            }
        }

        // ---- AUTONOMY PROCESSING ----

        // Handle incoming autonomy commands
        if let Some(auto_cmd) = ds.auto_cmd.take() {
            match auto_cmd {
                AutoCmd::Follow(route) => match Trajectory::generate(&route) {
                    Ok(trajectory) => {
                        let start_pose = trajectory.initial_pose();

                        info!(
                            "Starting route: {} states, {:.2} s, {} waypoints",
                            trajectory.get_num_states(),
                            trajectory.total_duration_s(),
                            route.waypoints.len()
                        );

                        // Odometry is reset to the trajectory's initial pose
                        // at the start of each routine
                        odometry.reset(start_pose);
                        ds.rov_pose_lm = Some(start_pose);

                        if let Err(e) = traj_ctrl.begin_route(trajectory, &start_pose) {
                            warn!("Could not begin route: {}", e);
                        }
                    }
                    // An infeasible route is fatal to that routine only: it
                    // is reported and the routine does not start.
                    Err(e) => warn!("Route rejected: {}", e),
                },
                AutoCmd::Abort => {
                    info!("Route abort requested");
                    traj_ctrl.abort();
                }
            }
        }

        // Manual control processing
        match ds.manual_ctrl.proc(&ds.manual_ctrl_input) {
            Ok((Some(cmd), _)) => ds.loco_ctrl_input.cmd = Some(cmd),
            Ok((None, _)) => (),
            Err(e) => warn!("Error during ManualCtrl processing: {}", e),
        }

        // Trajectory control processing. While a route is executing its
        // output overrides any manual command.
        if let Some(pose) = ds.rov_pose_lm {
            match traj_ctrl.proc(&pose, ds.cycle_time_s) {
                Ok((cmd, report)) => {
                    if let Some(cmd) = cmd {
                        ds.loco_ctrl_input.cmd = Some(cmd);
                    }
                    ds.traj_ctrl_status_rpt = Some(report);
                }
                Err(e) => warn!("Error during TrajCtrl processing: {}", e),
            }

            ds.loco_ctrl_input.heading_rad = pose.heading_rad;
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        // LocoCtrl processing
        match ds.loco_ctrl.proc(&ds.loco_ctrl_input) {
            Ok((output, report)) => {
                ds.loco_ctrl_output = output;
                ds.loco_ctrl_status_rpt = report;
            },
            Err(e) => {
                // LocoCtrl errors usually just mean you sent the wrong TC, so
                // just issue the warning and continue.
                warn!("Error during LocoCtrl processing: {}", e)
            }
        };

        // ---- DISPATCH ----

        // A failed dispatch is surfaced and never retried - the cycle clock
        // keeps advancing and the next cycle commands from the correct
        // elapsed time.
        match mech.send_demands(&ds.loco_ctrl_output) {
            Ok(MechDemsResponse::DemsOk) => (),
            Ok(response) => warn!(
                "Recieved non-nominal response from mechanisms layer: {:?}",
                response
            ),
            Err(e) => warn!("Mechanisms dispatch error: {}", e),
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S)
            .checked_sub(cycle_dur)
        {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            },
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64()
                        - Duration::from_secs_f64(CYCLE_PERIOD_S).as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;

        // If at the end of the script and no route is executing, exit
        if end_of_script && !traj_ctrl.is_executing() {
            info!("End of script and no route executing, exiting");
            break;
        }
    }

    // ---- SHUTDOWN ----

    if let Some(pose) = ds.rov_pose_lm {
        info!(
            "Final pose: ({:.3}, {:.3}) m, {:.1} deg",
            pose.position_m_lm[0],
            pose.position_m_lm[1],
            pose.heading_rad.to_degrees()
        );
    }

    info!("End of execution");

    Ok(())
}
