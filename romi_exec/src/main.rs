//! Main robot executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logger and parameters
//!     - Build the simulated world and the robot on top of it
//!     - Main loop, one millisecond of virtual time per cycle:
//!         - Run every task that is due
//!         - Advance the simulated world
//!     - Shut the robot down and save the run summary
//!
//! The loop ends when the process is interrupted (Ctrl-C), when the mission
//! duration has elapsed, when the navigation task reaches `Finished`, or when
//! a task fails. Every one of these goes through the robot shutdown, which
//! disables both motors first.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, error, info, warn};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    thread,
    time::{Duration, Instant},
};
use structopt::StructOpt;

// Internal
use romi_lib::{
    mission::{StopReason, Termination},
    robot::{Robot, RobotParams, RunSummary},
    sim::{Pose, Sim, SimParams},
};
use util::{
    logger::{logger_init, LevelFilter},
    params::LoadError,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Virtual time advanced each cycle.
const CYCLE_PERIOD_MS: u64 = 1;

/// Period of the progress report in the log.
const REPORT_PERIOD_MS: i32 = 1000;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "romi_exec", about = "Line following robot, on simulated hardware")]
struct Opts {
    /// Minimum level of log messages
    #[structopt(short, long, default_value = "info")]
    log_level: LevelFilter,

    /// Mission duration in seconds, overrides romi_exec.toml. Zero runs until
    /// interrupted.
    #[structopt(short, long)]
    duration: Option<f64>,

    /// Pace the simulation against the wall clock
    #[structopt(short, long)]
    real_time: bool,
}

/// Everything saved into the session at the end of the run.
#[derive(Serialize)]
struct SessionRecord {
    run: RunSummary,
    final_pose: Pose,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("romi_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(opts.log_level, &session).wrap_err("Failed to initialise logging")?;

    info!("Romi Line Following Robot Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opts);

    // ---- LOAD PARAMETERS ----

    let mut params = RobotParams {
        exec: load_or_default("romi_exec.toml")?,
        wheel_ctrl: load_or_default("wheel_ctrl.toml")?,
        line_sensor: load_or_default("line_sensor.toml")?,
        nav_ctrl: load_or_default("nav_ctrl.toml")?,
    };
    let sim_params: SimParams = load_or_default("sim.toml")?;

    if let Some(d) = opts.duration {
        params.exec.mission_duration_s = d;
    }
    if opts.real_time {
        params.exec.real_time = true;
    }

    info!("Parameters loaded");

    // ---- INITIALISE ROBOT ----

    let sim = Sim::new(sim_params, &params);
    let duration_ms = (params.exec.mission_duration_s * 1000.0) as i32;
    let real_time = params.exec.real_time;

    let mut robot = Robot::new(params, sim.hardware());

    info!("Robot initialised");

    let termination = Termination::new(duration_ms);
    termination
        .install_interrupt_handler()
        .wrap_err("Failed to install the interrupt handler")?;

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    let mut next_report_ms = 0;

    let run_result = loop {
        let cycle_start_instant = Instant::now();

        if let Err(e) = robot.run_once() {
            error!("Task failure, stopping the mission");
            break Err(e);
        }

        let elapsed_ms = robot.elapsed_ms();

        if elapsed_ms >= next_report_ms {
            let pose = sim.pose();
            info!(
                "t = {:>6.1} s, {:?}, x = {:.1} in, y = {:.1} in, heading = {:.1} deg",
                elapsed_ms as f64 / 1000.0,
                robot.nav_mode(),
                pose.x_in,
                pose.y_in,
                pose.heading_rad.to_degrees()
            );
            next_report_ms += REPORT_PERIOD_MS;
        }

        match termination.check(&robot) {
            Some(StopReason::Interrupted) => {
                warn!("Interrupted, stopping the mission");
                break Ok(());
            }
            Some(reason) => {
                info!("Stopping: {}", reason);
                break Ok(());
            }
            None => (),
        }

        sim.advance_ms(CYCLE_PERIOD_MS);

        // ---- CYCLE MANAGEMENT ----

        if real_time {
            let cycle_dur = Instant::now() - cycle_start_instant;

            match Duration::from_millis(CYCLE_PERIOD_MS).checked_sub(cycle_dur) {
                Some(d) => thread::sleep(d),
                None => warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_MS as f64 / 1000.0
                ),
            }
        }
    };

    // ---- SHUTDOWN ----

    let shutdown_result = robot.shutdown();

    let record = SessionRecord {
        run: robot.summary(),
        final_pose: sim.pose(),
    };
    let summary_path = session
        .save_json("summary.json", &record)
        .wrap_err("Failed to save the run summary")?;
    info!("Run summary saved to {:?}", summary_path);

    run_result.wrap_err("Mission aborted")?;
    shutdown_result.wrap_err("Robot shutdown failed")?;

    info!("End of execution");

    Ok(())
}

/// Load a parameter file, falling back to the defaults if it doesn't exist.
///
/// A file which exists but fails to parse is an error.
fn load_or_default<P>(file: &str) -> Result<P, Report>
where
    P: DeserializeOwned + Default,
{
    match util::params::load(file) {
        Ok(p) => Ok(p),
        Err(LoadError::FileLoadError(e)) => {
            warn!("Could not load {} ({}), using defaults", file, e);
            Ok(P::default())
        }
        Err(e) => Err(e).wrap_err_with(|| format!("Could not load {}", file)),
    }
}
