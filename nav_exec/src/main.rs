//! Main navigation executable entry point.
//! 
//! # Architecture
//! 
//! The executable runs a simulated robot through a scripted list of
//! navigation commands:
//! 
//!     - Initialise session, logging and parameters
//!     - Build the simulated arena and hand its equipment to NavCtrl
//!     - For each command:
//!         - Execute it in NavCtrl
//!         - Archive the believed pose
//!     - Save the obstacle map into the session
//!     - Exit with an error if a command failed

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{Report, eyre::WrapErr};
use log::{error, info, warn};
use structopt::StructOpt;

// Internal
use nav_lib::{
    eqpt::{Actuation, RangeSensing},
    map::{ObstacleMap, PointMap},
    nav_ctrl::{NavCommand, NavCtrl, NavCtrlError, Params},
    sim::SimArena,
};
use params::NavExecParams;
use util::{
    archive::Archived,
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "nav_exec", about = "Marvin navigation executable")]
struct Opts {
    /// Executable parameter file, relative to the params directory
    #[structopt(short, long, default_value = "nav_exec.toml")]
    params: String,

    /// Minimum log level (info, debug or trace)
    #[structopt(short, long, default_value = "debug")]
    log_level: LevelFilter,
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
    let session = Session::new(
        "nav_exec", 
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(opts.log_level, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Marvin Navigation Executable\n");
    info!("Running on: {}", host::get_host_info());
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: NavExecParams = util::params::load(&opts.params)
        .wrap_err("Could not load exec params")?;

    info!("Exec parameters loaded");

    // The simulated robot shares NavCtrl's calibration so that commanded
    // motion matches the motion NavCtrl believes in.
    let nav_params: Params = util::params::load(&exec_params.nav_ctrl_params)
        .wrap_err("Could not load NavCtrl params")?;

    // ---- INITIALISE MODULES ----

    let (ranger, motors) = SimArena::new(
        exec_params.arena_extent,
        exec_params.true_start_pose,
        nav_params,
    ).into_eqpt(exec_params.realtime);

    let mut nav_ctrl = NavCtrl::new(
        ranger,
        motors,
        PointMap::new(exec_params.arena_extent)
    );
    nav_ctrl.init(exec_params.nav_ctrl_params.clone(), &session)
        .wrap_err("Failed to initialise NavCtrl")?;

    info!("NavCtrl initialised");

    // ---- MAIN LOOP ----

    info!("Initialisation complete, executing {} commands", exec_params.commands.len());

    let script_result = run_commands(&mut nav_ctrl, &exec_params.commands);

    // ---- SHUTDOWN ----

    info!(
        "True pose {}, believed pose {}",
        nav_ctrl.sensors().arena().true_pose(),
        nav_ctrl.pose()
    );

    let map_path = session.save_json("nav_ctrl/obstacle_map.json", nav_ctrl.map())
        .wrap_err("Could not save the obstacle map")?;

    info!(
        "{} obstacles saved to {:?} ({} outside the arena)",
        nav_ctrl.map().points().len(),
        map_path,
        nav_ctrl.map().num_outside()
    );

    script_result.wrap_err("Command script aborted")?;

    Ok(())
}

/// Execute the commands in order, archiving the pose after each one.
///
/// A calibration which does not converge is only warned about. Any other
/// failure stops the script and is returned.
fn run_commands<R, A, M>(
    nav_ctrl: &mut NavCtrl<R, A, M>,
    commands: &[NavCommand],
) -> Result<(), NavCtrlError>
where
    R: RangeSensing,
    A: Actuation,
    M: ObstacleMap,
{
    for cmd in commands.iter() {
        let result = nav_ctrl.proc(cmd);

        if let Err(e) = nav_ctrl.write() {
            warn!("Could not archive NavCtrl: {}", e);
        }

        match result {
            Ok((pose, report)) => {
                info!("{:?} complete, believed pose {}", cmd, pose);
                if !report.obstacles.is_empty() {
                    info!("    Obstacles: {:?}", report.obstacles);
                }
            },
            Err(NavCtrlError::CalibrationNotConverged { .. }) => {
                warn!(
                    "Calibration did not converge, continuing from {}",
                    nav_ctrl.pose()
                );
            },
            Err(e) => {
                error!("{:?} failed: {}", cmd, e);
                return Err(e);
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
