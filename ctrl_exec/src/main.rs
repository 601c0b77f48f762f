//! Main control executable entry point.
//!
//! # Architecture
//!
//! The control exec is driven by the trajectories published by the perception exec. For each
//! trajectory received:
//!
//!     - Take a snapshot of the shared tuning values
//!     - Steering control processing on the first target point
//!     - Publish the actuator command
//!
//! Alongside the loop a keyboard thread lets the operator adjust the throttle speed and gains,
//! see `ctrl_lib::key_input`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::Utc;
use color_eyre::{Report, eyre::WrapErr};
use log::{debug, info, warn};

// Internal
use comms_if::net::NetParams;
use ctrl_lib::{
    ctrl_client::{CtrlClient, CtrlClientError},
    key_input::KeyInput,
    params::CtrlExecParams,
    steer_ctrl::{self, SteerCtrl},
    tuning::SharedTuning
};
use util::{
    host,
    logger::{logger_init, parse_level},
    module::{State, TuningHandler},
    session::{self, Session}
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    color_eyre::install()?;

    // ---- LOAD PARAMETERS ----

    let exec_params: CtrlExecParams = util::params::load("ctrl_exec.toml")
        .wrap_err("Could not load ctrl_exec params")?;
    let net_params: NetParams = util::params::load("net.toml")
        .wrap_err("Could not load net params")?;

    // ---- EARLY INITIALISATION ----

    let session = Session::new("ctrl_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    let log_level = parse_level(&exec_params.log_level)
        .wrap_err("Invalid log level in ctrl_exec.toml")?;
    logger_init(log_level, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Lane Keeping Control Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- INITIALISE MODULES ----

    let mut steer = SteerCtrl::default();
    steer.init(exec_params.steer_ctrl.clone())
        .wrap_err("Failed to initialise SteerCtrl")?;
    info!("SteerCtrl init complete, desired column {}", steer.desired_x());

    let tuning = SharedTuning::new(exec_params.tuning);
    let initial_tuning = tuning.snapshot();
    info!("Initial tuning: {:?}", initial_tuning);
    session::save("tuning/tuning.json", initial_tuning);

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = comms_if::net::zmq::Context::new();

    let client = CtrlClient::new(&zmq_ctx, &net_params, exec_params.recv_timeout_ms)
        .wrap_err("Failed to initialise the CtrlClient")?;
    info!("CtrlClient initialised");

    info!("Network initialisation complete");

    // ---- KEYBOARD TUNING ----

    let key_input = if exec_params.keyboard_tuning {
        Some(
            KeyInput::start(tuning.clone(), exec_params.increments)
                .wrap_err("Failed to start keyboard tuning")?
        )
    }
    else {
        info!("Keyboard tuning disabled");
        None
    };

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    let mut num_cmds: u64 = 0;
    let mut was_connected = false;

    loop {
        if key_input.as_ref().map(|k| k.quit_requested()).unwrap_or(false) {
            break
        }

        // ---- TUNING ----

        if let Some(state) = client.tuning_state() {
            steer.on_tuning_state(&state);
        }

        // ---- TRAJECTORY INPUT ----

        let connected = client.traj_connected();
        if connected != was_connected {
            match connected {
                true => info!("Connected to the perception exec"),
                false => warn!("Connection to the perception exec lost")
            }
            was_connected = connected;
        }

        let msg = match client.recv_trajectory() {
            Ok(Some(m)) => m,
            Ok(None) => continue,
            Err(CtrlClientError::MalformedTrajectory(e)) => {
                warn!("Skipping malformed trajectory: {}", e);
                continue
            },
            Err(e) => return Err(e).wrap_err("Could not receive trajectories")
        };

        let target = match msg.target() {
            Some(t) => t,
            None => {
                warn!("Skipping trajectory with no points");
                continue
            }
        };

        // ---- STEERING CONTROL ----

        let input = steer_ctrl::InputData {
            actual_x: target.x as f64,
            tuning: tuning.snapshot(),
            timestamp: Utc::now()
        };

        let (cmd, report) = match steer.proc(&input) {
            Ok(o) => o,
            Err(e) => {
                warn!("Error during SteerCtrl processing: {}", e);
                continue
            }
        };

        // ---- ACTUATOR OUTPUT ----

        client.send_command(&cmd)
            .wrap_err("Could not publish the actuator command")?;
        num_cmds += 1;

        debug!(
            "Target x {} (desired {}), steer {:.3}, throttle {:.2}{}",
            target.x,
            steer.desired_x(),
            cmd.steering_angle,
            cmd.left_throttle,
            if report.saturated { " [saturated]" } else { "" }
        );
    }

    // ---- SHUTDOWN ----

    drop(key_input);

    info!("Published {} actuator commands", num_cmds);
    info!("End of execution");

    session.exit();

    Ok(())
}
