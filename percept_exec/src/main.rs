//! Main perception executable entry point.
//!
//! # Architecture
//!
//! The perception exec runs a single synchronous loop, one iteration per camera frame:
//!
//!     - Acquire the next frame from the frame source
//!     - Binarise it (grayscale, threshold, close)
//!     - Apply any tuning state pushed by the system manager
//!     - Perception processing:
//!         - Boundary tracking
//!         - Lookahead row selection
//!         - Row segmentation
//!     - Publish the target point, if one was found
//!
//! Frames are not queued, the stream source conflates so the loop always works on the latest one.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{Report, eyre::WrapErr};
use log::{debug, info, warn};
use std::time::Instant;

// Internal
use comms_if::{net::NetParams, traj::TrajectoryMsg};
use percept_lib::{
    frame_source::FrameSourceError,
    params::PerceptExecParams,
    percept::Percept,
    percept_server::PerceptServer,
    preproc
};
use util::{
    host,
    logger::{logger_init, parse_level},
    module::{State, TuningHandler},
    session::Session
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    color_eyre::install()?;

    // ---- LOAD PARAMETERS ----

    let exec_params: PerceptExecParams = util::params::load("percept_exec.toml")
        .wrap_err("Could not load percept_exec params")?;
    let net_params: NetParams = util::params::load("net.toml")
        .wrap_err("Could not load net params")?;

    // ---- EARLY INITIALISATION ----

    let session = Session::new("percept_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    let log_level = parse_level(&exec_params.log_level)
        .wrap_err("Invalid log level in percept_exec.toml")?;
    logger_init(log_level, &session)
        .wrap_err("Failed to initialise logging")?;

    info!("Lane Keeping Perception Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- INITIALISE MODULES ----

    let mut percept = Percept::default();
    percept.init(exec_params.percept.clone())
        .wrap_err("Failed to initialise perception")?;
    info!("Perception init complete");

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = comms_if::net::zmq::Context::new();

    let mut source = exec_params.frame_source.open(&zmq_ctx, &net_params)
        .wrap_err("Failed to open the frame source")?;
    info!("Frame source initialised");

    let server = PerceptServer::new(&zmq_ctx, &net_params)
        .wrap_err("Failed to initialise the PerceptServer")?;
    info!("PerceptServer initialised");

    info!("Network initialisation complete");

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    let mut num_frames: u64 = 0;
    let mut num_published: u64 = 0;

    loop {
        let frame = match source.next_frame() {
            Ok(f) => f,
            Err(FrameSourceError::EndOfSequence) => {
                info!("End of image sequence reached, stopping");
                break
            },
            Err(e) => return Err(e).wrap_err("Could not acquire a frame")
        };

        let frame_start = Instant::now();
        num_frames += 1;

        // ---- TUNING ----

        if let Some(state) = server.tuning_state() {
            percept.on_tuning_state(&state);
        }

        // ---- PERCEPTION ----

        let image = preproc::binarise(&frame.image, &exec_params.preproc);

        match percept.proc(&image) {
            Ok((Some(point), report)) => {
                let msg = TrajectoryMsg::single(
                    point,
                    image.width() as u32,
                    image.height() as u32
                );

                server.send(&msg)
                    .wrap_err("Could not publish the trajectory")?;
                num_published += 1;

                debug!(
                    "Target ({}, {}), boundary {}, {:?}",
                    point.x, point.y, report.boundary, report.mode
                );
            },
            Ok((None, report)) => warn!(
                "No lane segment on row {} (boundary {}), frame skipped",
                report.row, report.boundary
            ),
            Err(e) => warn!("Error during perception processing: {}", e)
        }

        // ---- FRAME BUDGET ----

        let frame_dur = frame_start.elapsed().as_secs_f64();
        if frame_dur > exec_params.frame_budget_s {
            warn!(
                "Frame overran its budget by {:.06} s",
                frame_dur - exec_params.frame_budget_s
            );
        }
    }

    // ---- SHUTDOWN ----

    info!(
        "Processed {} frames, published {} trajectories",
        num_frames, num_published
    );
    info!("End of execution");

    session.exit();

    Ok(())
}
