//! # Perception Server
//!
//! Publishes the trajectory extracted from each frame and, if a system manager is configured,
//! listens for tuning state updates.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, SendError, SocketOptions},
    traj::TrajectoryMsg,
    tuning::{TuningState, TuningSubscriber}
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Perception server
pub struct PerceptServer {
    socket: MonitoredSocket,

    tuning: Option<TuningSubscriber>
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PerceptServerError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not subscribe to tuning states: {0}")]
    TuningSocketError(MonitoredSocketError),

    #[error("Could not send the trajectory: {0}")]
    SendError(SendError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PerceptServer {
    /// Create a new instance of the perception server.
    ///
    /// This function will not block until a subscriber connects.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, PerceptServerError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            bind: true,
            linger: 1,
            send_timeout: 10,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(
            ctx,
            zmq::PUB,
            socket_options,
            &params.trajectory_endpoint
        ).map_err(PerceptServerError::SocketError)?;

        let tuning = match params.tuning_endpoint {
            Some(ref e) => Some(
                TuningSubscriber::new(ctx, e)
                    .map_err(PerceptServerError::TuningSocketError)?
            ),
            None => None
        };

        Ok(Self {
            socket,
            tuning
        })
    }

    /// Publish a trajectory.
    pub fn send(&self, msg: &TrajectoryMsg) -> Result<(), PerceptServerError> {
        self.socket.send_json(msg)
            .map_err(PerceptServerError::SendError)
    }

    /// Get the latest tuning state, if one has arrived since the last call.
    pub fn tuning_state(&self) -> Option<TuningState> {
        self.tuning.as_ref().and_then(|t| t.latest())
    }
}
