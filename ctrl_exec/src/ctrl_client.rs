//! # Control Client
//!
//! Subscribes to the trajectories published by the perception exec and publishes the resulting
//! actuator commands.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::act::ActuatorCommand,
    net::{zmq, MonitoredSocket, MonitoredSocketError, NetParams, RecvError, SendError, SocketOptions},
    traj::TrajectoryMsg,
    tuning::{TuningState, TuningSubscriber}
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The control client
pub struct CtrlClient {
    traj_socket: MonitoredSocket,

    act_socket: MonitoredSocket,

    tuning: Option<TuningSubscriber>
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CtrlClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not receive a trajectory: {0}")]
    RecvError(zmq::Error),

    #[error("Received a malformed trajectory: {0}")]
    MalformedTrajectory(RecvError),

    #[error("Could not send the actuator command: {0}")]
    SendError(SendError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CtrlClient {
    /// Create a new instance of the control client.
    ///
    /// Neither socket waits for its peer. Receiving a trajectory blocks for at most
    /// `recv_timeout_ms` milliseconds.
    pub fn new(
        ctx: &zmq::Context,
        params: &NetParams,
        recv_timeout_ms: i32
    ) -> Result<Self, CtrlClientError> {
        let traj_options = SocketOptions {
            block_on_first_connect: false,
            conflate: true,
            linger: 1,
            recv_timeout: recv_timeout_ms,
            ..Default::default()
        };

        let traj_socket = MonitoredSocket::new(
            ctx,
            zmq::SUB,
            traj_options,
            &params.trajectory_endpoint
        ).map_err(CtrlClientError::SocketError)?;

        let act_options = SocketOptions {
            block_on_first_connect: false,
            bind: true,
            linger: 1,
            send_timeout: 10,
            ..Default::default()
        };

        let act_socket = MonitoredSocket::new(
            ctx,
            zmq::PUB,
            act_options,
            &params.actuator_endpoint
        ).map_err(CtrlClientError::SocketError)?;

        let tuning = match params.tuning_endpoint {
            Some(ref e) => Some(
                TuningSubscriber::new(ctx, e).map_err(CtrlClientError::SocketError)?
            ),
            None => None
        };

        Ok(Self {
            traj_socket,
            act_socket,
            tuning
        })
    }

    /// Wait for the next trajectory.
    ///
    /// Returns `None` if nothing arrived within the receive timeout. Messages which can't be
    /// parsed give a `MalformedTrajectory` error, which callers may skip.
    pub fn recv_trajectory(&self) -> Result<Option<TrajectoryMsg>, CtrlClientError> {
        match self.traj_socket.recv_json(0) {
            Ok(m) => Ok(m),
            Err(RecvError::SocketError(e)) => Err(CtrlClientError::RecvError(e)),
            Err(e) => Err(CtrlClientError::MalformedTrajectory(e))
        }
    }

    /// Publish an actuator command.
    pub fn send_command(&self, cmd: &ActuatorCommand) -> Result<(), CtrlClientError> {
        self.act_socket.send_json(cmd)
            .map_err(CtrlClientError::SendError)
    }

    /// Get the latest tuning state, if one has arrived since the last call.
    pub fn tuning_state(&self) -> Option<TuningState> {
        self.tuning.as_ref().and_then(|t| t.latest())
    }

    /// True if the perception exec is connected.
    pub fn traj_connected(&self) -> bool {
        self.traj_socket.connected()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
