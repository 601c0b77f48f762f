//! # Tuning state
//!
//! The system manager may push a tuning state to any running exec at any time. Each exec decides
//! for itself whether to act on it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::warn;
use serde::{Serialize, Deserialize};

use crate::net::{zmq, MonitoredSocket, MonitoredSocketError, RecvError, SocketOptions};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A set of named tuning values.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct TuningState {
    pub values: Vec<TuningEntry>,
}

/// A single named tuning value
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TuningEntry {
    pub key: String,
    pub value: TuningValue,
}

/// Subscriber to the system manager's tuning state stream.
///
/// Polled once per cycle by the execs, never blocks.
pub struct TuningSubscriber {
    socket: MonitoredSocket
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The value of a tuning entry.
///
/// Integers are tried before floats so `3` is an `Int` and `3.0` a `Float`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum TuningValue {
    Int(i64),
    Float(f64),
    Str(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TuningState {
    /// Get the value with the given key, if present.
    pub fn get(&self, key: &str) -> Option<&TuningValue> {
        self.values
            .iter()
            .find(|e| e.key == key)
            .map(|e| &e.value)
    }

    /// Get a numeric value as a float. Integer values are widened.
    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            TuningValue::Float(f) => Some(*f),
            TuningValue::Int(i) => Some(*i as f64),
            TuningValue::Str(_) => None
        }
    }

    /// Get an integer value.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            TuningValue::Int(i) => Some(*i),
            _ => None
        }
    }
}

impl TuningSubscriber {
    /// Connect to the system manager's tuning endpoint.
    ///
    /// This function will not block until the system manager connects.
    pub fn new(ctx: &zmq::Context, endpoint: &str) -> Result<Self, MonitoredSocketError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            conflate: true,
            linger: 1,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(ctx, zmq::SUB, socket_options, endpoint)?;

        Ok(Self { socket })
    }

    /// Get the latest tuning state, if a new one has been published.
    ///
    /// Malformed states are dropped with a warning.
    pub fn latest(&self) -> Option<TuningState> {
        match self.socket.recv_json(zmq::DONTWAIT) {
            Ok(s) => s,
            Err(RecvError::SocketError(e)) => {
                warn!("Could not read from the tuning socket: {}", e);
                None
            },
            Err(e) => {
                warn!("Received an invalid tuning state: {}", e);
                None
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lookup() {
        let state: TuningState = serde_json::from_str(r#"{
            "values": [
                {"key": "kp", "value": 0.003},
                {"key": "desired-trajectory-point", "value": 320},
                {"key": "name", "value": "controller"}
            ]
        }"#).unwrap();

        assert_eq!(state.get_float("kp"), Some(0.003));
        assert_eq!(state.get_int("desired-trajectory-point"), Some(320));
        assert_eq!(state.get_float("desired-trajectory-point"), Some(320.0));
        assert_eq!(state.get_float("name"), None);
        assert_eq!(state.get("missing"), None);
    }
}
