//! Client protocol frames.
//!
//! Every frame is one JSON object on its own line. Requests are tagged by
//! `op`, responses by `status`.

use graphbench_core::SampledSubgraph;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;

/// Request sent by a client session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Create a named tensor store of fixed width
    CreateTensorStore { name: String, dim: usize },

    /// Store one vector under `key`
    PutTensor {
        store: String,
        key: String,
        values: Vec<f32>,
    },

    /// Fetch vectors for `keys`, in order
    GetTensors { store: String, keys: Vec<String> },

    /// Draw a random subgraph
    Subgraph { num_seeds: usize, fan_out: Vec<usize> },

    /// End the session
    Close,
}

/// Server reply to a [`Request`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    /// Request applied, nothing to return
    Ok,

    /// Vectors for a `GetTensors` request
    Tensors { values: Vec<Vec<f32>> },

    /// Result of a `Subgraph` request
    Subgraph { subgraph: SampledSubgraph },

    /// Request rejected
    Error { message: String },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Encode a frame, including the trailing newline.
pub fn encode_frame<T: Serialize>(frame: &T) -> Result<String, BackendError> {
    let mut line = serde_json::to_string(frame)?;
    line.push('\n');
    Ok(line)
}

/// Decode one frame line.
pub fn decode_frame<T: DeserializeOwned>(line: &str) -> Result<T, BackendError> {
    serde_json::from_str(line.trim_end())
        .map_err(|e| BackendError::protocol(format!("invalid frame '{}': {}", line.trim_end(), e)))
}
