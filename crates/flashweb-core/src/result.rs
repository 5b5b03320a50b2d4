//! Outcome of one submitted operation

use serde::{Deserialize, Serialize};

/// JSON body the relay returns on success
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecResponse {
    /// Tool output, shown verbatim
    pub msg: String,
    /// URL of a produced artifact, if any
    pub out: Option<String>,
}

impl ExecResponse {
    /// Decode a success body
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }
}

/// Outcome of a submission, as rendered by the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// The relay ran the operation successfully
    Success {
        /// Tool output
        message: String,
        /// Download link for a produced artifact
        artifact_url: Option<String>,
    },
    /// The request failed in transport or on the server
    Failure {
        /// HTTP status, `0` when no response was received
        status_code: u16,
        /// Raw response body, or the transport error text
        message: String,
    },
}

impl OperationResult {
    /// Whether this is the success branch
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl From<ExecResponse> for OperationResult {
    fn from(resp: ExecResponse) -> Self {
        Self::Success {
            message: resp.msg,
            artifact_url: resp.out,
        }
    }
}
