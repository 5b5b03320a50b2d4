//! Transport abstraction

use crate::error::Result;
use flashweb_core::TransportPayload;

/// Status and body of a response, whatever the status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends one payload and waits for the response
///
/// Implementations must issue exactly one request per call and must not
/// retry.
pub trait Transport {
    /// Send the payload to the relay
    async fn send(&self, payload: TransportPayload) -> Result<RawResponse>;
}
