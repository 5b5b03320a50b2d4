//! One submission, two outcomes

use crate::transport::Transport;
use flashweb_core::{ExecResponse, OperationRequest, OperationResult};

/// Submit one request and classify the outcome
///
/// Exactly one attempt is made. The result is always one of:
/// - `Success` for a 2xx response whose body is `{"msg", "out"}` JSON
/// - `Failure` with the status and raw body for any other response
/// - `Failure` with status `0` and the error text when no response arrived
///
/// Nothing is retried and no error escapes; the caller renders whatever
/// comes back.
pub async fn submit<T: Transport>(transport: &T, request: &OperationRequest) -> OperationResult {
    log::info!(
        "Submitting {} (programmer: {:?})",
        request.action,
        request.programmer
    );

    let payload = request.to_transport_payload();
    let response = match transport.send(payload).await {
        Ok(response) => response,
        Err(e) => {
            log::error!("Request failed: {}", e);
            return OperationResult::Failure {
                status_code: 0,
                message: e.to_string(),
            };
        }
    };

    if !response.is_success() {
        log::warn!("Relay answered with status {}", response.status);
        return OperationResult::Failure {
            status_code: response.status,
            message: response.body_text(),
        };
    }

    match ExecResponse::from_slice(&response.body) {
        Ok(exec) => exec.into(),
        Err(e) => {
            log::warn!("Malformed success body: {}", e);
            OperationResult::Failure {
                status_code: response.status,
                message: response.body_text(),
            }
        }
    }
}
