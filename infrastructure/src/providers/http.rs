//! Shared HTTP plumbing for the model backends.

use cloudgenie_application::AdapterError;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::trace;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn build_client() -> Result<reqwest::Client, AdapterError> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| AdapterError::Configuration(format!("failed to build HTTP client: {}", e)))
}

/// POST `body` and decode the JSON response.
///
/// Non-2xx statuses become [`AdapterError::RequestFailed`] carrying the
/// provider's error message when it sends one.
pub(crate) async fn post_json<B: Serialize + ?Sized>(
    provider: &str,
    request: reqwest::RequestBuilder,
    body: &B,
) -> Result<Value, AdapterError> {
    let response = request
        .json(body)
        .send()
        .await
        .map_err(|e| AdapterError::RequestFailed(format!("{} API error: {}", provider, e)))?;

    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| AdapterError::RequestFailed(format!("{} API error: {}", provider, e)))?;
    trace!("{} responded {}: {}", provider, status, String::from_utf8_lossy(&bytes));

    if !status.is_success() {
        return Err(AdapterError::RequestFailed(format!(
            "{} API error ({}): {}",
            provider,
            status,
            error_message(&bytes)
        )));
    }

    serde_json::from_slice(&bytes)
        .map_err(|e| AdapterError::InvalidResponse(format!("{} returned malformed JSON: {}", provider, e)))
}

/// Pull `error.message` out of a provider error body, falling back to the
/// raw text.
fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| {
            let error = v.get("error")?;
            error
                .get("message")
                .and_then(Value::as_str)
                .or_else(|| error.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_from_openai_shape() {
        let body = br#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(error_message(body), "Incorrect API key provided");
    }

    #[test]
    fn error_message_from_plain_string() {
        assert_eq!(error_message(br#"{"error": "overloaded"}"#), "overloaded");
    }

    #[test]
    fn error_message_falls_back_to_body() {
        assert_eq!(error_message(b"Bad Gateway"), "Bad Gateway");
    }
}
