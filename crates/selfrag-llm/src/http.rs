//! Shared HTTP plumbing for the remote providers

use crate::LlmError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::warn;

/// Default timeout for LLM requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Build the HTTP client used by a provider
pub(crate) fn build_client(timeout_secs: u64) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))
}

/// Build the private runtime a provider blocks on for the synchronous ports
///
/// Providers must not be driven from inside another tokio runtime.
pub(crate) fn build_runtime() -> Result<Runtime, LlmError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| LlmError::Other(format!("Failed to start runtime: {}", e)))
}

/// Whether a failed status is worth another attempt
///
/// Rate limits and server errors are transient; other client errors repeat.
pub(crate) fn is_retryable(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// POST a JSON body and decode a JSON reply, retrying transient failures
///
/// Retries use exponential backoff: 1s, 2s, 4s, etc. A 404 is reported as
/// an unavailable model. Other 4xx statuses except 429 fail immediately, as
/// does an undecodable body.
pub(crate) async fn post_json<B, R>(
    client: &reqwest::Client,
    url: &str,
    headers: &[(&str, &str)],
    body: &B,
    max_retries: u32,
    model: &str,
) -> Result<R, LlmError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let mut attempts = 0;
    let mut last_error = None;

    while attempts < max_retries {
        let mut request = client.post(url).json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return response.json::<R>().await.map_err(|e| {
                        LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                    });
                } else if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(LlmError::ModelNotAvailable(model.to_string()));
                } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    last_error = Some(LlmError::RateLimitExceeded);
                } else {
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    let error =
                        LlmError::Communication(format!("HTTP {}: {}", status, error_text));
                    if !is_retryable(status) {
                        return Err(error);
                    }
                    last_error = Some(error);
                }
            }
            Err(e) => {
                last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
            }
        }

        attempts += 1;
        if attempts < max_retries {
            let delay = Duration::from_secs(2u64.pow(attempts - 1));
            warn!(url, attempts, ?delay, "LLM request failed, retrying");
            tokio::time::sleep(delay).await;
        }
    }

    Err(last_error.unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
}
