//! Fan-out delivery of a rendered message to chat webhooks.
//!
//! [`Dispatcher`] POSTs the message body to every destination at once,
//! through the platform's Slack-compatible ingestion endpoint. Each
//! destination gets exactly one attempt; there is no retry or backoff.

use std::time::Duration;

use futures::future::join_all;

use crate::delivery::mentions::neutralize_mentions;

/// Appended to every destination URL to reach the Slack-compatible endpoint.
pub const SLACK_COMPAT_SUFFIX: &str = "/slack";

/// HTTP request timeout for a single delivery when none is configured.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a single destination did not accept the message.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    /// The URL is stripped before wrapping since it carries the token.
    #[error("HTTP request failed: {0}")]
    Request(reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),
}

/// At least one destination did not receive the message.
///
/// Names the first failing destination (token redacted). Which of the other
/// destinations succeeded is not reported.
#[derive(Debug, thiserror::Error)]
#[error("Delivery to {destination} failed ({failed} of {attempted} destinations): {source}")]
pub struct DispatchError {
    pub destination: String,
    #[source]
    pub source: DeliveryError,
    pub failed: usize,
    pub attempted: usize,
}

/// Every destination accepted the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Sends rendered messages to chat webhook destinations.
#[derive(Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
}

impl Dispatcher {
    /// Create a dispatcher whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(DeliveryError::Request)?;
        Ok(Self { client })
    }

    /// Deliver `message` to all `destinations` concurrently.
    ///
    /// Broadcast mentions are neutralized first. All sends run to
    /// completion even when some fail; the result is an error if any did.
    pub async fn dispatch(
        &self,
        destinations: &[String],
        message: &str,
    ) -> Result<DispatchReport, DispatchError> {
        let body = neutralize_mentions(message);

        let sends = destinations.iter().map(|url| self.send(url, body.clone()));
        let results = join_all(sends).await;

        let attempted = results.len();
        let mut failures: Vec<(String, DeliveryError)> = destinations
            .iter()
            .zip(results)
            .filter_map(|(url, result)| result.err().map(|e| (redact(url), e)))
            .collect();

        for (destination, error) in &failures {
            tracing::warn!(destination = %destination, error = %error, "Webhook delivery failed");
        }

        let failed = failures.len();
        if failures.is_empty() {
            tracing::debug!(delivered = attempted, "Message delivered to all destinations");
            return Ok(DispatchReport {
                delivered: attempted,
            });
        }

        let (destination, source) = failures.swap_remove(0);
        Err(DispatchError {
            destination,
            source,
            failed,
            attempted,
        })
    }

    /// Execute a single POST and check the response status.
    ///
    /// The body is sent verbatim with a JSON content type; it is already
    /// the platform payload, not a value to encode.
    async fn send(&self, url: &str, body: String) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(format!("{url}{SLACK_COMPAT_SUFFIX}"))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| DeliveryError::Request(e.without_url()))?;
        if !response.status().is_success() {
            return Err(DeliveryError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Strip the token segment from a webhook URL for logs and errors.
pub fn redact(url: &str) -> String {
    match url.rsplit_once('/') {
        Some((prefix, _token)) => format!("{prefix}/<redacted>"),
        None => "<redacted>".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
