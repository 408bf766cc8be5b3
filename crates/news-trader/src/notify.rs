//! Notification Sink
//!
//! Best-effort outbound messages about trade outcomes. Delivery failures
//! are swallowed and logged; a notifier can never block or fail a cycle.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{Result, TraderError};

const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Push a short text message somewhere a human will see it
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Best-effort delivery; implementations must not propagate failure
    async fn notify(&self, text: &str);
}

/// Notifier that only writes to the log
#[derive(Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, text: &str) {
        tracing::info!(target: "notify", "{text}");
    }
}

/// Notifier that POSTs `{"text": ...}` to a webhook
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| TraderError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, text: &str) {
        let result = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { text })
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                tracing::warn!(status = %response.status(), "notification rejected");
            }
            Err(e) => {
                tracing::warn!(error = %e, "notification delivery failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_webhook_failure_is_swallowed() {
        // Nothing listens here; notify must return normally anyway.
        let notifier = WebhookNotifier::new("http://127.0.0.1:1/hook").unwrap();
        notifier.notify("BUY 0.02 BTC").await;
    }
}
