//! Form-relay notification client
//!
//! Submission notifications go out through a third-party form-relay service
//! as an opaque POST. One attempt, no retry; a failed notification is logged
//! and swallowed because a booked consultation must never bounce on email
//! trouble.

use crate::config::NotifyConfig;
use crate::store::Consultation;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Payload accepted by the form-relay service
#[derive(Debug, Serialize)]
struct RelayPayload<'a> {
    access_key: &'a str,
    subject: String,
    from_name: &'a str,
    email: &'a str,
    message: String,
}

/// Best-effort notifier over a form-relay endpoint
#[derive(Clone)]
pub struct FormRelayNotifier {
    config: NotifyConfig,
    client: reqwest::Client,
}

impl FormRelayNotifier {
    /// Create a new notifier from configuration
    pub fn new(config: NotifyConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Whether a relay endpoint is configured
    pub fn is_configured(&self) -> bool {
        self.config.endpoint.is_some()
    }

    /// Send a new-submission notification. Returns whether the relay
    /// accepted it; every failure path is logged, none propagate.
    pub async fn notify_submission(&self, record: &Consultation) -> bool {
        let (endpoint, access_key) = match (&self.config.endpoint, &self.config.access_key) {
            (Some(endpoint), Some(access_key)) => (endpoint, access_key.as_str()),
            (Some(endpoint), None) => (endpoint, ""),
            (None, _) => {
                debug!("No form relay configured, skipping notification");
                return false;
            }
        };

        let payload = RelayPayload {
            access_key,
            subject: format!("New consultation request: {}", record.service),
            from_name: &record.name,
            email: &record.email,
            message: record
                .message
                .as_deref()
                .unwrap_or("(no message provided)")
                .to_string(),
        };

        match self.client.post(endpoint).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(id = %record.id, "Submission notification delivered");
                true
            }
            Ok(response) => {
                warn!(
                    id = %record.id,
                    status = %response.status(),
                    "Form relay rejected the notification"
                );
                false
            }
            Err(e) => {
                warn!(id = %record.id, error = %e, "Form relay unreachable");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fallback_consultations;

    #[tokio::test]
    async fn test_unconfigured_notifier_skips() {
        let notifier = FormRelayNotifier::new(NotifyConfig::default());
        assert!(!notifier.is_configured());

        let record = &fallback_consultations()[0];
        assert!(!notifier.notify_submission(record).await);
    }
}
