//! A destination that posts deliveries to an HTTP webhook.

use crate::core::{Delivery, Destination};
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{error, info, instrument};

/// Sends each delivery as a JSON POST to a configured webhook URL.
///
/// The payload is the serialized `Delivery`: destination id, subject, and
/// the rendered (or raw) messages. Non-2xx responses are errors.
pub struct WebhookDestination {
    name: String,
    webhook_url: String,
    client: reqwest::Client,
}

impl WebhookDestination {
    pub fn new(name: impl Into<String>, webhook_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            name: name.into(),
            webhook_url: webhook_url.into(),
            client,
        })
    }
}

#[async_trait]
impl Destination for WebhookDestination {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, delivery), fields(dest = %delivery.dest, count = delivery.payload.messages.len()))]
    async fn send(&self, delivery: &Delivery) -> Result<()> {
        if delivery.payload.messages.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .post(&self.webhook_url)
            .json(delivery)
            .send()
            .await;

        match response {
            Ok(res) if res.status().is_success() => {
                info!("successfully posted delivery to webhook");
                Ok(())
            }
            Ok(res) => {
                let status = res.status();
                let body = res.text().await.unwrap_or_default();
                error!(status = %status, body = %body, "webhook rejected delivery");
                anyhow::bail!("webhook rejected delivery: status {}, body: {}", status, body)
            }
            Err(e) => {
                error!(error = %e, "HTTP request to webhook failed");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod webhook_tests {
    use super::*;
    use crate::core::{Payload, Rendered};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_delivery() -> Delivery {
        Delivery {
            dest: "ops".to_string(),
            payload: Payload {
                subject: Some("nightly checks".to_string()),
                messages: vec![Rendered::Text("FAIL on orders (prod)".to_string())],
            },
        }
    }

    #[tokio::test]
    async fn posts_delivery_as_json() {
        // Arrange
        let server = MockServer::start().await;
        let delivery = test_delivery();
        let expected_body = json!({
            "dest": "ops",
            "payload": {
                "subject": "nightly checks",
                "messages": ["FAIL on orders (prod)"],
            },
        });

        Mock::given(method("POST"))
            .and(path("/webhook"))
            .and(body_json(&expected_body))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let destination =
            WebhookDestination::new("ops", format!("{}/webhook", server.uri())).unwrap();

        // Act
        let result = destination.send(&delivery).await;

        // Assert
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn server_error_is_a_send_failure() {
        // Arrange
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/webhook"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let destination =
            WebhookDestination::new("ops", format!("{}/webhook", server.uri())).unwrap();

        // Act
        let result = destination.send(&test_delivery()).await;

        // Assert
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn empty_payload_is_not_sent() {
        // No mock mounted: an actual request would hit an unmatched route,
        // get a 404, and fail the send.
        let server = MockServer::start().await;
        let destination =
            WebhookDestination::new("ops", format!("{}/webhook", server.uri())).unwrap();

        let delivery = Delivery {
            dest: "ops".to_string(),
            payload: Payload {
                subject: None,
                messages: vec![],
            },
        };

        assert!(destination.send(&delivery).await.is_ok());
    }
}
