use crate::config::toml_config::GatewayConfig;
use crate::domain::model::{Msisdn, SendOutcome};
use crate::domain::ports::SmsGateway;
use crate::utils::error::{DispatchError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct GatewayRequest<'a> {
    api_token: &'a str,
    recipient: &'a str,
    sender_id: &'a str,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct GatewayResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client for the delivery gateway.
///
/// Makes one POST per recipient and folds every failure mode (non-2xx,
/// non-confirmation body, transport error, timeout) into
/// [`SendOutcome::Failed`]. The timeout is a fixed deployment constant
/// applied on the underlying client; there is no retry.
pub struct HttpGateway {
    client: reqwest::Client,
    endpoint: String,
    api_token: String,
    sender_id: String,
}

impl HttpGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|err| DispatchError::Config {
                message: format!("failed to build gateway HTTP client: {err}"),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_token: config.api_token.clone(),
            sender_id: config.sender_id.clone(),
        })
    }
}

#[async_trait]
impl SmsGateway for HttpGateway {
    async fn send(&self, to: &Msisdn, message: &str) -> SendOutcome {
        let payload = GatewayRequest {
            api_token: &self.api_token,
            recipient: to.as_str(),
            sender_id: &self.sender_id,
            message,
        };

        tracing::debug!(recipient = %to, endpoint = %self.endpoint, "sending message");

        let response = match self.client.post(&self.endpoint).json(&payload).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(recipient = %to, "gateway transport error: {err}");
                return SendOutcome::Failed {
                    reason: format!("transport error: {err}"),
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(recipient = %to, %status, "gateway returned non-success status");
            return SendOutcome::Failed {
                reason: format!("gateway returned HTTP {status}"),
            };
        }

        match response.json::<GatewayResponse>().await {
            Ok(body) if body.status == "success" => SendOutcome::Sent,
            Ok(body) => SendOutcome::Failed {
                reason: body
                    .message
                    .unwrap_or_else(|| format!("gateway status: {}", body.status)),
            },
            Err(err) => SendOutcome::Failed {
                reason: format!("unparseable gateway response: {err}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn gateway(endpoint: String) -> HttpGateway {
        HttpGateway::new(&GatewayConfig {
            endpoint,
            api_token: "test-token".to_string(),
            sender_id: "TestSender".to_string(),
            timeout_seconds: 5,
        })
        .unwrap()
    }

    fn msisdn() -> Msisdn {
        crate::core::validator::validate("94771234567").unwrap()
    }

    #[tokio::test]
    async fn confirmed_response_is_sent() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/sms/send").json_body_partial(
                r#"{"api_token": "test-token", "recipient": "94771234567", "sender_id": "TestSender"}"#,
            );
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"status": "success", "message": "queued"}));
        });

        let outcome = gateway(server.url("/sms/send")).send(&msisdn(), "hello").await;

        mock.assert();
        assert_eq!(outcome, SendOutcome::Sent);
    }

    #[tokio::test]
    async fn non_confirmation_body_is_failed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/sms/send");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"status": "error", "message": "invalid sender id"}));
        });

        let outcome = gateway(server.url("/sms/send")).send(&msisdn(), "hello").await;

        assert_eq!(
            outcome,
            SendOutcome::Failed {
                reason: "invalid sender id".to_string()
            }
        );
    }

    #[tokio::test]
    async fn http_error_status_is_failed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/sms/send");
            then.status(500);
        });

        let outcome = gateway(server.url("/sms/send")).send(&msisdn(), "hello").await;
        assert!(matches!(outcome, SendOutcome::Failed { reason } if reason.contains("500")));
    }

    #[tokio::test]
    async fn unparseable_body_is_failed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/sms/send");
            then.status(200).body("not json");
        });

        let outcome = gateway(server.url("/sms/send")).send(&msisdn(), "hello").await;
        assert!(matches!(outcome, SendOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn transport_error_is_failed_not_panicked() {
        // Nothing listens here; connection is refused immediately.
        let outcome = gateway("http://127.0.0.1:1/sms/send".to_string())
            .send(&msisdn(), "hello")
            .await;
        assert!(matches!(outcome, SendOutcome::Failed { reason } if reason.contains("transport")));
    }
}
