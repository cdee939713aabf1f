//! HTTP gateway for outbound notification mail.

use std::time::Duration;

use async_trait::async_trait;
use hireflow_core::{NotificationGateway, NotificationMessage};
use hireflow_domain::{HireflowError, MailConfig, Result};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, instrument};

/// [`NotificationGateway`] implementation posting messages to a mail
/// delivery service. An accepted request counts as delivered; bounce
/// handling stays with the mail service.
pub struct HttpMailGateway {
    http: Client,
    base_url: String,
    api_key: String,
    from_address: String,
}

impl HttpMailGateway {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|err| HireflowError::Config(format!("HTTP client build failed: {err}")))?;
        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl NotificationGateway for HttpMailGateway {
    #[instrument(skip(self, message), fields(to = %message.to))]
    async fn send(&self, message: &NotificationMessage) -> Result<()> {
        let payload = OutboundMail {
            from: &self.from_address,
            to: &message.to,
            subject: &message.subject,
            body: &message.body,
        };

        let response = self
            .http
            .post(format!("{}/messages", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| HireflowError::Notification(format!("mail request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HireflowError::Notification(format!(
                "mail service returned {status}: {body}"
            )));
        }

        debug!("notification accepted by mail service");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct OutboundMail<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json_string, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn gateway_for(server: &MockServer) -> HttpMailGateway {
        HttpMailGateway::new(&MailConfig {
            api_base_url: server.uri(),
            api_key: "mail-key".to_string(),
            from_address: "recruiting@example.com".to_string(),
            timeout_seconds: 5,
        })
        .expect("gateway built")
    }

    fn message() -> NotificationMessage {
        NotificationMessage {
            to: "ada@example.com".to_string(),
            subject: "Interview scheduled".to_string(),
            body: "Your interview is on 2025-06-02 09:00 UTC.".to_string(),
        }
    }

    #[tokio::test]
    async fn posts_message_with_sender_and_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(header("authorization", "Bearer mail-key"))
            .and(body_json_string(
                r#"{
                    "from": "recruiting@example.com",
                    "to": "ada@example.com",
                    "subject": "Interview scheduled",
                    "body": "Your interview is on 2025-06-02 09:00 UTC."
                }"#,
            ))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        gateway.send(&message()).await.expect("accepted");
    }

    #[tokio::test]
    async fn rejection_surfaces_as_notification_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("ada@example.com"))
            .respond_with(ResponseTemplate::new(500).set_body_string("smtp backend down"))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let err = gateway.send(&message()).await.expect_err("rejected");
        match err {
            HireflowError::Notification(msg) => assert!(msg.contains("500")),
            other => panic!("expected notification error, got {:?}", other),
        }
    }
}
