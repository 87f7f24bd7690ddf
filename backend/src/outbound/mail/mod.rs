//! Mail sender adapters.
//!
//! [`HttpMailSender`] posts JSON to a transactional mail API with a bearer
//! token. [`LoggingMailSender`] only records what would have been sent and is
//! wired when no API is configured.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::EmailMessage;
use crate::domain::ports::{DeliveryReceipt, MailDeliveryError, MailSender};

#[derive(Debug, Serialize)]
struct SendMailBody<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMailResponse {
    #[serde(default)]
    id: Option<String>,
}

/// Sends mail through an HTTP API.
pub struct HttpMailSender {
    client: Client,
    endpoint: Url,
    token: Zeroizing<String>,
    from: String,
}

impl HttpMailSender {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        token: impl Into<String>,
        from: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            token: Zeroizing::new(token.into()),
            from: from.into(),
        })
    }
}

#[async_trait]
impl MailSender for HttpMailSender {
    async fn send(&self, message: &EmailMessage) -> Result<DeliveryReceipt, MailDeliveryError> {
        let body = SendMailBody {
            from: &self.from,
            to: message.to.as_ref(),
            subject: &message.subject,
            html: &message.html_body,
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.token.as_str())
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, bytes.as_ref()));
        }
        Ok(DeliveryReceipt {
            message_id: message_id(bytes.as_ref()),
        })
    }
}

fn message_id(body: &[u8]) -> String {
    serde_json::from_slice::<SendMailResponse>(body)
        .ok()
        .and_then(|response| response.id)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn map_transport_error(error: reqwest::Error) -> MailDeliveryError {
    if error.is_timeout() {
        MailDeliveryError::timeout(error.to_string())
    } else {
        MailDeliveryError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> MailDeliveryError {
    let text = String::from_utf8_lossy(body);
    let compact: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    MailDeliveryError::rejected(status.as_u16(), compact.chars().take(160).collect::<String>())
}

/// Logs each message instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMailSender;

#[async_trait]
impl MailSender for LoggingMailSender {
    async fn send(&self, message: &EmailMessage) -> Result<DeliveryReceipt, MailDeliveryError> {
        let message_id = format!("log:{}", Uuid::new_v4());
        info!(
            to = %message.to,
            subject = %message.subject,
            %message_id,
            "mail delivery disabled; message logged only"
        );
        Ok(DeliveryReceipt { message_id })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::EmailAddress;

    #[rstest]
    fn provider_id_is_used_when_present() {
        assert_eq!(message_id(br#"{"id":"msg_42"}"#), "msg_42");
    }

    #[rstest]
    fn missing_provider_id_falls_back_to_a_uuid() {
        let id = message_id(b"");
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[rstest]
    fn rejection_keeps_status_and_compact_body() {
        let error = map_status_error(StatusCode::UNPROCESSABLE_ENTITY, b"{\n \"error\": \"bad to\" }");
        assert_eq!(
            error,
            MailDeliveryError::rejected(422_u16, "{ \"error\": \"bad to\" }")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn logging_sender_always_acknowledges() {
        let message = EmailMessage {
            to: EmailAddress::new("ada@example.com").expect("email"),
            subject: "Payment Received".to_owned(),
            html_body: "<p>Thanks</p>".to_owned(),
        };

        let receipt = LoggingMailSender.send(&message).await.expect("logged");

        assert!(receipt.message_id.starts_with("log:"));
    }
}
