use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::Deserialize;

use crate::error::NotifyError;

use super::{templates::truncate_chars, DeliveryReceipt, EmailSender, OutgoingEmail};

const BREVO_SEND_URL: &str = "https://api.brevo.com/v3/smtp/email";

/// Transactional email through Brevo.
pub struct BrevoMailer {
    client: reqwest::Client,
    api_key: String,
    from_name: String,
    from_email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    message_id: Option<String>,
}

impl BrevoMailer {
    pub fn new(api_key: &str, from_name: &str, from_email: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            from_name: from_name.to_string(),
            from_email: from_email.to_string(),
        }
    }

    fn payload(&self, email: &OutgoingEmail) -> serde_json::Value {
        serde_json::json!({
            "sender": {"name": self.from_name, "email": self.from_email},
            "to": [{"email": email.to_email, "name": email.to_name}],
            "subject": email.subject,
            "htmlContent": email.html,
            "tags": email.tags,
        })
    }
}

#[async_trait]
impl EmailSender for BrevoMailer {
    async fn send_email(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, NotifyError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let res = self
            .client
            .post(BREVO_SEND_URL)
            .headers(headers)
            .header("api-key", &self.api_key)
            .body(self.payload(email).to_string())
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body: truncate_chars(&body, 512).0.to_string(),
            });
        }

        let sent: SendResponse = res.json().await?;
        Ok(DeliveryReceipt { message_id: sent.message_id, status: "sent".to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let mailer = BrevoMailer::new("key", "RescueRadar", "noreply@rescueradar.org");
        let payload = mailer.payload(&OutgoingEmail {
            to_email: "team@rescue.org".to_string(),
            to_name: "Rescue Team".to_string(),
            subject: "New report".to_string(),
            html: "<p>hi</p>".to_string(),
            tags: vec!["report_1".to_string(), "authority".to_string()],
        });

        assert_eq!(payload["sender"]["email"], "noreply@rescueradar.org");
        assert_eq!(payload["to"][0]["email"], "team@rescue.org");
        assert_eq!(payload["htmlContent"], "<p>hi</p>");
        assert_eq!(payload["tags"][1], "authority");
    }

    #[test]
    fn test_send_response_parsing() {
        let r: SendResponse = serde_json::from_str(r#"{"messageId": "<abc@smtp-relay>"}"#).unwrap();
        assert_eq!(r.message_id.as_deref(), Some("<abc@smtp-relay>"));
    }
}
