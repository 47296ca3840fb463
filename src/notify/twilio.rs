use async_trait::async_trait;
use serde::Deserialize;

use crate::error::NotifyError;

use super::{templates::truncate_chars, ChatSender, DeliveryReceipt};

const TWILIO_API: &str = "https://api.twilio.com/2010-04-01";

/// WhatsApp messages through the Twilio Messages API.
pub struct TwilioWhatsApp {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from: String,
}

#[derive(Deserialize)]
struct MessageResource {
    sid: Option<String>,
    status: Option<String>,
}

impl TwilioWhatsApp {
    pub fn new(account_sid: &str, auth_token: &str, from_number: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            account_sid: account_sid.to_string(),
            auth_token: auth_token.to_string(),
            from: whatsapp_address(from_number),
        }
    }
}

fn whatsapp_address(number: &str) -> String {
    if number.starts_with("whatsapp:") {
        number.to_string()
    } else {
        format!("whatsapp:{}", number)
    }
}

#[async_trait]
impl ChatSender for TwilioWhatsApp {
    async fn send_message(&self, to: &str, body: &str) -> Result<DeliveryReceipt, NotifyError> {
        let url = format!("{}/Accounts/{}/Messages.json", TWILIO_API, self.account_sid);
        let to = whatsapp_address(to);
        let res = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("From", self.from.as_str()), ("To", to.as_str()), ("Body", body.trim())])
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

        let message: MessageResource = res.json().await?;
        Ok(DeliveryReceipt {
            message_id: message.sid,
            status: message.status.unwrap_or_else(|| "queued".to_string()),
        })
    }
}
