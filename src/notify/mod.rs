pub mod brevo;
pub mod templates;
pub mod twilio;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, Utc};

use crate::error::NotifyError;
use crate::models::{NotificationChannel, NotificationRecord, Report};
use crate::storage::StorageGateway;

pub use brevo::BrevoMailer;
pub use twilio::TwilioWhatsApp;

/// What a provider hands back for an accepted message.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryReceipt {
    pub message_id: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to_email: String,
    pub to_name: String,
    pub subject: String,
    pub html: String,
    pub tags: Vec<String>,
}

#[async_trait]
pub trait ChatSender: Send + Sync {
    /// `to` is a bare phone number; the sender adds any channel prefix.
    async fn send_message(&self, to: &str, body: &str) -> Result<DeliveryReceipt, NotifyError>;
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, NotifyError>;
}

/// Stand-in for a provider whose credentials are missing.
pub struct Disabled(pub &'static str);

#[async_trait]
impl ChatSender for Disabled {
    async fn send_message(&self, _to: &str, _body: &str) -> Result<DeliveryReceipt, NotifyError> {
        Err(NotifyError::NotConfigured(self.0))
    }
}

#[async_trait]
impl EmailSender for Disabled {
    async fn send_email(&self, _email: &OutgoingEmail) -> Result<DeliveryReceipt, NotifyError> {
        Err(NotifyError::NotConfigured(self.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    WhatsappReceipt,
    RescueTeamEmail,
    UserEmailConfirmation,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::WhatsappReceipt => "whatsapp_receipt",
            NotificationKind::RescueTeamEmail => "rescue_team_email",
            NotificationKind::UserEmailConfirmation => "user_email_confirmation",
        }
    }

    pub fn channel(&self) -> NotificationChannel {
        match self {
            NotificationKind::WhatsappReceipt => NotificationChannel::Whatsapp,
            NotificationKind::RescueTeamEmail | NotificationKind::UserEmailConfirmation => NotificationChannel::Email,
        }
    }
}

#[derive(Debug, Default)]
pub struct DispatchOutcome {
    pub sent: Vec<NotificationKind>,
    pub failed: Vec<(NotificationKind, String)>,
}

impl DispatchOutcome {
    pub fn sent_names(&self) -> Vec<String> {
        self.sent.iter().map(|k| k.as_str().to_string()).collect()
    }
}

/// Fires the post-submission notifications. Each one is independent: a
/// failed send is recorded in the outcome and the next one still runs.
#[derive(Clone)]
pub struct Dispatcher {
    chat: Arc<dyn ChatSender>,
    email: Arc<dyn EmailSender>,
    rescue_email: String,
}

impl Dispatcher {
    pub fn new(chat: Arc<dyn ChatSender>, email: Arc<dyn EmailSender>, rescue_email: impl Into<String>) -> Self {
        Self { chat, email, rescue_email: rescue_email.into() }
    }

    /// `persisted` says whether the report reached the database; notification
    /// records are only logged next to reports that did.
    pub async fn dispatch(&self, report: &Report, storage: &StorageGateway, persisted: bool) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();

        if let Some(phone) = &report.contact_phone {
            let body = templates::receipt_message(&report.id, &report.description, Local::now().naive_local());
            let result = self.chat.send_message(phone, &body).await;
            self.settle(&mut outcome, NotificationKind::WhatsappReceipt, phone, result, report, storage, persisted)
                .await;
        }

        let alert = templates::rescue_team_alert(report);
        let result = self
            .email
            .send_email(&OutgoingEmail {
                to_email: self.rescue_email.clone(),
                to_name: "Rescue Team".to_string(),
                subject: alert.subject,
                html: alert.html,
                tags: vec![format!("report_{}", report.id), "authority".to_string()],
            })
            .await;
        self.settle(&mut outcome, NotificationKind::RescueTeamEmail, &self.rescue_email, result, report, storage, persisted)
            .await;

        if let Some(address) = &report.contact_email {
            let confirmation = templates::reporter_confirmation(report);
            let result = self
                .email
                .send_email(&OutgoingEmail {
                    to_email: address.clone(),
                    to_name: report.contact_name.clone().unwrap_or_else(|| "Reporter".to_string()),
                    subject: confirmation.subject,
                    html: confirmation.html,
                    tags: vec![format!("report_{}", report.id), "confirmation".to_string()],
                })
                .await;
            self.settle(&mut outcome, NotificationKind::UserEmailConfirmation, address, result, report, storage, persisted)
                .await;
        }

        outcome
    }

    #[allow(clippy::too_many_arguments)]
    async fn settle(
        &self,
        outcome: &mut DispatchOutcome,
        kind: NotificationKind,
        recipient: &str,
        result: Result<DeliveryReceipt, NotifyError>,
        report: &Report,
        storage: &StorageGateway,
        persisted: bool,
    ) {
        match result {
            Ok(receipt) => {
                tracing::info!("{} sent for report {} (status={})", kind.as_str(), report.id, receipt.status);
                outcome.sent.push(kind);
                if persisted {
                    storage
                        .log_notification(&NotificationRecord {
                            report_id: report.id.clone(),
                            channel: kind.channel(),
                            recipient: recipient.to_string(),
                            status: "sent".to_string(),
                            message_id: receipt.message_id,
                            sent_at: Utc::now(),
                        })
                        .await;
                }
            }
            Err(e) => {
                tracing::warn!("{} failed for report {}: {}", kind.as_str(), report.id, e);
                outcome.failed.push((kind, e.to_string()));
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Records every call and optionally fails them all.
    #[derive(Default)]
    pub struct RecordingSender {
        pub messages: Mutex<Vec<(String, String)>>,
        pub emails: Mutex<Vec<OutgoingEmail>>,
        pub fail: bool,
    }

    impl RecordingSender {
        pub fn failing() -> Self {
            Self { fail: true, ..Default::default() }
        }

        pub fn message_count(&self) -> usize {
            self.messages.lock().unwrap().len()
        }

        pub fn email_count(&self) -> usize {
            self.emails.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatSender for RecordingSender {
        async fn send_message(&self, to: &str, body: &str) -> Result<DeliveryReceipt, NotifyError> {
            self.messages.lock().unwrap().push((to.to_string(), body.to_string()));
            if self.fail {
                return Err(NotifyError::Rejected { status: 400, body: "invalid number".to_string() });
            }
            Ok(DeliveryReceipt { message_id: Some("SM123".to_string()), status: "queued".to_string() })
        }
    }

    #[async_trait]
    impl EmailSender for RecordingSender {
        async fn send_email(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, NotifyError> {
            self.emails.lock().unwrap().push(email.clone());
            if self.fail {
                return Err(NotifyError::Rejected { status: 401, body: "unauthorized".to_string() });
            }
            Ok(DeliveryReceipt { message_id: Some("<msg@brevo>".to_string()), status: "sent".to_string() })
        }
    }
}
