use std::sync::Arc;

use crate::cfg::Config;
use crate::demo::DemoCache;
use crate::handlers::health::ServiceChecks;
use crate::notify::{BrevoMailer, ChatSender, Disabled, Dispatcher, EmailSender, TwilioWhatsApp};
use crate::storage::{DatabaseStore, FileStore, ReportStore, StorageGateway};

#[derive(Clone)]
pub struct AppState {
    pub storage: StorageGateway,
    pub dispatcher: Dispatcher,
    pub demo_cache: Arc<DemoCache>,
    pub services: ServiceChecks,
}

impl AppState {
    pub async fn from_config(cfg: &Config) -> Self {
        let database: Option<Arc<dyn ReportStore>> = match &cfg.db {
            Some(db_cfg) => match DatabaseStore::connect(db_cfg).await {
                Ok(store) => Some(Arc::new(store)),
                Err(e) => {
                    tracing::warn!("database setup failed: {}. Continuing with backup file storage.", e);
                    None
                }
            },
            None => {
                tracing::info!("DB_HOST not set, running with backup file storage only");
                None
            }
        };
        let fallback = Arc::new(FileStore::new(cfg.backup_file.clone()));
        tracing::info!("backup file: {}", fallback.path().display());

        let chat: Arc<dyn ChatSender> = match (
            &cfg.twilio_account_sid,
            &cfg.twilio_auth_token,
            &cfg.twilio_whatsapp_number,
        ) {
            (Some(sid), Some(token), Some(from)) if cfg.twilio_configured() => {
                Arc::new(TwilioWhatsApp::new(sid, token, from))
            }
            _ => {
                tracing::warn!("Twilio credentials missing; WhatsApp receipts disabled");
                Arc::new(Disabled("twilio"))
            }
        };

        let email: Arc<dyn EmailSender> = match (&cfg.brevo_api_key, &cfg.brevo_from_email) {
            (Some(key), Some(from)) if cfg.brevo_configured() => {
                Arc::new(BrevoMailer::new(key, &cfg.brevo_sender_name, from))
            }
            _ => {
                tracing::warn!("Brevo credentials missing; email notifications disabled");
                Arc::new(Disabled("brevo"))
            }
        };

        let storage = StorageGateway::new(database, fallback);
        Self {
            services: ServiceChecks {
                database: storage.has_database(),
                whatsapp: cfg.twilio_configured(),
                email: cfg.brevo_configured(),
            },
            storage,
            dispatcher: Dispatcher::new(chat, email, cfg.default_rescue_email.clone()),
            demo_cache: Arc::new(DemoCache::new(cfg.demo_cache_ttl)),
        }
    }
}
