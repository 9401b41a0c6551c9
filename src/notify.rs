//! Notification collaborator: how expiry notices and audit requests leave
//! the system. The engine only sees the `Notifier` trait; the transport is
//! wired up at startup from config.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};

/// Outbound mail settings, resolved by the caller before the engine sees
/// them.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// From address, e.g. `DoNotScan <donotscan@example.com>`
    pub from: String,

    /// SMTP server host
    pub host: String,

    /// SMTP server port
    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// SMTP username; authentication is skipped when absent
    pub user: Option<String>,

    /// SMTP password
    pub password: Option<String>,

    /// Per-send timeout so one dead mail path cannot stall a whole pass
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_smtp_port() -> u16 {
    25
}

fn default_timeout_secs() -> u64 {
    10
}

pub trait Notifier: Send + Sync {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// SMTP delivery via lettre.
pub struct SmtpNotifier {
    config: MailConfig,
}

impl SmtpNotifier {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }
}

impl Notifier for SmtpNotifier {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials, Message,
            SmtpTransport, Transport,
        };

        let email = Message::builder()
            .from(self.config.from.parse().map_err(|e| {
                Error::Notification(format!("invalid from address '{}': {}", self.config.from, e))
            })?)
            .to(to
                .parse()
                .map_err(|e| Error::Notification(format!("invalid recipient '{}': {}", to, e)))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| Error::Notification(format!("failed to build message: {}", e)))?;

        let builder = match (&self.config.user, &self.config.password) {
            (Some(user), Some(password)) => SmtpTransport::relay(&self.config.host)
                .map_err(|e| Error::Notification(format!("smtp relay error: {}", e)))?
                .credentials(Credentials::new(user.clone(), password.clone())),
            // No authentication (local relays)
            _ => SmtpTransport::builder_dangerous(&self.config.host),
        };
        let mailer = builder
            .port(self.config.port)
            .timeout(Some(Duration::from_secs(self.config.timeout_secs)))
            .build();

        mailer
            .send(&email)
            .map_err(|e| Error::Notification(format!("failed to send to {}: {}", to, e)))?;

        Ok(())
    }
}

/// Used when no mail transport is configured: sends are logged and reported
/// as delivered so lifecycle passes still complete.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, to: &str, subject: &str, _body: &str) -> Result<()> {
        warn!(%to, %subject, "mail transport not configured, notification logged only");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Records messages instead of delivering them, for tests.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    pub sent: RwLock<Vec<SentMessage>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.read().unwrap().len()
    }
}

impl Notifier for MemoryNotifier {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        self.sent.write().unwrap().push(SentMessage {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// Pick the transport the config calls for.
pub fn create_notifier(config: Option<MailConfig>) -> Arc<dyn Notifier> {
    match config {
        Some(cfg) => Arc::new(SmtpNotifier::new(cfg)),
        None => Arc::new(LogNotifier),
    }
}
