pub mod config;
pub mod error;
pub mod notify;
pub mod output;
pub mod rules;

// Re-export main types for easy access
pub use error::{Error, Result};
pub use notify::{MailConfig, MemoryNotifier, Notifier, SmtpNotifier};
pub use rules::{Activity, ActivityEvent, Criterion, NewRule, Rule, RuleEngine, RuleStore};
