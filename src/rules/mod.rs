pub mod engine;
pub mod models;
pub mod query;
pub mod storage;

// Re-export commonly used items
pub use engine::RuleEngine;
pub use models::{default_expiration, renewal_expiration, Activity, ActivityEvent, NewRule, Rule};
pub use query::Criterion;
pub use storage::RuleStore;
