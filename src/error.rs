use thiserror::Error;

/// Error kinds surfaced by the rule engine and its collaborators.
///
/// `Validation` and `NotFound` go back to the caller for correction and leave
/// no state behind. `Storage` aborts the operation with no partial mutation.
/// `Notification` is non-fatal: the expiry and audit passes log it and keep
/// going, so it never fails an operation on its own.
#[derive(Debug, Error)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("rule {0} not found")]
    NotFound(u64),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("notification error: {0}")]
    Notification(String),
}

pub type Result<T> = std::result::Result<T, Error>;
