//! Errors raised by the ledger.
//!
//! The taxonomy mirrors what callers can do about a failure:
//!
//! - [`Validation`], [`NotFound`], [`InsufficientFunds`]: rejected before or
//!   with a fully rolled-back state, safe to surface to the caller as-is.
//! - [`ConcurrentModification`]: a conflicting concurrent write was detected;
//!   the whole operation can be retried.
//! - [`PartialApplication`]: a stored record references an account that no
//!   longer exists. This is an invariant violation and must never be
//!   silently swallowed.
//!
//! [`Validation`]: LedgerError::Validation
//! [`NotFound`]: LedgerError::NotFound
//! [`InsufficientFunds`]: LedgerError::InsufficientFunds
//! [`ConcurrentModification`]: LedgerError::ConcurrentModification
//! [`PartialApplication`]: LedgerError::PartialApplication

use sea_orm::DbErr;
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("\"{0}\" not found")]
    NotFound(String),
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("\"{0}\" already present")]
    ExistingKey(String),
    #[error("concurrent modification: {0}")]
    ConcurrentModification(String),
    #[error("partial application: {0}")]
    PartialApplication(String),
    #[error(transparent)]
    Database(DbErr),
}

impl From<DbErr> for LedgerError {
    fn from(err: DbErr) -> Self {
        // SQLite reports write conflicts as "database is locked"; Postgres as
        // serialization failures or deadlocks. Both are safe to retry.
        let message = err.to_string();
        let lowered = message.to_ascii_lowercase();
        if lowered.contains("database is locked")
            || lowered.contains("could not serialize")
            || lowered.contains("deadlock")
        {
            return Self::ConcurrentModification(message);
        }
        Self::Database(err)
    }
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::ConcurrentModification(a), Self::ConcurrentModification(b)) => a == b,
            (Self::PartialApplication(a), Self::PartialApplication(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
