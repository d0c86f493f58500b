//! The module contains the errors the engine can return.
//!
//! Every rejected mutation carries what the caller needs to fix it:
//!
//! - [`SystemLocked`] names the transaction that must be classified first.
//! - [`OverAllocation`] reports the ceiling, the current total and the attempt.
//! - [`NotBalanced`] reports how much is still unclassified.
//!
//! Storage failures are split between [`Timeout`] (transient, retryable) and
//! [`Database`].
//!
//!  [`SystemLocked`]: EngineError::SystemLocked
//!  [`OverAllocation`]: EngineError::OverAllocation
//!  [`NotBalanced`]: EngineError::NotBalanced
//!  [`Timeout`]: EngineError::Timeout
//!  [`Database`]: EngineError::Database
use sea_orm::{ConnAcquireErr, DbErr};
use thiserror::Error;

use crate::Amount;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Unknown category: {0:?}")]
    UnknownCategory(Vec<i64>),
    #[error("Transaction {external_reference} already exists")]
    DuplicateTransaction {
        external_reference: String,
        existing_id: Option<i64>,
    },
    #[error("System locked: transaction {open_transaction_id} must be classified first")]
    SystemLocked { open_transaction_id: i64 },
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Transaction {0} already locked")]
    AlreadyLocked(i64),
    #[error(
        "Total splits exceed remaining amount: max allowed {max_allowed}, \
         current total {current_total}, attempted {attempted}"
    )]
    OverAllocation {
        max_allowed: Amount,
        current_total: Amount,
        attempted: Amount,
    },
    #[error("Transaction not balanced: {remaining} remaining")]
    NotBalanced { remaining: Amount },
    #[error("Invalid admin code")]
    Unauthorized,
    #[error("No open transaction found")]
    NothingToUnlock,
    #[error("Storage operation timed out")]
    Timeout,
    #[error(transparent)]
    Database(DbErr),
}

impl EngineError {
    /// Transient failures worth retrying without changing the request.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

impl From<DbErr> for EngineError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::ConnectionAcquire(ConnAcquireErr::Timeout) => Self::Timeout,
            other => Self::Database(other),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::UnknownCategory(a), Self::UnknownCategory(b)) => a == b,
            (
                Self::DuplicateTransaction {
                    external_reference: a,
                    existing_id: x,
                },
                Self::DuplicateTransaction {
                    external_reference: b,
                    existing_id: y,
                },
            ) => a == b && x == y,
            (
                Self::SystemLocked {
                    open_transaction_id: a,
                },
                Self::SystemLocked {
                    open_transaction_id: b,
                },
            ) => a == b,
            (Self::InvalidState(a), Self::InvalidState(b)) => a == b,
            (Self::AlreadyLocked(a), Self::AlreadyLocked(b)) => a == b,
            (
                Self::OverAllocation {
                    max_allowed: a1,
                    current_total: a2,
                    attempted: a3,
                },
                Self::OverAllocation {
                    max_allowed: b1,
                    current_total: b2,
                    attempted: b3,
                },
            ) => a1 == b1 && a2 == b2 && a3 == b3,
            (Self::NotBalanced { remaining: a }, Self::NotBalanced { remaining: b }) => a == b,
            (Self::Unauthorized, Self::Unauthorized) => true,
            (Self::NothingToUnlock, Self::NothingToUnlock) => true,
            (Self::Timeout, Self::Timeout) => true,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_timeout_is_transient() {
        let err = EngineError::from(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout));
        assert_eq!(err, EngineError::Timeout);
        assert!(err.is_transient());
    }

    #[test]
    fn other_db_errors_are_not_transient() {
        let err = EngineError::from(DbErr::Custom("boom".to_string()));
        assert!(matches!(err, EngineError::Database(_)));
        assert!(!err.is_transient());
    }
}
