//! Storage-layer errors.

use thiserror::Error;

use shopdesk_core::DomainError;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Error surfaced by the ledger services.
///
/// Any of these aborts the enclosing transaction; nothing from a failed call
/// is persisted.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Business rule failure (validation, insufficient stock, not found, ...).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// SQLite failure: disk, lock timeout, constraint violation.
    #[error("persistence failure: {0}")]
    Persistence(#[from] sqlx::Error),

    /// A stored row could not be decoded into a domain record.
    #[error("corrupt row in {table}: {reason}")]
    CorruptRow { table: &'static str, reason: String },
}

impl LedgerError {
    pub(crate) fn corrupt(table: &'static str, reason: impl Into<String>) -> Self {
        Self::CorruptRow {
            table,
            reason: reason.into(),
        }
    }

    /// The domain error, if this is one.
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            LedgerError::Domain(err) => Some(err),
            LedgerError::Persistence(_) | LedgerError::CorruptRow { .. } => None,
        }
    }
}
