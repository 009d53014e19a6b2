//! Ledger error types.
//!
//! Split validation failures pass through unchanged; the remaining variants
//! cover parties and currencies that do not fit the group.

use tally_shared::AppError;
use tally_shared::types::{CategoryId, Currency, PartyId, TransactionId};
use thiserror::Error;

use crate::split::SplitError;

/// Errors that can occur while recording or editing transactions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The split itself is invalid.
    #[error(transparent)]
    Split(#[from] SplitError),

    /// The party does not belong to the group.
    #[error("Party not found: {0}")]
    UnknownParty(PartyId),

    /// The transaction does not exist in the group.
    #[error("Transaction not found: {0}")]
    UnknownTransaction(TransactionId),

    /// The category does not belong to the group.
    #[error("Category not found: {0}")]
    UnknownCategory(CategoryId),

    /// Expense destinations receive money but never pay.
    #[error("Party {0} is an expense destination and cannot pay")]
    SinkCannotPay(PartyId),

    /// Expense destinations never carry a share.
    #[error("Party {0} is an expense destination and cannot share costs")]
    SinkCannotShare(PartyId),

    /// A simple payment names a payee other than its recipient.
    #[error("Payee {payee} does not match payment recipient {recipient}")]
    PayeeMismatch {
        /// The explicit payee.
        payee: PartyId,
        /// The simple-split recipient.
        recipient: PartyId,
    },

    /// Another party in the group already has this name.
    #[error("A party named {0:?} already exists")]
    DuplicateName(String),

    /// The transaction is not in the group's currency.
    #[error("Transaction currency {actual} does not match group currency {expected}")]
    CurrencyMismatch {
        /// The group currency.
        expected: Currency,
        /// The transaction currency.
        actual: Currency,
    },
}

impl LedgerError {
    /// Returns the machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Split(err) => err.error_code(),
            Self::UnknownParty(_) => "UNKNOWN_PARTY",
            Self::UnknownTransaction(_) => "UNKNOWN_TRANSACTION",
            Self::UnknownCategory(_) => "UNKNOWN_CATEGORY",
            Self::SinkCannotPay(_) => "SINK_CANNOT_PAY",
            Self::SinkCannotShare(_) => "SINK_CANNOT_SHARE",
            Self::PayeeMismatch { .. } => "PAYEE_MISMATCH",
            Self::DuplicateName(_) => "DUPLICATE_NAME",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Split(split) => split.into(),
            LedgerError::UnknownParty(_)
            | LedgerError::UnknownTransaction(_)
            | LedgerError::UnknownCategory(_) => Self::NotFound(err.to_string()),
            LedgerError::SinkCannotPay(_) | LedgerError::SinkCannotShare(_) => {
                Self::BusinessRule(err.to_string())
            }
            _ => Self::Validation(err.to_string()),
        }
    }
}
