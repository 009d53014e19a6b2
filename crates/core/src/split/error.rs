//! Split validation errors.
//!
//! Every variant is a deterministic input-validation failure: it is reported
//! to the caller with a reason code and never retried.

use rust_decimal::Decimal;
use serde::Serialize;
use tally_shared::AppError;
use tally_shared::types::PartyId;
use thiserror::Error;

/// Errors that can occur while validating or allocating a split.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    /// Fewer participants than the split or flow requires.
    #[error("At least {required} participant(s) required, got {actual}")]
    NotEnoughParticipants {
        /// Minimum number of participants.
        required: usize,
        /// Number of participants supplied (or carrying weight).
        actual: usize,
    },

    /// Manual percentages do not add up to 100.
    #[error("Percentages must sum to 100, got {sum}")]
    PercentagesMismatch {
        /// Sum of the supplied percentages.
        sum: Decimal,
    },

    /// Manual amounts do not add up to the transaction total.
    #[error("Amounts must sum to the total of {total}, got {sum}")]
    AmountsMismatch {
        /// Sum of the supplied amounts.
        sum: Decimal,
        /// The transaction total.
        total: Decimal,
    },

    /// A party is paying itself.
    #[error("Party {0} cannot be both payer and recipient")]
    SelfPayment(PartyId),

    /// A party was given a negative weight or amount.
    #[error("Weight for party {0} cannot be negative")]
    NegativeWeight(PartyId),

    /// The transaction total is negative.
    #[error("Total amount cannot be negative, got {0}")]
    NegativeTotal(Decimal),

    /// The same party appears twice in one split.
    #[error("Party {0} appears more than once in the split")]
    DuplicateParticipant(PartyId),

    /// A percentage has more than two decimals.
    #[error("Percentage for party {0} has more than two decimals")]
    PercentPrecision(PartyId),
}

/// Reason code reported to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SplitReason {
    /// `not_enough_participants`
    #[serde(rename = "not_enough_participants")]
    NotEnoughParticipants,
    /// `percentages_not_100`
    #[serde(rename = "percentages_not_100")]
    PercentagesNot100,
    /// `amounts_mismatch_total`
    #[serde(rename = "amounts_mismatch_total")]
    AmountsMismatchTotal,
    /// `negative_weight`
    #[serde(rename = "negative_weight")]
    NegativeWeight,
    /// `self_payment`
    #[serde(rename = "self_payment")]
    SelfPayment,
    /// `duplicate_participant`
    #[serde(rename = "duplicate_participant")]
    DuplicateParticipant,
}

impl SplitReason {
    /// The reason code as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotEnoughParticipants => "not_enough_participants",
            Self::PercentagesNot100 => "percentages_not_100",
            Self::AmountsMismatchTotal => "amounts_mismatch_total",
            Self::NegativeWeight => "negative_weight",
            Self::SelfPayment => "self_payment",
            Self::DuplicateParticipant => "duplicate_participant",
        }
    }
}

impl std::fmt::Display for SplitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SplitError {
    /// Returns the reason code for this error.
    #[must_use]
    pub const fn reason(&self) -> SplitReason {
        match self {
            Self::NotEnoughParticipants { .. } => SplitReason::NotEnoughParticipants,
            Self::PercentagesMismatch { .. } | Self::PercentPrecision(_) => {
                SplitReason::PercentagesNot100
            }
            Self::AmountsMismatch { .. } => SplitReason::AmountsMismatchTotal,
            Self::SelfPayment(_) => SplitReason::SelfPayment,
            Self::NegativeWeight(_) | Self::NegativeTotal(_) => SplitReason::NegativeWeight,
            Self::DuplicateParticipant(_) => SplitReason::DuplicateParticipant,
        }
    }

    /// Returns the machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotEnoughParticipants { .. } => "NOT_ENOUGH_PARTICIPANTS",
            Self::PercentagesMismatch { .. } => "PERCENTAGES_MISMATCH",
            Self::AmountsMismatch { .. } => "AMOUNTS_MISMATCH",
            Self::SelfPayment(_) => "SELF_PAYMENT",
            Self::NegativeWeight(_) => "NEGATIVE_WEIGHT",
            Self::NegativeTotal(_) => "NEGATIVE_TOTAL",
            Self::DuplicateParticipant(_) => "DUPLICATE_PARTICIPANT",
            Self::PercentPrecision(_) => "PERCENT_PRECISION",
        }
    }
}

impl From<SplitError> for AppError {
    fn from(err: SplitError) -> Self {
        Self::Validation(format!("{} ({})", err, err.reason()))
    }
}
