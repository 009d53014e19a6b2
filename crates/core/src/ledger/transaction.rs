//! Transaction aggregate.
//!
//! A transaction owns the full set of shares produced by its split. Shares
//! are never edited one by one: [`Transaction::replace_split`] computes a new
//! set and swaps it in whole, or leaves the transaction untouched on error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::{CategoryId, GroupId, Money, PartyId, TransactionId};
use tracing::debug;

use super::error::LedgerError;
use crate::split::{ShareAllocator, ShareResult, Split, SplitMode, validate_payment};

/// Input for recording a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// Free-form description.
    pub description: String,
    /// Total amount.
    pub amount: Money,
    /// The party who paid.
    pub paid_by: PartyId,
    /// Who received the money. Simple payments default to their recipient.
    #[serde(default)]
    pub paid_to: Option<PartyId>,
    /// How the amount is split.
    pub split: Split,
    /// Spending category.
    #[serde(default)]
    pub category: Option<CategoryId>,
    /// When the money changed hands.
    pub paid_at: DateTime<Utc>,
}

/// A recorded expense or payment with its shares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    /// Unique identifier.
    pub id: TransactionId,
    /// The group this transaction belongs to.
    pub group_id: GroupId,
    /// Free-form description.
    pub description: String,
    /// The party who paid.
    pub paid_by: PartyId,
    /// Spending category.
    pub category: Option<CategoryId>,
    /// When the money changed hands.
    pub paid_at: DateTime<Utc>,
    amount: Money,
    paid_to: Option<PartyId>,
    split: Split,
    shares: Vec<ShareResult>,
}

impl Transaction {
    /// Validates and allocates a new transaction.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if:
    /// - a simple payment names a payee other than its recipient
    /// - the payer pays itself or also receives a share of its own payment
    /// - the split cannot be allocated
    pub fn record(
        group_id: GroupId,
        input: NewTransaction,
        allocator: &ShareAllocator,
    ) -> Result<Self, LedgerError> {
        let paid_to = resolve_payee(input.paid_to, &input.split)?;
        let shares = allocate_shares(input.amount, input.paid_by, paid_to, &input.split, allocator)?;

        Ok(Self {
            id: TransactionId::new(),
            group_id,
            description: input.description,
            paid_by: input.paid_by,
            category: input.category,
            paid_at: input.paid_at,
            amount: input.amount.round(),
            paid_to,
            split: input.split,
            shares,
        })
    }

    /// Replaces the amount and split, recomputing every share.
    ///
    /// The old share set is discarded only once the new one is valid.
    ///
    /// # Errors
    ///
    /// Same as [`Transaction::record`]; on error the transaction is unchanged.
    pub fn replace_split(
        &mut self,
        amount: Money,
        split: Split,
        allocator: &ShareAllocator,
    ) -> Result<(), LedgerError> {
        // An explicit payee survives edits unless the split becomes a payment.
        let payee = match self.split {
            Split::Simple { .. } => None,
            _ => self.paid_to,
        };
        let paid_to = resolve_payee(payee, &split)?;
        let shares = allocate_shares(amount, self.paid_by, paid_to, &split, allocator)?;

        debug!(
            transaction_id = %self.id,
            old_shares = self.shares.len(),
            new_shares = shares.len(),
            mode = %split.mode(),
            "replaced transaction shares"
        );

        self.amount = amount.round();
        self.paid_to = paid_to;
        self.split = split;
        self.shares = shares;
        Ok(())
    }

    /// Total amount.
    #[must_use]
    pub const fn amount(&self) -> Money {
        self.amount
    }

    /// Who received the money.
    #[must_use]
    pub const fn paid_to(&self) -> Option<PartyId> {
        self.paid_to
    }

    /// The split the shares were computed from.
    #[must_use]
    pub const fn split(&self) -> &Split {
        &self.split
    }

    /// The split mode.
    #[must_use]
    pub const fn mode(&self) -> SplitMode {
        self.split.mode()
    }

    /// All shares, in split order.
    #[must_use]
    pub fn shares(&self) -> &[ShareResult] {
        &self.shares
    }

    /// The share held by `party`, if any.
    #[must_use]
    pub fn share_of(&self, party: PartyId) -> Option<&ShareResult> {
        self.shares.iter().find(|s| s.party == party)
    }

    /// Returns true if `party` paid, was paid, or holds a share.
    #[must_use]
    pub fn involves(&self, party: PartyId) -> bool {
        self.paid_by == party || self.paid_to == Some(party) || self.share_of(party).is_some()
    }

    /// Returns true if this is a direct payment between two parties.
    #[must_use]
    pub const fn is_payment(&self) -> bool {
        matches!(self.split, Split::Simple { .. })
    }
}

fn resolve_payee(paid_to: Option<PartyId>, split: &Split) -> Result<Option<PartyId>, LedgerError> {
    match (split, paid_to) {
        (Split::Simple { recipient }, Some(payee)) if payee != *recipient => {
            Err(LedgerError::PayeeMismatch {
                payee,
                recipient: *recipient,
            })
        }
        (Split::Simple { recipient }, _) => Ok(Some(*recipient)),
        (_, payee) => Ok(payee),
    }
}

fn allocate_shares(
    amount: Money,
    paid_by: PartyId,
    paid_to: Option<PartyId>,
    split: &Split,
    allocator: &ShareAllocator,
) -> Result<Vec<ShareResult>, LedgerError> {
    validate_payment(paid_by, paid_to, split)?;
    Ok(allocator.allocate(amount, split)?)
}
