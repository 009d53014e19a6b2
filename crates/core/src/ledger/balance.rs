//! Party balance calculations.
//!
//! Balances are never stored. They are recomputed from the transactions on
//! every read:
//! - `paid`: sum of amounts of transactions the party paid
//! - `owed`: sum of the party's shares
//! - `balance = paid - owed`; positive means the group owes the party
//!
//! A direct payment from B to A has A as its sole sharer, so it raises B's
//! balance and lowers A's by the same amount. Across a group whose payers and
//! sharers are all members, balances always sum to zero.

use std::cmp::Reverse;
use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{CategoryId, Currency, Money, PartyId};

use super::party::Party;
use super::transaction::Transaction;

/// A party's balance at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyBalance {
    /// The party.
    pub party_id: PartyId,
    /// Total paid by the party.
    pub paid_total: Decimal,
    /// Total of the party's shares.
    pub owed_total: Decimal,
    /// Net balance (`paid_total - owed_total`).
    pub balance: Decimal,
    /// Currency of all three amounts.
    pub currency: Currency,
}

impl PartyBalance {
    /// Creates a zero balance.
    #[must_use]
    pub const fn new(party_id: PartyId, currency: Currency) -> Self {
        Self {
            party_id,
            paid_total: Decimal::ZERO,
            owed_total: Decimal::ZERO,
            balance: Decimal::ZERO,
            currency,
        }
    }

    /// Adds an amount the party paid.
    pub fn add_paid(&mut self, amount: Decimal) {
        self.paid_total += amount;
        self.balance = self.paid_total - self.owed_total;
    }

    /// Adds a share the party owes.
    pub fn add_owed(&mut self, amount: Decimal) {
        self.owed_total += amount;
        self.balance = self.paid_total - self.owed_total;
    }

    /// The net balance as money.
    #[must_use]
    pub const fn net(&self) -> Money {
        Money::new(self.balance, self.currency)
    }

    /// Returns true if the party neither owes nor is owed anything.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.balance.is_zero()
    }
}

/// Computes one party's balance.
#[must_use]
pub fn balance(party: PartyId, currency: Currency, transactions: &[Transaction]) -> PartyBalance {
    let mut result = PartyBalance::new(party, currency);
    for tx in transactions {
        if tx.paid_by == party {
            result.add_paid(tx.amount().amount);
        }
        if let Some(share) = tx.share_of(party) {
            result.add_owed(share.amount.amount);
        }
    }
    result
}

/// Computes every party's balance in a single pass.
///
/// Results follow the order of `parties`. Parties without transactions get a
/// zero balance; transactions touching unlisted parties are ignored for them.
#[must_use]
pub fn group_balances(
    parties: &[Party],
    currency: Currency,
    transactions: &[Transaction],
) -> Vec<PartyBalance> {
    let mut balances: Vec<PartyBalance> = parties
        .iter()
        .map(|p| PartyBalance::new(p.id, currency))
        .collect();
    let index: HashMap<PartyId, usize> = parties
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id, i))
        .collect();

    for tx in transactions {
        if let Some(&i) = index.get(&tx.paid_by) {
            balances[i].add_paid(tx.amount().amount);
        }
        for share in tx.shares() {
            if let Some(&i) = index.get(&share.party) {
                balances[i].add_owed(share.amount.amount);
            }
        }
    }

    balances
}

/// Sums the amounts of all transactions in `category`.
#[must_use]
pub fn category_total(
    category: CategoryId,
    currency: Currency,
    transactions: &[Transaction],
) -> Money {
    let total = transactions
        .iter()
        .filter(|tx| tx.category == Some(category))
        .map(|tx| tx.amount().amount)
        .sum();
    Money::new(total, currency)
}

/// Transactions where `party` paid, was paid, or holds a share, newest first.
#[must_use]
pub fn transactions_involving(party: PartyId, transactions: &[Transaction]) -> Vec<&Transaction> {
    let mut involved: Vec<&Transaction> = transactions.iter().filter(|tx| tx.involves(party)).collect();
    involved.sort_by_key(|tx| Reverse(tx.paid_at));
    involved
}
