//! JSON ledger files.
//!
//! A ledger file describes one group and its transactions, naming parties
//! by their display name:
//!
//! ```json
//! {
//!   "group": { "name": "Weekend", "currency": "USD" },
//!   "members": ["Ann", "Bob", "Cid"],
//!   "sinks": ["Hotel"],
//!   "categories": ["Lodging"],
//!   "transactions": [
//!     {
//!       "description": "Room",
//!       "amount": "90.00",
//!       "paid_by": "Ann",
//!       "paid_to": "Hotel",
//!       "category": "Lodging",
//!       "paid_at": "2024-07-13T12:00:00Z",
//!       "split": { "mode": "shares", "parties": [{ "party": "Ann", "weight": 2 }, { "party": "Bob", "weight": 1 }] }
//!     }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tally_core::ledger::{Group, LedgerService, NewTransaction};
use tally_core::split::{Fraction, ShareAllocator, Split};
use tally_shared::SplitConfig;
use tally_shared::types::{CategoryId, Currency, Money, PartyId};
use tracing::debug;

/// A group ledger as stored on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerFile {
    /// Group settings.
    pub group: GroupSpec,
    /// Member names.
    pub members: Vec<String>,
    /// Expense destination names.
    #[serde(default)]
    pub sinks: Vec<String>,
    /// Extra category names.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Transactions in recording order.
    #[serde(default)]
    pub transactions: Vec<TransactionSpec>,
}

/// Group settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupSpec {
    /// Display name.
    pub name: String,
    /// Currency; the configured default when absent.
    #[serde(default)]
    pub currency: Option<Currency>,
}

/// A transaction with parties referenced by name.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionSpec {
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Total amount in the group currency.
    pub amount: Decimal,
    /// Payer name.
    pub paid_by: String,
    /// Payee name.
    #[serde(default)]
    pub paid_to: Option<String>,
    /// Category name.
    #[serde(default)]
    pub category: Option<String>,
    /// When the money changed hands.
    pub paid_at: DateTime<Utc>,
    /// How the amount is split.
    pub split: SplitSpec,
}

/// A split with parties referenced by name.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SplitSpec {
    /// Direct payment to one party.
    Simple {
        /// Recipient name.
        recipient: String,
    },
    /// Equal shares.
    Even {
        /// Participant names.
        parties: Vec<String>,
    },
    /// Percentages summing to 100.
    Percent {
        /// Participant names with percentages.
        parties: Vec<NamedWeight<Decimal>>,
    },
    /// Legacy decimal portions summing to 1, recorded as percentages.
    Portion {
        /// Participant names with portions (`0.25` for a quarter).
        parties: Vec<NamedWeight<Decimal>>,
    },
    /// Explicit amounts summing to the total.
    Amount {
        /// Participant names with amounts.
        parties: Vec<NamedWeight<Decimal>>,
    },
    /// Integer share counts.
    Shares {
        /// Participant names with share counts.
        parties: Vec<NamedWeight<i64>>,
    },
}

/// A participant name with its weight.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedWeight<W> {
    /// Participant name.
    pub party: String,
    /// Weight, percentage or amount.
    pub weight: W,
}

impl LedgerFile {
    /// Reads and parses a ledger file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid ledger.
    pub fn read(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read ledger file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid ledger file {}", path.display()))
    }

    /// Parses a ledger from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a ledger.
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Creates the group and records every transaction.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first transaction that cannot be recorded.
    pub fn into_ledger(self, config: &SplitConfig) -> anyhow::Result<LedgerService> {
        let currency = self.group.currency.unwrap_or(config.default_currency);
        let setup = Group::create(self.group.name, currency, self.members.as_slice())
            .context("invalid group members")?;
        let mut ledger = LedgerService::new(setup, ShareAllocator::new(config.remainder_policy));

        for sink in self.sinks {
            ledger.add_sink(sink).context("invalid sinks")?;
        }
        for category in self.categories {
            ledger.add_category(category);
        }

        for (index, spec) in self.transactions.into_iter().enumerate() {
            let label = format!("transaction #{} ({})", index + 1, spec.description);
            let input = spec
                .resolve(&ledger, currency)
                .with_context(|| label.clone())?;
            let tx = ledger.record(input).with_context(|| label.clone())?;
            debug!(transaction_id = %tx.id, %label, "recorded transaction");
        }

        Ok(ledger)
    }
}

impl TransactionSpec {
    fn resolve(self, ledger: &LedgerService, currency: Currency) -> anyhow::Result<NewTransaction> {
        let paid_to = self.paid_to.as_deref().map(|n| party(ledger, n)).transpose()?;
        let category = self.category.as_deref().map(|n| category(ledger, n)).transpose()?;

        Ok(NewTransaction {
            paid_by: party(ledger, &self.paid_by)?,
            paid_to,
            split: self.split.resolve(ledger)?,
            category,
            amount: Money::new(self.amount, currency),
            description: self.description,
            paid_at: self.paid_at,
        })
    }
}

impl SplitSpec {
    fn resolve(self, ledger: &LedgerService) -> anyhow::Result<Split> {
        Ok(match self {
            Self::Simple { recipient } => Split::Simple {
                recipient: party(ledger, &recipient)?,
            },
            Self::Even { parties } => Split::even(
                parties
                    .iter()
                    .map(|n| party(ledger, n))
                    .collect::<anyhow::Result<Vec<_>>>()?,
            ),
            Self::Percent { parties } => Split::percent(weights(ledger, parties)?),
            Self::Portion { parties } => Split::percent(
                weights(ledger, parties)?
                    .into_iter()
                    .map(|(party, portion)| (party, Fraction::from_portion(portion).percentage())),
            ),
            Self::Amount { parties } => Split::amount(weights(ledger, parties)?),
            Self::Shares { parties } => Split::shares(weights(ledger, parties)?),
        })
    }
}

fn weights<W>(
    ledger: &LedgerService,
    parties: Vec<NamedWeight<W>>,
) -> anyhow::Result<Vec<(PartyId, W)>> {
    parties
        .into_iter()
        .map(|w| Ok((party(ledger, &w.party)?, w.weight)))
        .collect()
}

fn party(ledger: &LedgerService, name: &str) -> anyhow::Result<PartyId> {
    ledger
        .party_by_name(name)
        .map(|p| p.id)
        .ok_or_else(|| anyhow!("unknown party {name:?}"))
}

fn category(ledger: &LedgerService, name: &str) -> anyhow::Result<CategoryId> {
    ledger
        .category_by_name(name)
        .map(|c| c.id)
        .ok_or_else(|| anyhow!("unknown category {name:?}"))
}
