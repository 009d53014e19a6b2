//! Group ledger.
//!
//! This module records transactions against a group and derives balances:
//! - Parties (members and expense destinations)
//! - Groups and spending categories
//! - Transaction aggregates owning their share set
//! - Balance aggregation recomputed from transactions on every read
//! - Error types for ledger operations
//! - Ledger service validating transactions against the group

pub mod balance;
pub mod error;
pub mod group;
pub mod party;
pub mod service;
pub mod transaction;

#[cfg(test)]
mod balance_props;

pub use balance::{PartyBalance, balance, category_total, group_balances, transactions_involving};
pub use error::LedgerError;
pub use group::{Category, DEFAULT_CATEGORY_NAME, Group, GroupSetup, MIN_GROUP_MEMBERS};
pub use party::{Party, PartyKind};
pub use service::LedgerService;
pub use transaction::{NewTransaction, Transaction};
