//! Core business logic for Tally.
//!
//! This crate contains pure computation with no I/O: share allocation and
//! balance aggregation over transactions supplied by the caller.
//!
//! # Modules
//!
//! - `split` - Split modes, fractions and exact-sum share allocation
//! - `ledger` - Groups, transactions and balances

pub mod ledger;
pub mod split;
