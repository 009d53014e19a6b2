//! Property-based tests for balance aggregation.
//!
//! - Group balances always sum to zero
//! - A party with no transactions has a zero balance
//! - The one-pass group reduction agrees with per-party balances

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{Currency, GroupId, Money, PartyId};

use super::balance::{balance, group_balances};
use super::party::Party;
use super::transaction::{NewTransaction, Transaction};
use crate::split::{ShareAllocator, Split};

/// A transaction blueprint: payer index, amount in cents, share counts per party.
type Blueprint = (usize, i64, Vec<i64>);

const PARTIES: usize = 5;

/// Strategy to generate transactions among `PARTIES` members.
fn blueprints() -> impl Strategy<Value = Vec<Blueprint>> {
    prop::collection::vec(
        (
            0..PARTIES,
            0i64..1_000_000,
            prop::collection::vec(0i64..5, PARTIES).prop_filter("needs a sharer", |counts| {
                counts.iter().any(|c| *c > 0)
            }),
        ),
        0..30,
    )
}

fn build(blueprints: &[Blueprint]) -> (Vec<Party>, Vec<Transaction>) {
    let group = GroupId::new();
    let parties: Vec<Party> = (0..PARTIES)
        .map(|i| Party::member(group, format!("P{i}")))
        .collect();
    let allocator = ShareAllocator::default();

    let transactions = blueprints
        .iter()
        .enumerate()
        .filter_map(|(day, (payer, cents, counts))| {
            let paid_by = parties[*payer].id;
            // The payer may hold a share of its own expense.
            let split = Split::shares(
                parties
                    .iter()
                    .zip(counts)
                    .filter(|(_, c)| **c > 0)
                    .map(|(p, c)| (p.id, *c)),
            );
            let input = NewTransaction {
                description: format!("tx {day}"),
                amount: Money::new(Decimal::new(*cents, 2), Currency::Usd),
                paid_by,
                paid_to: None,
                split,
                category: None,
                paid_at: Utc.timestamp_opt(1_700_000_000 + i64::try_from(day).unwrap(), 0).unwrap(),
            };
            Transaction::record(group, input, &allocator).ok()
        })
        .collect();

    (parties, transactions)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The sum of all member balances is exactly zero.
    #[test]
    fn prop_group_balances_sum_to_zero(bps in blueprints()) {
        let (parties, transactions) = build(&bps);
        let total: Decimal = group_balances(&parties, Currency::Usd, &transactions)
            .iter()
            .map(|b| b.balance)
            .sum();
        prop_assert_eq!(total, Decimal::ZERO);
    }

    /// An outsider's balance is zero whatever the group did.
    #[test]
    fn prop_uninvolved_party_is_zero(bps in blueprints()) {
        let (_, transactions) = build(&bps);
        let outsider = balance(PartyId::new(), Currency::Usd, &transactions);
        prop_assert!(outsider.is_settled());
        prop_assert_eq!(outsider.paid_total, Decimal::ZERO);
        prop_assert_eq!(outsider.owed_total, Decimal::ZERO);
    }

    /// The single-pass reduction matches the per-party calculation.
    #[test]
    fn prop_group_matches_single_party(bps in blueprints()) {
        let (parties, transactions) = build(&bps);
        let all = group_balances(&parties, Currency::Usd, &transactions);
        for (party, pb) in parties.iter().zip(&all) {
            prop_assert_eq!(pb, &balance(party.id, Currency::Usd, &transactions));
        }
    }
}
