//! Integration tests for share allocation and group balances.
//!
//! Exercises the public API end to end: allocation of every split mode,
//! rejection reasons, and a group ledger settling up.

use chrono::{TimeZone, Utc};
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use tally_core::ledger::{Group, LedgerError, LedgerService, NewTransaction};
use tally_core::split::{ShareAllocator, Split, SplitError, allocate};
use tally_shared::RemainderPolicy;
use tally_shared::types::{Currency, Money, PartyId};

fn usd(amount: Decimal) -> Money {
    Money::new(amount, Currency::Usd)
}

fn amounts(total: Money, split: &Split) -> Vec<Decimal> {
    allocate(total, split)
        .unwrap()
        .iter()
        .map(|s| s.amount.amount)
        .collect()
}

// ============================================================================
// Allocation scenarios
// ============================================================================

#[test]
fn test_even_ten_dollars_three_ways() {
    let (a, b, c) = (PartyId::new(), PartyId::new(), PartyId::new());
    let shares = allocate(usd(dec!(10.00)), &Split::even([a, b, c])).unwrap();

    let result: Vec<Decimal> = shares.iter().map(|s| s.amount.amount).collect();
    assert_eq!(result, vec![dec!(3.34), dec!(3.33), dec!(3.33)]);
    assert_eq!(result.iter().copied().sum::<Decimal>(), dec!(10.00));
    assert!(shares.iter().all(|s| s.fraction.denominator == 3));
}

#[test]
fn test_shares_one_one_two() {
    let (a, b, c) = (PartyId::new(), PartyId::new(), PartyId::new());
    let shares = allocate(
        usd(dec!(100.00)),
        &Split::shares([(a, 1), (b, 1), (c, 2)]),
    )
    .unwrap();

    let result: Vec<Decimal> = shares.iter().map(|s| s.amount.amount).collect();
    assert_eq!(result, vec![dec!(25.00), dec!(25.00), dec!(50.00)]);
    assert!(shares.iter().all(|s| s.fraction.denominator == 4));
    assert_eq!(shares[2].fraction.numerator, 2);
}

#[test]
fn test_simple_payment_goes_to_recipient() {
    let a = PartyId::new();
    let shares = allocate(usd(dec!(42.10)), &Split::Simple { recipient: a }).unwrap();

    assert_eq!(shares.len(), 1);
    assert_eq!(shares[0].party, a);
    assert_eq!(shares[0].amount, usd(dec!(42.10)));
    assert_eq!(shares[0].fraction.to_string(), "1/1");
}

#[test]
fn test_percent_round_trip() {
    let (a, b, c) = (PartyId::new(), PartyId::new(), PartyId::new());
    let split = Split::percent([(a, dec!(33.33)), (b, dec!(33.33)), (c, dec!(33.34))]);
    let shares = allocate(usd(dec!(99.99)), &split).unwrap();

    let percentages: Vec<Decimal> = shares.iter().map(|s| s.fraction.percentage()).collect();
    assert_eq!(percentages, vec![dec!(33.33), dec!(33.33), dec!(33.34)]);
    assert_eq!(
        shares.iter().map(|s| s.amount.amount).sum::<Decimal>(),
        dec!(99.99)
    );
}

#[rstest]
#[case::largest_weight(RemainderPolicy::LargestWeight, vec![dec!(0.17), dec!(0.17), dec!(0.17), dec!(0.49)])]
#[case::first_participant(RemainderPolicy::FirstParticipant, vec![dec!(0.16), dec!(0.17), dec!(0.17), dec!(0.50)])]
fn test_remainder_policy(#[case] policy: RemainderPolicy, #[case] expected: Vec<Decimal>) {
    let p: Vec<PartyId> = (0..4).map(|_| PartyId::new()).collect();
    let split = Split::shares([(p[0], 1), (p[1], 1), (p[2], 1), (p[3], 3)]);
    let shares = ShareAllocator::new(policy)
        .allocate(usd(dec!(1.00)), &split)
        .unwrap();

    let result: Vec<Decimal> = shares.iter().map(|s| s.amount.amount).collect();
    assert_eq!(result, expected);
}

#[test]
fn test_zero_decimal_currency() {
    let (a, b, c) = (PartyId::new(), PartyId::new(), PartyId::new());
    let total = Money::new(dec!(1000), Currency::Jpy);
    assert_eq!(
        amounts(total, &Split::even([a, b, c])),
        vec![dec!(334), dec!(333), dec!(333)]
    );
}

// ============================================================================
// Rejection scenarios
// ============================================================================

#[test]
fn test_percentages_must_sum_to_100() {
    let (a, b) = (PartyId::new(), PartyId::new());
    let err = allocate(
        usd(dec!(100.00)),
        &Split::percent([(a, dec!(60)), (b, dec!(30))]),
    )
    .unwrap_err();

    assert_eq!(err, SplitError::PercentagesMismatch { sum: dec!(90) });
    assert_eq!(err.reason().as_str(), "percentages_not_100");
}

#[test]
fn test_amounts_must_sum_to_total() {
    let (a, b) = (PartyId::new(), PartyId::new());
    let err = allocate(
        usd(dec!(100.00)),
        &Split::amount([(a, dec!(40.00)), (b, dec!(50.00))]),
    )
    .unwrap_err();

    assert!(matches!(err, SplitError::AmountsMismatch { .. }));
    assert_eq!(err.reason().as_str(), "amounts_mismatch_total");
}

#[rstest]
#[case::empty_even(Split::even(Vec::<PartyId>::new()), "not_enough_participants")]
#[case::negative_share(Split::shares([(PartyId::new(), -1)]), "negative_weight")]
#[case::negative_amount(Split::amount([(PartyId::new(), dec!(-5.00))]), "negative_weight")]
fn test_rejection_reasons(#[case] split: Split, #[case] reason: &str) {
    let err = allocate(usd(dec!(10.00)), &split).unwrap_err();
    assert_eq!(err.reason().as_str(), reason);
}

// ============================================================================
// Group ledger
// ============================================================================

fn entry(paid_by: PartyId, amount: Decimal, split: Split, hour: u32) -> NewTransaction {
    NewTransaction {
        description: format!("entry at {hour}h"),
        amount: usd(amount),
        paid_by,
        paid_to: None,
        split,
        category: None,
        paid_at: Utc.with_ymd_and_hms(2024, 7, 14, hour, 0, 0).unwrap(),
    }
}

#[test]
fn test_even_expense_then_direct_payment() {
    let setup = Group::create("Weekend", Currency::Usd, &["A", "B", "C"]).unwrap();
    let mut ledger = LedgerService::new(setup, ShareAllocator::default());
    let ids: Vec<PartyId> = ledger.parties().iter().map(|p| p.id).collect();
    let (a, b, c) = (ids[0], ids[1], ids[2]);

    // T1: A pays 30.00 split evenly among A, B and C.
    ledger
        .record(entry(a, dec!(30.00), Split::even([a, b, c]), 10))
        .unwrap();
    let after_t1: Vec<Decimal> = ledger.balances().iter().map(|b| b.balance).collect();
    assert_eq!(after_t1, vec![dec!(20.00), dec!(-10.00), dec!(-10.00)]);

    // T2: B pays A 10.00 directly.
    ledger
        .record(entry(b, dec!(10.00), Split::Simple { recipient: a }, 11))
        .unwrap();
    let after_t2: Vec<Decimal> = ledger.balances().iter().map(|b| b.balance).collect();
    assert_eq!(after_t2, vec![dec!(10.00), dec!(0.00), dec!(-10.00)]);
    assert_eq!(after_t2.iter().copied().sum::<Decimal>(), Decimal::ZERO);

    let history: Vec<String> = ledger
        .history_of(a)
        .unwrap()
        .iter()
        .map(|tx| tx.description.clone())
        .collect();
    assert_eq!(history, vec!["entry at 11h", "entry at 10h"]);
    assert_eq!(ledger.history_of(c).unwrap().len(), 1);
}

#[test]
fn test_rejected_transaction_leaves_ledger_untouched() {
    let setup = Group::create("Flat", Currency::Usd, &["A", "B"]).unwrap();
    let mut ledger = LedgerService::new(setup, ShareAllocator::default());
    let a = ledger.parties()[0].id;

    let err = ledger
        .record(entry(a, dec!(10.00), Split::Simple { recipient: a }, 9))
        .unwrap_err();

    assert_eq!(err, LedgerError::Split(SplitError::SelfPayment(a)));
    assert_eq!(err.error_code(), "SELF_PAYMENT");
    assert!(ledger.transactions().is_empty());
}
