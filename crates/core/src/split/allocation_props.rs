//! Property-based tests for share allocation.
//!
//! - Exact-sum invariant across every split mode
//! - Even split proportionality
//! - Shares never negative, zero weight owes nothing, bounded rounding drift
//! - Determinism
//! - Percentage round-trip through fractions

use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::RemainderPolicy;
use tally_shared::types::{Currency, Money, PartyId};

use super::allocation::{ShareAllocator, allocate};
use super::types::{ShareResult, Split};

/// Strategy to generate non-negative totals (0.00 to 100,000.00).
fn total_amount() -> impl Strategy<Value = Money> {
    (0i64..10_000_000i64).prop_map(|cents| Money::new(Decimal::new(cents, 2), Currency::Usd))
}

/// Strategy to generate small totals (0.00 to 0.99), where rounding
/// overshoot can exceed a single share.
fn small_amount() -> impl Strategy<Value = Money> {
    (0i64..100i64).prop_map(|cents| Money::new(Decimal::new(cents, 2), Currency::Usd))
}

/// Small and large totals, weighted toward the small end.
fn any_amount() -> impl Strategy<Value = Money> {
    prop_oneof![3 => small_amount(), 1 => total_amount()]
}

/// Strategy to generate participant counts (1 to 50).
fn participant_count() -> impl Strategy<Value = usize> {
    1usize..=50
}

/// Strategy to generate two-decimal percentages summing to exactly 100.
fn percentages_summing_to_100() -> impl Strategy<Value = Vec<Decimal>> {
    // Raw weights normalized to basis points; the first entry takes the leftover.
    prop::collection::vec(1u32..1000, 1..20).prop_map(|values| {
        let sum: u32 = values.iter().sum();
        let mut basis_points: Vec<i64> = values
            .iter()
            .map(|v| i64::from(*v) * 10_000 / i64::from(sum))
            .collect();
        let allocated: i64 = basis_points.iter().sum();
        basis_points[0] += 10_000 - allocated;
        basis_points.into_iter().map(|bp| Decimal::new(bp, 2)).collect()
    })
}

/// Two-decimal percentages summing to 100 where some entries may be zero.
fn percentages_with_zeros() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(prop_oneof![1 => Just(0u32), 3 => 1u32..1000], 1..20)
        .prop_filter("needs a non-zero percentage", |values| values.iter().any(|v| *v > 0))
        .prop_map(|values| {
            let sum: u32 = values.iter().sum();
            let mut basis_points: Vec<i64> = values
                .iter()
                .map(|v| i64::from(*v) * 10_000 / i64::from(sum))
                .collect();
            let allocated: i64 = basis_points.iter().sum();
            if let Some(first) = values.iter().position(|v| *v > 0) {
                basis_points[first] += 10_000 - allocated;
            }
            basis_points.into_iter().map(|bp| Decimal::new(bp, 2)).collect()
        })
}

/// Strategy to generate share counts with at least one non-zero entry.
fn share_counts() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(0i64..20, 1..20).prop_filter("needs a non-zero share", |counts| {
        counts.iter().any(|c| *c > 0)
    })
}

fn policy_strategy() -> impl Strategy<Value = RemainderPolicy> {
    prop_oneof![
        Just(RemainderPolicy::LargestWeight),
        Just(RemainderPolicy::FirstParticipant)
    ]
}

fn parties(count: usize) -> Vec<PartyId> {
    (0..count).map(|_| PartyId::new()).collect()
}

fn sum(shares: &[ShareResult]) -> Decimal {
    shares.iter().map(|s| s.amount.amount).sum()
}

/// Checks that no share is negative, zero weights get exactly zero, and every
/// share stays within `N` minor units of its exact proportional value.
fn assert_fair(
    total: Money,
    shares: &[ShareResult],
    weights: &[Decimal],
) -> Result<(), TestCaseError> {
    let weight_sum: Decimal = weights.iter().copied().sum();
    let bound = total.currency.minor_unit() * Decimal::from(shares.len());

    prop_assert_eq!(sum(shares), total.amount);
    for (share, weight) in shares.iter().zip(weights) {
        let amount = share.amount.amount;
        prop_assert!(amount >= Decimal::ZERO, "negative share {} of {}", amount, total);
        if weight.is_zero() {
            prop_assert!(amount.is_zero(), "zero weight owes {}", amount);
        }
        let exact = total.amount * *weight / weight_sum;
        prop_assert!((amount - exact).abs() < bound, "{} drifts from {}", amount, exact);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Even split shares always sum to the total.
    #[test]
    fn prop_even_sum_equals_total(
        total in total_amount(),
        count in participant_count(),
    ) {
        let shares = allocate(total, &Split::even(parties(count))).unwrap();
        prop_assert_eq!(shares.len(), count);
        prop_assert_eq!(sum(&shares), total.amount);
    }

    /// Every even share is floor(T/N) except the first, which adds the remainder.
    #[test]
    fn prop_even_proportionality(
        total in total_amount(),
        count in participant_count(),
    ) {
        let shares = allocate(total, &Split::even(parties(count))).unwrap();
        let base = total.floor().amount / Decimal::from(count);
        let base = Money::new(base, total.currency).floor().amount;
        let remainder = total.amount - base * Decimal::from(count);

        prop_assert!(remainder >= Decimal::ZERO);
        prop_assert!(remainder < Decimal::new(i64::try_from(count).unwrap(), 2));
        prop_assert_eq!(shares[0].amount.amount, base + remainder);
        for share in shares.iter().skip(1) {
            prop_assert_eq!(share.amount.amount, base);
        }
    }

    /// Percentage shares sum to the total and their fractions round-trip.
    #[test]
    fn prop_percent_sum_and_round_trip(
        total in total_amount(),
        percentages in percentages_summing_to_100(),
        policy in policy_strategy(),
    ) {
        let p = parties(percentages.len());
        let split = Split::percent(p.iter().copied().zip(percentages.iter().copied()));
        let shares = ShareAllocator::new(policy).allocate(total, &split).unwrap();

        prop_assert_eq!(sum(&shares), total.amount);
        for (share, percent) in shares.iter().zip(percentages.iter()) {
            let diff = (share.fraction.percentage() - *percent).abs();
            prop_assert!(diff <= Decimal::new(1, 2), "{} vs {}", share.fraction, percent);
        }
    }

    /// Shares splits sum to the total; denominators equal the share count sum.
    #[test]
    fn prop_shares_sum_equals_total(
        total in total_amount(),
        counts in share_counts(),
        policy in policy_strategy(),
    ) {
        let p = parties(counts.len());
        let split = Split::shares(p.iter().copied().zip(counts.iter().copied()));
        let shares = ShareAllocator::new(policy).allocate(total, &split).unwrap();

        let expected_denominator: i64 = counts.iter().sum();
        prop_assert_eq!(sum(&shares), total.amount);
        for share in &shares {
            prop_assert_eq!(share.fraction.denominator, u64::try_from(expected_denominator).unwrap());
        }
    }

    /// Fixed amounts are returned unchanged.
    #[test]
    fn prop_amounts_pass_through(
        cents in prop::collection::vec(0i64..1_000_000, 1..20),
    ) {
        let amounts: Vec<Decimal> = cents.iter().map(|c| Decimal::new(*c, 2)).collect();
        let total = Money::new(amounts.iter().copied().sum(), Currency::Usd);
        let p = parties(amounts.len());
        let split = Split::amount(p.iter().copied().zip(amounts.iter().copied()));
        let shares = allocate(total, &split).unwrap();

        let result: Vec<Decimal> = shares.iter().map(|s| s.amount.amount).collect();
        prop_assert_eq!(result, amounts);
    }

    /// Allocating the same input twice yields identical output.
    #[test]
    fn prop_allocation_is_deterministic(
        total in total_amount(),
        counts in share_counts(),
    ) {
        let p = parties(counts.len());
        let split = Split::shares(p.iter().copied().zip(counts.iter().copied()));
        let first = allocate(total, &split).unwrap();
        let second = allocate(total, &split).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Percentage shares are non-negative and close to exact, zero percent owes nothing.
    #[test]
    fn prop_percent_shares_are_fair(
        total in any_amount(),
        percentages in percentages_with_zeros(),
        policy in policy_strategy(),
    ) {
        let p = parties(percentages.len());
        let split = Split::percent(p.iter().copied().zip(percentages.iter().copied()));
        let shares = ShareAllocator::new(policy).allocate(total, &split).unwrap();
        assert_fair(total, &shares, &percentages)?;
    }

    /// Shares splits are non-negative and close to exact, zero counts owe nothing.
    #[test]
    fn prop_shares_are_fair(
        total in any_amount(),
        counts in share_counts(),
        policy in policy_strategy(),
    ) {
        let p = parties(counts.len());
        let split = Split::shares(p.iter().copied().zip(counts.iter().copied()));
        let shares = ShareAllocator::new(policy).allocate(total, &split).unwrap();
        let weights: Vec<Decimal> = counts.iter().map(|c| Decimal::from(*c)).collect();
        assert_fair(total, &shares, &weights)?;
    }
}
