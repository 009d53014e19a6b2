//! Share allocation.
//!
//! Turns a transaction total and a [`Split`] into one [`ShareResult`] per
//! participant such that the share amounts sum EXACTLY to the total.
//!
//! Each mode works in two steps:
//! 1. Compute every share at the currency's minor unit (floor for even
//!    splits, Banker's Rounding for percentage and shares splits)
//! 2. Hand whatever is left over (`total - sum of shares`, a few minor units
//!    at most) to a single participant chosen by the [`RemainderPolicy`].
//!    When rounding overshoots the total by more than that participant's
//!    share, the excess is taken back one minor unit at a time so that no
//!    share ever drops below zero
//!
//! Fixed-amount splits are validated instead of rounded, and simple payments
//! have a single recipient, so neither ever has a remainder.

use rust_decimal::Decimal;
use tally_shared::RemainderPolicy;
use tally_shared::types::money::{floor_minor, round_minor};
use tally_shared::types::{Money, PartyId};
use tracing::debug;

use super::error::SplitError;
use super::types::{Fraction, ShareResult, Split, SplitMode, SplitRequest, Weighted};
use super::validation::validate_participants;

/// Percentages are written with at most two decimals (basis points).
const PERCENT_DECIMALS: u32 = 2;

/// Allocates transaction totals across participants.
///
/// Stateless apart from the remainder policy, so one instance can be shared
/// freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShareAllocator {
    policy: RemainderPolicy,
}

/// Allocates `total` with the default [`RemainderPolicy`].
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tally_core::split::{allocate, Split};
/// use tally_shared::types::{Currency, Money, PartyId};
///
/// let (a, b, c) = (PartyId::new(), PartyId::new(), PartyId::new());
/// let shares = allocate(Money::new(dec!(10.00), Currency::Usd), &Split::even([a, b, c])).unwrap();
///
/// // 10.00 / 3 = [3.34, 3.33, 3.33]
/// assert_eq!(shares[0].amount.amount, dec!(3.34));
/// assert_eq!(shares.iter().map(|s| s.amount.amount).sum::<rust_decimal::Decimal>(), dec!(10.00));
/// ```
///
/// # Errors
///
/// Returns `SplitError` if the split is invalid for the total.
pub fn allocate(total: Money, split: &Split) -> Result<Vec<ShareResult>, SplitError> {
    ShareAllocator::default().allocate(total, split)
}

impl ShareAllocator {
    /// Creates an allocator with the given remainder policy.
    #[must_use]
    pub const fn new(policy: RemainderPolicy) -> Self {
        Self { policy }
    }

    /// The remainder policy in use.
    #[must_use]
    pub const fn policy(&self) -> RemainderPolicy {
        self.policy
    }

    /// Allocates `total` according to `split`.
    ///
    /// The total is first rounded to its currency's minor unit; the returned
    /// shares sum exactly to that rounded total and are in input order.
    ///
    /// # Errors
    ///
    /// Returns `SplitError` if:
    /// - the total or any weight is negative
    /// - there are no participants, or a participant is repeated
    /// - percentages do not sum to 100 or carry more than two decimals
    /// - amounts do not sum to the total
    /// - every share count is zero
    pub fn allocate(&self, total: Money, split: &Split) -> Result<Vec<ShareResult>, SplitError> {
        if total.is_negative() {
            return Err(SplitError::NegativeTotal(total.amount));
        }
        let total = total.round();
        validate_participants(&split.participants())?;

        let (shares, remainder) = match split {
            Split::Simple { recipient } => (vec![simple_share(total, *recipient)], Decimal::ZERO),
            Split::Even { parties } => self.allocate_even(total, parties),
            Split::Percent { parties } => self.allocate_percent(total, parties)?,
            Split::Amount { parties } => (allocate_amounts(total, parties)?, Decimal::ZERO),
            Split::Shares { parties } => self.allocate_shares(total, parties)?,
        };

        debug!(
            mode = %split.mode(),
            participants = shares.len(),
            total = %total,
            %remainder,
            "allocated shares"
        );

        Ok(shares)
    }

    /// Allocates a [`SplitRequest`].
    ///
    /// # Errors
    ///
    /// See [`ShareAllocator::allocate`].
    pub fn allocate_request(&self, request: &SplitRequest) -> Result<Vec<ShareResult>, SplitError> {
        self.allocate(request.total, &request.split)
    }

    /// Equal shares rounded down; the first participant takes the remainder.
    fn allocate_even(&self, total: Money, parties: &[PartyId]) -> (Vec<ShareResult>, Decimal) {
        let count = Decimal::from(parties.len());
        let base = floor_minor(total.amount / count, total.currency);
        let fraction = Fraction::new(1, parties.len() as u64);

        let mut shares: Vec<ShareResult> = parties
            .iter()
            .map(|party| ShareResult {
                party: *party,
                amount: Money::new(base, total.currency),
                fraction,
                amount_is_manual: false,
                fraction_is_manual: false,
            })
            .collect();

        let weights = vec![Decimal::ONE; shares.len()];
        let remainder = self.absorb_remainder(total, &mut shares, &weights);
        (shares, remainder)
    }

    fn allocate_percent(
        &self,
        total: Money,
        parties: &[Weighted<Decimal>],
    ) -> Result<(Vec<ShareResult>, Decimal), SplitError> {
        reject_negative(parties.iter().map(|w| (w.party, w.weight < Decimal::ZERO)))?;
        if let Some(w) = parties
            .iter()
            .find(|w| w.weight.normalize().scale() > PERCENT_DECIMALS)
        {
            return Err(SplitError::PercentPrecision(w.party));
        }

        let sum: Decimal = parties.iter().map(|w| w.weight).sum();
        if sum != Decimal::ONE_HUNDRED {
            return Err(SplitError::PercentagesMismatch { sum });
        }

        let mut shares: Vec<ShareResult> = parties
            .iter()
            .map(|w| ShareResult {
                party: w.party,
                amount: Money::new(
                    round_minor(total.amount * w.weight / Decimal::ONE_HUNDRED, total.currency),
                    total.currency,
                ),
                fraction: Fraction::from_percentage(w.weight),
                amount_is_manual: false,
                fraction_is_manual: true,
            })
            .collect();

        let weights: Vec<Decimal> = parties.iter().map(|w| w.weight).collect();
        let remainder = self.absorb_remainder(total, &mut shares, &weights);
        Ok((shares, remainder))
    }

    fn allocate_shares(
        &self,
        total: Money,
        parties: &[Weighted<i64>],
    ) -> Result<(Vec<ShareResult>, Decimal), SplitError> {
        reject_negative(parties.iter().map(|w| (w.party, w.weight < 0)))?;

        let counts: Vec<u64> = parties
            .iter()
            .map(|w| u64::try_from(w.weight).unwrap_or(0))
            .collect();
        let denominator = counts.iter().fold(0u64, |acc, c| acc.saturating_add(*c));
        if denominator == 0 {
            return Err(SplitError::NotEnoughParticipants {
                required: 1,
                actual: 0,
            });
        }

        let weights: Vec<Decimal> = counts.iter().map(|c| Decimal::from(*c)).collect();
        let denominator_dec = Decimal::from(denominator);

        let mut shares: Vec<ShareResult> = parties
            .iter()
            .zip(counts.iter().zip(weights.iter()))
            .map(|(w, (count, weight))| ShareResult {
                party: w.party,
                amount: Money::new(
                    round_minor(total.amount * *weight / denominator_dec, total.currency),
                    total.currency,
                ),
                fraction: Fraction::new(*count, denominator),
                amount_is_manual: false,
                fraction_is_manual: true,
            })
            .collect();

        let remainder = self.absorb_remainder(total, &mut shares, &weights);
        Ok((shares, remainder))
    }

    /// Settles `total - sum(shares)` and returns it.
    ///
    /// The first participant in policy order takes the whole remainder as
    /// long as its share stays at or above zero. An overshoot that would
    /// push it below zero is taken back one minor unit at a time, cycling
    /// through the participants in policy order and skipping empty shares.
    fn absorb_remainder(
        &self,
        total: Money,
        shares: &mut [ShareResult],
        weights: &[Decimal],
    ) -> Decimal {
        let allocated: Decimal = shares.iter().map(|s| s.amount.amount).sum();
        let remainder = total.amount - allocated;
        if remainder.is_zero() {
            return remainder;
        }

        let order = self.absorb_order(weights);
        let first = order[0];
        if shares[first].amount.amount + remainder >= Decimal::ZERO {
            shares[first].amount.amount += remainder;
            return remainder;
        }

        // Shares are whole minor units and sum to more than the total, so
        // every pass takes back at least one unit.
        let unit = total.currency.minor_unit();
        let mut excess = -remainder;
        while excess > Decimal::ZERO {
            let before = excess;
            for &index in &order {
                if excess <= Decimal::ZERO {
                    break;
                }
                let share = &mut shares[index].amount.amount;
                if *share >= unit {
                    *share -= unit;
                    excess -= unit;
                }
            }
            if excess == before {
                break;
            }
        }
        remainder
    }

    /// Participant indices in the order they absorb a remainder.
    ///
    /// Zero-weight participants always come last, so they never receive
    /// part of a remainder. Ties keep input order.
    fn absorb_order(&self, weights: &[Decimal]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..weights.len()).collect();
        match self.policy {
            RemainderPolicy::FirstParticipant => order.sort_by_key(|&i| weights[i].is_zero()),
            RemainderPolicy::LargestWeight => order.sort_by(|&a, &b| weights[b].cmp(&weights[a])),
        }
        order
    }
}

fn simple_share(total: Money, recipient: PartyId) -> ShareResult {
    ShareResult {
        party: recipient,
        amount: total,
        fraction: Fraction::WHOLE,
        amount_is_manual: false,
        fraction_is_manual: false,
    }
}

/// Declared amounts are normalized to the minor unit and must sum to the total.
fn allocate_amounts(
    total: Money,
    parties: &[Weighted<Decimal>],
) -> Result<Vec<ShareResult>, SplitError> {
    reject_negative(parties.iter().map(|w| (w.party, w.weight < Decimal::ZERO)))?;

    let amounts: Vec<Decimal> = parties
        .iter()
        .map(|w| round_minor(w.weight, total.currency))
        .collect();
    let sum: Decimal = amounts.iter().copied().sum();
    if sum != total.amount {
        return Err(SplitError::AmountsMismatch {
            sum,
            total: total.amount,
        });
    }

    let total_units = minor_units(total);

    Ok(parties
        .iter()
        .zip(amounts)
        .map(|(w, amount)| {
            let fraction = if total_units == 0 {
                Fraction::new(1, parties.len() as u64)
            } else {
                Fraction::reduced(minor_units(Money::new(amount, total.currency)), total_units)
            };
            ShareResult {
                party: w.party,
                amount: Money::new(amount, total.currency),
                fraction,
                amount_is_manual: true,
                fraction_is_manual: false,
            }
        })
        .collect())
}

/// Whole minor units of a non-negative amount already at the currency scale.
fn minor_units(money: Money) -> u64 {
    money
        .to_minor_units()
        .and_then(|units| u64::try_from(units).ok())
        .unwrap_or(0)
}

fn reject_negative(
    mut flags: impl Iterator<Item = (PartyId, bool)>,
) -> Result<(), SplitError> {
    match flags.find(|(_, negative)| *negative) {
        Some((party, _)) => Err(SplitError::NegativeWeight(party)),
        None => Ok(()),
    }
}

impl SplitMode {
    /// Returns true if shares in this mode can leave a rounding remainder.
    #[must_use]
    pub const fn has_remainder(self) -> bool {
        matches!(self, Self::Even | Self::Percent | Self::Shares)
    }
}
