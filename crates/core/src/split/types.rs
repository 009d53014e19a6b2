//! Split domain types.
//!
//! A [`Split`] describes *how* a transaction total is shared; the allocator
//! turns it into one [`ShareResult`] per participant. Every share carries a
//! canonical `numerator / denominator` [`Fraction`] regardless of the mode it
//! came from, so percentages, share counts and legacy decimal portions all end
//! up in the same representation.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tally_shared::types::{Money, PartyId};

/// Denominator used for percentage and legacy portion fractions.
///
/// Two-decimal percentages map onto it exactly: `12.34%` is `1234/10000`.
pub const PERCENT_DENOMINATOR: u64 = 10_000;

/// Split mode tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    /// One party receives the whole amount (member-to-member payment).
    Simple,
    /// Every participant gets the same share.
    Even,
    /// Manual percentages summing to 100.
    Percent,
    /// Manual amounts summing to the total.
    Amount,
    /// Manual integer share counts.
    Shares,
}

impl SplitMode {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Simple => "Simple payment",
            Self::Even => "Even split",
            Self::Percent => "Manual percentages",
            Self::Amount => "Manual amounts",
            Self::Shares => "Manual shares",
        }
    }

    /// Stable identifier, matching the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Even => "even",
            Self::Percent => "percent",
            Self::Amount => "amount",
            Self::Shares => "shares",
        }
    }
}

impl std::fmt::Display for SplitMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A participant together with its declared weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weighted<W> {
    /// The participating party.
    pub party: PartyId,
    /// Percentage, amount or share count depending on the split mode.
    pub weight: W,
}

impl<W> Weighted<W> {
    /// Pairs a party with its weight.
    pub const fn new(party: PartyId, weight: W) -> Self {
        Self { party, weight }
    }
}

/// How a transaction total is divided among participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Split {
    /// The recipient takes the whole amount.
    Simple {
        /// The party being paid.
        recipient: PartyId,
    },
    /// Equal shares, rounded down to the minor unit.
    Even {
        /// Participants in input order.
        parties: Vec<PartyId>,
    },
    /// Percentages (0.00 - 100.00) that must sum to exactly 100.
    Percent {
        /// Participants with their percentage.
        parties: Vec<Weighted<Decimal>>,
    },
    /// Explicit amounts that must sum to exactly the total.
    Amount {
        /// Participants with their amount in major units.
        parties: Vec<Weighted<Decimal>>,
    },
    /// Integer share counts; the denominator is their sum.
    Shares {
        /// Participants with their share count.
        parties: Vec<Weighted<i64>>,
    },
}

impl Split {
    /// Even split over the given parties.
    #[must_use]
    pub fn even(parties: impl IntoIterator<Item = PartyId>) -> Self {
        Self::Even {
            parties: parties.into_iter().collect(),
        }
    }

    /// Percentage split from `(party, percent)` pairs.
    #[must_use]
    pub fn percent(parties: impl IntoIterator<Item = (PartyId, Decimal)>) -> Self {
        Self::Percent {
            parties: parties
                .into_iter()
                .map(|(party, weight)| Weighted::new(party, weight))
                .collect(),
        }
    }

    /// Fixed-amount split from `(party, amount)` pairs.
    #[must_use]
    pub fn amount(parties: impl IntoIterator<Item = (PartyId, Decimal)>) -> Self {
        Self::Amount {
            parties: parties
                .into_iter()
                .map(|(party, weight)| Weighted::new(party, weight))
                .collect(),
        }
    }

    /// Shares split from `(party, share count)` pairs.
    #[must_use]
    pub fn shares(parties: impl IntoIterator<Item = (PartyId, i64)>) -> Self {
        Self::Shares {
            parties: parties
                .into_iter()
                .map(|(party, weight)| Weighted::new(party, weight))
                .collect(),
        }
    }

    /// The mode tag of this split.
    #[must_use]
    pub const fn mode(&self) -> SplitMode {
        match self {
            Self::Simple { .. } => SplitMode::Simple,
            Self::Even { .. } => SplitMode::Even,
            Self::Percent { .. } => SplitMode::Percent,
            Self::Amount { .. } => SplitMode::Amount,
            Self::Shares { .. } => SplitMode::Shares,
        }
    }

    /// Participants in input order.
    #[must_use]
    pub fn participants(&self) -> Vec<PartyId> {
        match self {
            Self::Simple { recipient } => vec![*recipient],
            Self::Even { parties } => parties.clone(),
            Self::Percent { parties } | Self::Amount { parties } => {
                parties.iter().map(|w| w.party).collect()
            }
            Self::Shares { parties } => parties.iter().map(|w| w.party).collect(),
        }
    }
}

/// Transient input to a single allocation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitRequest {
    /// The amount being divided.
    pub total: Money,
    /// How it is divided.
    pub split: Split,
}

/// A `numerator / denominator` fraction of a transaction total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fraction {
    /// Numerator.
    pub numerator: u64,
    /// Denominator, never zero.
    pub denominator: u64,
}

impl Fraction {
    /// The whole amount.
    pub const WHOLE: Self = Self {
        numerator: 1,
        denominator: 1,
    };

    /// Creates a fraction as given, without reducing it.
    ///
    /// A zero denominator is replaced with 1.
    #[must_use]
    pub const fn new(numerator: u64, denominator: u64) -> Self {
        Self {
            numerator,
            denominator: if denominator == 0 { 1 } else { denominator },
        }
    }

    /// Creates a fraction reduced to lowest terms.
    #[must_use]
    pub fn reduced(numerator: u64, denominator: u64) -> Self {
        let fraction = Self::new(numerator, denominator);
        let divisor = gcd(fraction.numerator, fraction.denominator);
        if divisor <= 1 {
            return fraction;
        }
        Self::new(fraction.numerator / divisor, fraction.denominator / divisor)
    }

    /// Converts a percentage (e.g. `33.33`) into `x / 10000`.
    ///
    /// Digits beyond two decimals are rounded half to even; negative input yields zero.
    #[must_use]
    pub fn from_percentage(percent: Decimal) -> Self {
        let numerator = (percent * Decimal::ONE_HUNDRED)
            .round()
            .to_u64()
            .unwrap_or(0);
        Self::new(numerator, PERCENT_DENOMINATOR)
    }

    /// Converts a legacy decimal portion (`0.25` for a quarter) into `x / 10000`.
    #[must_use]
    pub fn from_portion(portion: Decimal) -> Self {
        let numerator = (portion * Decimal::from(PERCENT_DENOMINATOR))
            .round()
            .to_u64()
            .unwrap_or(0);
        Self::new(numerator, PERCENT_DENOMINATOR)
    }

    /// The fraction as an exact decimal (up to `Decimal` precision).
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::from(self.numerator) / Decimal::from(self.denominator)
    }

    /// The fraction as a percentage rounded to two decimals.
    #[must_use]
    pub fn percentage(self) -> Decimal {
        (self.to_decimal() * Decimal::ONE_HUNDRED).round_dp(2)
    }
}

impl std::fmt::Display for Fraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// One participant's share of a transaction total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareResult {
    /// The party responsible for this share.
    pub party: PartyId,
    /// The amount owed, in the transaction currency.
    pub amount: Money,
    /// Which part of the total this share represents.
    pub fraction: Fraction,
    /// The amount was entered by hand rather than derived from the fraction.
    pub amount_is_manual: bool,
    /// The fraction was entered by hand (percentages or share counts).
    pub fraction_is_manual: bool,
}
