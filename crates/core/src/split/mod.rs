//! Share splitting.
//!
//! This module implements the allocation of a transaction total across its
//! participants:
//! - Split modes (simple, even, percent, amount, shares) as a tagged enum
//! - Canonical `numerator / denominator` fractions for every share
//! - Exact-sum allocation with a deterministic remainder policy
//! - Validation errors with stable reason codes

pub mod allocation;
pub mod error;
pub mod types;
pub mod validation;

#[cfg(test)]
mod allocation_props;

pub use allocation::{ShareAllocator, allocate};
pub use error::{SplitError, SplitReason};
pub use types::{Fraction, PERCENT_DENOMINATOR, ShareResult, Split, SplitMode, SplitRequest, Weighted};
pub use validation::{validate_participants, validate_payment};
