//! Structural checks shared by every split mode and by payment recording.

use std::collections::HashSet;

use tally_shared::types::PartyId;

use super::error::SplitError;
use super::types::Split;

/// Validates that at least one party participates and none appears twice.
///
/// # Errors
///
/// Returns `NotEnoughParticipants` for an empty list and
/// `DuplicateParticipant` for the first repeated party.
pub fn validate_participants(parties: &[PartyId]) -> Result<(), SplitError> {
    if parties.is_empty() {
        return Err(SplitError::NotEnoughParticipants {
            required: 1,
            actual: 0,
        });
    }

    let mut seen = HashSet::with_capacity(parties.len());
    for party in parties {
        if !seen.insert(*party) {
            return Err(SplitError::DuplicateParticipant(*party));
        }
    }

    Ok(())
}

/// Validates the payer/payee relationship of a transaction.
///
/// Rejects a payer paying itself, a simple payment whose recipient is the
/// payer, and an explicit payee that is also one of the sharers.
///
/// # Errors
///
/// Returns `SelfPayment` naming the offending party.
pub fn validate_payment(
    payer: PartyId,
    payee: Option<PartyId>,
    split: &Split,
) -> Result<(), SplitError> {
    if payee == Some(payer) {
        return Err(SplitError::SelfPayment(payer));
    }

    match split {
        Split::Simple { recipient } => {
            if *recipient == payer {
                return Err(SplitError::SelfPayment(payer));
            }
        }
        _ => {
            if let Some(payee) = payee
                && split.participants().contains(&payee)
            {
                return Err(SplitError::SelfPayment(payee));
            }
        }
    }

    Ok(())
}
