//! Parties taking part in a group's transactions.

use serde::{Deserialize, Serialize};
use tally_shared::types::{GroupId, PartyId};

/// What role a party plays in the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyKind {
    /// A person sharing costs.
    Member,
    /// An expense destination (a shop, a landlord) that only receives money.
    Sink,
}

/// A member of a group or an expense destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Unique identifier.
    pub id: PartyId,
    /// The group this party belongs to.
    pub group_id: GroupId,
    /// Display name.
    pub name: String,
    /// Member or expense destination.
    pub kind: PartyKind,
}

impl Party {
    /// Creates a group member.
    #[must_use]
    pub fn member(group_id: GroupId, name: impl Into<String>) -> Self {
        Self {
            id: PartyId::new(),
            group_id,
            name: name.into(),
            kind: PartyKind::Member,
        }
    }

    /// Creates an expense destination.
    #[must_use]
    pub fn sink(group_id: GroupId, name: impl Into<String>) -> Self {
        Self {
            id: PartyId::new(),
            group_id,
            name: name.into(),
            kind: PartyKind::Sink,
        }
    }

    /// Returns true if this party is a group member.
    #[must_use]
    pub fn is_member(&self) -> bool {
        self.kind == PartyKind::Member
    }
}

impl std::fmt::Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
