//! Groups and expense categories.

use serde::{Deserialize, Serialize};
use tally_shared::types::{CategoryId, Currency, GroupId};

use super::party::Party;
use crate::split::SplitError;

/// Name of the category every group starts with.
pub const DEFAULT_CATEGORY_NAME: &str = "Uncategorized";

/// Minimum number of members needed to create a group.
pub const MIN_GROUP_MEMBERS: usize = 2;

/// A group of people sharing expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Unique identifier.
    pub id: GroupId,
    /// Display name.
    pub name: String,
    /// Currency every transaction of the group is recorded in.
    pub currency: Currency,
    /// Whether transactions are sorted into categories.
    pub use_categories: bool,
    /// Category assigned when a transaction names none.
    pub default_category: CategoryId,
}

/// A spending category within a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier.
    pub id: CategoryId,
    /// The group this category belongs to.
    pub group_id: GroupId,
    /// Display name.
    pub name: String,
}

/// Everything produced when a group is created.
#[derive(Debug, Clone)]
pub struct GroupSetup {
    /// The group itself.
    pub group: Group,
    /// One member per distinct name, in the order given.
    pub members: Vec<Party>,
    /// The default category.
    pub default_category: Category,
}

impl Group {
    /// Creates a group with its members and default category.
    ///
    /// Blank names are ignored and repeated names (after trimming) collapse
    /// into one member.
    ///
    /// # Errors
    ///
    /// Returns `NotEnoughParticipants` if fewer than two distinct names remain.
    pub fn create<S: AsRef<str>>(
        name: impl Into<String>,
        currency: Currency,
        member_names: &[S],
    ) -> Result<GroupSetup, SplitError> {
        let mut names: Vec<&str> = Vec::with_capacity(member_names.len());
        for candidate in member_names.iter().map(|n| n.as_ref().trim()) {
            if !candidate.is_empty() && !names.contains(&candidate) {
                names.push(candidate);
            }
        }

        if names.len() < MIN_GROUP_MEMBERS {
            return Err(SplitError::NotEnoughParticipants {
                required: MIN_GROUP_MEMBERS,
                actual: names.len(),
            });
        }

        let id = GroupId::new();
        let default_category = Category {
            id: CategoryId::new(),
            group_id: id,
            name: DEFAULT_CATEGORY_NAME.to_string(),
        };
        let group = Self {
            id,
            name: name.into(),
            currency,
            use_categories: false,
            default_category: default_category.id,
        };
        let members = names.into_iter().map(|n| Party::member(id, n)).collect();

        Ok(GroupSetup {
            group,
            members,
            default_category,
        })
    }

    /// Creates a new category in this group.
    #[must_use]
    pub fn new_category(&self, name: impl Into<String>) -> Category {
        Category {
            id: CategoryId::new(),
            group_id: self.id,
            name: name.into(),
        }
    }
}
