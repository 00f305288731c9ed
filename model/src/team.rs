//! Crew data representations.

use serde::{Deserialize, Serialize};

/// One-time coin cost charged to a user founding a new crew.
pub const FORMATION_PRICE: i64 = 1000;

/// The most members a crew can hold.
pub const MAX_CAPACITY: i64 = 20;

/// The most crews returned by the browse sample.
pub const SAMPLE_SIZE: usize = 20;

/// A single crew.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Team {
    /// The unique identifier of the crew.
    pub id: i64,
    /// The current member count.
    ///
    /// Always equal to the length of [`Team::members`].
    pub capacity: i64,
    /// The user ids of every member.
    pub members: Vec<i64>,
    /// The crew's status, derived from its member count.
    pub status: TeamStatus,
}

/// The crew's status.
///
/// Purely a function of member count; an empty crew is deleted rather than
/// given a status.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TeamStatus {
    /// The crew has room for more members.
    Forming,
    /// The crew is at [`MAX_CAPACITY`] and cannot be joined.
    Full,
}

impl TeamStatus {
    /// Derives a status from a member count.
    pub fn from_capacity(capacity: i64) -> TeamStatus {
        if capacity >= MAX_CAPACITY {
            TeamStatus::Full
        } else {
            TeamStatus::Forming
        }
    }

    /// Whether the crew can accept another member.
    pub fn is_full(&self) -> bool {
        matches!(self, TeamStatus::Full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn test_status_from_capacity() {
        assert_eq!(TeamStatus::from_capacity(1), TeamStatus::Forming);
        assert_eq!(TeamStatus::from_capacity(19), TeamStatus::Forming);
        assert_eq!(TeamStatus::from_capacity(20), TeamStatus::Full);

        assert!(!TeamStatus::from_capacity(19).is_full());
        assert!(TeamStatus::from_capacity(20).is_full());
    }
}
