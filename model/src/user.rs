//! User representations.

use serde::{Deserialize, Serialize};

/// The level all new users start at.
pub const STARTER_LEVEL: i64 = 1;

/// Coins awarded for each level gained.
pub const LEVEL_UP_REWARD: i64 = 25;

/// A single user.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub struct User {
    /// The unique identifier of the user.
    pub id: i64,
    /// The display name of the user.
    pub name: String,
    /// How many coins they have.
    pub coins: i64,
    /// Their current level.
    pub level: i64,
    /// The crew they belong to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<i64>,
}
