//! User request bodies.

use garde::Validate;

use serde::{Deserialize, Serialize};

/// Request body for creating a new user.
#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct CreateUserRequest {
    /// The display name of the new user.
    #[garde(length(chars, min = 1, max = 32))]
    pub name: String,
}
