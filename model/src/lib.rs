//! API model representations.

pub mod error;
pub mod request;
pub mod team;
pub mod user;

pub use error::ApiError;
pub use team::{Team, TeamStatus};
pub use user::User;
