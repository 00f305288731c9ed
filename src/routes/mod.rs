//! Route handlers.

pub mod team;
pub mod user;
