//! Row Match crew backend.
//!
//! This provides a backend for the social layer of Row Match: users, crews
//! and the coin economy that ties them together.

pub mod app;
pub mod cli;
pub mod config;
pub mod routes;
pub mod team;
pub mod user;
