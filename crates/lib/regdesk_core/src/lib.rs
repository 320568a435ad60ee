//! # regdesk_core
//!
//! Core domain logic for Regdesk: accounts and session tokens, client
//! records, and file intake.

pub mod auth;
pub mod clients;
pub mod migrate;
pub mod models;
pub mod uploads;
pub mod uuid;
pub mod validation;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
