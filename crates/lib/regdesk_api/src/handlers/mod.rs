//! Request handlers.

pub mod auth;
pub mod clients;
pub mod health;
