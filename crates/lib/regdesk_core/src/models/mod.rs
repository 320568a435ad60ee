//! Domain models.
//!
//! These are internal domain models, distinct from the HTTP request and
//! response shapes in `regdesk_api::models`.

pub mod account;
pub mod client;
