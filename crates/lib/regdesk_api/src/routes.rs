//! Route paths served by [`crate::router`].

pub const GET_HEALTH: &str = "/health";

pub const POST_AUTH_REGISTER: &str = "/api/auth/register";
pub const POST_AUTH_LOGIN: &str = "/api/auth/login";
pub const GET_AUTH_VERIFY: &str = "/api/auth/verify";

/// `POST` is public (registration form), `GET` lists for operators.
pub const CLIENTS: &str = "/api/clients";
pub const CLIENTS_ID: &str = "/api/clients/{id}";
