//! Authentication service: register, login, and session checks on top of
//! `regdesk_core::auth`.

use regdesk_core::auth::password::{hash_password, verify_against_dummy, verify_password};
use regdesk_core::models::account::{Account, NewAccount, Role};
use regdesk_core::validation;
use tracing::{info, warn};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{AuthPayload, AuthUser, LoginRequest, RegisterRequest};

fn required<'a>(value: &'a Option<String>, message: &str) -> AppResult<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Validation(message.into()))
}

fn auth_payload(state: &AppState, account: &Account) -> AppResult<AuthPayload> {
    let token = state.tokens.issue(account)?;
    Ok(AuthPayload {
        user: AuthUser::from(account),
        token,
    })
}

/// Create an account and issue a token for it.
pub async fn register(state: &AppState, req: RegisterRequest) -> AppResult<AuthPayload> {
    let account = create_account(state, req).await?;
    auth_payload(state, &account)
}

/// Validate and persist a new account.
///
/// The role defaults to `operator`. The password is stored only as a bcrypt
/// hash.
async fn create_account(state: &AppState, req: RegisterRequest) -> AppResult<Account> {
    let email = validation::email(required(&req.email, "Email is required")?)?;
    let password = required(&req.password, "Password is required")?;
    validation::password(password)?;
    let name = validation::account_name(required(&req.name, "Name is required")?)?;
    let role = req.role.unwrap_or_default();

    if state.accounts.email_exists(&email).await? {
        return Err(AppError::DuplicateAccount);
    }

    let password_hash = hash_password(password)?;
    let account = state
        .accounts
        .create(NewAccount {
            email,
            name,
            role,
            password_hash,
        })
        .await?;

    info!(account_id = %account.id, role = %account.role, "account registered");
    Ok(account)
}

/// Authenticate with email + password.
///
/// Unknown email and wrong password produce the same error.
pub async fn login(state: &AppState, req: LoginRequest) -> AppResult<AuthPayload> {
    let (Some(email), Some(password)) = (
        req.email.as_deref().map(str::trim).filter(|e| !e.is_empty()),
        req.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation("Email and password are required".into()));
    };

    let email = validation::normalize_email(email);
    let Some(found) = state.accounts.find_by_email(&email).await? else {
        verify_against_dummy(password);
        warn!("login failed: unknown account");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(password, &found.password_hash)? {
        warn!(account_id = %found.account.id, "login failed: wrong password");
        return Err(AppError::InvalidCredentials);
    }

    info!(account_id = %found.account.id, "login succeeded");
    auth_payload(state, &found.account)
}

/// Resolve a token to its account.
///
/// An invalid or expired token, or a token for an account that no longer
/// exists, fails with `InvalidCredentials`.
pub async fn verify_session(state: &AppState, token: &str) -> AppResult<Account> {
    let claims = state
        .tokens
        .verify(token)
        .map_err(|_| AppError::InvalidCredentials)?;
    let id = claims.account_id().ok_or(AppError::InvalidCredentials)?;
    state
        .accounts
        .get(id)
        .await?
        .ok_or(AppError::InvalidCredentials)
}

/// Create an admin account unless the email is already taken.
///
/// Returns `None` when an account with that email exists.
pub async fn seed_admin(
    state: &AppState,
    email: &str,
    password: &str,
    name: &str,
) -> AppResult<Option<Account>> {
    let req = RegisterRequest {
        email: Some(email.into()),
        password: Some(password.into()),
        name: Some(name.into()),
        role: Some(Role::Admin),
    };
    match create_account(state, req).await {
        Ok(account) => Ok(Some(account)),
        Err(AppError::DuplicateAccount) => Ok(None),
        Err(e) => Err(e),
    }
}
