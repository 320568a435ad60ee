//! Account queries against PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use super::AuthError;
use super::store::AccountStore;
use crate::models::account::{Account, AccountWithPassword, NewAccount, Role};
use crate::uuid::uuidv7;

/// Raw `accounts` row; `role` is stored as text.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    name: String,
    role: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for AccountWithPassword {
    type Error = AuthError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse().map_err(|e: String| {
            error!(account_id = %row.id, "corrupt account row: {e}");
            AuthError::Internal(e)
        })?;
        Ok(AccountWithPassword {
            account: Account {
                id: row.id,
                email: row.email,
                name: row.name,
                role,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            password_hash: row.password_hash,
        })
    }
}

/// Account store backed by the `accounts` table.
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a unique-index violation on `accounts.email` to `DuplicateAccount`.
fn map_insert_error(e: sqlx::Error) -> AuthError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::DuplicateAccount,
        _ => AuthError::DbError(e),
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create(&self, new: NewAccount) -> Result<Account, AuthError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (id, email, name, role, password_hash)
            VALUES ($1, lower($2), $3, $4, $5)
            RETURNING id, email, name, role, password_hash, created_at, updated_at
            "#,
        )
        .bind(uuidv7())
        .bind(&new.email)
        .bind(&new.name)
        .bind(new.role.as_str())
        .bind(&new.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;
        Ok(AccountWithPassword::try_from(row)?.account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountWithPassword>, AuthError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, name, role, password_hash, created_at, updated_at
            FROM accounts
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(AccountWithPassword::try_from).transpose()
    }

    async fn get(&self, id: Uuid) -> Result<Option<Account>, AuthError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, name, role, password_hash, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row
            .map(AccountWithPassword::try_from)
            .transpose()?
            .map(|a| a.account))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE lower(email) = lower($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
