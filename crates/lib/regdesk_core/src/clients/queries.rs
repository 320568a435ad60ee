//! Client queries against PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::store::ClientStore;
use super::{ClientError, ListQuery};
use crate::models::client::{Client, ClientChanges, ClientPage, NewClient};
use crate::uuid::uuidv7;

const CLIENT_COLUMNS: &str = "id, full_name, email, phone, file_url, created_at, updated_at";

/// Client store backed by the `clients` table.
///
/// Email uniqueness is enforced by the `clients_email_lower_key` unique
/// index; violations surface as `ClientError::DuplicateEmail`.
#[derive(Debug, Clone)]
pub struct PgClientStore {
    pool: PgPool,
}

impl PgClientStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_write_error(e: sqlx::Error) -> ClientError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => ClientError::DuplicateEmail,
        _ => ClientError::DbError(e),
    }
}

/// Escape `LIKE` metacharacters so search text matches literally.
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl ClientStore for PgClientStore {
    async fn insert(&self, new: NewClient) -> Result<Client, ClientError> {
        sqlx::query_as::<_, Client>(&format!(
            r#"
            INSERT INTO clients (id, full_name, email, phone, file_url)
            VALUES ($1, $2, lower($3), $4, $5)
            RETURNING {CLIENT_COLUMNS}
            "#
        ))
        .bind(uuidv7())
        .bind(&new.full_name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.file_url)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn list(&self, query: &ListQuery) -> Result<ClientPage, ClientError> {
        let pattern = query.search.as_deref().map(like_pattern);
        let filter = r#"
            $1::text IS NULL
            OR full_name ILIKE $1
            OR email ILIKE $1
            OR phone ILIKE $1
        "#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM clients WHERE {filter}"
        ))
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let clients = sqlx::query_as::<_, Client>(&format!(
            r#"
            SELECT {CLIENT_COLUMNS}
            FROM clients
            WHERE {filter}
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(&pattern)
        .bind(i64::from(query.limit))
        .bind(i64::try_from(query.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok(ClientPage {
            clients,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn get(&self, id: Uuid) -> Result<Option<Client>, ClientError> {
        let row = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Client>, ClientError> {
        let row = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: ClientChanges,
    ) -> Result<Option<Client>, ClientError> {
        let (set_phone, phone) = match changes.phone {
            Some(phone) => (true, phone),
            None => (false, None),
        };
        sqlx::query_as::<_, Client>(&format!(
            r#"
            UPDATE clients
            SET full_name = COALESCE($2, full_name),
                email = COALESCE(lower($3), email),
                phone = CASE WHEN $4 THEN $5 ELSE phone END,
                updated_at = now()
            WHERE id = $1
            RETURNING {CLIENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&changes.full_name)
        .bind(&changes.email)
        .bind(set_phone)
        .bind(&phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ClientError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("smith"), "%smith%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }
}
