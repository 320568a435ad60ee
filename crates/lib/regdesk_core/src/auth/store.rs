//! Account store abstraction.
//!
//! `PgAccountStore` (in [`super::queries`]) backs production; the in-memory
//! store backs tests and local runs without a database. Both enforce email
//! uniqueness at the storage layer.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::AuthError;
use crate::models::account::{Account, AccountWithPassword, NewAccount};
use crate::uuid::uuidv7;

/// Persistence for operator/admin accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert an account. Fails with `DuplicateAccount` if the email is taken.
    async fn create(&self, account: NewAccount) -> Result<Account, AuthError>;

    /// Fetch an account together with its password hash.
    async fn find_by_email(&self, email: &str) -> Result<Option<AccountWithPassword>, AuthError>;

    /// Fetch an account by ID (without the hash).
    async fn get(&self, id: Uuid) -> Result<Option<Account>, AuthError>;

    /// Check whether an email is already registered.
    async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        Ok(self.find_by_email(email).await?.is_some())
    }
}

/// In-memory account store.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<Vec<AccountWithPassword>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create(&self, new: NewAccount) -> Result<Account, AuthError> {
        let mut accounts = self.accounts.write().await;
        let email = new.email.to_lowercase();
        if accounts.iter().any(|a| a.account.email == email) {
            return Err(AuthError::DuplicateAccount);
        }
        let now = Utc::now();
        let account = Account {
            id: uuidv7(),
            email,
            name: new.name,
            role: new.role,
            created_at: now,
            updated_at: now,
        };
        accounts.push(AccountWithPassword {
            account: account.clone(),
            password_hash: new.password_hash,
        });
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AccountWithPassword>, AuthError> {
        let email = email.to_lowercase();
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.account.email == email).cloned())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Account>, AuthError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .iter()
            .find(|a| a.account.id == id)
            .map(|a| a.account.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::Role;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            email: email.into(),
            name: "Ops".into(),
            role: Role::Operator,
            password_hash: "$2b$10$hash".into(),
        }
    }

    #[tokio::test]
    async fn create_then_lookup() {
        let store = MemoryAccountStore::new();
        let created = store.create(new_account("ops@example.com")).await.unwrap();

        let found = store.find_by_email("OPS@example.com").await.unwrap().unwrap();
        assert_eq!(found.account, created);
        assert_eq!(found.password_hash, "$2b$10$hash");

        assert_eq!(store.get(created.id).await.unwrap(), Some(created));
        assert!(store.email_exists("ops@example.com").await.unwrap());
        assert!(!store.email_exists("nobody@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_case_insensitively() {
        let store = MemoryAccountStore::new();
        store.create(new_account("ops@example.com")).await.unwrap();
        let err = store.create(new_account("OPS@Example.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateAccount));
    }

    #[tokio::test]
    async fn unknown_id_is_none() {
        let store = MemoryAccountStore::new();
        assert!(store.get(Uuid::now_v7()).await.unwrap().is_none());
    }
}
