//! Client record store abstraction and in-memory implementation.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ClientError, ListQuery};
use crate::models::client::{Client, ClientChanges, ClientPage, NewClient};
use crate::uuid::uuidv7;

/// Persistence for client records.
///
/// Implementations must enforce case-insensitive email uniqueness themselves
/// and report a collision as `ClientError::DuplicateEmail`, including when two
/// writers race past an application-level pre-check.
#[async_trait]
pub trait ClientStore: Send + Sync {
    async fn insert(&self, client: NewClient) -> Result<Client, ClientError>;

    /// One page of records matching `query`, newest first, plus the total
    /// match count.
    async fn list(&self, query: &ListQuery) -> Result<ClientPage, ClientError>;

    async fn get(&self, id: Uuid) -> Result<Option<Client>, ClientError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Client>, ClientError>;

    /// Apply `changes`. Returns `None` if the record does not exist.
    async fn update(&self, id: Uuid, changes: ClientChanges)
    -> Result<Option<Client>, ClientError>;

    /// Remove a record. Returns `false` if it did not exist.
    async fn delete(&self, id: Uuid) -> Result<bool, ClientError>;
}

/// Case-insensitive substring match over name, email, and phone.
pub fn matches_search(client: &Client, needle_lower: &str) -> bool {
    client.full_name.to_lowercase().contains(needle_lower)
        || client.email.to_lowercase().contains(needle_lower)
        || client
            .phone
            .as_deref()
            .is_some_and(|p| p.to_lowercase().contains(needle_lower))
}

/// In-memory client store. All mutations run under one write lock, so the
/// uniqueness check and the write are atomic.
#[derive(Debug, Default)]
pub struct MemoryClientStore {
    clients: RwLock<Vec<Client>>,
}

impl MemoryClientStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientStore for MemoryClientStore {
    async fn insert(&self, new: NewClient) -> Result<Client, ClientError> {
        let mut clients = self.clients.write().await;
        let email = new.email.to_lowercase();
        if clients.iter().any(|c| c.email.to_lowercase() == email) {
            return Err(ClientError::DuplicateEmail);
        }
        let now = Utc::now();
        let client = Client {
            id: uuidv7(),
            full_name: new.full_name,
            email,
            phone: new.phone,
            file_url: new.file_url,
            created_at: now,
            updated_at: now,
        };
        clients.push(client.clone());
        Ok(client)
    }

    async fn list(&self, query: &ListQuery) -> Result<ClientPage, ClientError> {
        let clients = self.clients.read().await;
        let needle = query.search.as_deref().map(str::to_lowercase);
        let mut matching: Vec<&Client> = clients
            .iter()
            .filter(|c| needle.as_deref().is_none_or(|n| matches_search(c, n)))
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matching.len() as u64;
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let page = matching
            .into_iter()
            .skip(offset)
            .take(query.limit as usize)
            .cloned()
            .collect();
        Ok(ClientPage {
            clients: page,
            total,
        })
    }

    async fn get(&self, id: Uuid) -> Result<Option<Client>, ClientError> {
        let clients = self.clients.read().await;
        Ok(clients.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Client>, ClientError> {
        let email = email.to_lowercase();
        let clients = self.clients.read().await;
        Ok(clients
            .iter()
            .find(|c| c.email.to_lowercase() == email)
            .cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        mut changes: ClientChanges,
    ) -> Result<Option<Client>, ClientError> {
        let mut clients = self.clients.write().await;
        let Some(index) = clients.iter().position(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(email) = changes.email.as_mut() {
            *email = email.to_lowercase();
            if clients.iter().any(|c| c.id != id && c.email.to_lowercase() == *email) {
                return Err(ClientError::DuplicateEmail);
            }
        }
        let client = &mut clients[index];
        changes.apply(client, Utc::now());
        Ok(Some(client.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ClientError> {
        let mut clients = self.clients.write().await;
        let before = clients.len();
        clients.retain(|c| c.id != id);
        Ok(clients.len() != before)
    }
}
