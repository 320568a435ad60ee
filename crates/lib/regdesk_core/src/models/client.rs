//! Client registration records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered client. `file_url` is set at creation and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated insert payload.
#[derive(Debug, Clone)]
pub struct NewClient {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub file_url: String,
}

/// Validated partial update. `None` leaves a field untouched;
/// `phone: Some(None)` clears the phone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientChanges {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
}

impl ClientChanges {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.email.is_none() && self.phone.is_none()
    }

    /// Applies the changes to an in-memory record.
    pub fn apply(self, client: &mut Client, now: DateTime<Utc>) {
        if let Some(full_name) = self.full_name {
            client.full_name = full_name;
        }
        if let Some(email) = self.email {
            client.email = email;
        }
        if let Some(phone) = self.phone {
            client.phone = phone;
        }
        client.updated_at = now;
    }
}

/// One page of a client listing.
#[derive(Debug, Clone)]
pub struct ClientPage {
    pub clients: Vec<Client>,
    /// Number of records matching the filter, regardless of page.
    pub total: u64,
}
