//! Client registration and admin management flows.

use regdesk_core::clients::ListQuery;
use regdesk_core::models::client::{Client, ClientChanges, ClientPage, NewClient};
use regdesk_core::uploads::{self, Upload};
use regdesk_core::uuid::parse_id;
use regdesk_core::validation;
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{ClientForm, ListClientsParams, Pagination, UpdateClientRequest};

/// Register a client from the public form.
///
/// Fields and the file are validated before any I/O, and the email is checked
/// for duplicates before the file is uploaded, so a rejected form never
/// writes to object storage. If the upload fails no record is created.
pub async fn create_client(
    state: &AppState,
    form: ClientForm,
    upload: Option<Upload>,
) -> AppResult<Client> {
    let full_name = validation::full_name(form.full_name.as_deref().unwrap_or_default())?;
    let email = validation::email(form.email.as_deref().unwrap_or_default())?;
    let phone = validation::phone(form.phone.as_deref())?;
    uploads::validate(upload.as_ref())?;

    if state.clients.find_by_email(&email).await?.is_some() {
        return Err(AppError::DuplicateEmail);
    }

    let stored = state.uploads.store(upload).await?;

    // The unique index still decides if another request raced us here.
    let client = state
        .clients
        .insert(NewClient {
            full_name,
            email,
            phone,
            file_url: stored.url,
        })
        .await?;

    info!(client_id = %client.id, key = %stored.key, "client registered");
    Ok(client)
}

/// List clients with pagination and optional search.
pub async fn list_clients(
    state: &AppState,
    params: &ListClientsParams,
) -> AppResult<(ClientPage, Pagination)> {
    let query = ListQuery::from_raw(
        params.page.as_deref(),
        params.limit.as_deref(),
        params.search.as_deref(),
        state.config.max_page_limit,
    );
    let page = state.clients.list(&query).await?;
    let pagination = Pagination {
        page: query.page,
        limit: query.limit,
        total: page.total,
        pages: query.pages(page.total),
    };
    Ok((page, pagination))
}

/// Fetch one client. Malformed IDs are reported as not found.
pub async fn get_client(state: &AppState, id: &str) -> AppResult<Client> {
    let id = parse_id(id).ok_or_else(AppError::client_not_found)?;
    state
        .clients
        .get(id)
        .await?
        .ok_or_else(AppError::client_not_found)
}

/// Update name, email, or phone. The stored file cannot be changed here.
pub async fn update_client(
    state: &AppState,
    id: &str,
    req: UpdateClientRequest,
) -> AppResult<Client> {
    let id = parse_id(id).ok_or_else(AppError::client_not_found)?;
    let current = state
        .clients
        .get(id)
        .await?
        .ok_or_else(AppError::client_not_found)?;

    let changes = ClientChanges {
        full_name: req
            .full_name
            .as_deref()
            .map(validation::full_name)
            .transpose()?,
        email: req.email.as_deref().map(validation::email).transpose()?,
        phone: req
            .phone
            .as_deref()
            .map(|p| validation::phone(Some(p)))
            .transpose()?,
    };

    if let Some(email) = &changes.email
        && *email != current.email.to_lowercase()
        && let Some(other) = state.clients.find_by_email(email).await?
        && other.id != id
    {
        return Err(AppError::DuplicateEmail);
    }

    let updated = state
        .clients
        .update(id, changes)
        .await?
        .ok_or_else(AppError::client_not_found)?;

    info!(client_id = %updated.id, "client updated");
    Ok(updated)
}

/// Delete a client record. Its stored file is left in object storage.
pub async fn delete_client(state: &AppState, id: &str) -> AppResult<()> {
    let id = parse_id(id).ok_or_else(AppError::client_not_found)?;
    if !state.clients.delete(id).await? {
        return Err(AppError::client_not_found());
    }
    info!(client_id = %id, "client deleted");
    Ok(())
}
