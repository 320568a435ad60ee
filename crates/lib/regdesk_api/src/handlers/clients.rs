//! Client request handlers.

use axum::Json;
use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::{Multipart, RawQuery, State};
use axum::http::StatusCode;
use regdesk_core::models::client::Client;
use regdesk_core::uploads::Upload;

use crate::AppState;
use crate::error::{AppJson, AppPath, AppResult};
use crate::models::{ApiResponse, ClientForm, ClientList, ListClientsParams, UpdateClientRequest};
use crate::services::clients;

async fn read_text(field: Field<'_>) -> AppResult<String> {
    Ok(field.text().await?)
}

/// Split the multipart form into text fields and the (first) `file` part.
/// Unknown parts are skipped.
async fn read_client_form(mut multipart: Multipart) -> AppResult<(ClientForm, Option<Upload>)> {
    let mut form = ClientForm::default();
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "fullName" => form.full_name = Some(read_text(field).await?),
            "email" => form.email = Some(read_text(field).await?),
            "phone" => form.phone = Some(read_text(field).await?),
            "file" if upload.is_none() => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                // A file input left empty still sends a nameless, empty part.
                if !(file_name.is_empty() && bytes.is_empty()) {
                    upload = Some(Upload {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
            }
            _ => {}
        }
    }
    Ok((form, upload))
}

/// `POST /api/clients`: public registration form (multipart).
pub async fn create_client_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<(StatusCode, Json<ApiResponse<Client>>)> {
    let (form, upload) = read_client_form(multipart?).await?;
    let client = clients::create_client(&state, form, upload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(client).with_message("Client registered successfully")),
    ))
}

/// `GET /api/clients`: paginated, searchable listing.
pub async fn list_clients_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<ApiResponse<ClientList>>> {
    let params = ListClientsParams::from_query(query.as_deref());
    let (page, pagination) = clients::list_clients(&state, &params).await?;
    Ok(Json(
        ApiResponse::data(page.clients).with_pagination(pagination),
    ))
}

/// `GET /api/clients/{id}`
pub async fn get_client_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<String>,
) -> AppResult<Json<ApiResponse<Client>>> {
    let client = clients::get_client(&state, &id).await?;
    Ok(Json(ApiResponse::data(client)))
}

/// `PUT /api/clients/{id}`: edit name, email, or phone.
pub async fn update_client_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<String>,
    AppJson(body): AppJson<UpdateClientRequest>,
) -> AppResult<Json<ApiResponse<Client>>> {
    let client = clients::update_client(&state, &id, body).await?;
    Ok(Json(
        ApiResponse::data(client).with_message("Client updated successfully"),
    ))
}

/// `DELETE /api/clients/{id}`
pub async fn delete_client_handler(
    State(state): State<AppState>,
    AppPath(id): AppPath<String>,
) -> AppResult<Json<ApiResponse<()>>> {
    clients::delete_client(&state, &id).await?;
    Ok(Json(ApiResponse::ok("Client deleted successfully")))
}
