//! Shared harness: router over in-memory stores and request helpers.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use object_store::ObjectStore;
use object_store::path::Path as ObjectPath;
use object_store::memory::InMemory;
use regdesk_api::config::ApiConfig;
use regdesk_api::{AppState, router};
use regdesk_core::auth::jwt::TokenSigner;
use regdesk_core::auth::store::MemoryAccountStore;
use regdesk_core::clients::store::MemoryClientStore;
use regdesk_core::models::client::NewClient;
use regdesk_core::uploads::{FileIntake, UPLOAD_PREFIX};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const BOUNDARY: &str = "regdesk-test-boundary";
pub const FILE_BASE: &str = "https://files.test";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub objects: Arc<InMemory>,
}

pub fn config() -> ApiConfig {
    ApiConfig::from_lookup(|key| match key {
        "JWT_SECRET" => Some("test-secret".into()),
        "AWS_S3_BUCKET_NAME" => Some("regdesk-test".into()),
        "PUBLIC_FILE_BASE_URL" => Some(FILE_BASE.into()),
        _ => None,
    })
    .expect("test config")
}

/// App whose uploads go to `store`.
pub fn app_with_store(store: Arc<dyn ObjectStore>) -> (Router, AppState) {
    let config = config();
    let state = AppState {
        accounts: Arc::new(MemoryAccountStore::new()),
        clients: Arc::new(MemoryClientStore::new()),
        uploads: FileIntake::new(store, config.public_file_base()),
        tokens: TokenSigner::new(config.jwt_secret.as_bytes(), config.jwt_expires_in)
            .expect("token signer"),
        config,
    };
    (router(state.clone()), state)
}

pub fn app() -> TestApp {
    let objects = Arc::new(InMemory::new());
    let (router, state) = app_with_store(objects.clone());
    TestApp {
        router,
        state,
        objects,
    }
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        send(&self.router, req).await
    }

    /// Register an operator and return its token.
    pub async fn operator_token(&self) -> String {
        let (status, body) = self
            .send(json_request(
                "POST",
                "/api/auth/register",
                json!({"email": "op@regdesk.test", "password": "secret1", "name": "Operator"}),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["token"]
            .as_str()
            .expect("token in register response")
            .to_string()
    }

    /// Insert a client directly into the store.
    pub async fn seed_client(&self, full_name: &str, email: &str) -> String {
        let client = self
            .state
            .clients
            .insert(NewClient {
                full_name: full_name.into(),
                email: email.into(),
                phone: None,
                file_url: format!("{FILE_BASE}/uploads/seed.pdf"),
            })
            .await
            .expect("seed client");
        client.id.to_string()
    }

    /// Number of objects stored under the upload prefix.
    pub async fn object_count(&self) -> usize {
        let prefix = ObjectPath::from(UPLOAD_PREFIX);
        self.objects
            .list_with_delimiter(Some(&prefix))
            .await
            .expect("list objects")
            .objects
            .len()
    }
}

pub async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = router.clone().oneshot(req).await.expect("request");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, body)
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn authed(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request")
}

/// A file part of a multipart form.
pub struct FilePart<'a> {
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: Vec<u8>,
}

pub fn pdf(len: usize) -> FilePart<'static> {
    FilePart {
        file_name: "id.pdf",
        content_type: "application/pdf",
        bytes: vec![b'%'; len],
    }
}

/// Build a `multipart/form-data` registration request.
pub fn registration(fields: &[(&str, &str)], file: Option<FilePart<'_>>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.file_name, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(&file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/clients")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request")
}
