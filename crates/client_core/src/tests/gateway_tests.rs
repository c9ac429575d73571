use super::*;
use crate::error::GENERIC_FAILURE_MESSAGE;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response as AxumResponse},
    routing::get,
    Json, Router,
};
use shared::{domain::Field, protocol::SelectedFile, protocol::UploadMetadata};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
struct ReceivedPart {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

#[derive(Clone, Default)]
struct ServerState {
    /// Requests answered with a 500 before the server starts succeeding.
    failures_before_success: Arc<AtomicUsize>,
    list_hits: Arc<AtomicUsize>,
    upload_hits: Arc<AtomicUsize>,
    delete_hits: Arc<AtomicUsize>,
    uploads: Arc<Mutex<Vec<Vec<ReceivedPart>>>>,
    deleted: Arc<Mutex<Vec<String>>>,
    list_delay_ms: u64,
}

impl ServerState {
    fn failing_first(failures: usize) -> Self {
        let state = Self::default();
        state
            .failures_before_success
            .store(failures, Ordering::SeqCst);
        state
    }

    fn should_fail(&self) -> bool {
        self.failures_before_success
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }
}

fn server_error() -> AxumResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "storage offline").into_response()
}

async fn handle_get(State(state): State<ServerState>, Path(segment): Path<String>) -> AxumResponse {
    if segment != "list" {
        return StatusCode::NOT_FOUND.into_response();
    }
    state.list_hits.fetch_add(1, Ordering::SeqCst);
    if state.list_delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(state.list_delay_ms)).await;
    }
    if state.should_fail() {
        return server_error();
    }
    Json(serde_json::json!([
        {
            "id": "1",
            "fields": [
                { "fieldName": "DWDOCID", "item": "1" },
                { "fieldName": "DWDOCSIZE", "item": "1024000" }
            ]
        },
        { "id": "2", "fields": [{ "fieldName": "DWDOCID", "item": "2" }] }
    ]))
    .into_response()
}

async fn handle_post(
    State(state): State<ServerState>,
    Path(segment): Path<String>,
    mut multipart: Multipart,
) -> AxumResponse {
    if segment != "upload" {
        return StatusCode::NOT_FOUND.into_response();
    }
    state.upload_hits.fetch_add(1, Ordering::SeqCst);
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.expect("field bytes").to_vec();
        parts.push(ReceivedPart {
            name,
            file_name,
            content_type,
            data,
        });
    }
    state.uploads.lock().await.push(parts);
    if state.should_fail() {
        return server_error();
    }
    Json(serde_json::json!({ "success": true })).into_response()
}

async fn handle_delete(
    State(state): State<ServerState>,
    Path(segment): Path<String>,
) -> AxumResponse {
    state.delete_hits.fetch_add(1, Ordering::SeqCst);
    if state.should_fail() {
        return server_error();
    }
    state.deleted.lock().await.push(segment);
    StatusCode::OK.into_response()
}

async fn spawn_document_server(state: ServerState) -> anyhow::Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new()
        .route(
            "/api/:segment",
            get(handle_get).post(handle_post).delete(handle_delete),
        )
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}/api"))
}

fn sample_upload() -> UploadRequest {
    UploadRequest {
        file: SelectedFile::new(
            "contract.pdf",
            Some("application/pdf".to_string()),
            b"%PDF-1.7 test".to_vec(),
        ),
        metadata: UploadMetadata {
            company_name: "Acme".to_string(),
            contact_name: "Jordan Lee".to_string(),
            birthday: "1990-04-01".to_string(),
        },
    }
}

#[test]
fn rejects_unparseable_api_url() {
    let err = HttpDocumentGateway::new("not a url").err().expect("must fail");
    assert!(matches!(err, ConfigError::InvalidApiUrl { .. }));
}

#[test]
fn rejects_api_url_that_cannot_be_a_base() {
    let err = HttpDocumentGateway::new("mailto:docs@example.com")
        .err()
        .expect("must fail");
    assert!(matches!(err, ConfigError::UnsupportedApiUrl { .. }));
}

#[test]
fn endpoints_join_base_path_and_encode_ids() {
    let gateway = HttpDocumentGateway::new("http://docs.example.com/api/").expect("gateway");
    assert_eq!(
        gateway.endpoint("list").as_str(),
        "http://docs.example.com/api/list"
    );
    assert_eq!(
        gateway.endpoint("a/b c").as_str(),
        "http://docs.example.com/api/a%2Fb%20c"
    );

    let bare = HttpDocumentGateway::new("http://docs.example.com").expect("gateway");
    assert_eq!(
        bare.endpoint("upload").as_str(),
        "http://docs.example.com/upload"
    );
}

#[test]
fn opaque_response_tolerates_empty_and_text_bodies() {
    assert_eq!(opaque_response(b""), OpaqueResponse(serde_json::Value::Null));
    assert_eq!(
        opaque_response(b"deleted"),
        OpaqueResponse(serde_json::Value::String("deleted".to_string()))
    );
    assert_eq!(
        opaque_response(br#"{"success":true}"#),
        OpaqueResponse(serde_json::json!({ "success": true }))
    );
}

#[tokio::test]
async fn list_fetches_documents_from_list_endpoint() {
    let state = ServerState::default();
    let base = spawn_document_server(state.clone()).await.expect("server");
    let gateway = HttpDocumentGateway::new(&base).expect("gateway");

    let documents = gateway.list_documents().await.expect("list");

    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].id, DocumentId::from("1"));
    assert_eq!(
        documents[0].fields[1],
        Field::new("DWDOCSIZE", "1024000")
    );
    assert_eq!(state.list_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn list_retries_once_after_a_failure() {
    let state = ServerState::failing_first(1);
    let base = spawn_document_server(state.clone()).await.expect("server");
    let gateway = HttpDocumentGateway::new(&base).expect("gateway");

    let documents = gateway.list_documents().await.expect("list after retry");

    assert_eq!(documents.len(), 2);
    assert_eq!(state.list_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn list_gives_up_after_second_failure_with_generic_error() {
    let state = ServerState::failing_first(5);
    let base = spawn_document_server(state.clone()).await.expect("server");
    let gateway = HttpDocumentGateway::new(&base).expect("gateway");

    let err = gateway.list_documents().await.expect_err("must fail");

    assert_eq!(err, GatewayError);
    assert_eq!(err.to_string(), GENERIC_FAILURE_MESSAGE);
    assert_eq!(state.list_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn upload_sends_multipart_form_with_metadata() {
    let state = ServerState::default();
    let base = spawn_document_server(state.clone()).await.expect("server");
    let gateway = HttpDocumentGateway::new(&base).expect("gateway");

    let response = gateway
        .upload_document(&sample_upload())
        .await
        .expect("upload");

    assert_eq!(
        response,
        OpaqueResponse(serde_json::json!({ "success": true }))
    );
    let uploads = state.uploads.lock().await;
    assert_eq!(uploads.len(), 1);
    let parts = &uploads[0];
    let names: Vec<&str> = parts.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["file", "companyName", "contactName", "birthday"]);

    assert_eq!(parts[0].file_name.as_deref(), Some("contract.pdf"));
    assert_eq!(parts[0].content_type.as_deref(), Some("application/pdf"));
    assert_eq!(parts[0].data, b"%PDF-1.7 test".to_vec());
    assert_eq!(parts[1].data, b"Acme".to_vec());
    assert_eq!(parts[2].data, b"Jordan Lee".to_vec());
    assert_eq!(parts[3].data, b"1990-04-01".to_vec());
}

#[tokio::test]
async fn upload_defaults_missing_mime_type() {
    let state = ServerState::default();
    let base = spawn_document_server(state.clone()).await.expect("server");
    let gateway = HttpDocumentGateway::new(&base).expect("gateway");
    let mut request = sample_upload();
    request.file.mime_type = None;

    gateway.upload_document(&request).await.expect("upload");

    let uploads = state.uploads.lock().await;
    assert_eq!(
        uploads[0][0].content_type.as_deref(),
        Some("application/octet-stream")
    );
}

#[tokio::test]
async fn upload_retries_once_with_a_fresh_form() {
    let state = ServerState::failing_first(1);
    let base = spawn_document_server(state.clone()).await.expect("server");
    let gateway = HttpDocumentGateway::new(&base).expect("gateway");

    gateway
        .upload_document(&sample_upload())
        .await
        .expect("upload after retry");

    assert_eq!(state.upload_hits.load(Ordering::SeqCst), 2);
    let uploads = state.uploads.lock().await;
    assert_eq!(uploads.len(), 2);
    assert_eq!(uploads[0], uploads[1]);
}

#[tokio::test]
async fn delete_targets_document_path() {
    let state = ServerState::default();
    let base = spawn_document_server(state.clone()).await.expect("server");
    let gateway = HttpDocumentGateway::new(&base).expect("gateway");

    let response = gateway
        .delete_document(&DocumentId::from("doc 7"))
        .await
        .expect("delete");

    assert_eq!(response, OpaqueResponse(serde_json::Value::Null));
    assert_eq!(*state.deleted.lock().await, vec!["doc 7".to_string()]);
}

#[tokio::test]
async fn delete_is_not_retried() {
    let state = ServerState::failing_first(1);
    let base = spawn_document_server(state.clone()).await.expect("server");
    let gateway = HttpDocumentGateway::new(&base).expect("gateway");

    let err = gateway
        .delete_document(&DocumentId::from("1"))
        .await
        .expect_err("must fail");

    assert_eq!(err, GatewayError);
    assert_eq!(state.delete_hits.load(Ordering::SeqCst), 1);
    assert!(state.deleted.lock().await.is_empty());
}

#[tokio::test]
async fn unreachable_server_collapses_to_generic_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let gateway = HttpDocumentGateway::new(&format!("http://{addr}/api")).expect("gateway");

    let err = gateway.list_documents().await.expect_err("must fail");

    assert_eq!(err, GatewayError);
}

#[tokio::test]
async fn request_timeout_counts_as_failure() {
    let state = ServerState {
        list_delay_ms: 1_000,
        ..ServerState::default()
    };
    let base = spawn_document_server(state.clone()).await.expect("server");
    let gateway = HttpDocumentGateway::with_timeout(&base, Some(Duration::from_millis(100)))
        .expect("gateway");

    let err = gateway.list_documents().await.expect_err("must time out");

    assert_eq!(err, GatewayError);
    assert_eq!(state.list_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn undecodable_list_body_is_a_failure() {
    async fn garbage() -> &'static str {
        "not json"
    }
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new().route("/list", get(garbage));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    let gateway = HttpDocumentGateway::new(&format!("http://{addr}")).expect("gateway");

    assert_eq!(gateway.list_documents().await, Err(GatewayError));
}
