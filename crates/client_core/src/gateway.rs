//! Remote document store access: list, upload and delete.

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use shared::{
    domain::{Document, DocumentId},
    protocol::{
        OpaqueResponse, UploadRequest, UPLOAD_PART_BIRTHDAY, UPLOAD_PART_COMPANY_NAME,
        UPLOAD_PART_CONTACT_NAME, UPLOAD_PART_FILE,
    },
};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
    config::ClientSettings,
    error::{ConfigError, GatewayError, RequestFailure},
};

/// One retry on top of the first attempt.
const LIST_ATTEMPTS: usize = 2;
const UPLOAD_ATTEMPTS: usize = 2;
const DELETE_ATTEMPTS: usize = 1;

#[async_trait]
pub trait DocumentGateway: Send + Sync {
    async fn list_documents(&self) -> Result<Vec<Document>, GatewayError>;
    async fn upload_document(&self, request: &UploadRequest)
        -> Result<OpaqueResponse, GatewayError>;
    async fn delete_document(&self, document_id: &DocumentId)
        -> Result<OpaqueResponse, GatewayError>;
}

pub struct HttpDocumentGateway {
    http: Client,
    base_url: Url,
}

impl HttpDocumentGateway {
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Self::with_timeout(api_url, None)
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ConfigError> {
        Self::with_timeout(&settings.api_url, settings.request_timeout())
    }

    pub fn with_timeout(api_url: &str, timeout: Option<Duration>) -> Result<Self, ConfigError> {
        let trimmed = api_url.trim();
        let base_url = Url::parse(trimmed).map_err(|source| ConfigError::InvalidApiUrl {
            url: trimmed.to_string(),
            source,
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::UnsupportedApiUrl {
                url: trimmed.to_string(),
            });
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ConfigError::HttpClient)?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/{segment}` with `segment` percent-encoded as a single path
    /// segment. A trailing slash on the base is dropped first.
    fn endpoint(&self, segment: &str) -> Url {
        let mut url = self.base_url.clone();
        // Cannot fail: the constructor rejects cannot-be-a-base urls.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(segment);
        }
        url
    }

    async fn fetch_list(&self) -> Result<Vec<Document>, RequestFailure> {
        let response = self
            .http
            .get(self.endpoint("list"))
            .send()
            .await
            .map_err(RequestFailure::Client)?;
        let body = checked_body(response).await?;
        serde_json::from_slice(&body).map_err(RequestFailure::Decode)
    }

    async fn post_upload(&self, request: &UploadRequest) -> Result<OpaqueResponse, RequestFailure> {
        // Forms are consumed by send, so each attempt builds a fresh one.
        let form = upload_form(request)?;
        let response = self
            .http
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(RequestFailure::Client)?;
        let body = checked_body(response).await?;
        Ok(opaque_response(&body))
    }

    async fn send_delete(&self, document_id: &DocumentId) -> Result<OpaqueResponse, RequestFailure> {
        let response = self
            .http
            .delete(self.endpoint(document_id.as_str()))
            .send()
            .await
            .map_err(RequestFailure::Client)?;
        let body = checked_body(response).await?;
        Ok(opaque_response(&body))
    }
}

#[async_trait]
impl DocumentGateway for HttpDocumentGateway {
    async fn list_documents(&self) -> Result<Vec<Document>, GatewayError> {
        let documents = with_attempts("list", LIST_ATTEMPTS, || self.fetch_list()).await?;
        info!(count = documents.len(), "documents: list fetched");
        Ok(documents)
    }

    async fn upload_document(
        &self,
        request: &UploadRequest,
    ) -> Result<OpaqueResponse, GatewayError> {
        let response =
            with_attempts("upload", UPLOAD_ATTEMPTS, || self.post_upload(request)).await?;
        info!(
            filename = %request.file.filename,
            size_bytes = request.file.bytes.len(),
            "documents: file uploaded"
        );
        Ok(response)
    }

    async fn delete_document(
        &self,
        document_id: &DocumentId,
    ) -> Result<OpaqueResponse, GatewayError> {
        let response =
            with_attempts("delete", DELETE_ATTEMPTS, || self.send_delete(document_id)).await?;
        info!(document_id = %document_id, "documents: document deleted");
        Ok(response)
    }
}

async fn with_attempts<T, F, Fut>(
    operation: &'static str,
    attempts: usize,
    mut call: F,
) -> Result<T, GatewayError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RequestFailure>>,
{
    let mut attempt = 1;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(failure) if attempt < attempts => {
                warn!(operation, attempt, error = %failure, "documents: request failed; retrying");
                attempt += 1;
            }
            Err(failure) => {
                error!(operation, attempts = attempt, error = %failure, "documents: request failed");
                return Err(GatewayError);
            }
        }
    }
}

async fn checked_body(response: Response) -> Result<Vec<u8>, RequestFailure> {
    let status = response.status();
    let body = response.bytes().await.map_err(RequestFailure::Client)?;
    if !status.is_success() {
        return Err(RequestFailure::Server {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }
    Ok(body.to_vec())
}

/// Empty bodies become `null`; bodies that are not JSON are kept as text.
fn opaque_response(body: &[u8]) -> OpaqueResponse {
    if body.iter().all(u8::is_ascii_whitespace) {
        return OpaqueResponse(serde_json::Value::Null);
    }
    match serde_json::from_slice(body) {
        Ok(value) => OpaqueResponse(value),
        Err(_) => {
            debug!("documents: non-json success body kept as text");
            OpaqueResponse(serde_json::Value::String(
                String::from_utf8_lossy(body).into_owned(),
            ))
        }
    }
}

fn upload_form(request: &UploadRequest) -> Result<Form, RequestFailure> {
    let file = Part::bytes(request.file.bytes.clone())
        .file_name(request.file.filename.clone())
        .mime_str(request.file.mime_type_or_default())
        .map_err(RequestFailure::Client)?;
    Ok(Form::new()
        .part(UPLOAD_PART_FILE, file)
        .text(
            UPLOAD_PART_COMPANY_NAME,
            request.metadata.company_name.clone(),
        )
        .text(
            UPLOAD_PART_CONTACT_NAME,
            request.metadata.contact_name.clone(),
        )
        .text(UPLOAD_PART_BIRTHDAY, request.metadata.birthday.clone()))
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
