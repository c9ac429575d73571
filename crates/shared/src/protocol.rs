use std::fmt;

use serde::{Deserialize, Serialize};

/// Multipart part names expected by the upload endpoint.
pub const UPLOAD_PART_FILE: &str = "file";
pub const UPLOAD_PART_COMPANY_NAME: &str = "companyName";
pub const UPLOAD_PART_CONTACT_NAME: &str = "contactName";
pub const UPLOAD_PART_BIRTHDAY: &str = "birthday";

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Response body the client never inspects beyond success.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpaqueResponse(pub serde_json::Value);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMetadata {
    pub company_name: String,
    pub contact_name: String,
    /// Free-form date text; the server owns any validation.
    pub birthday: String,
}

#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(filename: impl Into<String>, mime_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime_type,
            bytes,
        }
    }

    pub fn mime_type_or_default(&self) -> &str {
        self.mime_type.as_deref().unwrap_or(DEFAULT_MIME_TYPE)
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// One upload submission: the file plus the three metadata parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub file: SelectedFile,
    pub metadata: UploadMetadata,
}
