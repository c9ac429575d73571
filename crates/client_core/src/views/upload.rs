use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use shared::protocol::{SelectedFile, UploadMetadata, UploadRequest};
use tracing::{error, info};

use crate::{
    gateway::DocumentGateway,
    notices::{Notice, NoticeSink},
    notifier::UpdateNotifier,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    NoFileSelected,
    Uploaded,
    Failed,
}

/// The upload form. Publishes on the notifier after a successful upload and
/// never listens to it.
///
/// The form is not cleared after an upload, and there is no in-flight flag:
/// submitting again while a request is pending sends a second upload.
pub struct UploadView {
    gateway: Arc<dyn DocumentGateway>,
    notifier: UpdateNotifier,
    notices: Arc<dyn NoticeSink>,
    pub company_name: String,
    pub contact_name: String,
    pub birthday: String,
    selected_file: Option<SelectedFile>,
}

impl UploadView {
    pub fn new(
        gateway: Arc<dyn DocumentGateway>,
        notifier: UpdateNotifier,
        notices: Arc<dyn NoticeSink>,
    ) -> Self {
        Self {
            gateway,
            notifier,
            notices,
            company_name: String::new(),
            contact_name: String::new(),
            birthday: String::new(),
            selected_file: None,
        }
    }

    pub fn select_file(&mut self, file: Option<SelectedFile>) {
        self.selected_file = file;
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected_file.as_ref()
    }

    /// Reads `path` into the form, guessing the MIME type from its extension.
    pub async fn select_file_from_path(&mut self, path: &Path) -> Result<()> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .with_context(|| format!("'{}' does not name a file", path.display()))?;
        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string());

        info!(%filename, size_bytes = bytes.len(), "documents: file selected");
        self.selected_file = Some(SelectedFile::new(filename, mime_type, bytes));
        Ok(())
    }

    pub async fn upload_file(&self) -> UploadOutcome {
        let Some(file) = self.selected_file.clone() else {
            info!("documents: upload requested without a file");
            self.notices.notify(Notice::NoFileSelected);
            return UploadOutcome::NoFileSelected;
        };

        let request = UploadRequest {
            file,
            metadata: UploadMetadata {
                company_name: self.company_name.clone(),
                contact_name: self.contact_name.clone(),
                birthday: self.birthday.clone(),
            },
        };

        match self.gateway.upload_document(&request).await {
            Ok(_) => {
                self.notices.notify(Notice::UploadSucceeded);
                let listeners = self.notifier.emit();
                info!(
                    filename = %request.file.filename,
                    listeners,
                    "documents: upload finished; update published"
                );
                UploadOutcome::Uploaded
            }
            Err(error) => {
                error!(filename = %request.file.filename, %error, "documents: upload failed");
                self.notices.notify(Notice::UploadFailed);
                UploadOutcome::Failed
            }
        }
    }
}
