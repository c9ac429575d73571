//! View models for the document page. The two views never reference each
//! other; the upload view reaches the list view only through the notifier.

mod list;
mod upload;

pub use list::{DeleteOutcome, DocumentListView};
pub use upload::{UploadOutcome, UploadView};

use std::sync::Arc;

use anyhow::Result;

use crate::{
    gateway::DocumentGateway,
    notices::{ConfirmPrompt, NoticeSink},
    notifier::UpdateNotifier,
};

/// The page hosting the upload form above the document table.
pub struct LandingPage {
    pub list: Arc<DocumentListView>,
    pub upload: UploadView,
}

impl LandingPage {
    pub fn mount(
        gateway: Arc<dyn DocumentGateway>,
        notifier: UpdateNotifier,
        notices: Arc<dyn NoticeSink>,
        confirm: Arc<dyn ConfirmPrompt>,
    ) -> Result<Self> {
        let list = DocumentListView::mount(
            Arc::clone(&gateway),
            &notifier,
            Arc::clone(&notices),
            confirm,
        )?;
        let upload = UploadView::new(gateway, notifier, notices);
        Ok(Self { list, upload })
    }

    pub fn unmount(&self) {
        self.list.unmount();
    }
}

#[cfg(test)]
#[path = "../tests/views_tests.rs"]
mod tests;
