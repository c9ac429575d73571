use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use parking_lot::Mutex;
use shared::domain::{Document, DocumentId};
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{error, info, warn};

use crate::{
    error::GatewayError,
    gateway::DocumentGateway,
    notices::{ConfirmPrompt, Notice, NoticeSink},
    notifier::{Subscription, UpdateNotifier},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Declined,
    Deleted,
    Failed,
}

#[derive(Debug, Default)]
struct ListState {
    documents: Vec<Document>,
    loading: bool,
}

/// The document table. Refreshes whenever the notifier fires while mounted.
pub struct DocumentListView {
    gateway: Arc<dyn DocumentGateway>,
    notices: Arc<dyn NoticeSink>,
    confirm: Arc<dyn ConfirmPrompt>,
    runtime: Handle,
    state: Mutex<ListState>,
    subscription: Mutex<Option<Subscription>>,
    refreshes: Mutex<Vec<JoinHandle<()>>>,
}

impl DocumentListView {
    /// Subscribes to `notifier` and issues the first load. Must be called
    /// from within a tokio runtime; refreshes are spawned onto it.
    pub fn mount(
        gateway: Arc<dyn DocumentGateway>,
        notifier: &UpdateNotifier,
        notices: Arc<dyn NoticeSink>,
        confirm: Arc<dyn ConfirmPrompt>,
    ) -> Result<Arc<Self>> {
        let runtime =
            Handle::try_current().context("document list view must be mounted on a tokio runtime")?;
        let view = Arc::new(Self {
            gateway,
            notices,
            confirm,
            runtime,
            state: Mutex::new(ListState::default()),
            subscription: Mutex::new(None),
            refreshes: Mutex::new(Vec::new()),
        });

        let weak = Arc::downgrade(&view);
        let subscription = notifier.subscribe(move || {
            let view = weak
                .upgrade()
                .ok_or_else(|| anyhow!("document list view is gone"))?;
            view.spawn_refresh();
            Ok(())
        });
        *view.subscription.lock() = Some(subscription);

        view.spawn_refresh();
        info!("documents: list view mounted");
        Ok(view)
    }

    pub fn unmount(&self) {
        if let Some(subscription) = self.subscription.lock().take() {
            subscription.unsubscribe();
            info!("documents: list view unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.lock().is_some()
    }

    pub fn documents(&self) -> Vec<Document> {
        self.state.lock().documents.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn find(&self, document_id: &DocumentId) -> Option<Document> {
        self.state
            .lock()
            .documents
            .iter()
            .find(|doc| &doc.id == document_id)
            .cloned()
    }

    /// Fetches the list and replaces the collection. On failure the current
    /// collection is kept.
    pub async fn load_documents(&self) -> Result<(), GatewayError> {
        self.state.lock().loading = true;
        let outcome = self.gateway.list_documents().await;

        let mut state = self.state.lock();
        state.loading = false;
        match outcome {
            Ok(documents) => {
                info!(count = documents.len(), "documents: list view refreshed");
                state.documents = documents;
                Ok(())
            }
            Err(error) => {
                error!(
                    %error,
                    kept = state.documents.len(),
                    "documents: failed to fetch documents; keeping current list"
                );
                Err(error)
            }
        }
    }

    /// Asks for confirmation, deletes, then reloads this view directly.
    pub async fn delete_document(&self, document: &Document) -> DeleteOutcome {
        let label = document.display_id().unwrap_or(document.id.as_str());
        let prompt = format!("Are you sure you want to delete document {label}?");
        if !self.confirm.confirm(&prompt) {
            info!(document_id = %document.id, "documents: delete declined");
            return DeleteOutcome::Declined;
        }

        self.state.lock().loading = true;
        match self.gateway.delete_document(&document.id).await {
            Ok(_) => {
                self.notices.notify(Notice::DeleteSucceeded);
                let _ = self.load_documents().await;
                DeleteOutcome::Deleted
            }
            Err(error) => {
                error!(document_id = %document.id, %error, "documents: delete failed");
                self.notices.notify(Notice::DeleteFailed);
                self.state.lock().loading = false;
                DeleteOutcome::Failed
            }
        }
    }

    /// Waits for every refresh issued so far, including ones issued while
    /// waiting.
    pub async fn settle(&self) {
        loop {
            let pending = std::mem::take(&mut *self.refreshes.lock());
            if pending.is_empty() {
                return;
            }
            for handle in pending {
                if let Err(error) = handle.await {
                    warn!(%error, "documents: refresh task ended abnormally");
                }
            }
        }
    }

    /// Marks the view loading and spawns a load. Overlapping loads are not
    /// merged; the last response to arrive wins.
    fn spawn_refresh(self: &Arc<Self>) {
        self.state.lock().loading = true;
        let view = Arc::clone(self);
        let handle = self.runtime.spawn(async move {
            let _ = view.load_documents().await;
        });

        let mut refreshes = self.refreshes.lock();
        refreshes.retain(|pending| !pending.is_finished());
        refreshes.push(handle);
    }
}

impl Drop for DocumentListView {
    fn drop(&mut self) {
        self.unmount();
    }
}
