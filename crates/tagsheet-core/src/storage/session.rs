use std::sync::Arc;

use tagsheet_engine::engine::Sheet;

use super::{StorageBackend, WriteQueue};
use crate::document::{Action, reduce};
use crate::error::Result;

/// A locally edited sheet mirrored to a backend.
///
/// Actions are applied to the local copy first and then sent to the backend
/// in issue order. A rejected remote write is logged; the local copy is kept.
pub struct SheetSession<B: StorageBackend> {
    sheet: Sheet,
    backend: Arc<B>,
    queue: WriteQueue,
}

impl<B: StorageBackend> SheetSession<B> {
    /// Must be called from within a tokio runtime.
    pub fn new(sheet: Sheet, backend: Arc<B>) -> SheetSession<B> {
        SheetSession {
            sheet,
            backend,
            queue: WriteQueue::new(),
        }
    }

    /// Load a sheet from the backend and start a session on it.
    pub async fn open(backend: Arc<B>, id: &str) -> Result<SheetSession<B>> {
        let sheet = backend.get_sheet(id).await?;
        Ok(SheetSession::new(sheet, backend))
    }

    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    /// Apply an action locally and queue it for the backend.
    ///
    /// A local failure is returned and nothing is sent.
    pub fn apply(&mut self, action: Action) -> Result<&Sheet> {
        self.sheet = reduce(&self.sheet, &action)?;

        let backend = Arc::clone(&self.backend);
        let id = self.sheet.id.clone();
        let write = self.queue.enqueue(async move {
            if let Err(e) = backend.update_sheet(&id, &action).await {
                tracing::warn!(sheet = %id, action = action.name(), error = %e, "remote update failed");
            }
            Ok(())
        });
        drop(write);

        Ok(&self.sheet)
    }

    pub fn pending_writes(&self) -> usize {
        self.queue.pending()
    }

    /// Wait for every queued write to settle.
    pub async fn flush(&self) -> Result<()> {
        self.queue.flush().await
    }
}
