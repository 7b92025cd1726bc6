//! Persistence plumbing.
//!
//! - [`StorageBackend`] - Async interface every sheet store implements
//! - [`MemoryStore`] - In-process store backed by a `DashMap`
//! - [`WriteQueue`] - FIFO ordering for outgoing writes
//! - [`SheetSession`] - Local copy kept in step with a backend

mod memory;
mod queue;
mod session;

use std::future::Future;

use tagsheet_engine::engine::{Sheet, SheetMeta};

use crate::document::Action;
use crate::error::Result;

pub use memory::MemoryStore;
pub use queue::WriteQueue;
pub use session::SheetSession;

/// A place sheets live. Implementations apply actions with the same reducer
/// the client uses, so both sides converge.
pub trait StorageBackend: Send + Sync + 'static {
    fn get_sheets(&self) -> impl Future<Output = Result<Vec<SheetMeta>>> + Send;

    /// Create an empty sheet under a fresh id.
    fn create_sheet(&self, title: &str) -> impl Future<Output = Result<SheetMeta>> + Send;

    fn rename_sheet(&self, id: &str, name: &str) -> impl Future<Output = Result<()>> + Send;

    fn delete_sheet(&self, id: &str) -> impl Future<Output = Result<()>> + Send;

    fn get_sheet(&self, id: &str) -> impl Future<Output = Result<Sheet>> + Send;

    /// Apply one action to a stored sheet and return the new version.
    fn update_sheet(&self, id: &str, action: &Action)
    -> impl Future<Output = Result<Sheet>> + Send;

    /// Store a complete sheet under its own id, replacing any previous copy.
    fn import_sheet(&self, sheet: Sheet) -> impl Future<Output = Result<SheetMeta>> + Send;
}
