//! tagsheet-core - UI-agnostic sheet reducer, formula runtime and storage.

pub mod document;
pub mod error;
pub mod storage;

pub use document::{Action, ColumnEditAction, FormulaRuntime, Outcome, reduce, reduce_at};
pub use error::{Result, SheetError};
pub use storage::{MemoryStore, SheetSession, StorageBackend, WriteQueue};

pub use tagsheet_engine::engine::{Column, ColumnType, Row, Sheet, SheetMeta};
