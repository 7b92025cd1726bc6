use std::sync::Arc;

use dashmap::DashMap;
use tagsheet_engine::engine::{Sheet, SheetMeta};
use uuid::Uuid;

use super::StorageBackend;
use crate::document::{Action, create_sheet, reduce};
use crate::error::{Result, SheetError};

/// In-memory sheet store. Clones share the same sheets.
#[derive(Clone, Default)]
pub struct MemoryStore {
    sheets: Arc<DashMap<String, Sheet>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

impl StorageBackend for MemoryStore {
    async fn get_sheets(&self) -> Result<Vec<SheetMeta>> {
        let mut metas: Vec<SheetMeta> = self.sheets.iter().map(|s| s.meta()).collect();
        metas.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
        Ok(metas)
    }

    async fn create_sheet(&self, title: &str) -> Result<SheetMeta> {
        let id = Uuid::new_v4().to_string();
        let sheet = create_sheet(&id, title);
        let meta = sheet.meta();
        self.sheets.insert(id, sheet);
        tracing::debug!(sheet = %meta.id, "sheet created");
        Ok(meta)
    }

    async fn rename_sheet(&self, id: &str, name: &str) -> Result<()> {
        let mut sheet = self
            .sheets
            .get_mut(id)
            .ok_or_else(|| SheetError::SheetNotFound(id.to_string()))?;
        sheet.name = name.to_string();
        Ok(())
    }

    async fn delete_sheet(&self, id: &str) -> Result<()> {
        self.sheets
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| SheetError::SheetNotFound(id.to_string()))
    }

    async fn get_sheet(&self, id: &str) -> Result<Sheet> {
        self.sheets
            .get(id)
            .map(|s| s.clone())
            .ok_or_else(|| SheetError::SheetNotFound(id.to_string()))
    }

    async fn update_sheet(&self, id: &str, action: &Action) -> Result<Sheet> {
        let mut entry = self
            .sheets
            .get_mut(id)
            .ok_or_else(|| SheetError::SheetNotFound(id.to_string()))?;
        let next = reduce(&entry, action)?;
        *entry = next.clone();
        Ok(next)
    }

    async fn import_sheet(&self, sheet: Sheet) -> Result<SheetMeta> {
        let meta = sheet.meta();
        self.sheets.insert(sheet.id.clone(), sheet);
        Ok(meta)
    }
}
