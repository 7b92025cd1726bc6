use chrono::{DateTime, Utc};
use tagsheet_engine::engine::{Column, ColumnType, Sheet};

/// Title given to the column of a freshly created sheet.
pub const DEFAULT_COLUMN_TITLE: &str = "Untitled column";

/// Create an empty sheet stamped with the current time.
pub fn create_sheet(id: &str, name: &str) -> Sheet {
    create_sheet_at(id, name, Utc::now())
}

pub fn create_sheet_at(id: &str, name: &str, now: DateTime<Utc>) -> Sheet {
    Sheet::new(id, name, now)
}

/// Create a sheet with one text column, ready for a first row.
pub fn create_sheet_with_column(id: &str, name: &str, column_id: &str) -> Sheet {
    let mut sheet = create_sheet(id, name);
    sheet
        .columns
        .push(Column::new(column_id, DEFAULT_COLUMN_TITLE, ColumnType::Text));
    sheet
}
