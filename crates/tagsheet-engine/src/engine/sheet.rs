//! Sheet data structures.
//!
//! This module provides the document model shared by the reducer and the
//! formula pipeline:
//! - [`Sheet`] - One tagged-spreadsheet document (columns, rows, tag cache)
//! - [`Column`] / [`ColumnKind`] - Typed field definitions shared by all rows
//! - [`Row`] - Sparse string values keyed by column id
//! - [`derive_tag_cache`] - Rebuilds the per-tags-column token index

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-tags-column set of every tag token currently in use.
pub type TagCache = BTreeMap<String, BTreeSet<String>>;

/// The discriminant of a column, without variant settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Number,
    Enum,
    Tags,
    Date,
    Formula,
}

impl ColumnType {
    pub const ALL: [ColumnType; 6] = [
        ColumnType::Text,
        ColumnType::Number,
        ColumnType::Enum,
        ColumnType::Tags,
        ColumnType::Date,
        ColumnType::Formula,
    ];

    /// Parse a lowercase type name (`"text"`, `"enum"`, ...).
    pub fn from_name(name: &str) -> Option<ColumnType> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Number => "number",
            ColumnType::Enum => "enum",
            ColumnType::Tags => "tags",
            ColumnType::Date => "date",
            ColumnType::Formula => "formula",
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a formula column's source is turned into a script.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormulaType {
    /// A fragment whose last line is the result.
    #[default]
    Expression,
    /// A complete script that defines the entry point itself.
    Module,
}

/// Column type plus its variant-specific settings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ColumnKind {
    Text,
    Number,
    Enum {
        #[serde(default)]
        options: Vec<String>,
    },
    Tags,
    Date,
    Formula {
        #[serde(default)]
        formula: String,
        #[serde(default, rename = "formulaType")]
        formula_type: FormulaType,
    },
}

impl ColumnKind {
    /// Default settings for a freshly created or converted column.
    pub fn default_for(column_type: ColumnType) -> ColumnKind {
        match column_type {
            ColumnType::Text => ColumnKind::Text,
            ColumnType::Number => ColumnKind::Number,
            ColumnType::Enum => ColumnKind::Enum {
                options: Vec::new(),
            },
            ColumnType::Tags => ColumnKind::Tags,
            ColumnType::Date => ColumnKind::Date,
            ColumnType::Formula => ColumnKind::Formula {
                formula: String::new(),
                formula_type: FormulaType::Expression,
            },
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnKind::Text => ColumnType::Text,
            ColumnKind::Number => ColumnType::Number,
            ColumnKind::Enum { .. } => ColumnType::Enum,
            ColumnKind::Tags => ColumnType::Tags,
            ColumnKind::Date => ColumnType::Date,
            ColumnKind::Formula { .. } => ColumnType::Formula,
        }
    }
}

/// A typed field definition shared by all rows.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    /// Stable identity, never reused.
    pub id: String,
    /// Display name, not unique.
    pub title: String,
    #[serde(flatten)]
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(id: &str, title: &str, column_type: ColumnType) -> Column {
        Column {
            id: id.to_string(),
            title: title.to_string(),
            kind: ColumnKind::default_for(column_type),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        self.kind.column_type()
    }

    pub fn is_formula(&self) -> bool {
        matches!(self.kind, ColumnKind::Formula { .. })
    }

    pub fn is_tags(&self) -> bool {
        matches!(self.kind, ColumnKind::Tags)
    }

    /// Enum options, or `None` for non-enum columns.
    pub fn options(&self) -> Option<&[String]> {
        match &self.kind {
            ColumnKind::Enum { options } => Some(options),
            _ => None,
        }
    }
}

/// One record. Absent keys are empty cells.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Row {
    pub id: String,
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

impl Row {
    pub fn new(id: &str) -> Row {
        Row {
            id: id.to_string(),
            values: BTreeMap::new(),
        }
    }

    pub fn value(&self, column_id: &str) -> Option<&str> {
        self.values.get(column_id).map(String::as_str)
    }
}

/// Listing projection of a sheet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetMeta {
    pub id: String,
    pub name: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// One tagged-spreadsheet document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub id: String,
    pub name: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default, rename = "tagCache")]
    pub tag_cache: TagCache,
}

impl Sheet {
    /// Create an empty sheet with both timestamps set to `now`.
    pub fn new(id: &str, name: &str, now: DateTime<Utc>) -> Sheet {
        Sheet {
            id: id.to_string(),
            name: name.to_string(),
            created: now,
            updated: now,
            columns: Vec::new(),
            rows: Vec::new(),
            tag_cache: TagCache::new(),
        }
    }

    pub fn meta(&self) -> SheetMeta {
        SheetMeta {
            id: self.id.clone(),
            name: self.name.clone(),
            created: self.created,
            updated: self.updated,
        }
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    pub fn column_mut(&mut self, column_id: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id == column_id)
    }

    pub fn column_index(&self, column_id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == column_id)
    }

    pub fn row(&self, row_id: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == row_id)
    }

    pub fn row_mut(&mut self, row_id: &str) -> Option<&mut Row> {
        self.rows.iter_mut().find(|r| r.id == row_id)
    }

    /// Columns that feed formulas (everything except formula columns).
    pub fn input_columns(&self) -> Vec<Column> {
        self.columns
            .iter()
            .filter(|c| !c.is_formula())
            .cloned()
            .collect()
    }

    /// Recompute the tag cache from rows and columns.
    pub fn refresh_tag_cache(&mut self) {
        self.tag_cache = derive_tag_cache(self);
    }
}

/// Split raw tag text on commas, trimming and dropping empty tokens.
/// Duplicates are removed; the first occurrence keeps its position.
pub fn parse_tags(input: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for token in input.split(',').map(str::trim) {
        if !token.is_empty() && !tags.iter().any(|t| t == token) {
            tags.push(token.to_string());
        }
    }
    tags
}

/// Canonical `", "`-joined form of tag text.
pub fn clean_tag_text(input: &str) -> String {
    parse_tags(input).join(", ")
}

/// Derive the tag cache: one entry per tags column holding every token in use.
pub fn derive_tag_cache(sheet: &Sheet) -> TagCache {
    let mut cache = TagCache::new();
    for column in sheet.columns.iter().filter(|c| c.is_tags()) {
        let tags = cache.entry(column.id.clone()).or_default();
        for row in &sheet.rows {
            if let Some(text) = row.value(&column.id) {
                tags.extend(parse_tags(text));
            }
        }
    }
    cache
}
