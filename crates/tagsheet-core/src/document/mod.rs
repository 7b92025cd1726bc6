//! Sheet editing and formula evaluation (UI-agnostic).

mod action;
mod eval;
mod ops;
mod state;
mod validate;
mod wire;

pub use action::{Action, ColumnEditAction};
pub use eval::{CellResult, ComputedSheet, FormulaRuntime, inject_computed};
pub use ops::{reduce, reduce_at, replay};
pub use state::{DEFAULT_COLUMN_TITLE, create_sheet, create_sheet_at, create_sheet_with_column};
pub use validate::{default_enum_name, sanitize_title, validate_column_action};
pub use wire::Outcome;
