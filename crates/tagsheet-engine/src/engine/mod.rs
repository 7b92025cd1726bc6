//! Sheet model and formula engine API.

mod compile;
mod eval;
mod format;
mod ident;
mod sheet;

pub use compile::{
    CompiledFormula, INDENT, MAIN_FUNCTION, compile, injected_variables, serialize_value,
    string_literal,
};
pub use eval::{DEFAULT_TIMEOUT, Sandbox};
pub use format::{canonical_number, format_dynamic, format_number, number_literal, parse_number};
pub use ident::{PREAMBLE_NAMES, is_reserved, sanitize_identifier};
pub use sheet::{
    Column, ColumnKind, ColumnType, FormulaType, Row, Sheet, SheetMeta, TagCache, clean_tag_text,
    derive_tag_cache, parse_tags,
};

pub use rhai::Dynamic;
