//! Column title → Rhai identifier conversion.
//!
//! Formula authors refer to columns by their titles, so every title is turned
//! into a variable name that Rhai accepts:
//!
//! - Whitespace runs become `_`: `Due date` → `Due_date`
//! - Characters outside `[A-Za-z0-9_]` are stripped: `Price ($)` → `Price_`
//! - A leading digit gets a `col_` prefix: `2024 total` → `col_2024_total`
//!   (Rhai needs a letter before the first digit, underscores aside)
//! - Keywords, preamble names and built-ins get a `_` suffix: `loop` → `loop_`

use regex::Regex;
use std::sync::OnceLock;

use crate::builtins::builtin_names;

/// Rhai keywords plus the symbols Rhai reserves for future use.
const RHAI_RESERVED: &[&str] = &[
    // keywords
    "true", "false", "let", "const", "if", "else", "switch", "do", "while", "until", "loop", "for",
    "in", "continue", "break", "return", "throw", "try", "catch", "fn", "private", "import",
    "export", "as", "global", "this", "is", "Fn", "call", "curry", "type_of", "print", "debug",
    "eval", "is_def_fn", "is_def_var", "is_shared",
    // reserved
    "var", "static", "shared", "goto", "exit", "match", "case", "public", "protected", "new",
    "use", "with", "module", "package", "super", "spawn", "thread", "go", "sync", "async",
    "await", "yield", "default", "void", "null", "nil",
];

/// Names the formula preamble defines itself.
pub const PREAMBLE_NAMES: &[&str] = &["FORMULA_CELLS", "FORMULA_DROPDOWNS", "fx"];

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex must compile"))
}

fn unsafe_char_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_]").expect("identifier regex must compile"))
}

/// Whether `name` cannot be used as a plain variable name.
pub fn is_reserved(name: &str) -> bool {
    RHAI_RESERVED.contains(&name)
        || PREAMBLE_NAMES.contains(&name)
        || builtin_names().any(|b| b == name)
}

/// Turn a column title into a Rhai variable name.
///
/// Returns `None` when nothing usable is left (e.g. a title made of symbols),
/// in which case the column is only reachable through `get_cell`.
pub fn sanitize_identifier(title: &str) -> Option<String> {
    let collapsed = whitespace_re().replace_all(title.trim(), "_");
    let mut name = unsafe_char_re().replace_all(&collapsed, "").into_owned();

    if name.is_empty() || name.chars().all(|c| c == '_') {
        return None;
    }
    if name
        .trim_start_matches('_')
        .starts_with(|c: char| c.is_ascii_digit())
    {
        name.insert_str(0, "col_");
    }
    if is_reserved(&name) {
        name.push('_');
    }
    Some(name)
}
