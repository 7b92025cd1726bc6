//! Built-in formula functions and their metadata.
//!
//! Conventions:
//! - Built-ins are Rhai script functions emitted into every formula preamble.
//! - They read the per-row data through the preamble constants
//!   `FORMULA_CELLS` and `FORMULA_DROPDOWNS` via the `global::` namespace,
//!   since Rhai functions cannot see `let` bindings of the calling script.
//! - Every built-in takes an optional trailing `occurrence` argument selecting
//!   the nth column with a duplicated title (default 0).
//! - If you add a new built-in, add its source to `BUILTINS_SOURCE` and an
//!   entry to `BUILTINS`.

pub struct Builtin {
    pub name: &'static str,
    pub signature: &'static str,
    pub description: &'static str,
}

pub const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "get_cell",
        signature: "get_cell(name_or_index, occurrence = 0)",
        description: "Value of a column in the current row",
    },
    Builtin {
        name: "get_dropdown_index",
        signature: "get_dropdown_index(name_or_index, occurrence = 0)",
        description: "Position of the current value in a dropdown column's options",
    },
    Builtin {
        name: "to_dropdown_value",
        signature: "to_dropdown_value(index, name_or_index, occurrence = 0)",
        description: "Option text at a position of a dropdown column",
    },
];

/// Rhai source of the built-in library.
///
/// Errors are raised with `throw`, so a misuse fails the formula at runtime
/// rather than the compilation step.
pub const BUILTINS_SOURCE: &str = r#"fn formula_column_index(name_or_index, occurrence) {
    if occurrence < 0 { throw "Occurrence index starts at 0!"; }
    let cells = global::FORMULA_CELLS;
    if type_of(name_or_index) == "i64" {
        if name_or_index < 0 { throw "Column index starts at 0!"; }
        if name_or_index >= cells.len() { throw "Column index out of range: " + name_or_index; }
        return name_or_index;
    }
    let seen = 0;
    for index in 0..cells.len() {
        if cells[index].column_name == name_or_index {
            if seen == occurrence { return index; }
            seen += 1;
        }
    }
    -1
}
fn formula_dropdown_options(index) {
    for column in global::FORMULA_DROPDOWNS {
        if column.index == index { return column.values; }
    }
    ()
}
fn get_cell(name_or_index) { get_cell(name_or_index, 0) }
fn get_cell(name_or_index, occurrence) {
    let index = formula_column_index(name_or_index, occurrence);
    if index < 0 { return ""; }
    let cells = global::FORMULA_CELLS;
    cells[index].value
}
fn get_dropdown_index(name_or_index) { get_dropdown_index(name_or_index, 0) }
fn get_dropdown_index(name_or_index, occurrence) {
    let index = formula_column_index(name_or_index, occurrence);
    if index < 0 { return (); }
    let options = formula_dropdown_options(index);
    if type_of(options) == "()" { return (); }
    let cells = global::FORMULA_CELLS;
    let value = cells[index].value;
    let position = 0;
    for option in options {
        if option == value { return position; }
        position += 1;
    }
    ()
}
fn to_dropdown_value(value, name_or_index) { to_dropdown_value(value, name_or_index, 0) }
fn to_dropdown_value(value, name_or_index, occurrence) {
    let index = formula_column_index(name_or_index, occurrence);
    if index < 0 { return (); }
    let options = formula_dropdown_options(index);
    if type_of(options) == "()" { return (); }
    if type_of(value) != "i64" { return (); }
    if value < 0 || value >= options.len() { return (); }
    options[value]
}"#;

pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|b| b.name)
}
