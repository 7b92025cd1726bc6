//! Formula compilation.
//!
//! Turns a formula column's source plus one row of data into a self-contained
//! Rhai script:
//!
//! ```text
//! const FORMULA_CELLS = [#{ column_name: "Score", value: 7 }, ...];   ┐
//! const FORMULA_DROPDOWNS = [#{ column_name: .., index: .., values: [..] }];
//! let Score = 7;                                                       │ preamble
//! let Name = "Ada";                                                    │
//! fn get_cell(..) { .. } ...                                           ┘
//! let fx = || {                                                        ← header
//!     <user line 1>
//!     return <user last line>
//! };
//! fx.call()                                                            ← entry call
//! ```
//!
//! Expressions are wrapped in a closure (not a `fn`) so the body can read the
//! injected `let` bindings. `return` goes on the last code line unless that
//! line closes a block, in which case the block is already the closure's value.
//!
//! Module formulas are pasted verbatim and must define `fn fx()` themselves.
//! Their column bindings are emitted as `const`, so functions reach them as
//! `global::Score`.

use super::format::number_literal;
use super::ident::sanitize_identifier;
use super::sheet::{Column, ColumnType, FormulaType, Row};
use crate::builtins::BUILTINS_SOURCE;

/// Entry point every compiled formula exposes.
pub const MAIN_FUNCTION: &str = "fx";

/// Indentation applied to expression lines inside the wrapper.
pub const INDENT: &str = "    ";

/// A formula ready for the sandbox, plus what is needed to map error
/// positions back to the author's text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledFormula {
    pub script: String,
    pub formula_type: FormulaType,
    /// Number of generated lines before the wrapper header (expressions) or
    /// before the pasted source (modules).
    pub preamble_lines: usize,
    /// Number of lines of user source in the script.
    pub user_lines: usize,
    /// Synthetic name used in diagnostics and logs.
    pub source_name: String,
}

impl CompiledFormula {
    /// Script line (1-based) holding the first line of user source.
    pub fn first_user_line(&self) -> usize {
        match self.formula_type {
            FormulaType::Expression => self.preamble_lines + 2,
            FormulaType::Module => self.preamble_lines + 1,
        }
    }

    /// Columns of indentation added in front of each user line.
    pub fn indent_width(&self) -> usize {
        match self.formula_type {
            FormulaType::Expression => INDENT.len(),
            FormulaType::Module => 0,
        }
    }

    /// Map a script line to a formula line, if it falls inside user source.
    pub fn user_line(&self, script_line: usize) -> Option<usize> {
        let first = self.first_user_line();
        (script_line >= first && script_line < first + self.user_lines)
            .then(|| script_line - first + 1)
    }

    /// Like [`user_line`](Self::user_line), but lines generated after the
    /// user source (the wrapper's `};` and the entry call) count as the line
    /// just past the formula, where an unfinished formula trips the parser.
    pub fn formula_line(&self, script_line: usize) -> Option<usize> {
        let first = self.first_user_line();
        (script_line >= first).then(|| (script_line - first + 1).min(self.user_lines + 1))
    }

    /// Rename the synthetic source (e.g. `formula_<row>_<column>`).
    pub fn named(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = source_name.into();
        self
    }
}

/// Compile a formula for one row.
///
/// `columns` are the non-formula columns in display order; they provide the
/// injected variables and the data behind the built-ins.
pub fn compile(
    formula_type: FormulaType,
    source: &str,
    columns: &[Column],
    row: &Row,
) -> CompiledFormula {
    let preamble = create_preamble(formula_type, columns, row);
    let preamble_lines = preamble.lines().count();
    let mut script = preamble;
    script.push('\n');

    let user_lines = match formula_type {
        FormulaType::Expression => {
            let body = expression_body(source);
            script.push_str(&format!("let {} = || {{\n", MAIN_FUNCTION));
            for line in &body {
                script.push_str(INDENT);
                script.push_str(line);
                script.push('\n');
            }
            script.push_str("};\n");
            script.push_str(&format!("{}.call()\n", MAIN_FUNCTION));
            body.len()
        }
        FormulaType::Module => {
            let lines = source.lines().count();
            script.push_str(source);
            if !source.ends_with('\n') {
                script.push('\n');
            }
            script.push_str(&format!("{}()\n", MAIN_FUNCTION));
            lines
        }
    };

    CompiledFormula {
        script,
        formula_type,
        preamble_lines,
        user_lines,
        source_name: format!("formula_{}", row.id),
    }
}

/// Split an expression into lines, dropping trailing blank lines and making
/// sure the last code line returns.
fn expression_body(source: &str) -> Vec<String> {
    let mut lines: Vec<String> = source.lines().map(str::to_string).collect();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        return vec!["return ();".to_string()];
    }

    // Trailing comments and blank lines do not hold the value.
    let Some(index) = lines
        .iter()
        .rposition(|l| !l.trim().is_empty() && !is_comment(l))
    else {
        return lines;
    };
    let last = &mut lines[index];
    if !is_return(last) && !closes_block(last) {
        let indent_len = last.len() - last.trim_start().len();
        let (indent, rest) = last.split_at(indent_len);
        *last = format!("{}return {}", indent, rest);
    }
    lines
}

fn is_return(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed == "return"
        || trimmed.starts_with("return ")
        || trimmed.starts_with("return;")
        || trimmed.starts_with("return(")
}

fn is_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("//") || (trimmed.starts_with("/*") && trimmed.ends_with("*/"))
}

/// `}` of a multi-line `if`, `switch` or block, possibly followed by more
/// closers or a trailing comment.
fn closes_block(line: &str) -> bool {
    line.trim_start().starts_with('}')
}

/// Generate the preamble: data constants, column variables and built-ins.
/// Every binding occupies exactly one line.
fn create_preamble(formula_type: FormulaType, columns: &[Column], row: &Row) -> String {
    let mut out = String::new();

    let cells = columns
        .iter()
        .map(|c| {
            format!(
                "#{{ column_name: {}, value: {} }}",
                string_literal(&c.title),
                serialize_value(c.column_type(), row.value(&c.id))
            )
        })
        .collect::<Vec<_>>()
        .join(", ");
    out.push_str(&format!("const FORMULA_CELLS = [{}];\n", cells));

    let dropdowns = columns
        .iter()
        .enumerate()
        .filter_map(|(index, c)| {
            let options = c.options()?;
            let values = options
                .iter()
                .map(|o| string_literal(o))
                .collect::<Vec<_>>()
                .join(", ");
            Some(format!(
                "#{{ column_name: {}, index: {}, values: [{}] }}",
                string_literal(&c.title),
                index,
                values
            ))
        })
        .collect::<Vec<_>>()
        .join(", ");
    out.push_str(&format!("const FORMULA_DROPDOWNS = [{}];\n", dropdowns));

    let binding = match formula_type {
        FormulaType::Expression => "let",
        FormulaType::Module => "const",
    };
    for (name, column) in injected_variables(columns) {
        out.push_str(&format!(
            "{} {} = {};\n",
            binding,
            name,
            serialize_value(column.column_type(), row.value(&column.id))
        ));
    }

    out.push_str(BUILTINS_SOURCE);
    out
}

/// Variable names bound for each column. When two titles sanitize to the same
/// name, the earlier column wins and the later one is not bound.
pub fn injected_variables(columns: &[Column]) -> Vec<(String, &Column)> {
    let mut bound: Vec<(String, &Column)> = Vec::new();
    for column in columns {
        let Some(name) = sanitize_identifier(&column.title) else {
            continue;
        };
        if bound.iter().any(|(n, _)| *n == name) {
            continue;
        }
        bound.push((name, column));
    }
    bound
}

/// Serialize a cell value as a Rhai literal.
/// - number columns: numeric literal, `""` when the text is not a number
/// - everything else: string literal
/// - absent values: `""`
pub fn serialize_value(column_type: ColumnType, value: Option<&str>) -> String {
    match column_type {
        ColumnType::Number => value
            .and_then(number_literal)
            .unwrap_or_else(|| "\"\"".to_string()),
        _ => string_literal(value.unwrap_or("")),
    }
}

/// Quote and escape text so it forms a single-line Rhai string literal.
pub fn string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
