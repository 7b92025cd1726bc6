//! tagsheet_engine - Sheet model, formula compiler and Rhai sandbox.

pub mod builtins;
pub mod engine;
pub mod error;

pub use error::FormulaError;

#[cfg(test)]
mod tests {
    use crate::engine::*;
    use crate::error::FormulaError;

    fn status_column() -> Column {
        let mut column = Column::new("c2", "Status", ColumnType::Enum);
        column.kind = ColumnKind::Enum {
            options: vec!["Open".into(), "In progress".into(), "Done".into()],
        };
        column
    }

    fn sheet_columns() -> Vec<Column> {
        vec![
            Column::new("c1", "Score", ColumnType::Number),
            status_column(),
            Column::new("c3", "Due date", ColumnType::Date),
            Column::new("c4", "Labels", ColumnType::Tags),
        ]
    }

    fn row(score: &str, status: &str) -> Row {
        let mut row = Row::new("r1");
        row.values.insert("c1".into(), score.into());
        row.values.insert("c2".into(), status.into());
        row.values.insert("c3".into(), "2024-05-01".into());
        row.values.insert("c4".into(), "red, blue".into());
        row
    }

    fn eval(source: &str, row: &Row) -> Result<String, FormulaError> {
        let compiled = compile(FormulaType::Expression, source, &sheet_columns(), row);
        Sandbox::new().evaluate(&compiled, DEFAULT_TIMEOUT)
    }

    #[test]
    fn test_dropdown_round_trip_through_builtins() {
        let r = row("3", "In progress");
        assert_eq!(eval(r#"get_dropdown_index("Status")"#, &r).unwrap(), "1");
        assert_eq!(
            eval(r#"to_dropdown_value(get_dropdown_index("Status") + 1, "Status")"#, &r).unwrap(),
            "Done"
        );
    }

    #[test]
    fn test_stale_enum_value_has_no_index() {
        let r = row("3", "Archived");
        assert_eq!(eval(r#"get_dropdown_index("Status")"#, &r).unwrap(), "");
    }

    #[test]
    fn test_titles_with_spaces_become_variables() {
        assert_eq!(eval("Due_date", &row("1", "Open")).unwrap(), "2024-05-01");
    }

    #[test]
    fn test_non_numeric_score_is_empty_string() {
        let r = row("n/a", "Open");
        assert_eq!(eval(r#"if Score == "" { "missing" } else { "ok" }"#, &r).unwrap(), "missing");
    }

    #[test]
    fn test_tags_are_plain_text() {
        let r = row("1", "Open");
        assert_eq!(eval(r#"Labels.split(", ").len()"#, &r).unwrap(), "2");
    }

    #[test]
    fn test_float_results() {
        assert_eq!(eval("Score / 4.0", &row("3", "Open")).unwrap(), "0.75");
        assert_eq!(eval("Score * 1.0", &row("3", "Open")).unwrap(), "3");
    }

    #[test]
    fn test_every_row_gets_a_literal_result() {
        for score in ["1", "2", "", "x"] {
            assert_eq!(eval(r#""hello""#, &row(score, "Open")).unwrap(), "hello");
        }
    }
}
