//! Checks run by editors before submitting column edits.
//!
//! The reducer accepts anything well-formed; these helpers enforce the
//! friendlier rules (unique, non-empty option and tag names).

use std::collections::HashSet;

use super::action::ColumnEditAction;
use crate::error::{Result, SheetError};

const DEFAULT_ENUM_PREFIX: &str = "Option #";

/// Reject enum and tag edits whose resulting names are empty or repeated.
pub fn validate_column_action(edit: &ColumnEditAction) -> Result<()> {
    match edit {
        ColumnEditAction::EnumUpdate {
            id_order,
            id_to_names,
        } => validate_names(
            id_order
                .iter()
                .map(|id| id_to_names.get(id).map(String::as_str).unwrap_or("")),
        ),
        ColumnEditAction::TagRename { tag_map } => {
            validate_names(tag_map.values().map(String::as_str))
        }
        _ => Ok(()),
    }
}

fn validate_names<'a>(names: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    let mut empty = false;
    for name in names {
        if !seen.insert(name) {
            return Err(SheetError::InvalidOptions("Options must be unique.".into()));
        }
        empty |= name.is_empty();
    }
    if empty {
        return Err(SheetError::InvalidOptions(
            "Options cannot be empty strings.".into(),
        ));
    }
    Ok(())
}

pub fn sanitize_title(title: &str) -> String {
    title.trim().to_string()
}

/// First `Option #<n>` not already used.
pub fn default_enum_name(options: &[String]) -> String {
    (1..)
        .map(|n| format!("{}{}", DEFAULT_ENUM_PREFIX, n))
        .find(|candidate| !options.contains(candidate))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn enum_update(order: &[&str], names: &[(&str, &str)]) -> ColumnEditAction {
        ColumnEditAction::EnumUpdate {
            id_order: order.iter().map(|s| s.to_string()).collect(),
            id_to_names: map(names),
        }
    }

    #[test]
    fn test_valid_enum_update() {
        assert!(validate_column_action(&enum_update(&["a", "b"], &[("a", "A"), ("b", "B")])).is_ok());
    }

    #[test]
    fn test_duplicate_option_names() {
        let err = validate_column_action(&enum_update(&["a", "b"], &[("a", "X"), ("b", "X")]))
            .unwrap_err();
        assert!(matches!(err, SheetError::InvalidOptions(msg) if msg.contains("unique")));
    }

    #[test]
    fn test_missing_option_name_is_empty() {
        let err = validate_column_action(&enum_update(&["a", "b"], &[("a", "A")])).unwrap_err();
        assert!(matches!(err, SheetError::InvalidOptions(msg) if msg.contains("empty")));
    }

    #[test]
    fn test_tag_rename_validation() {
        let ok = ColumnEditAction::TagRename {
            tag_map: map(&[("a", "x"), ("b", "y")]),
        };
        assert!(validate_column_action(&ok).is_ok());
        let clash = ColumnEditAction::TagRename {
            tag_map: map(&[("a", "x"), ("b", "x")]),
        };
        assert!(validate_column_action(&clash).is_err());
    }

    #[test]
    fn test_other_edits_pass() {
        let edit = ColumnEditAction::Rename { title: String::new() };
        assert!(validate_column_action(&edit).is_ok());
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("  Due date \n"), "Due date");
    }

    #[test]
    fn test_default_enum_name() {
        assert_eq!(default_enum_name(&[]), "Option #1");
        let taken = vec!["Option #1".to_string(), "Option #3".to_string()];
        assert_eq!(default_enum_name(&taken), "Option #2");
    }
}
