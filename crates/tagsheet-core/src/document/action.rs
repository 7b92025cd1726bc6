//! Edit actions, the only way a sheet changes.
//!
//! Wire shape: `{"action": "update_cell", "params": {"rowId": .., ...}}`.
//! Column edits inside `update_column_batched` are tagged on `editType`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tagsheet_engine::engine::FormulaType;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "params", rename_all = "snake_case")]
pub enum Action {
    #[serde(rename_all = "camelCase")]
    UpdateCell {
        row_id: String,
        column_id: String,
        value: String,
    },
    #[serde(rename_all = "camelCase")]
    AddRow { row_id: String },
    #[serde(rename_all = "camelCase")]
    DeleteRow { row_id: String },
    #[serde(rename_all = "camelCase")]
    AddColumn {
        column_id: String,
        title: String,
        #[serde(rename = "type")]
        column_type: String,
    },
    #[serde(rename_all = "camelCase")]
    DeleteColumn { column_id: String },
    #[serde(rename_all = "camelCase")]
    UpdateColumnBatched {
        column_id: String,
        actions: Vec<ColumnEditAction>,
    },
}

/// One edit to a single column, applied in order within a batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "editType", rename_all = "snake_case")]
pub enum ColumnEditAction {
    Rename {
        title: String,
    },
    #[serde(rename_all = "camelCase")]
    ChangeType {
        to_type: String,
    },
    /// `id_order` lists option ids in display order; `id_to_names` maps each
    /// id (the old option text, or a fresh id) to its new name.
    #[serde(rename_all = "camelCase")]
    EnumUpdate {
        id_order: Vec<String>,
        id_to_names: BTreeMap<String, String>,
    },
    #[serde(rename_all = "camelCase")]
    Reorder {
        to_index: i64,
    },
    /// Old tag → new tag. Mapping to `""` removes the tag.
    #[serde(rename_all = "camelCase")]
    TagRename {
        tag_map: BTreeMap<String, String>,
    },
    #[serde(rename_all = "camelCase")]
    Formula {
        formula: String,
        #[serde(default)]
        formula_type: FormulaType,
    },
}

impl Action {
    /// Wire tag of the action, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::UpdateCell { .. } => "update_cell",
            Action::AddRow { .. } => "add_row",
            Action::DeleteRow { .. } => "delete_row",
            Action::AddColumn { .. } => "add_column",
            Action::DeleteColumn { .. } => "delete_column",
            Action::UpdateColumnBatched { .. } => "update_column_batched",
        }
    }

    pub fn update_cell(row_id: &str, column_id: &str, value: &str) -> Action {
        Action::UpdateCell {
            row_id: row_id.to_string(),
            column_id: column_id.to_string(),
            value: value.to_string(),
        }
    }

    pub fn add_row(row_id: &str) -> Action {
        Action::AddRow {
            row_id: row_id.to_string(),
        }
    }

    pub fn add_column(column_id: &str, title: &str, column_type: &str) -> Action {
        Action::AddColumn {
            column_id: column_id.to_string(),
            title: title.to_string(),
            column_type: column_type.to_string(),
        }
    }

    pub fn edit_column(column_id: &str, actions: Vec<ColumnEditAction>) -> Action {
        Action::UpdateColumnBatched {
            column_id: column_id.to_string(),
            actions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_cell_wire_shape() {
        let action = Action::update_cell("r1", "c1", "7");
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({"action": "update_cell", "params": {"rowId": "r1", "columnId": "c1", "value": "7"}})
        );
    }

    #[test]
    fn test_add_column_type_field() {
        let action: Action = serde_json::from_value(json!({
            "action": "add_column",
            "params": {"columnId": "c9", "title": "Due", "type": "date"}
        }))
        .unwrap();
        assert_eq!(action, Action::add_column("c9", "Due", "date"));
    }

    #[test]
    fn test_batched_edits_parse() {
        let action: Action = serde_json::from_value(json!({
            "action": "update_column_batched",
            "params": {
                "columnId": "c1",
                "actions": [
                    {"editType": "rename", "title": "Stage"},
                    {"editType": "change_type", "toType": "enum"},
                    {"editType": "enum_update", "idOrder": ["a"], "idToNames": {"a": "Open"}},
                    {"editType": "reorder", "toIndex": -1},
                    {"editType": "tag_rename", "tagMap": {"x": "y"}},
                    {"editType": "formula", "formula": "1", "formulaType": "module"}
                ]
            }
        }))
        .unwrap();
        let Action::UpdateColumnBatched { actions, .. } = action else {
            panic!("wrong variant");
        };
        assert_eq!(actions.len(), 6);
        assert_eq!(actions[3], ColumnEditAction::Reorder { to_index: -1 });
        assert_eq!(
            actions[5],
            ColumnEditAction::Formula {
                formula: "1".into(),
                formula_type: FormulaType::Module
            }
        );
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let result: Result<Action, _> =
            serde_json::from_value(json!({"action": "merge_cells", "params": {}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_map_serialization_is_ordered() {
        let edit = ColumnEditAction::TagRename {
            tag_map: [("b".to_string(), "B".to_string()), ("a".to_string(), "A".to_string())]
                .into_iter()
                .collect(),
        };
        assert_eq!(
            serde_json::to_string(&edit).unwrap(),
            r#"{"editType":"tag_rename","tagMap":{"a":"A","b":"B"}}"#
        );
    }
}
