use chrono::{DateTime, Utc};
use tagsheet_engine::engine::{
    Column, ColumnKind, ColumnType, Row, Sheet, canonical_number, parse_tags,
};

use super::action::{Action, ColumnEditAction};
use crate::error::{Result, SheetError};

/// Apply an action, stamping `updated` with the current time.
pub fn reduce(sheet: &Sheet, action: &Action) -> Result<Sheet> {
    reduce_at(sheet, action, Utc::now())
}

/// Apply an action with an explicit clock.
///
/// The input is never modified; on error the caller keeps its sheet as is.
pub fn reduce_at(sheet: &Sheet, action: &Action, now: DateTime<Utc>) -> Result<Sheet> {
    let mut next = sheet.clone();
    apply(&mut next, action)?;
    next.updated = now;
    Ok(next)
}

/// Apply a sequence of actions, stopping at the first failure.
/// The error carries the index of the failing action.
pub fn replay<'a>(
    sheet: &Sheet,
    actions: impl IntoIterator<Item = &'a Action>,
    now: DateTime<Utc>,
) -> std::result::Result<Sheet, (usize, SheetError)> {
    let mut current = sheet.clone();
    for (index, action) in actions.into_iter().enumerate() {
        current = reduce_at(&current, action, now).map_err(|e| (index, e))?;
    }
    Ok(current)
}

fn apply(sheet: &mut Sheet, action: &Action) -> Result<()> {
    match action {
        Action::UpdateCell {
            row_id,
            column_id,
            value,
        } => {
            let row = sheet
                .row_mut(row_id)
                .ok_or_else(|| SheetError::RowNotFound(row_id.clone()))?;
            row.values.insert(column_id.clone(), value.clone());
            if sheet.column(column_id).is_some_and(Column::is_tags) {
                sheet.refresh_tag_cache();
            }
        }
        Action::AddRow { row_id } => {
            if sheet.row(row_id).is_some() {
                return Err(SheetError::DuplicateRowId(row_id.clone()));
            }
            sheet.rows.push(Row::new(row_id));
        }
        Action::DeleteRow { row_id } => {
            let index = sheet
                .rows
                .iter()
                .position(|r| r.id == *row_id)
                .ok_or_else(|| SheetError::RowNotFound(row_id.clone()))?;
            sheet.rows.remove(index);
            sheet.refresh_tag_cache();
        }
        Action::AddColumn {
            column_id,
            title,
            column_type,
        } => {
            let column_type = parse_column_type(column_type)?;
            if sheet.column(column_id).is_some() {
                return Err(SheetError::DuplicateColumnId(column_id.clone()));
            }
            sheet
                .columns
                .push(Column::new(column_id, title, column_type));
            sheet.refresh_tag_cache();
        }
        Action::DeleteColumn { column_id } => {
            let index = column_position(sheet, column_id)?;
            // Row values under the id stay behind, unreachable.
            sheet.columns.remove(index);
            sheet.refresh_tag_cache();
        }
        Action::UpdateColumnBatched { column_id, actions } => {
            column_position(sheet, column_id)?;
            for edit in actions {
                apply_edit(sheet, column_id, edit)?;
            }
            sheet.refresh_tag_cache();
        }
    }
    Ok(())
}

fn apply_edit(sheet: &mut Sheet, column_id: &str, edit: &ColumnEditAction) -> Result<()> {
    match edit {
        ColumnEditAction::Rename { title } => {
            column_mut(sheet, column_id)?.title = title.clone();
        }
        ColumnEditAction::ChangeType { to_type } => {
            change_type(sheet, column_id, parse_column_type(to_type)?)?;
        }
        ColumnEditAction::EnumUpdate {
            id_order,
            id_to_names,
        } => {
            let column = column_mut(sheet, column_id)?;
            let ColumnKind::Enum { options } = &mut column.kind else {
                return Err(SheetError::NotAnEnumColumn(column_id.to_string()));
            };
            *options = id_order
                .iter()
                .filter_map(|id| id_to_names.get(id))
                .filter(|name| !name.is_empty())
                .cloned()
                .collect();

            for value in column_values_mut(sheet, column_id) {
                if let Some(name) = id_to_names.get(value.as_str()) {
                    *value = name.clone();
                }
            }
        }
        ColumnEditAction::Reorder { to_index } => {
            let from = column_position(sheet, column_id)?;
            let len = sheet.columns.len();
            let to = usize::try_from(*to_index)
                .ok()
                .filter(|i| *i < len)
                .ok_or(SheetError::IndexOutOfRange {
                    index: *to_index,
                    len,
                })?;
            let column = sheet.columns.remove(from);
            sheet.columns.insert(to, column);
        }
        ColumnEditAction::TagRename { tag_map } => {
            if !column_mut(sheet, column_id)?.is_tags() {
                return Err(SheetError::NotATagsColumn(column_id.to_string()));
            }
            for value in column_values_mut(sheet, column_id) {
                let mut renamed: Vec<String> = Vec::new();
                for tag in parse_tags(value) {
                    let tag = tag_map.get(&tag).cloned().unwrap_or(tag);
                    if !tag.is_empty() && !renamed.contains(&tag) {
                        renamed.push(tag);
                    }
                }
                *value = renamed.join(", ");
            }
        }
        ColumnEditAction::Formula {
            formula,
            formula_type,
        } => {
            let column = column_mut(sheet, column_id)?;
            let ColumnKind::Formula {
                formula: current,
                formula_type: current_type,
            } = &mut column.kind
            else {
                return Err(SheetError::NotAFormulaColumn(column_id.to_string()));
            };
            *current = formula.clone();
            *current_type = *formula_type;
        }
    }
    Ok(())
}

fn change_type(sheet: &mut Sheet, column_id: &str, to: ColumnType) -> Result<()> {
    let column = column_mut(sheet, column_id)?;
    if column.column_type() == to {
        return Ok(());
    }
    column.kind = ColumnKind::default_for(to);

    match to {
        ColumnType::Number => {
            for value in column_values_mut(sheet, column_id) {
                *value = canonical_number(value).unwrap_or_default();
            }
        }
        ColumnType::Tags => {
            for value in column_values_mut(sheet, column_id) {
                value.clear();
            }
        }
        _ => {}
    }
    Ok(())
}

fn parse_column_type(name: &str) -> Result<ColumnType> {
    ColumnType::from_name(name).ok_or_else(|| SheetError::InvalidColumnType(name.to_string()))
}

fn column_position(sheet: &Sheet, column_id: &str) -> Result<usize> {
    sheet
        .column_index(column_id)
        .ok_or_else(|| SheetError::ColumnNotFound(column_id.to_string()))
}

fn column_mut<'a>(sheet: &'a mut Sheet, column_id: &str) -> Result<&'a mut Column> {
    sheet
        .column_mut(column_id)
        .ok_or_else(|| SheetError::ColumnNotFound(column_id.to_string()))
}

/// Present values of one column across all rows.
fn column_values_mut<'a>(
    sheet: &'a mut Sheet,
    column_id: &'a str,
) -> impl Iterator<Item = &'a mut String> + 'a {
    sheet
        .rows
        .iter_mut()
        .filter_map(move |row| row.values.get_mut(column_id))
}
