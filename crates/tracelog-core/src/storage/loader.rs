use rusqlite::types::Value;
use rusqlite::{params_from_iter, Transaction};
use thiserror::Error;
use tracing::{debug, info};

use super::models::{ColumnType, DataTable, LoadRequest};
use crate::dates::{self, DateFormat};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LoadError {
    #[error("table has {0} missing values; clean them out before loading")]
    MissingValues(usize),

    #[error("type '{0}' must be one of int, real, text or date")]
    InvalidTypeTag(String),

    #[error("need as many columns ({columns}) as types ({types})")]
    ColumnTypeMismatch { columns: usize, types: usize },

    #[error("{requested} columns requested but the table only has {available}")]
    TooManyColumns { requested: usize, available: usize },

    #[error("table name '{0}' must be alphanumeric only")]
    InvalidTableName(String),

    #[error("row {row}, column '{column}': cannot convert '{value}' to {column_type}")]
    Conversion {
        row: usize,
        column: String,
        value: String,
        column_type: ColumnType,
    },
}

fn is_valid_table_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(char::is_alphanumeric)
}

/// Quoted so that keywords and leading digits (`select`, `123`) are valid names.
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn convert_cell(
    raw: &str,
    column_type: ColumnType,
    date_format: DateFormat,
) -> Option<Value> {
    match column_type {
        ColumnType::Int => raw.parse::<i64>().ok().map(Value::Integer),
        // SQLite stores NaN as NULL.
        ColumnType::Real => raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Value::Real),
        ColumnType::Text => Some(Value::Text(raw.to_string())),
        ColumnType::Date => dates::normalize_date(raw, date_format).ok().map(Value::Text),
    }
}

/// Everything checked before the first statement runs.
struct LoadPlan {
    columns: Vec<String>,
    types: Vec<ColumnType>,
}

fn plan(table: &DataTable, request: &LoadRequest) -> Result<LoadPlan, LoadError> {
    let missing = table.missing_values();
    if missing > 0 {
        return Err(LoadError::MissingValues(missing));
    }

    let types = request
        .types
        .iter()
        .map(|t| t.parse::<ColumnType>())
        .collect::<Result<Vec<_>, _>>()?;

    let columns = request
        .columns
        .clone()
        .unwrap_or_else(|| table.headers.clone());
    if columns.len() != types.len() {
        return Err(LoadError::ColumnTypeMismatch {
            columns: columns.len(),
            types: types.len(),
        });
    }
    if columns.len() > table.headers.len() {
        return Err(LoadError::TooManyColumns {
            requested: columns.len(),
            available: table.headers.len(),
        });
    }

    if !is_valid_table_name(&request.table_name) {
        return Err(LoadError::InvalidTableName(request.table_name.clone()));
    }

    Ok(LoadPlan { columns, types })
}

/// Create `request.table_name` inside `tx` and insert every row of `table`.
///
/// The transaction is left open: the caller inspects the staged table and
/// commits it, or drops the transaction to discard it. Returns the number of
/// rows inserted.
pub fn load_table(
    tx: &Transaction<'_>,
    table: &DataTable,
    request: &LoadRequest,
) -> Result<usize, crate::Error> {
    let LoadPlan { columns, types } = plan(table, request)?;
    let name = quote_identifier(&request.table_name);

    if request.replace {
        tx.execute(&format!("DROP TABLE IF EXISTS {}", name), [])?;
    }

    let items = columns
        .iter()
        .zip(&types)
        .map(|(column, column_type)| format!("{} {}", quote_identifier(column), column_type))
        .collect::<Vec<_>>()
        .join(", ");
    let create = format!("CREATE TABLE {} ({})", name, items);
    debug!("{}", create);
    tx.execute(&create, [])?;

    let placeholders = vec!["?"; columns.len()].join(",");
    let mut stmt = tx.prepare(&format!("INSERT INTO {} VALUES ({})", name, placeholders))?;

    for (row_idx, row) in table.rows.iter().enumerate() {
        let mut values = Vec::with_capacity(columns.len());
        for (col_idx, column_type) in types.iter().enumerate() {
            let raw = row.get(col_idx).and_then(|cell| cell.as_deref()).unwrap_or("");
            let value = convert_cell(raw, *column_type, request.date_format).ok_or_else(|| {
                LoadError::Conversion {
                    row: row_idx,
                    column: columns[col_idx].clone(),
                    value: raw.to_string(),
                    column_type: *column_type,
                }
            })?;
            values.push(value);
        }
        stmt.execute(params_from_iter(values))?;
    }

    info!(
        "Staged {} rows into {}; changes have not been committed",
        table.rows.len(),
        request.table_name
    );
    Ok(table.rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[Option<&str>]]) -> DataTable {
        let mut t = DataTable::new(headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            t.push_row(row.iter().map(|c| c.map(str::to_string)).collect());
        }
        t
    }

    #[test]
    fn test_plan_rejects_missing_values_first() {
        let t = table(&["a", "b"], &[&[Some("1"), None]]);
        let request = LoadRequest::new("bad name", &["nope"]);
        assert_eq!(plan(&t, &request).err(), Some(LoadError::MissingValues(1)));
    }

    #[test]
    fn test_plan_rejects_unknown_type() {
        let t = table(&["a"], &[&[Some("1")]]);
        let request = LoadRequest::new("t", &["blob"]);
        assert_eq!(
            plan(&t, &request).err(),
            Some(LoadError::InvalidTypeTag("blob".to_string()))
        );
    }

    #[test]
    fn test_plan_rejects_length_mismatch() {
        let t = table(&["a", "b"], &[&[Some("1"), Some("2")]]);
        let request = LoadRequest::new("t", &["int"]);
        assert_eq!(
            plan(&t, &request).err(),
            Some(LoadError::ColumnTypeMismatch {
                columns: 2,
                types: 1
            })
        );
    }

    #[test]
    fn test_plan_uses_leading_columns_when_named() {
        let t = table(&["a", "b", "c"], &[&[Some("1"), Some("2"), Some("3")]]);
        let request = LoadRequest::new("t", &["int", "int"]).with_columns(&["x", "y"]);
        let plan = plan(&t, &request).unwrap();
        assert_eq!(plan.columns, vec!["x", "y"]);
        assert_eq!(plan.types, vec![ColumnType::Int, ColumnType::Int]);
    }

    #[test]
    fn test_plan_rejects_too_many_columns() {
        let t = table(&["a"], &[&[Some("1")]]);
        let request = LoadRequest::new("t", &["int", "int"]).with_columns(&["x", "y"]);
        assert_eq!(
            plan(&t, &request).err(),
            Some(LoadError::TooManyColumns {
                requested: 2,
                available: 1
            })
        );
    }

    #[test]
    fn test_plan_rejects_non_alphanumeric_name() {
        let t = table(&["a"], &[&[Some("1")]]);
        for name in ["users table", "users;drop", ""] {
            let request = LoadRequest::new(name, &["int"]);
            assert_eq!(
                plan(&t, &request).err(),
                Some(LoadError::InvalidTableName(name.to_string()))
            );
        }
    }

    #[test]
    fn test_convert_cell() {
        let ez = DateFormat::MonthDayYear;
        assert_eq!(convert_cell("42", ColumnType::Int, ez), Some(Value::Integer(42)));
        assert_eq!(convert_cell("4.5", ColumnType::Int, ez), None);
        assert_eq!(convert_cell("4.5", ColumnType::Real, ez), Some(Value::Real(4.5)));
        assert_eq!(convert_cell("NaN", ColumnType::Real, ez), None);
        assert_eq!(convert_cell("inf", ColumnType::Real, ez), None);
        assert_eq!(
            convert_cell("rh", ColumnType::Text, ez),
            Some(Value::Text("rh".to_string()))
        );
        assert_eq!(
            convert_cell("3/09/16", ColumnType::Date, ez),
            Some(Value::Text("2016-3-09".to_string()))
        );
        assert_eq!(convert_cell("yesterday", ColumnType::Date, ez), None);
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("user_name"), "\"user_name\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }
}
