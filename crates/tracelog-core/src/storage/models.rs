use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::dates::DateFormat;
use crate::storage::loader::LoadError;

/// SQLite column types the loader knows how to convert into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Real,
    Text,
    /// Stored as text after date normalization.
    Date,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Int => "int",
            ColumnType::Real => "real",
            ColumnType::Text => "text",
            ColumnType::Date => "date",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "int" => Ok(ColumnType::Int),
            "real" => Ok(ColumnType::Real),
            "text" => Ok(ColumnType::Text),
            "date" => Ok(ColumnType::Date),
            other => Err(LoadError::InvalidTypeTag(other.to_string())),
        }
    }
}

/// A cleaned table ready for loading. `None` marks a missing value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl DataTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Option<String>>) {
        self.rows.push(row);
    }

    /// Read a headed CSV; empty cells and short rows become missing values.
    pub fn from_csv_path(path: &Path) -> Result<Self, crate::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut table = DataTable::new(headers);

        for record in reader.records() {
            let record = record?;
            let row = (0..table.headers.len())
                .map(|i| match record.get(i) {
                    Some(cell) if !cell.is_empty() => Some(cell.to_string()),
                    _ => None,
                })
                .collect();
            table.push_row(row);
        }

        Ok(table)
    }

    /// Number of cells that are missing, counting short rows.
    pub fn missing_values(&self) -> usize {
        self.rows
            .iter()
            .map(|row| {
                let short = self.headers.len().saturating_sub(row.len());
                row.iter().filter(|cell| cell.is_none()).count() + short
            })
            .sum()
    }
}

/// What to create and how to fill it.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub table_name: String,
    /// Names for the first `columns.len()` table columns; `None` uses the
    /// table's own headers.
    pub columns: Option<Vec<String>>,
    /// Type tags, one per column: `int`, `real`, `text` or `date`.
    pub types: Vec<String>,
    /// Drop an existing table of the same name first.
    pub replace: bool,
    pub date_format: DateFormat,
}

impl LoadRequest {
    pub fn new(table_name: &str, types: &[&str]) -> Self {
        Self {
            table_name: table_name.to_string(),
            columns: None,
            types: types.iter().map(|t| t.to_string()).collect(),
            replace: true,
            date_format: DateFormat::default(),
        }
    }

    pub fn with_columns(mut self, columns: &[&str]) -> Self {
        self.columns = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn keep_existing(mut self) -> Self {
        self.replace = false;
        self
    }

    pub fn with_date_format(mut self, date_format: DateFormat) -> Self {
        self.date_format = date_format;
        self
    }
}
