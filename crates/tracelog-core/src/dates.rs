use serde::Deserialize;
use thiserror::Error;

/// How dates in the activity sheet are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// `m/d/yy`, the way dates are typed into the activity sheet.
    #[default]
    MonthDayYear,
    /// Already in the shape SQLite should store; left untouched.
    Passthrough,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DateError {
    #[error("expected a m/d/yy date, got '{0}'")]
    Malformed(String),
}

/// Turn `m/d/yy` into `20yy-m-d`.
///
/// The pieces are concatenated as typed: no padding is added and the
/// result is not checked against a calendar.
pub fn normalize_date(date: &str, format: DateFormat) -> Result<String, DateError> {
    match format {
        DateFormat::Passthrough => Ok(date.to_string()),
        DateFormat::MonthDayYear => {
            let parts: Vec<&str> = date.split('/').collect();
            match parts.as_slice() {
                [m, d, y] => Ok(format!("20{}-{}-{}", y, m, d)),
                _ => Err(DateError::Malformed(date.to_string())),
            }
        }
    }
}
