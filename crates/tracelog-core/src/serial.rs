use thiserror::Error;

/// Range members are padded to at least this many digits.
const SERIAL_WIDTH: usize = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SerialError {
    #[error("empty serial string")]
    Empty,

    #[error("'{0}' is not a serial number")]
    NotNumeric(String),

    #[error("'{0}' is not a range of the form A-B")]
    MalformedRange(String),

    #[error("range '{0}' runs backwards")]
    Reversed(String),
}

fn parse_number(token: &str, whole: &str) -> Result<u32, SerialError> {
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_digit()) {
        return Err(SerialError::NotNumeric(whole.to_string()));
    }
    token
        .parse()
        .map_err(|_| SerialError::NotNumeric(whole.to_string()))
}

/// Expand a serial field from the activity sheet.
///
/// A single token is returned as written (`"12"` stays `"12"`); an inclusive
/// range `"A-B"` is expanded in ascending order with each member zero-padded
/// to three digits.
pub fn parse_serials(serials: &str) -> Result<Vec<String>, SerialError> {
    let serials = serials.trim();
    if serials.is_empty() {
        return Err(SerialError::Empty);
    }

    let Some((start, end)) = serials.split_once('-') else {
        parse_number(serials, serials)?;
        return Ok(vec![serials.to_string()]);
    };

    if end.contains('-') {
        return Err(SerialError::MalformedRange(serials.to_string()));
    }
    let start = parse_number(start.trim(), serials)?;
    let end = parse_number(end.trim(), serials)?;
    if start > end {
        return Err(SerialError::Reversed(serials.to_string()));
    }

    Ok((start..=end)
        .map(|n| format!("{:0width$}", n, width = SERIAL_WIDTH))
        .collect())
}
