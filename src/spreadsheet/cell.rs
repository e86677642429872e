use crate::error::TimesheetError;
use crate::spreadsheet::SpreadsheetError;
use chrono::Duration;
use chrono::NaiveDate;

/// Types of cell data in a worksheet part.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values stored as `0`/`1`
    Boolean,
    /// Plain numeric values
    Number,
    /// Date/time values stored as serial numbers
    NumberDateTime { is_1904: bool },
    /// Date values stored as serial numbers
    NumberDate { is_1904: bool },
    /// Time values stored as day fractions
    NumberTime,
    /// ISO 8601 date/time strings (`t="d"`)
    IsoDateTime,
    /// Inline or formula string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error values such as `#N/A`
    Error,
}

impl CellType {
    /// Maps built-in number format IDs to date and time types.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(Self::NumberDateTime { is_1904 }),
            "14" | "15" | "16" | "17" => Some(Self::NumberDate { is_1904 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(Self::NumberTime),
            _ => None,
        }
    }

    /// Detects date and time tokens in a custom number format code.
    /// Quoted literals, escaped characters and color or locale sections are ignored.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut bracket = None::<String>;
        let mut is_date = false;
        let mut is_time = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if bracket.is_none() => is_literal = true,
                _ if is_literal => (),

                // elapsed time sections such as [h]:mm, anything else is a color or locale
                ']' if bracket.is_some() => {
                    let section = bracket.take().unwrap_or_default().to_ascii_lowercase();
                    if !section.is_empty() && section.chars().all(|c| matches!(c, 'h' | 'm' | 's')) {
                        is_time = true;
                    }
                }
                '[' => bracket = Some(String::new()),
                _ if bracket.is_some() => {
                    if let Some(section) = bracket.as_mut() {
                        section.push(character);
                    }
                }

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time) {
            (true, true) => Self::NumberDateTime { is_1904 },
            (true, false) => Self::NumberDate { is_1904 },
            (false, true) => Self::NumberTime,
            (false, false) => Self::Number,
        }
    }
}

/// A single non-empty cell read from a worksheet.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    /// Cell text as it will appear in the table
    pub(crate) value: String,
}

/// Renders a raw worksheet value as the text shown in the table.
///
/// Shared string references must already be resolved by the caller.
pub(crate) fn to_text(kind: CellType, value: &str) -> Result<String, TimesheetError> {
    let text = match kind {
        CellType::Empty | CellType::Error => String::new(),
        CellType::Boolean => if value == "1" { "true" } else { "false" }.to_owned(),
        CellType::NumberDateTime { is_1904 } => to_datetime_string(value, is_1904)?,
        CellType::NumberDate { is_1904 } => to_date_string(value, is_1904)?,
        CellType::NumberTime => to_time_string(value)?,
        CellType::IsoDateTime => value.replace('T', " "),
        CellType::Number | CellType::InlineString | CellType::SharedString => value.to_owned(),
    };
    Ok(text)
}

/// Largest serial Excel stores, 9999-12-31
const MAX_SERIAL: f64 = 2_958_465.0;

/// Parses a serial date, rejecting values outside `0..=9999-12-31`.
fn to_serial(value: &str) -> Result<f64, TimesheetError> {
    let serial = value.parse::<f64>()?;
    if !serial.is_finite() || !(0.0..MAX_SERIAL + 1.0).contains(&serial) {
        Err(SpreadsheetError::SerialOutOfRangeError(value.to_owned()))?
    }
    Ok(serial)
}

/// Converts a serial day number to an ISO date string.
/// Serials below 60 are shifted for the phantom 1900-02-29 of the 1900 system.
fn to_date_string(value: &str, is_1904: bool) -> Result<String, TimesheetError> {
    let days = to_serial(value)?.trunc() as i64;
    let offset = if is_1904 {
        1462
    } else if days < 60 {
        1
    } else {
        0
    };
    let date = Duration::try_days(days + offset)
        .and_then(|delta| NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(delta))
        .ok_or_else(|| SpreadsheetError::SerialOutOfRangeError(value.to_owned()))?;
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Converts a day fraction to `HH:MM`, or `HH:MM:SS[.mmm]` when seconds are present.
/// Hours are not wrapped at 24 so elapsed durations keep their total.
fn to_time_string(value: &str) -> Result<String, TimesheetError> {
    let factor = value.parse::<f64>()?.abs();
    if !factor.is_finite() {
        Err(SpreadsheetError::SerialOutOfRangeError(value.to_owned()))?
    }
    let mut hours = (factor * 86_400_000f64).round() as i64;
    let milliseconds = hours % 1_000;
    hours /= 1_000;
    let seconds = hours % 60;
    hours /= 60;
    let minutes = hours % 60;
    hours /= 60;
    let timestamp = if milliseconds > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}.{milliseconds:03}")
    } else if seconds > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours:02}:{minutes:02}")
    };
    Ok(timestamp)
}

/// Converts a serial date-time to `YYYY-MM-DD HH:MM:SS`.
fn to_datetime_string(value: &str, is_1904: bool) -> Result<String, TimesheetError> {
    let date = to_date_string(value, is_1904)?;
    let serial = to_serial(value)?;
    let seconds = (serial.fract() * 86_400f64).round() as i64;
    Ok(format!(
        "{date} {:02}:{:02}:{:02}",
        seconds / 3600,
        seconds / 60 % 60,
        seconds % 60
    ))
}
