//! Type definitions for cell values and cell references

use chrono::{DateTime, Datelike, Local, NaiveDateTime, Timelike};
use std::fmt;

/// Days between 0001-01-01 (CE day 1) and the Excel 1900 epoch (1899-12-30).
const EXCEL_EPOCH_DAYS_FROM_CE: i64 = 693_594;
const SECONDS_PER_DAY: f64 = 86_400.0;
/// Serial of 1900-03-01, the first day Excel numbers correctly
const FIRST_SERIAL_AFTER_LEAP_BUG: i64 = 61;

/// Value kinds a column can be declared with
///
/// The set is closed: every kind has exactly one extraction coercion and one
/// cell-write strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Text cells
    String,
    /// Numeric cells (stored as `f64`)
    Number,
    /// Date/time cells (stored as Excel serial dates)
    Date,
    /// Boolean cells
    Boolean,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Date => "date",
            ValueKind::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// Represents a single typed value written into a cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// String value
    String(String),
    /// Numeric value
    Number(f64),
    /// Date/time value in the local time zone
    Date(DateTime<Local>),
    /// Boolean value
    Bool(bool),
}

impl CellValue {
    /// The value kind this value belongs to
    pub fn kind(&self) -> ValueKind {
        match self {
            CellValue::String(_) => ValueKind::String,
            CellValue::Number(_) => ValueKind::Number,
            CellValue::Date(_) => ValueKind::Date,
            CellValue::Bool(_) => ValueKind::Boolean,
        }
    }

    /// Try to get the text of a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to convert to float (dates convert to their Excel serial number)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Date(d) => Some(excel_serial(&d.naive_local())),
            _ => None,
        }
    }

    /// Try to get the boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get the date value
    pub fn as_date(&self) -> Option<&DateTime<Local>> {
        match self {
            CellValue::Date(d) => Some(d),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => f.write_str(s),
            CellValue::Number(n) => f.write_str(&format_general(*n)),
            CellValue::Date(d) => write!(f, "{}", d.naive_local()),
            CellValue::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Number(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<DateTime<Local>> for CellValue {
    fn from(d: DateTime<Local>) -> Self {
        CellValue::Date(d)
    }
}

/// Numeric field types a number column accepts
///
/// Cells store `f64`, so 64-bit and wider integers above 2^53 lose precision
/// the same way they do in Excel.
pub trait NumericValue {
    fn to_f64(self) -> f64;
}

macro_rules! impl_numeric_value {
    ($($t:ty),*) => {
        $(
            impl NumericValue for $t {
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_numeric_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

/// Convert a wall-clock date/time to an Excel serial date (1900 date system)
///
/// Excel counts a nonexistent 1900-02-29, so serials before 1900-03-01 are one
/// lower than the plain day count: 1900-01-01 is `1.0`, 1900-03-01 is `61.0`.
/// Dates before 1900-01-01 have no serial and come out negative.
pub fn excel_serial(datetime: &NaiveDateTime) -> f64 {
    let mut days = i64::from(datetime.date().num_days_from_ce()) - EXCEL_EPOCH_DAYS_FROM_CE;
    if days < FIRST_SERIAL_AFTER_LEAP_BUG {
        days -= 1;
    }
    let time = datetime.time();
    let seconds = f64::from(time.num_seconds_from_midnight())
        + f64::from(time.nanosecond()) / 1_000_000_000.0;
    days as f64 + seconds / SECONDS_PER_DAY
}

/// Render a number the way the `General` format displays it
pub fn format_general(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        let mut buffer = itoa::Buffer::new();
        buffer.format(n as i64).to_string()
    } else {
        n.to_string()
    }
}

/// Convert a 0-based column index to Excel letters (0 -> A, 25 -> Z, 26 -> AA)
pub fn column_letter(col: u16) -> String {
    let mut result = String::new();
    let mut col = u32::from(col) + 1;

    while col > 0 {
        col -= 1;
        result.insert(0, (b'A' + (col % 26) as u8) as char);
        col /= 26;
    }

    result
}

/// Get Excel-style cell reference (e.g., "A1", "B2") for 0-based coordinates
pub fn cell_reference(row: u32, col: u16) -> String {
    let mut buffer = itoa::Buffer::new();
    let mut reference = column_letter(col);
    reference.push_str(buffer.format(u64::from(row) + 1));
    reference
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_cell_reference() {
        assert_eq!(cell_reference(0, 0), "A1");
        assert_eq!(cell_reference(0, 25), "Z1");
        assert_eq!(cell_reference(0, 26), "AA1");
        assert_eq!(cell_reference(99, 1), "B100");
    }

    #[test]
    fn test_excel_serial() {
        let midnight = NaiveDate::from_ymd_opt(2019, 11, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(excel_serial(&midnight), 43770.0);

        let noon = NaiveDate::from_ymd_opt(1970, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(excel_serial(&noon), 25569.5);
    }

    #[test]
    fn test_excel_serial_early_1900() {
        let day = |y, m, d| {
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        };
        assert_eq!(excel_serial(&day(1900, 1, 1)), 1.0);
        assert_eq!(excel_serial(&day(1900, 2, 28)), 59.0);
        assert_eq!(excel_serial(&day(1900, 3, 1)), 61.0);
        assert_eq!(excel_serial(&day(1899, 12, 31)), 0.0);
        assert!(excel_serial(&day(1850, 6, 1)) < 0.0);

        let noon = NaiveDate::from_ymd_opt(1900, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(excel_serial(&noon), 1.5);
    }

    #[test]
    fn test_numeric_values() {
        assert_eq!(7u8.to_f64(), 7.0);
        assert_eq!((-3i64).to_f64(), -3.0);
        assert_eq!(42usize.to_f64(), 42.0);
        assert_eq!(1.5f32.to_f64(), 1.5);
    }

    #[test]
    fn test_format_general() {
        assert_eq!(format_general(42.0), "42");
        assert_eq!(format_general(-7.0), "-7");
        assert_eq!(format_general(1234.5), "1234.5");
    }

    #[test]
    fn test_cell_value_kinds() {
        assert_eq!(CellValue::from("x").kind(), ValueKind::String);
        assert_eq!(CellValue::from(1.5).kind(), ValueKind::Number);
        assert_eq!(CellValue::from(true).kind(), ValueKind::Boolean);
        assert_eq!(CellValue::from(true).to_string(), "TRUE");
        assert_eq!(CellValue::Number(3.0).as_f64(), Some(3.0));
        assert_eq!(CellValue::Bool(false).as_str(), None);
    }
}
