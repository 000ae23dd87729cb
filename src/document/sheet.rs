//! Sheet, row and cell model

use super::styles::StyleId;
use crate::error::{ExcelError, Result};
use crate::sizing::{DEFAULT_CHARACTER_WIDTH_PX, WIDTH_UNITS_PER_CHARACTER};
use crate::types::{format_general, CellValue};
use chrono::{DateTime, Local};
use std::collections::BTreeMap;

/// Maximum number of rows in a sheet
pub const MAX_ROWS: u32 = 1_048_576;
/// Maximum number of columns in a sheet
pub const MAX_COLUMNS: u16 = 16_384;
/// Width of a column that was never sized, in 1/256 character units
pub const DEFAULT_COLUMN_WIDTH: u32 = 2048;
/// Widest column the format allows, in characters
pub const MAX_COLUMN_WIDTH_CHARS: f64 = 255.0;
/// Maximum sheet name length
pub const MAX_SHEET_NAME_LEN: usize = 31;

const FORBIDDEN_SHEET_NAME_CHARS: [char; 7] = ['*', ':', '?', '/', '\\', '[', ']'];

/// Check a sheet name against the spreadsheet naming rules
pub fn validate_sheet_name(name: &str) -> Result<()> {
    let len = name.chars().count();
    if len == 0 || len > MAX_SHEET_NAME_LEN {
        return Err(ExcelError::ResourceAllocation(format!(
            "sheet name '{name}' must be 1 to {MAX_SHEET_NAME_LEN} characters"
        )));
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_SHEET_NAME_CHARS.contains(c)) {
        return Err(ExcelError::ResourceAllocation(format!(
            "sheet name '{name}' contains forbidden character '{c}'"
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(ExcelError::ResourceAllocation(format!(
            "sheet name {name:?} contains a control character"
        )));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(ExcelError::ResourceAllocation(format!(
            "sheet name '{name}' must not start or end with an apostrophe"
        )));
    }
    Ok(())
}

/// Frozen region: `col` columns and `row` rows stay visible while scrolling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreezePane {
    pub col: u16,
    pub row: u32,
}

/// A single cell: an optional style and an optional value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    style: Option<StyleId>,
    value: Option<CellValue>,
}

impl Cell {
    pub fn set_style(&mut self, style: StyleId) {
        self.style = Some(style);
    }

    pub fn style(&self) -> Option<StyleId> {
        self.style
    }

    pub fn set_string(&mut self, value: impl Into<String>) {
        self.value = Some(CellValue::String(value.into()));
    }

    pub fn set_number(&mut self, value: f64) {
        self.value = Some(CellValue::Number(value));
    }

    /// Stored as the Excel serial date of the local wall-clock time
    pub fn set_date(&mut self, value: DateTime<Local>) {
        self.value = Some(CellValue::Date(value));
    }

    pub fn set_bool(&mut self, value: bool) {
        self.value = Some(CellValue::Bool(value));
    }

    pub fn value(&self) -> Option<&CellValue> {
        self.value.as_ref()
    }
}

/// A row of cells keyed by 0-based column index
#[derive(Debug, Clone, Default)]
pub struct Row {
    cells: BTreeMap<u16, Cell>,
}

impl Row {
    /// Create (or reset) the cell at `col`
    pub fn create_cell(&mut self, col: u16) -> Result<&mut Cell> {
        if col >= MAX_COLUMNS {
            return Err(ExcelError::ResourceAllocation(format!(
                "column {col} exceeds the {MAX_COLUMNS} column limit"
            )));
        }
        let cell = self.cells.entry(col).or_default();
        *cell = Cell::default();
        Ok(cell)
    }

    pub fn cell(&self, col: u16) -> Option<&Cell> {
        self.cells.get(&col)
    }

    /// Cells in column order
    pub fn cells(&self) -> impl Iterator<Item = (u16, &Cell)> {
        self.cells.iter().map(|(col, cell)| (*col, cell))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Per-style rendering data needed to measure cell content
#[derive(Debug, Clone, Default)]
pub struct CellMetrics {
    pub(crate) font_scale: Vec<f64>,
    pub(crate) format_codes: Vec<Option<String>>,
}

impl CellMetrics {
    fn scale(&self, style: Option<StyleId>) -> f64 {
        style
            .and_then(|id| self.font_scale.get(id.0).copied())
            .unwrap_or(1.0)
    }

    fn format_code(&self, style: Option<StyleId>) -> Option<&str> {
        style
            .and_then(|id| self.format_codes.get(id.0))
            .and_then(|code| code.as_deref())
    }

    /// Rendered width of a cell, in characters of the default font
    pub fn measure(&self, cell: &Cell) -> Option<f64> {
        let chars = match cell.value.as_ref()? {
            CellValue::String(s) => s.lines().map(|line| line.chars().count()).max().unwrap_or(0),
            CellValue::Number(n) => match self.format_code(cell.style) {
                Some(code) if n.is_finite() && !code.eq_ignore_ascii_case("General") => {
                    rendered_number_len(code, *n)
                }
                _ => format_general(*n).chars().count(),
            },
            CellValue::Bool(b) => if *b { 4 } else { 5 },
            CellValue::Date(d) => match self.format_code(cell.style) {
                Some(code) if code != "General" => rendered_format_len(code),
                _ => format_general(crate::types::excel_serial(&d.naive_local()))
                    .chars()
                    .count(),
            },
        };
        Some(chars as f64 * self.scale(cell.style))
    }
}

/// Visible length of a format code: quotes, escapes and bracketed sections
/// (colors, locales) do not render
fn rendered_format_len(code: &str) -> usize {
    let mut len = 0;
    let mut in_brackets = false;
    let mut chars = code.chars();
    while let Some(c) = chars.next() {
        match c {
            '[' => in_brackets = true,
            ']' => in_brackets = false,
            _ if in_brackets => {}
            '"' => {}
            '\\' => {
                if chars.next().is_some() {
                    len += 1;
                }
            }
            _ => len += 1,
        }
    }
    len
}

/// Sections of a format code (`positive;negative;zero;text`)
fn format_sections(code: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut in_brackets = false;
    for (i, c) in code.char_indices() {
        match c {
            '"' if !in_brackets => in_quotes = !in_quotes,
            '[' if !in_quotes => in_brackets = true,
            ']' if !in_quotes => in_brackets = false,
            ';' if !in_quotes && !in_brackets => {
                sections.push(&code[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    sections.push(&code[start..]);
    sections
}

/// Length of `n` rendered with a number format code: digit placeholders,
/// thousands separators, decimal places, percent scaling and literal text
fn rendered_number_len(code: &str, n: f64) -> usize {
    let general = format_general(n).chars().count();
    let sections = format_sections(code);
    let (section, sign) = match sections.get(1) {
        Some(section) if n < 0.0 && !section.is_empty() => (*section, 0),
        _ => (sections[0], usize::from(n < 0.0)),
    };
    if section.to_ascii_lowercase().contains("general") {
        return general;
    }

    let mut literal = 0;
    let mut int_places = 0;
    let mut int_zeros = 0;
    let mut decimals = 0;
    let mut percent = 0;
    let mut grouping = false;
    let mut seen_point = false;
    let mut scientific = false;
    let mut in_quotes = false;
    let mut in_brackets = false;
    let mut chars = section.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            _ if in_quotes => literal += 1,
            '[' => in_brackets = true,
            ']' => in_brackets = false,
            _ if in_brackets => {}
            '\\' | '_' => {
                if chars.next().is_some() {
                    literal += 1;
                }
            }
            '*' => {
                chars.next();
            }
            '0' | '#' | '?' if seen_point => decimals += 1,
            '0' | '#' | '?' => {
                int_places += 1;
                if c != '#' {
                    int_zeros += 1;
                }
            }
            '.' if !seen_point => seen_point = true,
            ',' if !seen_point && int_places > 0 => grouping = true,
            '%' => {
                percent += 1;
                literal += 1;
            }
            'E' | 'e' => scientific = true,
            _ => literal += 1,
        }
    }
    if scientific || int_places + decimals == 0 {
        return general.max(literal);
    }

    let scaled = n.abs() * 100f64.powi(percent);
    let rendered = format!("{scaled:.decimals$}");
    let int_part = rendered.split('.').next().unwrap_or_default();
    let int_digits = if int_part == "0" { 0 } else { int_part.len() }.max(int_zeros);
    let separators = if grouping && int_digits > 0 {
        (int_digits - 1) / 3
    } else {
        0
    };
    sign + int_digits + separators + usize::from(seen_point) + decimals + literal
}

/// A worksheet
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    rows: BTreeMap<u32, Row>,
    freeze_pane: Option<FreezePane>,
    column_widths: BTreeMap<u16, u32>,
}

impl Sheet {
    pub(crate) fn new(name: &str) -> Self {
        Sheet {
            name: name.to_string(),
            rows: BTreeMap::new(),
            freeze_pane: None,
            column_widths: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create (or reset) the row at 0-based index `row`
    pub fn create_row(&mut self, row: u32) -> Result<&mut Row> {
        if row >= MAX_ROWS {
            return Err(ExcelError::ResourceAllocation(format!(
                "row {row} exceeds the {MAX_ROWS} row limit"
            )));
        }
        let entry = self.rows.entry(row).or_default();
        *entry = Row::default();
        Ok(entry)
    }

    pub fn row(&self, row: u32) -> Option<&Row> {
        self.rows.get(&row)
    }

    /// Rows in index order
    pub fn rows(&self) -> impl Iterator<Item = (u32, &Row)> {
        self.rows.iter().map(|(index, row)| (*index, row))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Freeze the first `col` columns and `row` rows
    pub fn create_freeze_pane(&mut self, col: u16, row: u32) {
        self.freeze_pane = if col == 0 && row == 0 {
            None
        } else {
            Some(FreezePane { col, row })
        };
    }

    pub fn freeze_pane(&self) -> Option<FreezePane> {
        self.freeze_pane
    }

    /// Width of `col` in 1/256 character units
    pub fn column_width(&self, col: u16) -> u32 {
        self.column_widths
            .get(&col)
            .copied()
            .unwrap_or(DEFAULT_COLUMN_WIDTH)
    }

    pub fn set_column_width(&mut self, col: u16, units: u32) {
        let max = (MAX_COLUMN_WIDTH_CHARS * f64::from(WIDTH_UNITS_PER_CHARACTER)) as u32;
        self.column_widths.insert(col, units.min(max));
    }

    pub fn column_width_in_pixels(&self, col: u16) -> f64 {
        f64::from(self.column_width(col)) / f64::from(WIDTH_UNITS_PER_CHARACTER)
            * DEFAULT_CHARACTER_WIDTH_PX
    }

    /// Explicitly sized columns in column order
    pub fn column_widths(&self) -> impl Iterator<Item = (u16, u32)> + '_ {
        self.column_widths.iter().map(|(col, units)| (*col, *units))
    }

    /// Size `col` to its widest rendered cell plus `padding_chars`.
    ///
    /// Returns the new width, or `None` when the column has no content and
    /// keeps its current width.
    pub fn auto_size_column(
        &mut self,
        col: u16,
        metrics: &CellMetrics,
        padding_chars: f64,
    ) -> Option<u32> {
        let widest = self
            .rows
            .values()
            .filter_map(|row| row.cell(col))
            .filter_map(|cell| metrics.measure(cell))
            .fold(None, |acc: Option<f64>, width| {
                Some(acc.map_or(width, |a| a.max(width)))
            })?;
        let chars = (widest + padding_chars).min(MAX_COLUMN_WIDTH_CHARS);
        let units = (chars * f64::from(WIDTH_UNITS_PER_CHARACTER)).round() as u32;
        self.set_column_width(col, units);
        Some(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_name_rules() {
        assert!(validate_sheet_name("MyList").is_ok());
        assert!(validate_sheet_name("").is_err());
        assert!(validate_sheet_name(&"x".repeat(32)).is_err());
        assert!(validate_sheet_name(&"x".repeat(31)).is_ok());
        assert!(validate_sheet_name("a/b").is_err());
        assert!(validate_sheet_name("[data]").is_err());
        assert!(validate_sheet_name("'quoted'").is_err());
        assert!(validate_sheet_name("tab\there").is_err());
    }

    #[test]
    fn test_rows_and_cells() {
        let mut sheet = Sheet::new("Sheet1");
        let row = sheet.create_row(2).unwrap();
        row.create_cell(1).unwrap().set_string("b");
        row.create_cell(0).unwrap().set_number(1.0);

        let row = sheet.row(2).unwrap();
        let cols: Vec<u16> = row.cells().map(|(col, _)| col).collect();
        assert_eq!(cols, vec![0, 1]);
        assert_eq!(row.cell(1).unwrap().value(), Some(&CellValue::from("b")));
        assert!(sheet.row(0).is_none());
    }

    #[test]
    fn test_limits() {
        let mut sheet = Sheet::new("Sheet1");
        assert!(matches!(
            sheet.create_row(MAX_ROWS),
            Err(ExcelError::ResourceAllocation(_))
        ));
        let row = sheet.create_row(MAX_ROWS - 1).unwrap();
        assert!(row.create_cell(MAX_COLUMNS).is_err());
        assert!(row.create_cell(MAX_COLUMNS - 1).is_ok());
    }

    #[test]
    fn test_style_only_cell() {
        let mut row = Row::default();
        let cell = row.create_cell(0).unwrap();
        cell.set_style(StyleId(3));
        assert_eq!(cell.style(), Some(StyleId(3)));
        assert!(cell.value().is_none());
    }

    #[test]
    fn test_freeze_pane() {
        let mut sheet = Sheet::new("Sheet1");
        sheet.create_freeze_pane(0, 1);
        assert_eq!(sheet.freeze_pane(), Some(FreezePane { col: 0, row: 1 }));
        sheet.create_freeze_pane(0, 0);
        assert_eq!(sheet.freeze_pane(), None);
    }

    #[test]
    fn test_auto_size_column() {
        let mut sheet = Sheet::new("Sheet1");
        sheet.create_row(0).unwrap().create_cell(0).unwrap().set_string("Name");
        sheet.create_row(1).unwrap().create_cell(0).unwrap().set_string("Peter");
        sheet.create_row(2).unwrap().create_cell(0).unwrap().set_style(StyleId(0));

        let metrics = CellMetrics::default();
        assert_eq!(sheet.auto_size_column(0, &metrics, 1.0), Some(6 * 256));
        assert_eq!(sheet.column_width(0), 6 * 256);
        assert!((sheet.column_width_in_pixels(0) - 6.0 * 7.0017).abs() < 1e-9);

        assert_eq!(sheet.auto_size_column(5, &metrics, 1.0), None);
        assert_eq!(sheet.column_width(5), DEFAULT_COLUMN_WIDTH);
    }

    #[test]
    fn test_measure_dates_by_format() {
        let date = chrono::NaiveDate::from_ymd_opt(2019, 11, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_local_timezone(Local)
            .earliest()
            .unwrap();
        let mut cell = Cell::default();
        cell.set_date(date);

        let metrics = CellMetrics {
            font_scale: vec![1.0],
            format_codes: vec![Some("yyyy-mm-dd".to_string())],
        };
        assert_eq!(metrics.measure(&cell), Some(5.0));
        cell.set_style(StyleId(0));
        assert_eq!(metrics.measure(&cell), Some(10.0));
    }

    #[test]
    fn test_rendered_number_len() {
        assert_eq!(rendered_number_len("#,##0.00", 1234567.0), 12);
        assert_eq!(rendered_number_len("0%", 0.25), 3);
        assert_eq!(rendered_number_len("0.0", -3.14), 4);
        assert_eq!(rendered_number_len("\"$\"#,##0", 1000.0), 6);
        assert_eq!(rendered_number_len("#.00", 0.5), 3);
        assert_eq!(rendered_number_len("0.00;(0.00)", -2.5), 6);
        assert_eq!(rendered_number_len("[Red]000", 7.0), 3);
        assert_eq!(rendered_number_len("General", 1234567.0), 7);
        assert_eq!(rendered_number_len("0.00E+00", 12345.0), 5);
    }

    #[test]
    fn test_measure_numbers_by_format() {
        let mut cell = Cell::default();
        cell.set_number(1234567.0);

        let metrics = CellMetrics {
            font_scale: vec![1.0],
            format_codes: vec![Some("#,##0.00".to_string())],
        };
        assert_eq!(metrics.measure(&cell), Some(7.0));
        cell.set_style(StyleId(0));
        assert_eq!(metrics.measure(&cell), Some(12.0));
    }

    #[test]
    fn test_rendered_format_len() {
        assert_eq!(rendered_format_len("yyyy-mm-dd"), 10);
        assert_eq!(rendered_format_len("[Red]0.00"), 4);
        assert_eq!(rendered_format_len("\"at\" h"), 4);
    }
}
