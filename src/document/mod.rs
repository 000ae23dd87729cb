//! In-memory single-sheet XLSX document
//!
//! [`Document`] owns the font, cell-style and number-format resources together
//! with one [`Sheet`]. Resources are allocated through the document and
//! referenced from cells by id; [`Document::write_to`] packages everything as
//! an XLSX file.

mod package;
mod shared_strings;
mod sheet;
mod styles;
mod xml_writer;

pub use shared_strings::SharedStrings;
pub use sheet::{
    validate_sheet_name, Cell, CellMetrics, FreezePane, Row, Sheet, DEFAULT_COLUMN_WIDTH,
    MAX_COLUMNS, MAX_ROWS, MAX_SHEET_NAME_LEN,
};
pub use styles::{
    CellStyle, Font, FontId, FormatRegistry, StyleId, DEFAULT_FONT_NAME, DEFAULT_FONT_SIZE,
    FIRST_CUSTOM_FORMAT_ID,
};
pub use xml_writer::XmlWriter;

use crate::error::{ExcelError, Result};
use std::io::{Cursor, Seek, Write};

/// Maximum number of cell styles per document
pub const MAX_CELL_STYLES: usize = 64_000;
/// Maximum number of fonts per document
pub const MAX_FONTS: usize = 1_024;

/// A workbook with a single sheet
#[derive(Debug, Default)]
pub struct Document {
    title: String,
    fonts: Vec<Font>,
    cell_styles: Vec<CellStyle>,
    formats: FormatRegistry,
    sheet: Option<Sheet>,
}

impl Document {
    pub fn new() -> Self {
        Document::default()
    }

    /// Document title, written to the package's core properties
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Allocate a new font with the engine defaults
    pub fn create_font(&mut self) -> Result<FontId> {
        if self.fonts.len() >= MAX_FONTS {
            return Err(ExcelError::ResourceAllocation(format!(
                "font limit of {MAX_FONTS} reached"
            )));
        }
        self.fonts.push(Font::default());
        Ok(FontId(self.fonts.len() - 1))
    }

    pub fn font(&self, id: FontId) -> Result<&Font> {
        self.fonts
            .get(id.0)
            .ok_or_else(|| ExcelError::ResourceAllocation(format!("unknown font {}", id.0)))
    }

    pub fn font_mut(&mut self, id: FontId) -> Result<&mut Font> {
        self.fonts
            .get_mut(id.0)
            .ok_or_else(|| ExcelError::ResourceAllocation(format!("unknown font {}", id.0)))
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    /// Allocate a new cell style with no attributes set
    pub fn create_cell_style(&mut self) -> Result<StyleId> {
        if self.cell_styles.len() >= MAX_CELL_STYLES {
            return Err(ExcelError::ResourceAllocation(format!(
                "cell style limit of {MAX_CELL_STYLES} reached"
            )));
        }
        self.cell_styles.push(CellStyle::default());
        Ok(StyleId(self.cell_styles.len() - 1))
    }

    pub fn cell_style(&self, id: StyleId) -> Result<&CellStyle> {
        self.cell_styles
            .get(id.0)
            .ok_or_else(|| ExcelError::ResourceAllocation(format!("unknown cell style {}", id.0)))
    }

    pub fn cell_style_mut(&mut self, id: StyleId) -> Result<&mut CellStyle> {
        self.cell_styles
            .get_mut(id.0)
            .ok_or_else(|| ExcelError::ResourceAllocation(format!("unknown cell style {}", id.0)))
    }

    pub fn cell_style_count(&self) -> usize {
        self.cell_styles.len()
    }

    /// Resolve a number format code to its id, registering custom codes
    pub fn create_data_format(&mut self, code: &str) -> Result<u32> {
        self.formats.get_format(code)
    }

    /// Format code registered under `id`
    pub fn data_format_code(&self, id: u32) -> Option<&str> {
        self.formats.format_code(id)
    }

    /// Create the document's sheet
    pub fn create_sheet(&mut self, name: &str) -> Result<&mut Sheet> {
        validate_sheet_name(name)?;
        if let Some(existing) = &self.sheet {
            return Err(ExcelError::ResourceAllocation(format!(
                "document already has sheet '{}'",
                existing.name()
            )));
        }
        Ok(self.sheet.insert(Sheet::new(name)))
    }

    pub fn sheet(&self) -> Option<&Sheet> {
        self.sheet.as_ref()
    }

    pub fn sheet_mut(&mut self) -> Option<&mut Sheet> {
        self.sheet.as_mut()
    }

    /// Rendering data of every allocated cell style, used to measure content
    pub fn cell_metrics(&self) -> CellMetrics {
        let font_scale = self
            .cell_styles
            .iter()
            .map(|style| {
                style
                    .font()
                    .and_then(|id| self.fonts.get(id.0))
                    .map_or(1.0, |font| {
                        f64::from(font.size()) / f64::from(DEFAULT_FONT_SIZE)
                    })
            })
            .collect();
        let format_codes = self
            .cell_styles
            .iter()
            .map(|style| match style.data_format() {
                0 => None,
                id => self.formats.format_code(id).map(str::to_string),
            })
            .collect();
        CellMetrics {
            font_scale,
            format_codes,
        }
    }

    /// Size `col` of the sheet to its content plus `padding_chars`.
    ///
    /// Returns `None` when there is no sheet or the column is empty.
    pub fn auto_size_column(&mut self, col: u16, padding_chars: f64) -> Option<u32> {
        let metrics = self.cell_metrics();
        self.sheet
            .as_mut()?
            .auto_size_column(col, &metrics, padding_chars)
    }

    /// Serialize the document as XLSX into `writer`
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        package::write_package(self, writer)
    }

    /// Serialize the document as XLSX into memory
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Release the document and its resources
    pub fn close(self) {
        log::debug!(
            "closing document '{}' ({} fonts, {} styles)",
            self.title,
            self.fonts.len(),
            self.cell_styles.len()
        );
    }

    pub(crate) fn fonts(&self) -> &[Font] {
        &self.fonts
    }

    pub(crate) fn cell_styles(&self) -> &[CellStyle] {
        &self.cell_styles
    }

    pub(crate) fn formats(&self) -> &FormatRegistry {
        &self.formats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_allocation() {
        let mut doc = Document::new();
        let font = doc.create_font().unwrap();
        doc.font_mut(font).unwrap().set_font_height_in_points(22).unwrap();

        let style = doc.create_cell_style().unwrap();
        doc.cell_style_mut(style).unwrap().set_font(font);

        assert_eq!(doc.font_count(), 1);
        assert_eq!(doc.cell_style_count(), 1);
        assert_eq!(doc.cell_style(style).unwrap().font(), Some(font));
        assert!(doc.font(FontId(7)).is_err());
    }

    #[test]
    fn test_font_limit() {
        let mut doc = Document::new();
        for _ in 0..MAX_FONTS {
            doc.create_font().unwrap();
        }
        assert!(matches!(
            doc.create_font(),
            Err(ExcelError::ResourceAllocation(_))
        ));
    }

    #[test]
    fn test_single_sheet() {
        let mut doc = Document::new();
        assert!(doc.create_sheet("bad:name").is_err());
        doc.create_sheet("MyList").unwrap();
        assert!(matches!(
            doc.create_sheet("Other"),
            Err(ExcelError::ResourceAllocation(_))
        ));
        assert_eq!(doc.sheet().unwrap().name(), "MyList");
    }

    #[test]
    fn test_auto_size_scales_with_font() {
        let mut doc = Document::new();
        let font = doc.create_font().unwrap();
        doc.font_mut(font).unwrap().set_font_height_in_points(22).unwrap();
        let big = doc.create_cell_style().unwrap();
        doc.cell_style_mut(big).unwrap().set_font(font);

        let sheet = doc.create_sheet("Sheet1").unwrap();
        let row = sheet.create_row(0).unwrap();
        let cell = row.create_cell(0).unwrap();
        cell.set_style(big);
        cell.set_string("abcd");
        row.create_cell(1).unwrap().set_string("abcd");

        assert_eq!(doc.auto_size_column(0, 1.0), Some(9 * 256));
        assert_eq!(doc.auto_size_column(1, 1.0), Some(5 * 256));
        assert_eq!(doc.auto_size_column(2, 1.0), None);
    }

    #[test]
    fn test_to_bytes_is_zip() {
        let mut doc = Document::new();
        doc.set_title("Empty.xlsx");
        let bytes = doc.to_bytes().unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
