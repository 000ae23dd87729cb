//! Native font, cell-style and number-format resources and `xl/styles.xml`

use super::xml_writer::XmlWriter;
use crate::error::{ExcelError, Result};
use crate::style::{FillPattern, HorizontalAlignment, Rgb, VerticalAlignment};
use indexmap::{IndexMap, IndexSet};
use std::io::Write;

/// Engine default font family
pub const DEFAULT_FONT_NAME: &str = "Calibri";
/// Engine default font size in points
pub const DEFAULT_FONT_SIZE: u16 = 11;
/// First id available for custom number formats
pub const FIRST_CUSTOM_FORMAT_ID: u32 = 164;
/// Maximum length of a number format code
pub const MAX_FORMAT_CODE_LEN: usize = 255;

/// Built-in number formats that need no `numFmt` entry
const BUILTIN_FORMATS: [(&str, u32); 18] = [
    ("General", 0),
    ("0", 1),
    ("0.00", 2),
    ("#,##0", 3),
    ("#,##0.00", 4),
    ("0%", 9),
    ("0.00%", 10),
    ("0.00E+00", 11),
    ("m/d/yy", 14),
    ("d-mmm-yy", 15),
    ("d-mmm", 16),
    ("mmm-yy", 17),
    ("h:mm AM/PM", 18),
    ("h:mm:ss AM/PM", 19),
    ("h:mm", 20),
    ("h:mm:ss", 21),
    ("m/d/yy h:mm", 22),
    ("@", 49),
];

/// Handle to a font allocated in a [`Document`](super::Document)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontId(pub(crate) usize);

/// Handle to a cell style allocated in a [`Document`](super::Document)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyleId(pub(crate) usize);

/// A native font resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Font {
    name: String,
    size: u16,
    color: Option<Rgb>,
}

impl Default for Font {
    fn default() -> Self {
        Font {
            name: DEFAULT_FONT_NAME.to_string(),
            size: DEFAULT_FONT_SIZE,
            color: None,
        }
    }
}

impl Font {
    pub fn set_font_name(&mut self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(ExcelError::ResourceAllocation(
                "font name must not be empty".to_string(),
            ));
        }
        self.name = name.to_string();
        Ok(())
    }

    pub fn set_font_height_in_points(&mut self, points: u16) -> Result<()> {
        if points == 0 || points > 409 {
            return Err(ExcelError::ResourceAllocation(format!(
                "font size {points}pt is outside 1..=409"
            )));
        }
        self.size = points;
        Ok(())
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = Some(color);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u16 {
        self.size
    }

    pub fn color(&self) -> Option<Rgb> {
        self.color
    }

    fn write_xml<W: Write>(&self, writer: &mut XmlWriter<W>) -> Result<()> {
        writer.start_element("font")?;
        writer.close_start_tag()?;
        writer.start_element("sz")?;
        writer.attribute_int("val", u64::from(self.size))?;
        writer.close_empty()?;
        if let Some(color) = self.color {
            writer.start_element("color")?;
            writer.attribute("rgb", &color.to_argb_hex())?;
            writer.close_empty()?;
        }
        writer.start_element("name")?;
        writer.attribute("val", &self.name)?;
        writer.close_empty()?;
        writer.start_element("family")?;
        writer.attribute_int("val", 2)?;
        writer.close_empty()?;
        writer.end_element("font")
    }
}

/// A native cell style resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CellStyle {
    fill_pattern: Option<FillPattern>,
    fill_color: Option<Rgb>,
    horizontal_alignment: Option<HorizontalAlignment>,
    vertical_alignment: Option<VerticalAlignment>,
    font: Option<FontId>,
    data_format: u32,
}

impl CellStyle {
    pub fn set_fill_pattern(&mut self, pattern: FillPattern) {
        self.fill_pattern = Some(pattern);
    }

    pub fn set_fill_foreground_color(&mut self, color: Rgb) {
        self.fill_color = Some(color);
    }

    pub fn set_alignment(&mut self, alignment: HorizontalAlignment) {
        self.horizontal_alignment = Some(alignment);
    }

    pub fn set_vertical_alignment(&mut self, alignment: VerticalAlignment) {
        self.vertical_alignment = Some(alignment);
    }

    pub fn set_font(&mut self, font: FontId) {
        self.font = Some(font);
    }

    /// Set the number format id returned by [`Document::create_data_format`](super::Document::create_data_format)
    pub fn set_data_format(&mut self, format_id: u32) {
        self.data_format = format_id;
    }

    pub fn fill_pattern(&self) -> Option<FillPattern> {
        self.fill_pattern
    }

    pub fn fill_color(&self) -> Option<Rgb> {
        self.fill_color
    }

    pub fn alignment(&self) -> Option<HorizontalAlignment> {
        self.horizontal_alignment
    }

    pub fn vertical_alignment(&self) -> Option<VerticalAlignment> {
        self.vertical_alignment
    }

    pub fn font(&self) -> Option<FontId> {
        self.font
    }

    pub fn data_format(&self) -> u32 {
        self.data_format
    }

    fn has_fill(&self) -> bool {
        self.fill_pattern.is_some() || self.fill_color.is_some()
    }

    fn has_alignment(&self) -> bool {
        self.horizontal_alignment.is_some() || self.vertical_alignment.is_some()
    }
}

/// Number format registry: built-in codes map to their fixed ids, custom codes
/// are registered once each starting at [`FIRST_CUSTOM_FORMAT_ID`].
#[derive(Debug, Default)]
pub struct FormatRegistry {
    custom: IndexMap<String, u32>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        FormatRegistry::default()
    }

    /// Get the id of `code`, registering it if needed
    pub fn get_format(&mut self, code: &str) -> Result<u32> {
        if code.trim().is_empty() {
            return Err(ExcelError::ResourceAllocation(
                "number format code must not be empty".to_string(),
            ));
        }
        if code.chars().count() > MAX_FORMAT_CODE_LEN {
            return Err(ExcelError::ResourceAllocation(format!(
                "number format code exceeds {MAX_FORMAT_CODE_LEN} characters"
            )));
        }
        if let Some((_, id)) = BUILTIN_FORMATS.iter().find(|(builtin, _)| *builtin == code) {
            return Ok(*id);
        }
        if let Some(id) = self.custom.get(code) {
            return Ok(*id);
        }
        let id = FIRST_CUSTOM_FORMAT_ID + self.custom.len() as u32;
        self.custom.insert(code.to_string(), id);
        Ok(id)
    }

    /// Format code for `id`, if known
    pub fn format_code(&self, id: u32) -> Option<&str> {
        if let Some((code, _)) = BUILTIN_FORMATS.iter().find(|(_, builtin)| *builtin == id) {
            return Some(code);
        }
        self.custom
            .iter()
            .find(|(_, custom)| **custom == id)
            .map(|(code, _)| code.as_str())
    }

    pub fn custom_count(&self) -> usize {
        self.custom.len()
    }

    fn write_xml<W: Write>(&self, writer: &mut XmlWriter<W>) -> Result<()> {
        writer.start_element("numFmts")?;
        writer.attribute_int("count", self.custom.len() as u64)?;
        if self.custom.is_empty() {
            return writer.close_empty();
        }
        writer.close_start_tag()?;
        for (code, id) in &self.custom {
            writer.start_element("numFmt")?;
            writer.attribute_int("numFmtId", u64::from(*id))?;
            writer.attribute("formatCode", code)?;
            writer.close_empty()?;
        }
        writer.end_element("numFmts")
    }
}

/// Write `xl/styles.xml` for the allocated fonts and cell styles.
///
/// Index 0 of fonts and cell formats is the engine default; allocated
/// resources follow in allocation order. Fills 0 and 1 are reserved by the
/// format (`none`, `gray125`).
pub(crate) fn write_stylesheet<W: Write>(
    writer: &mut XmlWriter<W>,
    fonts: &[Font],
    cell_styles: &[CellStyle],
    formats: &FormatRegistry,
) -> Result<()> {
    let mut fills: IndexSet<(Option<FillPattern>, Option<Rgb>)> = IndexSet::new();
    fills.insert((Some(FillPattern::None), None));
    fills.insert((Some(FillPattern::Gray125), None));
    let fill_ids: Vec<usize> = cell_styles
        .iter()
        .map(|style| {
            if style.has_fill() {
                fills.insert_full((style.fill_pattern, style.fill_color)).0
            } else {
                0
            }
        })
        .collect();

    writer.declaration()?;
    writer.start_element("styleSheet")?;
    writer.attribute(
        "xmlns",
        "http://schemas.openxmlformats.org/spreadsheetml/2006/main",
    )?;
    writer.close_start_tag()?;

    formats.write_xml(writer)?;

    writer.start_element("fonts")?;
    writer.attribute_int("count", fonts.len() as u64 + 1)?;
    writer.close_start_tag()?;
    Font::default().write_xml(writer)?;
    for font in fonts {
        font.write_xml(writer)?;
    }
    writer.end_element("fonts")?;

    writer.start_element("fills")?;
    writer.attribute_int("count", fills.len() as u64)?;
    writer.close_start_tag()?;
    for (pattern, color) in &fills {
        writer.start_element("fill")?;
        writer.close_start_tag()?;
        writer.start_element("patternFill")?;
        writer.attribute(
            "patternType",
            pattern.unwrap_or(FillPattern::None).as_str(),
        )?;
        match color {
            Some(color) => {
                writer.close_start_tag()?;
                writer.start_element("fgColor")?;
                writer.attribute("rgb", &color.to_argb_hex())?;
                writer.close_empty()?;
                writer.start_element("bgColor")?;
                writer.attribute_int("indexed", 64)?;
                writer.close_empty()?;
                writer.end_element("patternFill")?;
            }
            None => writer.close_empty()?,
        }
        writer.end_element("fill")?;
    }
    writer.end_element("fills")?;

    writer.write_str(concat!(
        r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
        r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
    ))?;

    writer.start_element("cellXfs")?;
    writer.attribute_int("count", cell_styles.len() as u64 + 1)?;
    writer.close_start_tag()?;
    writer.write_str(r#"<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#)?;
    for (style, fill_id) in cell_styles.iter().zip(fill_ids) {
        writer.start_element("xf")?;
        writer.attribute_int("numFmtId", u64::from(style.data_format))?;
        writer.attribute_int("fontId", style.font.map_or(0, |font| font.0 as u64 + 1))?;
        writer.attribute_int("fillId", fill_id as u64)?;
        writer.attribute_int("borderId", 0)?;
        writer.attribute_int("xfId", 0)?;
        if style.data_format != 0 {
            writer.attribute("applyNumberFormat", "1")?;
        }
        if style.font.is_some() {
            writer.attribute("applyFont", "1")?;
        }
        if fill_id != 0 {
            writer.attribute("applyFill", "1")?;
        }
        if !style.has_alignment() {
            writer.close_empty()?;
            continue;
        }
        writer.attribute("applyAlignment", "1")?;
        writer.close_start_tag()?;
        writer.start_element("alignment")?;
        if let Some(alignment) = style.horizontal_alignment {
            writer.attribute("horizontal", alignment.as_str())?;
        }
        if let Some(alignment) = style.vertical_alignment {
            writer.attribute("vertical", alignment.as_str())?;
        }
        writer.close_empty()?;
        writer.end_element("xf")?;
    }
    writer.end_element("cellXfs")?;

    writer.write_str(concat!(
        r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
        r#"<dxfs count="0"/><tableStyles count="0"/>"#,
    ))?;
    writer.end_element("styleSheet")?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_registry() {
        let mut formats = FormatRegistry::new();
        assert_eq!(formats.get_format("General").unwrap(), 0);
        assert_eq!(formats.get_format("0.00").unwrap(), 2);
        assert_eq!(formats.get_format("yyyy-mm-dd").unwrap(), 164);
        assert_eq!(formats.get_format("hh:mm").unwrap(), 165);
        assert_eq!(formats.get_format("yyyy-mm-dd").unwrap(), 164);
        assert_eq!(formats.custom_count(), 2);
        assert_eq!(formats.format_code(164), Some("yyyy-mm-dd"));
        assert_eq!(formats.format_code(14), Some("m/d/yy"));
        assert_eq!(formats.format_code(999), None);
    }

    #[test]
    fn test_malformed_format_fails() {
        let mut formats = FormatRegistry::new();
        assert!(matches!(
            formats.get_format(""),
            Err(ExcelError::ResourceAllocation(_))
        ));
        assert!(formats.get_format(&"0".repeat(300)).is_err());
    }

    #[test]
    fn test_font_validation() {
        let mut font = Font::default();
        assert!(font.set_font_height_in_points(0).is_err());
        assert!(font.set_font_name("  ").is_err());
        font.set_font_height_in_points(14).unwrap();
        font.set_font_name("Arial").unwrap();
        assert_eq!(font.size(), 14);
        assert_eq!(font.name(), "Arial");
    }

    #[test]
    fn test_stylesheet_xml() {
        let mut header_font = Font::default();
        header_font.set_color(Rgb::WHITE);

        let mut header = CellStyle::default();
        header.set_fill_pattern(FillPattern::Solid);
        header.set_fill_foreground_color(Rgb::BLACK);
        header.set_alignment(HorizontalAlignment::Center);
        header.set_font(FontId(0));

        let mut formats = FormatRegistry::new();
        let mut dated = CellStyle::default();
        dated.set_data_format(formats.get_format("yyyy-mm-dd").unwrap());

        let mut output = Vec::new();
        write_stylesheet(
            &mut XmlWriter::new(&mut output),
            &[header_font],
            &[header, dated],
            &formats,
        )
        .unwrap();
        let xml = String::from_utf8(output).unwrap();

        assert!(xml.contains(r#"<numFmt numFmtId="164" formatCode="yyyy-mm-dd"/>"#));
        assert!(xml.contains(r#"<fonts count="2">"#));
        assert!(xml.contains(r#"<color rgb="FFFFFFFF"/>"#));
        assert!(xml.contains(r#"<fills count="3">"#));
        assert!(xml.contains(r#"<patternFill patternType="solid"><fgColor rgb="FF000000"/>"#));
        assert!(xml.contains(r#"<cellXfs count="3">"#));
        assert!(xml.contains(r#"<alignment horizontal="center"/>"#));
        assert!(xml.contains(r#"numFmtId="164" fontId="0" fillId="0""#));
    }
}
