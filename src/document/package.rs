//! XLSX packaging: writes every part of the document into a ZIP container

use std::io::{Seek, Write};

use chrono::Utc;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use super::shared_strings::SharedStrings;
use super::sheet::Sheet;
use super::styles::write_stylesheet;
use super::xml_writer::XmlWriter;
use super::Document;
use crate::error::Result;
use crate::sizing::WIDTH_UNITS_PER_CHARACTER;
use crate::types::{cell_reference, excel_serial, CellValue};

const SPREADSHEETML_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>
<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>
</Relationships>"#;

const APPLICATION: &str = "excelgen";

/// Serialize `document` as an XLSX package into `writer`
pub(crate) fn write_package<W: Write + Seek>(document: &Document, writer: W) -> Result<()> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(6));

    let fallback;
    let sheet = match document.sheet() {
        Some(sheet) => sheet,
        None => {
            fallback = Sheet::new("Sheet1");
            &fallback
        }
    };

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(CONTENT_TYPES.as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(ROOT_RELS.as_bytes())?;

    zip.start_file("docProps/core.xml", options)?;
    write_core_props(&mut XmlWriter::new(&mut zip), document.title())?;

    zip.start_file("docProps/app.xml", options)?;
    write_app_props(&mut XmlWriter::new(&mut zip), sheet.name())?;

    zip.start_file("xl/workbook.xml", options)?;
    write_workbook_xml(&mut XmlWriter::new(&mut zip), sheet.name())?;

    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    zip.write_all(WORKBOOK_RELS.as_bytes())?;

    zip.start_file("xl/styles.xml", options)?;
    write_stylesheet(
        &mut XmlWriter::new(&mut zip),
        document.fonts(),
        document.cell_styles(),
        document.formats(),
    )?;

    let mut shared_strings = SharedStrings::new();
    zip.start_file("xl/worksheets/sheet1.xml", options)?;
    write_sheet_xml(&mut XmlWriter::new(&mut zip), sheet, &mut shared_strings)?;

    zip.start_file("xl/sharedStrings.xml", options)?;
    shared_strings.write_xml(&mut XmlWriter::new(&mut zip))?;

    zip.finish()?;
    Ok(())
}

fn write_core_props<W: Write>(writer: &mut XmlWriter<W>, title: &str) -> Result<()> {
    let now = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    writer.declaration()?;
    writer.start_element("cp:coreProperties")?;
    writer.attribute(
        "xmlns:cp",
        "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
    )?;
    writer.attribute("xmlns:dc", "http://purl.org/dc/elements/1.1/")?;
    writer.attribute("xmlns:dcterms", "http://purl.org/dc/terms/")?;
    writer.attribute("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance")?;
    writer.close_start_tag()?;
    writer.text_element("dc:title", title)?;
    writer.text_element("dc:creator", APPLICATION)?;
    writer.text_element("cp:lastModifiedBy", APPLICATION)?;
    for element in ["dcterms:created", "dcterms:modified"] {
        writer.start_element(element)?;
        writer.attribute("xsi:type", "dcterms:W3CDTF")?;
        writer.close_start_tag()?;
        writer.write_str(&now)?;
        writer.end_element(element)?;
    }
    writer.end_element("cp:coreProperties")?;
    writer.flush()
}

fn write_app_props<W: Write>(writer: &mut XmlWriter<W>, sheet_name: &str) -> Result<()> {
    writer.declaration()?;
    writer.start_element("Properties")?;
    writer.attribute(
        "xmlns",
        "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties",
    )?;
    writer.attribute(
        "xmlns:vt",
        "http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes",
    )?;
    writer.close_start_tag()?;
    writer.text_element("Application", APPLICATION)?;
    writer.text_element("DocSecurity", "0")?;
    writer.text_element("ScaleCrop", "false")?;
    writer.write_str(concat!(
        "<HeadingPairs><vt:vector size=\"2\" baseType=\"variant\">",
        "<vt:variant><vt:lpstr>Worksheets</vt:lpstr></vt:variant>",
        "<vt:variant><vt:i4>1</vt:i4></vt:variant>",
        "</vt:vector></HeadingPairs>",
        "<TitlesOfParts><vt:vector size=\"1\" baseType=\"lpstr\">",
    ))?;
    writer.text_element("vt:lpstr", sheet_name)?;
    writer.write_str("</vt:vector></TitlesOfParts>")?;
    writer.text_element("LinksUpToDate", "false")?;
    writer.text_element("SharedDoc", "false")?;
    writer.text_element("HyperlinksChanged", "false")?;
    writer.text_element("AppVersion", "1.0")?;
    writer.end_element("Properties")?;
    writer.flush()
}

fn write_workbook_xml<W: Write>(writer: &mut XmlWriter<W>, sheet_name: &str) -> Result<()> {
    writer.declaration()?;
    writer.start_element("workbook")?;
    writer.attribute("xmlns", SPREADSHEETML_NS)?;
    writer.attribute("xmlns:r", RELATIONSHIPS_NS)?;
    writer.close_start_tag()?;
    writer.write_str("<bookViews><workbookView activeTab=\"0\"/></bookViews>")?;
    writer.start_element("sheets")?;
    writer.close_start_tag()?;
    writer.start_element("sheet")?;
    writer.attribute("name", sheet_name)?;
    writer.attribute_int("sheetId", 1)?;
    writer.attribute("r:id", "rId1")?;
    writer.close_empty()?;
    writer.end_element("sheets")?;
    writer.end_element("workbook")?;
    writer.flush()
}

fn write_sheet_xml<W: Write>(
    writer: &mut XmlWriter<W>,
    sheet: &Sheet,
    shared_strings: &mut SharedStrings,
) -> Result<()> {
    writer.declaration()?;
    writer.start_element("worksheet")?;
    writer.attribute("xmlns", SPREADSHEETML_NS)?;
    writer.attribute("xmlns:r", RELATIONSHIPS_NS)?;
    writer.close_start_tag()?;

    writer.start_element("sheetViews")?;
    writer.close_start_tag()?;
    writer.start_element("sheetView")?;
    writer.attribute("tabSelected", "1")?;
    writer.attribute_int("workbookViewId", 0)?;
    match sheet.freeze_pane() {
        Some(pane) => {
            let active_pane = match (pane.col > 0, pane.row > 0) {
                (true, true) => "bottomRight",
                (true, false) => "topRight",
                _ => "bottomLeft",
            };
            writer.close_start_tag()?;
            writer.start_element("pane")?;
            if pane.col > 0 {
                writer.attribute_int("xSplit", u64::from(pane.col))?;
            }
            if pane.row > 0 {
                writer.attribute_int("ySplit", u64::from(pane.row))?;
            }
            writer.attribute("topLeftCell", &cell_reference(pane.row, pane.col))?;
            writer.attribute("activePane", active_pane)?;
            writer.attribute("state", "frozen")?;
            writer.close_empty()?;
            writer.start_element("selection")?;
            writer.attribute("pane", active_pane)?;
            writer.close_empty()?;
            writer.end_element("sheetView")?;
        }
        None => writer.close_empty()?,
    }
    writer.end_element("sheetViews")?;

    writer.start_element("sheetFormatPr")?;
    writer.attribute("defaultRowHeight", "15")?;
    writer.close_empty()?;

    let mut widths = sheet.column_widths().peekable();
    if widths.peek().is_some() {
        writer.start_element("cols")?;
        writer.close_start_tag()?;
        for (col, units) in widths {
            writer.start_element("col")?;
            writer.attribute_int("min", u64::from(col) + 1)?;
            writer.attribute_int("max", u64::from(col) + 1)?;
            writer.attribute_f64(
                "width",
                f64::from(units) / f64::from(WIDTH_UNITS_PER_CHARACTER),
            )?;
            writer.attribute("customWidth", "1")?;
            writer.close_empty()?;
        }
        writer.end_element("cols")?;
    }

    writer.start_element("sheetData")?;
    writer.close_start_tag()?;
    for (index, row) in sheet.rows() {
        writer.start_element("row")?;
        writer.attribute_int("r", u64::from(index) + 1)?;
        writer.close_start_tag()?;
        for (col, cell) in row.cells() {
            writer.start_element("c")?;
            writer.attribute("r", &cell_reference(index, col))?;
            if let Some(style) = cell.style() {
                writer.attribute_int("s", style.0 as u64 + 1)?;
            }
            match cell.value() {
                None => writer.close_empty()?,
                Some(CellValue::String(s)) => {
                    let string_index = shared_strings.add_string(s);
                    writer.attribute("t", "s")?;
                    writer.close_start_tag()?;
                    writer.start_element("v")?;
                    writer.close_start_tag()?;
                    writer.write_int(u64::from(string_index))?;
                    writer.end_element("v")?;
                    writer.end_element("c")?;
                }
                Some(CellValue::Number(n)) if !n.is_finite() => {
                    writer.attribute("t", "e")?;
                    writer.close_start_tag()?;
                    writer.text_element("v", "#NUM!")?;
                    writer.end_element("c")?;
                }
                Some(CellValue::Number(n)) => {
                    writer.close_start_tag()?;
                    writer.text_element("v", &n.to_string())?;
                    writer.end_element("c")?;
                }
                Some(CellValue::Date(d)) if excel_serial(&d.naive_local()) < 0.0 => {
                    writer.attribute("t", "e")?;
                    writer.close_start_tag()?;
                    writer.text_element("v", "#NUM!")?;
                    writer.end_element("c")?;
                }
                Some(CellValue::Date(d)) => {
                    writer.close_start_tag()?;
                    writer.text_element("v", &excel_serial(&d.naive_local()).to_string())?;
                    writer.end_element("c")?;
                }
                Some(CellValue::Bool(b)) => {
                    writer.attribute("t", "b")?;
                    writer.close_start_tag()?;
                    writer.text_element("v", if *b { "1" } else { "0" })?;
                    writer.end_element("c")?;
                }
            }
        }
        writer.end_element("row")?;
    }
    writer.end_element("sheetData")?;
    writer.end_element("worksheet")?;
    writer.flush()
}
