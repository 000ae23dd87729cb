//! One-shot workbook generation from a [`WorkbookSpec`] and a record slice

use crate::config::WorkbookSpec;
use crate::document::{Document, FontId, StyleId};
use crate::error::Result;
use crate::sizing::SizingPolicy;
use crate::style::{FontSpec, StyleSpec};
use indexmap::IndexSet;

/// Turns a [`WorkbookSpec`] and its records into a [`Document`]
///
/// A generator is consumed by [`generate`](Self::generate); every run gets
/// its own document and resource tables.
///
/// ```
/// use excelgen::{WorkbookGenerator, WorkbookSpec};
///
/// struct Part {
///     no: u32,
///     name: &'static str,
/// }
///
/// let mut builder = WorkbookSpec::<Part>::builder()
///     .name("Parts")
///     .sheet_name(None)
///     .default_header_style()
///     .default_body_style();
/// builder.number_col("No", |p: &Part| Some(p.no))?;
/// builder.string_col("Part", |p: &Part| Some(p.name))?;
/// let spec = builder.build();
///
/// let parts = [Part { no: 1, name: "bolt" }, Part { no: 2, name: "nut" }];
/// let document = WorkbookGenerator::of(&spec, &parts)?;
/// assert_eq!(document.title(), "Parts.xlsx");
/// assert_eq!(document.sheet().map(|s| s.row_count()), Some(3));
/// # Ok::<(), excelgen::ExcelError>(())
/// ```
pub struct WorkbookGenerator<'a, R> {
    spec: &'a WorkbookSpec<R>,
    records: &'a [R],
    sizing: SizingPolicy,
}

/// Native resources allocated for one run, indexed like [`WorkbookSpec::style_set`] and [`WorkbookSpec::font_set`]
struct Resources {
    styles: IndexSet<StyleSpec>,
    style_ids: Vec<StyleId>,
}

impl Resources {
    fn style_id(&self, style: &StyleSpec) -> Option<StyleId> {
        self.styles
            .get_index_of(style)
            .and_then(|index| self.style_ids.get(index).copied())
    }
}

impl<'a, R> WorkbookGenerator<'a, R> {
    pub fn new(spec: &'a WorkbookSpec<R>, records: &'a [R]) -> Self {
        WorkbookGenerator {
            spec,
            records,
            sizing: SizingPolicy::default(),
        }
    }

    /// Generate with the default sizing policy
    pub fn of(spec: &'a WorkbookSpec<R>, records: &'a [R]) -> Result<Document> {
        WorkbookGenerator::new(spec, records).generate()
    }

    pub fn with_sizing(mut self, sizing: SizingPolicy) -> Self {
        self.sizing = sizing;
        self
    }

    pub fn generate(self) -> Result<Document> {
        let mut document = Document::new();
        document.set_title(format!("{}.xlsx", self.spec.name()));

        let resources = self.allocate(&mut document)?;
        self.write_rows(&mut document, &resources)?;
        self.size_columns(&mut document);

        log::info!(
            "generated workbook '{}': {} rows, {} columns",
            document.title(),
            self.records.len(),
            self.spec.columns().len()
        );
        Ok(document)
    }

    fn allocate(&self, document: &mut Document) -> Result<Resources> {
        let fonts: IndexSet<FontSpec> = self.spec.font_set();
        let mut font_ids: Vec<FontId> = Vec::with_capacity(fonts.len());
        for spec in &fonts {
            let id = document.create_font()?;
            let font = document.font_mut(id)?;
            if let Some(name) = &spec.name {
                font.set_font_name(name)?;
            }
            if let Some(size) = spec.size {
                font.set_font_height_in_points(size)?;
            }
            if let Some(color) = spec.color {
                font.set_color(color);
            }
            font_ids.push(id);
        }

        let styles = self.spec.style_set();
        let mut style_ids = Vec::with_capacity(styles.len());
        for spec in &styles {
            let data_format = match &spec.data_format {
                Some(code) => Some(document.create_data_format(code)?),
                None => None,
            };
            let font = spec
                .font
                .as_ref()
                .and_then(|font| fonts.get_index_of(font))
                .and_then(|index| font_ids.get(index).copied());

            let id = document.create_cell_style()?;
            let style = document.cell_style_mut(id)?;
            if let Some(pattern) = spec.fill_pattern {
                style.set_fill_pattern(pattern);
            }
            if let Some(color) = spec.fill_color {
                style.set_fill_foreground_color(color);
            }
            if let Some(alignment) = spec.horizontal_alignment {
                style.set_alignment(alignment);
            }
            if let Some(alignment) = spec.vertical_alignment {
                style.set_vertical_alignment(alignment);
            }
            if let Some(font) = font {
                style.set_font(font);
            }
            if let Some(format) = data_format {
                style.set_data_format(format);
            }
            style_ids.push(id);
        }

        log::debug!(
            "allocated {} fonts and {} cell styles for '{}'",
            font_ids.len(),
            style_ids.len(),
            self.spec.name()
        );
        Ok(Resources { styles, style_ids })
    }

    fn write_rows(&self, document: &mut Document, resources: &Resources) -> Result<()> {
        let columns = self.spec.columns();
        let header_style = resources.style_id(self.spec.header_style());
        let column_styles: Vec<Option<StyleId>> = columns
            .iter()
            .map(|column| resources.style_id(column.style()))
            .collect();

        let sheet = document.create_sheet(self.spec.sheet_name())?;

        let header = sheet.create_row(0)?;
        for (index, column) in columns.iter().enumerate() {
            let cell = header.create_cell(column_index(index))?;
            if let Some(style) = header_style {
                cell.set_style(style);
            }
            cell.set_string(column.name());
        }
        sheet.create_freeze_pane(0, 1);

        for (offset, record) in self.records.iter().enumerate() {
            let row = sheet.create_row(row_index(offset + 1))?;
            for (index, column) in columns.iter().enumerate() {
                let cell = row.create_cell(column_index(index))?;
                if let Some(style) = column_styles[index] {
                    cell.set_style(style);
                }
                column.extractor().write(record, cell);
            }
        }
        Ok(())
    }

    fn size_columns(&self, document: &mut Document) {
        for index in 0..self.spec.columns().len() {
            let col = column_index(index);
            document.auto_size_column(col, self.sizing.padding_chars);
            let Some(sheet) = document.sheet_mut() else {
                return;
            };
            if self.sizing.units_to_pixels(sheet.column_width(col)) < self.sizing.min_width_px {
                log::debug!(
                    "column {} narrower than {}px, using fallback width",
                    col,
                    self.sizing.min_width_px
                );
                sheet.set_column_width(col, self.sizing.fallback_width);
            }
        }
    }
}

/// Column positions past the sheet limit saturate so the engine reports the overflow
fn column_index(index: usize) -> u16 {
    u16::try_from(index).unwrap_or(u16::MAX)
}

fn row_index(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}
