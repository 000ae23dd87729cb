//! Workbook configuration and its staged builder
//!
//! A [`WorkbookSpec`] is assembled once, usually at startup, and shared
//! read-only by every generation run. The builder walks through fixed stages
//! (name, sheet name, header style, body style, columns); each stage only
//! exposes the calls valid at that point, so an out-of-order configuration is
//! a compile error.
//!
//! ```
//! use excelgen::{StyleSpec, WorkbookSpec};
//!
//! struct Staff {
//!     id: u32,
//!     name: String,
//! }
//!
//! let mut builder = WorkbookSpec::<Staff>::builder()
//!     .name("Staff")
//!     .sheet_name("MyList")
//!     .default_header_style()
//!     .default_body_style();
//! builder.number_col("ID", |s: &Staff| Some(s.id))?;
//! builder.string_col_styled("Name", StyleSpec::new().with_data_format("@"), |s: &Staff| {
//!     Some(s.name.clone())
//! })?;
//! let spec = builder.build();
//! assert_eq!(spec.columns().len(), 2);
//! # Ok::<(), excelgen::ExcelError>(())
//! ```

use crate::column::{ColumnSpec, Extractor};
use crate::error::Result;
use crate::style::{FontSpec, StyleSpec};
use crate::types::NumericValue;
use chrono::{
    DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone,
};
use indexmap::IndexSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Workbook name used when none is given
pub const DEFAULT_WORKBOOK_NAME: &str = "Workbook1";
/// Sheet name used when none is given
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Builder stage markers
pub mod stage {
    /// Expecting the workbook name
    #[derive(Debug)]
    pub struct Name;
    /// Expecting the sheet name
    #[derive(Debug)]
    pub struct SheetName;
    /// Expecting the header style
    #[derive(Debug)]
    pub struct HeaderStyle;
    /// Expecting the body style
    #[derive(Debug)]
    pub struct BodyStyle;
    /// Declaring columns
    #[derive(Debug)]
    pub struct Columns;
}

/// Immutable workbook configuration for records of type `R`
pub struct WorkbookSpec<R> {
    name: String,
    sheet_name: String,
    header_style: StyleSpec,
    body_style: StyleSpec,
    columns: Vec<ColumnSpec<R>>,
}

impl<R> WorkbookSpec<R> {
    /// Start configuring a workbook
    pub fn builder() -> WorkbookSpecBuilder<R, stage::Name> {
        WorkbookSpecBuilder {
            name: DEFAULT_WORKBOOK_NAME.to_string(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            header_style: StyleSpec::DEFAULT_HEADER,
            body_style: StyleSpec::DEFAULT_BODY,
            columns: Vec::new(),
            _stage: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn header_style(&self) -> &StyleSpec {
        &self.header_style
    }

    pub fn body_style(&self) -> &StyleSpec {
        &self.body_style
    }

    /// Columns in position order
    pub fn columns(&self) -> &[ColumnSpec<R>] {
        &self.columns
    }

    /// Distinct styles in use: header, body, then each column in order
    pub fn style_set(&self) -> IndexSet<StyleSpec> {
        std::iter::once(&self.header_style)
            .chain(std::iter::once(&self.body_style))
            .chain(self.columns.iter().map(ColumnSpec::style))
            .cloned()
            .collect()
    }

    /// Distinct fonts referenced by [`style_set`](Self::style_set), in the same order
    pub fn font_set(&self) -> IndexSet<FontSpec> {
        self.style_set()
            .into_iter()
            .filter_map(|style| style.font)
            .collect()
    }
}

impl<R> Clone for WorkbookSpec<R> {
    fn clone(&self) -> Self {
        WorkbookSpec {
            name: self.name.clone(),
            sheet_name: self.sheet_name.clone(),
            header_style: self.header_style.clone(),
            body_style: self.body_style.clone(),
            columns: self.columns.clone(),
        }
    }
}

impl<R> fmt::Debug for WorkbookSpec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkbookSpec")
            .field("name", &self.name)
            .field("sheet_name", &self.sheet_name)
            .field("header_style", &self.header_style)
            .field("body_style", &self.body_style)
            .field("columns", &self.columns)
            .finish()
    }
}

/// Staged builder for [`WorkbookSpec`]; `S` is one of the [`stage`] markers
pub struct WorkbookSpecBuilder<R, S> {
    name: String,
    sheet_name: String,
    header_style: StyleSpec,
    body_style: StyleSpec,
    columns: Vec<ColumnSpec<R>>,
    _stage: PhantomData<S>,
}

impl<R, S> fmt::Debug for WorkbookSpecBuilder<R, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkbookSpecBuilder")
            .field("name", &self.name)
            .field("sheet_name", &self.sheet_name)
            .field("header_style", &self.header_style)
            .field("body_style", &self.body_style)
            .field("columns", &self.columns)
            .finish()
    }
}

impl<R, S> WorkbookSpecBuilder<R, S> {
    fn advance<T>(self) -> WorkbookSpecBuilder<R, T> {
        WorkbookSpecBuilder {
            name: self.name,
            sheet_name: self.sheet_name,
            header_style: self.header_style,
            body_style: self.body_style,
            columns: self.columns,
            _stage: PhantomData,
        }
    }
}

impl<R> WorkbookSpecBuilder<R, stage::Name> {
    /// Set the workbook name; `None` keeps `Workbook1`
    pub fn name<'a>(
        mut self,
        name: impl Into<Option<&'a str>>,
    ) -> WorkbookSpecBuilder<R, stage::SheetName> {
        if let Some(name) = name.into() {
            self.name = name.to_string();
        }
        self.advance()
    }
}

impl<R> WorkbookSpecBuilder<R, stage::SheetName> {
    /// Set the sheet name; `None` keeps `Sheet1`
    pub fn sheet_name<'a>(
        mut self,
        sheet_name: impl Into<Option<&'a str>>,
    ) -> WorkbookSpecBuilder<R, stage::HeaderStyle> {
        if let Some(sheet_name) = sheet_name.into() {
            self.sheet_name = sheet_name.to_string();
        }
        self.advance()
    }
}

impl<R> WorkbookSpecBuilder<R, stage::HeaderStyle> {
    /// Set the header style; `None` keeps [`StyleSpec::DEFAULT_HEADER`]
    pub fn header_style(
        mut self,
        style: impl Into<Option<StyleSpec>>,
    ) -> WorkbookSpecBuilder<R, stage::BodyStyle> {
        if let Some(style) = style.into() {
            self.header_style = style;
        }
        self.advance()
    }

    pub fn default_header_style(self) -> WorkbookSpecBuilder<R, stage::BodyStyle> {
        self.header_style(None)
    }
}

impl<R> WorkbookSpecBuilder<R, stage::BodyStyle> {
    /// Set the body style; `None` keeps [`StyleSpec::DEFAULT_BODY`]
    pub fn body_style(
        mut self,
        style: impl Into<Option<StyleSpec>>,
    ) -> WorkbookSpecBuilder<R, stage::Columns> {
        if let Some(style) = style.into() {
            self.body_style = style;
        }
        self.advance()
    }

    pub fn default_body_style(self) -> WorkbookSpecBuilder<R, stage::Columns> {
        self.body_style(None)
    }
}

impl<R: 'static> WorkbookSpecBuilder<R, stage::Columns> {
    fn push(
        &mut self,
        name: &str,
        style: StyleSpec,
        extractor: Extractor<R>,
    ) -> Result<&mut Self> {
        self.columns.push(ColumnSpec::new(name, style, extractor)?);
        Ok(self)
    }

    fn styled(&self, style: &StyleSpec) -> StyleSpec {
        StyleSpec::merge(&self.body_style, style)
    }

    /// Declare a text column
    pub fn string_col<F, V>(&mut self, name: &str, extractor: F) -> Result<&mut Self>
    where
        F: Fn(&R) -> Option<V> + Send + Sync + 'static,
        V: Into<String>,
    {
        self.string_col_styled(name, StyleSpec::empty(), extractor)
    }

    /// Declare a text column whose style overrides the body style
    pub fn string_col_styled<F, V>(
        &mut self,
        name: &str,
        style: StyleSpec,
        extractor: F,
    ) -> Result<&mut Self>
    where
        F: Fn(&R) -> Option<V> + Send + Sync + 'static,
        V: Into<String>,
    {
        let style = self.styled(&style);
        self.push(
            name,
            style,
            Extractor::String(Arc::new(move |record: &R| extractor(record).map(Into::into))),
        )
    }

    /// Declare a numeric column
    pub fn number_col<F, V>(&mut self, name: &str, extractor: F) -> Result<&mut Self>
    where
        F: Fn(&R) -> Option<V> + Send + Sync + 'static,
        V: NumericValue,
    {
        self.number_col_styled(name, StyleSpec::empty(), extractor)
    }

    /// Declare a numeric column whose style overrides the body style
    pub fn number_col_styled<F, V>(
        &mut self,
        name: &str,
        style: StyleSpec,
        extractor: F,
    ) -> Result<&mut Self>
    where
        F: Fn(&R) -> Option<V> + Send + Sync + 'static,
        V: NumericValue,
    {
        let style = self.styled(&style);
        self.push(
            name,
            style,
            Extractor::Number(Arc::new(move |record: &R| extractor(record).map(NumericValue::to_f64))),
        )
    }

    /// Declare a date column; dates are written as local midnight
    pub fn date_col<F>(&mut self, name: &str, extractor: F) -> Result<&mut Self>
    where
        F: Fn(&R) -> Option<NaiveDate> + Send + Sync + 'static,
    {
        self.date_col_styled(name, StyleSpec::empty(), extractor)
    }

    /// Declare a date column whose style overrides the body style
    pub fn date_col_styled<F>(
        &mut self,
        name: &str,
        style: StyleSpec,
        extractor: F,
    ) -> Result<&mut Self>
    where
        F: Fn(&R) -> Option<NaiveDate> + Send + Sync + 'static,
    {
        let style = self.styled(&style);
        self.push(
            name,
            style,
            Extractor::Date(Arc::new(move |record: &R| {
                extractor(record).map(|date| to_local(date.and_time(NaiveTime::MIN)))
            })),
        )
    }

    /// Declare a date-time column; values are interpreted as local wall-clock time
    pub fn datetime_col<F>(&mut self, name: &str, extractor: F) -> Result<&mut Self>
    where
        F: Fn(&R) -> Option<NaiveDateTime> + Send + Sync + 'static,
    {
        self.datetime_col_styled(name, StyleSpec::empty(), extractor)
    }

    /// Declare a date-time column whose style overrides the body style
    pub fn datetime_col_styled<F>(
        &mut self,
        name: &str,
        style: StyleSpec,
        extractor: F,
    ) -> Result<&mut Self>
    where
        F: Fn(&R) -> Option<NaiveDateTime> + Send + Sync + 'static,
    {
        let style = self.styled(&style);
        self.push(
            name,
            style,
            Extractor::Date(Arc::new(move |record: &R| extractor(record).map(to_local))),
        )
    }

    /// Declare a boolean column
    pub fn boolean_col<F>(&mut self, name: &str, extractor: F) -> Result<&mut Self>
    where
        F: Fn(&R) -> Option<bool> + Send + Sync + 'static,
    {
        self.boolean_col_styled(name, StyleSpec::empty(), extractor)
    }

    /// Declare a boolean column whose style overrides the body style
    pub fn boolean_col_styled<F>(
        &mut self,
        name: &str,
        style: StyleSpec,
        extractor: F,
    ) -> Result<&mut Self>
    where
        F: Fn(&R) -> Option<bool> + Send + Sync + 'static,
    {
        let style = self.styled(&style);
        self.push(name, style, Extractor::Boolean(Arc::new(extractor)))
    }
}

impl<R> WorkbookSpecBuilder<R, stage::Columns> {
    /// Number of columns declared so far
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Snapshot the current configuration
    pub fn build(&self) -> WorkbookSpec<R> {
        WorkbookSpec {
            name: self.name.clone(),
            sheet_name: self.sheet_name.clone(),
            header_style: self.header_style.clone(),
            body_style: self.body_style.clone(),
            columns: self.columns.clone(),
        }
    }
}

/// Interpret a wall-clock time in the local zone
fn to_local(naive: NaiveDateTime) -> DateTime<Local> {
    in_zone(&Local, naive)
}

/// Resolve a wall-clock time in `zone`. A time repeated by a DST fold takes
/// the earlier instant; a time skipped by a DST gap moves forward by the
/// length of the gap.
fn in_zone<Tz: TimeZone>(zone: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(datetime) => datetime,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            // read with the offset in force before the transition, which lands
            // past it by exactly the gap
            let before = naive
                .checked_sub_signed(Duration::days(1))
                .map(|probe| zone.offset_from_utc_datetime(&probe).fix())
                .unwrap_or_else(|| zone.offset_from_utc_datetime(&naive).fix());
            let utc = naive
                .checked_sub_signed(Duration::seconds(i64::from(before.local_minus_utc())))
                .unwrap_or(naive);
            zone.from_utc_datetime(&utc)
        }
    }
}
