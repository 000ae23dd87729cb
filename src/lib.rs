//! # excelgen
//!
//! Styled XLSX generation from in-memory records.
//!
//! ## Features
//!
//! - **Typed configuration**: a staged builder declares the workbook name, sheet
//!   name, header/body styles and typed columns (text, number, date, boolean)
//! - **Shared resources**: fonts and cell styles are allocated once per distinct
//!   style, however many columns use them
//! - **Readable output**: frozen header row, per-column styles and data formats,
//!   auto-sized columns with a minimum width
//! - **HTTP downloads**: serve a generated workbook as an attachment from an axum
//!   route (feature `http`, on by default)
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use excelgen::{StyleSpec, WorkbookGenerator, WorkbookSpec};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! struct Staff {
//!     id: u32,
//!     name: String,
//!     birth_date: NaiveDate,
//! }
//!
//! let mut builder = WorkbookSpec::<Staff>::builder()
//!     .name("Staff")
//!     .sheet_name("MyList")
//!     .default_header_style()
//!     .default_body_style();
//! builder
//!     .number_col("ID", |s: &Staff| Some(s.id))?
//!     .string_col("Name", |s: &Staff| Some(s.name.clone()))?
//!     .date_col_styled(
//!         "BirthDate",
//!         StyleSpec::new().with_data_format("yyyy-mm-dd"),
//!         |s: &Staff| Some(s.birth_date),
//!     )?;
//! let spec = builder.build();
//!
//! let staff = vec![Staff {
//!     id: 1,
//!     name: "Dan".to_string(),
//!     birth_date: NaiveDate::from_ymd_opt(2019, 11, 1).unwrap(),
//! }];
//! let document = WorkbookGenerator::of(&spec, &staff)?;
//! let bytes = document.to_bytes()?;
//! assert_eq!(&bytes[..2], b"PK");
//! # Ok(())
//! # }
//! ```

pub mod column;
pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod generator;
#[cfg(feature = "http")]
pub mod http;
pub mod sizing;
pub mod style;
pub mod types;

pub use column::{ColumnSpec, Extractor};
pub use config::{WorkbookSpec, WorkbookSpecBuilder};
pub use convert::{MediaType, MessageConverter, OutputMessage, WorkbookMessageConverter};
pub use document::{Document, FontId, StyleId};
pub use error::{ExcelError, Result};
pub use generator::WorkbookGenerator;
#[cfg(feature = "http")]
pub use http::{workbook_response, workbook_router, WorkbookResponse};
pub use sizing::SizingPolicy;
pub use style::{FillPattern, FontSpec, HorizontalAlignment, Rgb, StyleSpec, VerticalAlignment};
pub use types::{CellValue, NumericValue, ValueKind};
