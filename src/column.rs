//! Column descriptors and typed extractors

use crate::document::Cell;
use crate::error::{ExcelError, Result};
use crate::style::StyleSpec;
use crate::types::{CellValue, ValueKind};
use chrono::{DateTime, Local};
use std::fmt;
use std::sync::Arc;

pub type StringFn<R> = Arc<dyn Fn(&R) -> Option<String> + Send + Sync>;
pub type NumberFn<R> = Arc<dyn Fn(&R) -> Option<f64> + Send + Sync>;
pub type DateFn<R> = Arc<dyn Fn(&R) -> Option<DateTime<Local>> + Send + Sync>;
pub type BooleanFn<R> = Arc<dyn Fn(&R) -> Option<bool> + Send + Sync>;

/// Extraction function of a column, one variant per [`ValueKind`]
///
/// The variant is fixed when the column is declared, so writing a cell never
/// re-inspects the value's type.
pub enum Extractor<R> {
    String(StringFn<R>),
    Number(NumberFn<R>),
    Date(DateFn<R>),
    Boolean(BooleanFn<R>),
}

impl<R> Extractor<R> {
    pub fn kind(&self) -> ValueKind {
        match self {
            Extractor::String(_) => ValueKind::String,
            Extractor::Number(_) => ValueKind::Number,
            Extractor::Date(_) => ValueKind::Date,
            Extractor::Boolean(_) => ValueKind::Boolean,
        }
    }

    /// Run the extractor on `record`
    pub fn extract(&self, record: &R) -> Option<CellValue> {
        match self {
            Extractor::String(f) => f(record).map(CellValue::String),
            Extractor::Number(f) => f(record).map(CellValue::Number),
            Extractor::Date(f) => f(record).map(CellValue::Date),
            Extractor::Boolean(f) => f(record).map(CellValue::Bool),
        }
    }

    /// Extract from `record` and write the value with the kind's setter.
    ///
    /// Returns `false` when the extractor yields nothing and the cell is left
    /// without a value.
    pub fn write(&self, record: &R, cell: &mut Cell) -> bool {
        match self {
            Extractor::String(f) => f(record).map(|v| cell.set_string(v)).is_some(),
            Extractor::Number(f) => f(record).map(|v| cell.set_number(v)).is_some(),
            Extractor::Date(f) => f(record).map(|v| cell.set_date(v)).is_some(),
            Extractor::Boolean(f) => f(record).map(|v| cell.set_bool(v)).is_some(),
        }
    }
}

impl<R> Clone for Extractor<R> {
    fn clone(&self) -> Self {
        match self {
            Extractor::String(f) => Extractor::String(Arc::clone(f)),
            Extractor::Number(f) => Extractor::Number(Arc::clone(f)),
            Extractor::Date(f) => Extractor::Date(Arc::clone(f)),
            Extractor::Boolean(f) => Extractor::Boolean(Arc::clone(f)),
        }
    }
}

impl<R> fmt::Debug for Extractor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Extractor::{}", self.kind())
    }
}

/// One column: header text, resolved style and typed extractor
pub struct ColumnSpec<R> {
    name: String,
    style: StyleSpec,
    extractor: Extractor<R>,
}

impl<R> ColumnSpec<R> {
    /// Create a column; the name must not be empty
    pub fn new(name: &str, style: StyleSpec, extractor: Extractor<R>) -> Result<Self> {
        if name.is_empty() {
            return Err(ExcelError::InvalidConfiguration(
                "column name is required".to_string(),
            ));
        }
        Ok(ColumnSpec {
            name: name.to_string(),
            style,
            extractor,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.extractor.kind()
    }

    pub fn style(&self) -> &StyleSpec {
        &self.style
    }

    pub fn extractor(&self) -> &Extractor<R> {
        &self.extractor
    }
}

impl<R> Clone for ColumnSpec<R> {
    fn clone(&self) -> Self {
        ColumnSpec {
            name: self.name.clone(),
            style: self.style.clone(),
            extractor: self.extractor.clone(),
        }
    }
}

impl<R> fmt::Debug for ColumnSpec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSpec")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("style", &self.style)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Row;

    struct Item {
        label: Option<&'static str>,
        qty: u32,
    }

    #[test]
    fn test_empty_name_rejected() {
        let extractor: Extractor<Item> = Extractor::Number(Arc::new(|i: &Item| Some(f64::from(i.qty))));
        assert!(matches!(
            ColumnSpec::new("", StyleSpec::empty(), extractor),
            Err(ExcelError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_extract_and_write() {
        let column = ColumnSpec::new(
            "Label",
            StyleSpec::empty(),
            Extractor::String(Arc::new(|i: &Item| i.label.map(str::to_string))),
        )
        .unwrap();
        assert_eq!(column.kind(), ValueKind::String);

        let mut row = Row::default();
        let present = Item { label: Some("bolt"), qty: 3 };
        let absent = Item { label: None, qty: 0 };

        assert!(column.extractor().write(&present, row.create_cell(0).unwrap()));
        assert!(!column.extractor().write(&absent, row.create_cell(1).unwrap()));
        assert_eq!(row.cell(0).unwrap().value(), Some(&CellValue::from("bolt")));
        assert!(row.cell(1).unwrap().value().is_none());
        assert_eq!(column.extractor().extract(&absent), None);
    }

    #[test]
    fn test_clone_shares_extractor() {
        let column = ColumnSpec::new(
            "Qty",
            StyleSpec::empty(),
            Extractor::Number(Arc::new(|i: &Item| Some(f64::from(i.qty)))),
        )
        .unwrap();
        let copy = column.clone();
        let item = Item { label: None, qty: 9 };
        assert_eq!(copy.extractor().extract(&item), Some(CellValue::Number(9.0)));
        assert_eq!(format!("{:?}", copy.extractor()), "Extractor::number");
    }
}
