//! Error types for workbook configuration, generation and serialization

use thiserror::Error;

/// Result type alias for excelgen operations
pub type Result<T> = std::result::Result<T, ExcelError>;

/// Main error type for all workbook operations
#[derive(Error, Debug)]
pub enum ExcelError {
    /// A column declaration was rejected by the configuration builder
    #[error("Invalid workbook configuration: {0}")]
    InvalidConfiguration(String),

    /// The document engine could not allocate a font, style, format, sheet, row or cell
    #[error("Failed to allocate workbook resource: {0}")]
    ResourceAllocation(String),

    /// Error occurred while writing a generated document
    #[error("Failed to write Excel file: {0}")]
    WriteError(String),

    /// IO error wrapper
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// ZIP container error wrapper
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// Operation intentionally not supported (e.g. reading a workbook from a request)
    #[error("Operation not supported: {0}")]
    NotSupported(String),
}

impl From<zip::result::ZipError> for ExcelError {
    fn from(err: zip::result::ZipError) -> Self {
        ExcelError::ZipError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ExcelError::InvalidConfiguration("column name is required".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid workbook configuration: column name is required"
        );

        let err = ExcelError::NotSupported("read".to_string());
        assert_eq!(err.to_string(), "Operation not supported: read");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: ExcelError = io.into();
        assert!(matches!(err, ExcelError::IoError(_)));
    }
}
