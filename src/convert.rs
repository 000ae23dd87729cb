//! Write-only message conversion of generated documents
//!
//! [`WorkbookMessageConverter`] turns a [`Document`] into an HTTP-style
//! message: content type, attachment disposition named after the document
//! title, and the XLSX bytes as body. Reading a document back from a message
//! is not supported.

use crate::document::Document;
use crate::error::{ExcelError, Result};
use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_DISPOSITION: &str = "Content-Disposition";

/// A media type such as `application/vnd.ms-excel`
///
/// Equality compares the essence (`type/subtype`) case-insensitively and
/// ignores parameters.
#[derive(Debug, Clone, Eq)]
pub struct MediaType(Cow<'static, str>);

impl MediaType {
    /// `application/vnd.ms-excel`
    pub const VND_MS_EXCEL: MediaType = MediaType(Cow::Borrowed("application/vnd.ms-excel"));

    /// Parse `type/subtype[; params]`
    pub fn parse(value: &str) -> Result<MediaType> {
        let value = value.trim();
        let essence = value.split(';').next().unwrap_or_default().trim();
        match essence.split_once('/') {
            Some((kind, subtype))
                if !kind.trim().is_empty()
                    && !subtype.trim().is_empty()
                    && !subtype.contains('/') =>
            {
                Ok(MediaType(Cow::Owned(value.to_string())))
            }
            _ => Err(ExcelError::InvalidConfiguration(format!(
                "invalid media type '{value}'"
            ))),
        }
    }

    /// `type/subtype` without parameters, lowercased
    pub fn essence(&self) -> String {
        self.0
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for MediaType {
    fn eq(&self, other: &Self) -> bool {
        self.essence() == other.essence()
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outgoing message: ordered headers and a body
#[derive(Debug, Default)]
pub struct OutputMessage {
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl OutputMessage {
    pub fn new() -> Self {
        OutputMessage::default()
    }

    /// Set a header, replacing any existing value with the same name
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => *existing = value,
            None => self.headers.push((name.to_string(), value)),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Vec<u8> {
        &mut self.body
    }

    pub fn into_parts(self) -> (Vec<(String, String)>, Vec<u8>) {
        (self.headers, self.body)
    }
}

/// Converts values of `T` to and from messages
pub trait MessageConverter<T> {
    /// Whether values of `type_id` can be read from a message of `media_type`
    fn can_read(&self, type_id: TypeId, media_type: &MediaType) -> bool;

    /// Whether values of `type_id` can be written as `media_type`
    fn can_write(&self, type_id: TypeId, media_type: &MediaType) -> bool;

    fn supported_media_types(&self) -> Vec<MediaType>;

    fn read(&self, input: &[u8]) -> Result<T>;

    fn write(&self, value: T, media_type: &MediaType, output: &mut OutputMessage) -> Result<()>;
}

/// Writes [`Document`]s as `application/vnd.ms-excel` attachments
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkbookMessageConverter;

impl WorkbookMessageConverter {
    pub fn new() -> Self {
        WorkbookMessageConverter
    }
}

impl MessageConverter<Document> for WorkbookMessageConverter {
    fn can_read(&self, _type_id: TypeId, _media_type: &MediaType) -> bool {
        false
    }

    fn can_write(&self, type_id: TypeId, media_type: &MediaType) -> bool {
        type_id == TypeId::of::<Document>() && *media_type == MediaType::VND_MS_EXCEL
    }

    fn supported_media_types(&self) -> Vec<MediaType> {
        vec![MediaType::VND_MS_EXCEL]
    }

    fn read(&self, _input: &[u8]) -> Result<Document> {
        Err(ExcelError::NotSupported(
            "workbooks cannot be read from a message".to_string(),
        ))
    }

    /// The document is closed after its bytes are written
    fn write(
        &self,
        document: Document,
        _media_type: &MediaType,
        output: &mut OutputMessage,
    ) -> Result<()> {
        let bytes = document
            .to_bytes()
            .map_err(|e| ExcelError::WriteError(format!("{}: {e}", document.title())))?;
        output.set_header(CONTENT_TYPE, MediaType::VND_MS_EXCEL.as_str());
        output.set_header(CONTENT_DISPOSITION, attachment(document.title()));
        output.body_mut().extend_from_slice(&bytes);
        document.close();
        Ok(())
    }
}

/// `attachment` disposition value for `filename`; non-ASCII names also get an
/// RFC 5987 `filename*` parameter
pub fn attachment(filename: &str) -> String {
    let mut value = String::from("attachment; filename=\"");
    for c in filename.chars() {
        match c {
            '"' | '\\' => {
                value.push('\\');
                value.push(c);
            }
            c if c.is_ascii() && !c.is_ascii_control() => value.push(c),
            _ => value.push('_'),
        }
    }
    value.push('"');

    if !filename.is_ascii() {
        value.push_str("; filename*=UTF-8''");
        for byte in filename.bytes() {
            if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
                value.push(byte as char);
            } else {
                value.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_equality() {
        let parsed = MediaType::parse("Application/VND.MS-Excel; charset=binary").unwrap();
        assert_eq!(parsed, MediaType::VND_MS_EXCEL);
        assert_ne!(
            MediaType::parse("application/json").unwrap(),
            MediaType::VND_MS_EXCEL
        );
        assert!(MediaType::parse("excel").is_err());
        assert!(MediaType::parse("/x").is_err());
    }

    #[test]
    fn test_capabilities() {
        let converter = WorkbookMessageConverter::new();
        let excel = MediaType::VND_MS_EXCEL;
        let json = MediaType::parse("application/json").unwrap();

        assert!(converter.can_write(TypeId::of::<Document>(), &excel));
        assert!(!converter.can_write(TypeId::of::<String>(), &excel));
        assert!(!converter.can_write(TypeId::of::<Document>(), &json));
        assert!(!converter.can_read(TypeId::of::<Document>(), &excel));
        assert_eq!(converter.supported_media_types(), vec![excel]);
    }

    #[test]
    fn test_read_not_supported() {
        let converter = WorkbookMessageConverter::new();
        assert!(matches!(
            converter.read(b"PK"),
            Err(ExcelError::NotSupported(_))
        ));
    }

    #[test]
    fn test_write_sets_headers_and_body() {
        let mut document = Document::new();
        document.set_title("Staff.xlsx");
        let mut message = OutputMessage::new();

        WorkbookMessageConverter::new()
            .write(document, &MediaType::VND_MS_EXCEL, &mut message)
            .unwrap();

        assert_eq!(
            message.header("content-type"),
            Some("application/vnd.ms-excel")
        );
        assert_eq!(
            message.header(CONTENT_DISPOSITION),
            Some("attachment; filename=\"Staff.xlsx\"")
        );
        assert_eq!(&message.body()[..2], b"PK");
    }

    #[test]
    fn test_set_header_replaces() {
        let mut message = OutputMessage::new();
        message.set_header("X-Test", "a");
        message.set_header("x-test", "b");
        assert_eq!(message.headers().len(), 1);
        assert_eq!(message.header("X-TEST"), Some("b"));
    }

    #[test]
    fn test_attachment_escaping() {
        assert_eq!(attachment("a\"b.xlsx"), "attachment; filename=\"a\\\"b.xlsx\"");
        assert_eq!(
            attachment("Lương.xlsx"),
            "attachment; filename=\"L__ng.xlsx\"; filename*=UTF-8''L%C6%B0%C6%A1ng.xlsx"
        );
    }
}
