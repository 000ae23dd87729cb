//! Buffered XML writer used to serialize the package parts

use crate::error::Result;
use std::io::Write;

const FLUSH_THRESHOLD: usize = 4096;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// `_xHHHH_` at the start of `bytes`
fn is_ooxml_escape(bytes: &[u8]) -> bool {
    bytes.len() >= 7
        && bytes[1] == b'x'
        && bytes[2..6].iter().all(u8::is_ascii_hexdigit)
        && bytes[6] == b'_'
}

/// XML writer that batches small writes into one buffer before hitting the output
pub struct XmlWriter<W: Write> {
    writer: W,
    buffer: Vec<u8>,
    numbers: itoa::Buffer,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(writer: W) -> Self {
        XmlWriter {
            writer,
            buffer: Vec::with_capacity(8192),
            numbers: itoa::Buffer::new(),
        }
    }

    /// Write raw bytes directly
    #[inline]
    pub fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(data);
        if self.buffer.len() > FLUSH_THRESHOLD {
            self.flush()?;
        }
        Ok(())
    }

    #[inline]
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        self.write_raw(s.as_bytes())
    }

    /// Write the standard XML declaration
    pub fn declaration(&mut self) -> Result<()> {
        self.write_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n")
    }

    /// Open a start tag (`<name`); attributes may follow
    #[inline]
    pub fn start_element(&mut self, name: &str) -> Result<()> {
        self.write_raw(b"<")?;
        self.write_str(name)
    }

    /// Finish a start tag opened with [`start_element`](Self::start_element)
    #[inline]
    pub fn close_start_tag(&mut self) -> Result<()> {
        self.write_raw(b">")
    }

    /// Finish a start tag as a self-closing element
    #[inline]
    pub fn close_empty(&mut self) -> Result<()> {
        self.write_raw(b"/>")
    }

    #[inline]
    pub fn end_element(&mut self, name: &str) -> Result<()> {
        self.write_raw(b"</")?;
        self.write_str(name)?;
        self.write_raw(b">")
    }

    /// Write `<name/>`
    #[inline]
    pub fn empty_element(&mut self, name: &str) -> Result<()> {
        self.start_element(name)?;
        self.close_empty()
    }

    /// Write `<name>text</name>` with the text escaped
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.start_element(name)?;
        self.close_start_tag()?;
        self.write_escaped(text)?;
        self.end_element(name)
    }

    #[inline]
    pub fn attribute(&mut self, name: &str, value: &str) -> Result<()> {
        self.write_raw(b" ")?;
        self.write_str(name)?;
        self.write_raw(b"=\"")?;
        self.write_escaped(value)?;
        self.write_raw(b"\"")
    }

    #[inline]
    pub fn attribute_int(&mut self, name: &str, value: u64) -> Result<()> {
        self.write_raw(b" ")?;
        self.write_str(name)?;
        self.write_raw(b"=\"")?;
        let digits = self.numbers.format(value);
        self.buffer.extend_from_slice(digits.as_bytes());
        self.write_raw(b"\"")
    }

    #[inline]
    pub fn attribute_f64(&mut self, name: &str, value: f64) -> Result<()> {
        self.attribute(name, &value.to_string())
    }

    /// Write an unsigned integer as element text
    #[inline]
    pub fn write_int(&mut self, value: u64) -> Result<()> {
        let digits = self.numbers.format(value);
        self.buffer.extend_from_slice(digits.as_bytes());
        Ok(())
    }

    /// Write text content with XML escaping.
    ///
    /// Control characters XML 1.0 cannot carry are written as OOXML `_xHHHH_`
    /// escapes, and a literal `_xHHHH_` in the text is protected as
    /// `_x005F_xHHHH_` so readers decode it back unchanged.
    pub fn write_escaped(&mut self, text: &str) -> Result<()> {
        let bytes = text.as_bytes();
        for (i, &byte) in bytes.iter().enumerate() {
            match byte {
                b'&' => self.buffer.extend_from_slice(b"&amp;"),
                b'<' => self.buffer.extend_from_slice(b"&lt;"),
                b'>' => self.buffer.extend_from_slice(b"&gt;"),
                b'"' => self.buffer.extend_from_slice(b"&quot;"),
                b'\'' => self.buffer.extend_from_slice(b"&apos;"),
                b'\t' | b'\n' | b'\r' => self.buffer.push(byte),
                0x00..=0x1F => {
                    self.buffer.extend_from_slice(b"_x00");
                    self.buffer.push(HEX_DIGITS[usize::from(byte >> 4)]);
                    self.buffer.push(HEX_DIGITS[usize::from(byte & 0x0F)]);
                    self.buffer.push(b'_');
                }
                b'_' if is_ooxml_escape(&bytes[i..]) => {
                    self.buffer.extend_from_slice(b"_x005F_");
                }
                _ => self.buffer.push(byte),
            }
        }
        if self.buffer.len() > FLUSH_THRESHOLD {
            self.flush()?;
        }
        Ok(())
    }

    /// Flush buffer to underlying writer
    pub fn flush(&mut self) -> Result<()> {
        if !self.buffer.is_empty() {
            self.writer.write_all(&self.buffer)?;
            self.buffer.clear();
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_writer() {
        let mut output = Vec::new();
        let mut writer = XmlWriter::new(&mut output);

        writer.start_element("root").unwrap();
        writer.attribute("attr", "value").unwrap();
        writer.attribute_int("count", 42).unwrap();
        writer.close_start_tag().unwrap();
        writer.text_element("t", "content").unwrap();
        writer.empty_element("b").unwrap();
        writer.end_element("root").unwrap();
        writer.flush().unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "<root attr=\"value\" count=\"42\"><t>content</t><b/></root>"
        );
    }

    #[test]
    fn test_xml_escaping() {
        let mut output = Vec::new();
        let mut writer = XmlWriter::new(&mut output);

        writer.write_escaped("<Tom & \"Jerry\">").unwrap();
        writer.flush().unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "&lt;Tom &amp; &quot;Jerry&quot;&gt;"
        );
    }

    #[test]
    fn test_control_characters_escaped() {
        let mut output = Vec::new();
        let mut writer = XmlWriter::new(&mut output);

        writer.write_escaped("a\u{1}b\u{1F}\tc\r\n").unwrap();
        writer.flush().unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "a_x0001_b_x001F_\tc\r\n"
        );
    }

    #[test]
    fn test_literal_escape_sequence_protected() {
        let mut output = Vec::new();
        let mut writer = XmlWriter::new(&mut output);

        writer.write_escaped("_x0041_ snake_x_case _xZZZZ_").unwrap();
        writer.flush().unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "_x005F_x0041_ snake_x_case _xZZZZ_"
        );
    }
}
