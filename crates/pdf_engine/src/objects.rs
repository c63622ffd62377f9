//! PDF Object Model
//!
//! The small set of primitive PDF objects (null, booleans, numbers, strings,
//! names, arrays, dictionaries, streams and indirect references) and their
//! serialization to the PDF file syntax.

use std::collections::BTreeMap;
use std::io::{self, Write};

/// A PDF object
#[derive(Debug, Clone)]
pub enum PdfObject {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(PdfString),
    Name(String),
    Array(Vec<PdfObject>),
    Dictionary(PdfDictionary),
    Stream(PdfStream),
    /// Indirect reference to an object number (generation is always 0)
    Reference(u32),
}

/// PDF string encoding
#[derive(Debug, Clone)]
pub enum PdfString {
    /// Literal string enclosed in parentheses
    Literal(Vec<u8>),
    /// Hexadecimal string enclosed in angle brackets
    Hex(Vec<u8>),
}

impl PdfString {
    /// Literal string holding the raw bytes of `s`
    pub fn ascii(s: &str) -> Self {
        PdfString::Literal(s.as_bytes().to_vec())
    }

    /// Text string: plain literal when `s` is ASCII, UTF-16BE with a byte
    /// order mark otherwise.
    pub fn text(s: &str) -> Self {
        if s.is_ascii() {
            return PdfString::ascii(s);
        }
        let mut data = vec![0xFE, 0xFF];
        for unit in s.encode_utf16() {
            data.extend_from_slice(&unit.to_be_bytes());
        }
        PdfString::Hex(data)
    }
}

/// PDF dictionary. Keys are kept sorted so output is deterministic.
#[derive(Debug, Clone, Default)]
pub struct PdfDictionary {
    entries: BTreeMap<String, PdfObject>,
}

impl PdfDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dictionary with its `/Type` entry already set
    pub fn typed(type_name: &str) -> Self {
        let mut dict = Self::new();
        dict.insert("Type", PdfObject::name(type_name));
        dict
    }

    pub fn insert(&mut self, key: impl Into<String>, value: PdfObject) {
        self.entries.insert(key.into(), value);
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: PdfObject) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&PdfObject> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PdfObject)> {
        self.entries.iter()
    }
}

/// PDF stream (dictionary + data)
#[derive(Debug, Clone)]
pub struct PdfStream {
    pub dict: PdfDictionary,
    pub data: Vec<u8>,
    /// Set once a filter has been applied to `data`
    pub compressed: bool,
    /// Streams that must stay readable as plain bytes (XMP metadata)
    pub never_compress: bool,
}

impl PdfStream {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            dict: PdfDictionary::new(),
            data,
            compressed: false,
            never_compress: false,
        }
    }

    pub fn with_dict(mut self, dict: PdfDictionary) -> Self {
        for (key, value) in dict.entries {
            self.dict.insert(key, value);
        }
        self
    }

    pub fn uncompressed(mut self) -> Self {
        self.never_compress = true;
        self
    }
}

/// Serializer for PDF objects
pub struct PdfSerializer<W: Write> {
    writer: W,
}

impl<W: Write> PdfSerializer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_object(&mut self, obj: &PdfObject) -> io::Result<()> {
        match obj {
            PdfObject::Null => write!(self.writer, "null"),
            PdfObject::Boolean(b) => write!(self.writer, "{}", b),
            PdfObject::Integer(n) => write!(self.writer, "{}", n),
            PdfObject::Real(n) => write!(self.writer, "{}", format_real(*n)),
            PdfObject::String(s) => self.write_string(s),
            PdfObject::Name(name) => self.write_name(name),
            PdfObject::Array(items) => self.write_array(items),
            PdfObject::Dictionary(dict) => self.write_dictionary(dict),
            PdfObject::Stream(stream) => self.write_stream(stream),
            PdfObject::Reference(num) => write!(self.writer, "{} 0 R", num),
        }
    }

    fn write_string(&mut self, s: &PdfString) -> io::Result<()> {
        match s {
            PdfString::Literal(data) => {
                self.writer.write_all(b"(")?;
                for &byte in data {
                    match byte {
                        b'(' | b')' | b'\\' => write!(self.writer, "\\{}", byte as char)?,
                        b'\n' => self.writer.write_all(b"\\n")?,
                        b'\r' => self.writer.write_all(b"\\r")?,
                        b'\t' => self.writer.write_all(b"\\t")?,
                        0x20..=0x7E => self.writer.write_all(&[byte])?,
                        _ => write!(self.writer, "\\{:03o}", byte)?,
                    }
                }
                self.writer.write_all(b")")
            }
            PdfString::Hex(data) => {
                self.writer.write_all(b"<")?;
                for byte in data {
                    write!(self.writer, "{:02X}", byte)?;
                }
                self.writer.write_all(b">")
            }
        }
    }

    fn write_name(&mut self, name: &str) -> io::Result<()> {
        self.writer.write_all(b"/")?;
        for byte in name.bytes() {
            let delimiter = matches!(
                byte,
                b'#' | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
            );
            if (0x21..=0x7E).contains(&byte) && !delimiter {
                self.writer.write_all(&[byte])?;
            } else {
                write!(self.writer, "#{:02X}", byte)?;
            }
        }
        Ok(())
    }

    fn write_array(&mut self, items: &[PdfObject]) -> io::Result<()> {
        self.writer.write_all(b"[")?;
        for (i, obj) in items.iter().enumerate() {
            if i > 0 {
                self.writer.write_all(b" ")?;
            }
            self.write_object(obj)?;
        }
        self.writer.write_all(b"]")
    }

    fn write_dictionary(&mut self, dict: &PdfDictionary) -> io::Result<()> {
        self.writer.write_all(b"<<")?;
        for (key, value) in dict.iter() {
            self.writer.write_all(b" ")?;
            self.write_name(key)?;
            self.writer.write_all(b" ")?;
            self.write_object(value)?;
        }
        self.writer.write_all(b" >>")
    }

    fn write_stream(&mut self, stream: &PdfStream) -> io::Result<()> {
        self.write_dictionary(&stream.dict)?;
        self.writer.write_all(b"\nstream\n")?;
        self.writer.write_all(&stream.data)?;
        self.writer.write_all(b"\nendstream")
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Format a real number with at most four decimals and no trailing zeros
pub(crate) fn format_real(n: f64) -> String {
    if n.fract() == 0.0 {
        return format!("{}", n as i64);
    }
    let s = format!("{:.4}", n);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

impl PdfObject {
    pub fn name(s: impl Into<String>) -> Self {
        PdfObject::Name(s.into())
    }

    pub fn text(s: &str) -> Self {
        PdfObject::String(PdfString::text(s))
    }

    pub fn real(n: f64) -> Self {
        PdfObject::Real(n)
    }

    /// Array of reals, used for boxes and matrices
    pub fn reals(values: &[f64]) -> Self {
        PdfObject::Array(values.iter().map(|&v| PdfObject::Real(v)).collect())
    }
}

impl From<bool> for PdfObject {
    fn from(b: bool) -> Self {
        PdfObject::Boolean(b)
    }
}

impl From<i64> for PdfObject {
    fn from(n: i64) -> Self {
        PdfObject::Integer(n)
    }
}

impl From<usize> for PdfObject {
    fn from(n: usize) -> Self {
        PdfObject::Integer(n as i64)
    }
}

impl From<PdfDictionary> for PdfObject {
    fn from(dict: PdfDictionary) -> Self {
        PdfObject::Dictionary(dict)
    }
}

impl From<Vec<PdfObject>> for PdfObject {
    fn from(items: Vec<PdfObject>) -> Self {
        PdfObject::Array(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serialize(obj: &PdfObject) -> String {
        let mut buf = Vec::new();
        PdfSerializer::new(&mut buf).write_object(obj).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_serialize_scalars() {
        assert_eq!(serialize(&PdfObject::Null), "null");
        assert_eq!(serialize(&PdfObject::Boolean(true)), "true");
        assert_eq!(serialize(&PdfObject::Integer(42)), "42");
        assert_eq!(serialize(&PdfObject::Real(3.14159)), "3.1416");
        assert_eq!(serialize(&PdfObject::Real(12.0)), "12");
        assert_eq!(serialize(&PdfObject::Reference(7)), "7 0 R");
    }

    #[test]
    fn test_serialize_literal_string_escapes() {
        let obj = PdfObject::String(PdfString::ascii("a(b)\\c"));
        assert_eq!(serialize(&obj), "(a\\(b\\)\\\\c)");
    }

    #[test]
    fn test_text_string_uses_utf16_for_non_ascii() {
        let obj = PdfObject::text("é");
        assert_eq!(serialize(&obj), "<FEFF00E9>");
        assert_eq!(serialize(&PdfObject::text("plain")), "(plain)");
    }

    #[test]
    fn test_serialize_name_escapes_delimiters() {
        assert_eq!(serialize(&PdfObject::name("Type")), "/Type");
        assert_eq!(serialize(&PdfObject::name("A B")), "/A#20B");
    }

    #[test]
    fn test_serialize_dictionary_is_sorted() {
        let dict = PdfDictionary::typed("Page").with("A", PdfObject::Integer(1));
        assert_eq!(serialize(&dict.into()), "<< /A 1 /Type /Page >>");
    }

    #[test]
    fn test_serialize_array() {
        let obj = PdfObject::reals(&[0.0, 0.5, 595.0]);
        assert_eq!(serialize(&obj), "[0 0.5 595]");
    }
}
