//! Byte-level serialization of PDF objects.

use crate::encryption::{should_encrypt_strings, PdfEncryption};
use crate::error::{PdfError, Result};
use crate::objects::{
    DocumentId, IndirectRef, ObjectId, PdfArray, PdfDictionary, PdfLiteral, PdfName, PdfNumber,
    PdfObject, PdfString, StreamContent,
};
use std::io::{self, Write};
use std::sync::Arc;

/// Output sink that tracks its byte position and knows how to write every
/// PDF object kind.
pub struct PdfOutputStream<W: Write> {
    inner: W,
    position: u64,
    high_precision: bool,
    document: Option<DocumentId>,
    encryption: Option<Arc<dyn PdfEncryption>>,
    current_object: Option<ObjectId>,
}

impl<W: Write> PdfOutputStream<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            position: 0,
            high_precision: false,
            document: None,
            encryption: None,
            current_object: None,
        }
    }

    /// Continue counting from `position` (the size of bytes already in the
    /// sink, e.g. an original file copied ahead of an incremental update).
    pub fn with_position(inner: W, position: u64) -> Self {
        Self {
            position,
            ..Self::new(inner)
        }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn set_high_precision(&mut self, high_precision: bool) {
        self.high_precision = high_precision;
    }

    /// References written through this stream must belong to `document`.
    pub fn set_document(&mut self, document: DocumentId) {
        self.document = Some(document);
    }

    pub fn set_encryption(&mut self, encryption: Option<Arc<dyn PdfEncryption>>) {
        self.encryption = encryption;
    }

    /// Object whose key encrypts strings written next; `None` disables
    /// string encryption.
    pub fn set_current_object(&mut self, id: Option<ObjectId>) {
        self.current_object = id;
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data)?;
        self.position += data.len() as u64;
        Ok(())
    }

    pub fn write_str(&mut self, text: &str) -> Result<()> {
        self.write_bytes(text.as_bytes())
    }

    pub fn write_integer(&mut self, value: i64) -> Result<()> {
        self.write_str(&value.to_string())
    }

    pub fn write_real(&mut self, value: f64) -> Result<()> {
        let formatted = format_real(value, self.high_precision);
        self.write_str(&formatted)
    }

    pub fn write_number(&mut self, number: PdfNumber) -> Result<()> {
        match number {
            PdfNumber::Integer(i) => self.write_integer(i),
            PdfNumber::Real(f) => self.write_real(f),
        }
    }

    pub fn write_name(&mut self, name: &PdfName) -> Result<()> {
        let escaped = escape_name(name.as_bytes());
        self.write_bytes(&escaped)
    }

    pub fn write_string(&mut self, string: &PdfString) -> Result<()> {
        let encrypted;
        let string = match (&self.encryption, self.current_object) {
            (Some(enc), Some(id)) if should_encrypt_strings(enc.as_ref()) && !string.is_encrypted() => {
                let mut copy = string.clone();
                copy.encrypt(enc.transform_for(id).as_mut());
                encrypted = copy;
                &encrypted
            }
            _ => string,
        };
        if string.is_hex() {
            let hex = encode_hex(string.as_bytes());
            self.write_bytes(b"<")?;
            self.write_bytes(&hex)?;
            self.write_bytes(b">")
        } else {
            let escaped = escape_literal_string(string.as_bytes());
            self.write_bytes(b"(")?;
            self.write_bytes(&escaped)?;
            self.write_bytes(b")")
        }
    }

    pub fn write_literal(&mut self, literal: &PdfLiteral) -> Result<()> {
        self.write_bytes(literal.as_bytes())
    }

    pub fn write_reference(&mut self, reference: IndirectRef) -> Result<()> {
        if let Some(document) = self.document {
            if reference.document() != document {
                return Err(PdfError::ForeignReference(reference.id()));
            }
        }
        self.write_str(&format!(
            "{} {} R",
            reference.number(),
            reference.generation()
        ))
    }

    pub fn write_array(&mut self, array: &PdfArray) -> Result<()> {
        self.write_bytes(b"[")?;
        for (i, element) in array.iter().enumerate() {
            if i > 0 {
                self.write_bytes(b" ")?;
            }
            self.write_object(element)?;
        }
        self.write_bytes(b"]")
    }

    pub fn write_dictionary(&mut self, dict: &PdfDictionary) -> Result<()> {
        self.write_bytes(b"<<")?;
        for (key, value) in dict.iter() {
            self.write_bytes(b" ")?;
            self.write_name(key)?;
            self.write_bytes(b" ")?;
            self.write_object(value)?;
        }
        self.write_bytes(b" >>")
    }

    /// Writes `dict`, then the already encoded `body` framed by
    /// `stream`/`endstream`. `/Length` must already be correct.
    pub fn write_stream(&mut self, dict: &PdfDictionary, body: &[u8]) -> Result<()> {
        self.write_dictionary(dict)?;
        self.write_bytes(b"\nstream\n")?;
        self.write_bytes(body)?;
        self.write_bytes(b"\nendstream")
    }

    pub fn write_object(&mut self, object: &PdfObject) -> Result<()> {
        match object {
            PdfObject::Null => self.write_bytes(b"null"),
            PdfObject::Boolean(true) => self.write_bytes(b"true"),
            PdfObject::Boolean(false) => self.write_bytes(b"false"),
            PdfObject::Number(n) => self.write_number(*n),
            PdfObject::Name(n) => self.write_name(n),
            PdfObject::String(s) => self.write_string(s),
            PdfObject::Literal(l) => self.write_literal(l),
            PdfObject::Array(a) => self.write_array(a),
            PdfObject::Dictionary(d) => self.write_dictionary(d),
            PdfObject::Reference(r) => self.write_reference(*r),
            PdfObject::Stream(s) => match s.content() {
                StreamContent::Buffer(bytes) => self.write_stream(s.dictionary(), bytes),
                StreamContent::Original(original) => {
                    self.write_stream(s.dictionary(), original.as_bytes())
                }
                StreamContent::Input(_) => Err(PdfError::InvalidStream(
                    "input-backed stream must be written as an indirect object".to_string(),
                )),
                StreamContent::Released => Err(PdfError::InvalidStream(
                    "stream has no content".to_string(),
                )),
            },
        }
    }

    /// `n g obj\n` + object + `\nendobj\n`.
    pub fn write_indirect_object(&mut self, id: ObjectId, object: &PdfObject) -> Result<()> {
        self.write_object_header(id)?;
        self.write_object(object)?;
        self.write_object_footer()
    }

    pub fn write_object_header(&mut self, id: ObjectId) -> Result<()> {
        self.write_str(&format!("{} {} obj\n", id.number(), id.generation()))
    }

    pub fn write_object_footer(&mut self) -> Result<()> {
        self.write_bytes(b"\nendobj\n")
    }
}

impl<W: Write> Write for PdfOutputStream<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.position += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Formats a real number the compact way PDF producers do: up to five
/// decimals below 1, two decimals up to 32767, none above.
pub fn format_real(value: f64, high_precision: bool) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let abs = value.abs();
    let digits = if high_precision {
        if abs < 0.000_000_1 {
            return "0".to_string();
        }
        format!("{abs:.10}")
    } else {
        if abs < 0.000_015 {
            return "0".to_string();
        }
        if abs < 1.0 {
            format!("{abs:.5}")
        } else if abs <= 32767.0 {
            format!("{abs:.2}")
        } else {
            format!("{abs:.0}")
        }
    };
    let trimmed = if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits.as_str()
    };
    if trimmed == "0" {
        return "0".to_string();
    }
    if value < 0.0 {
        format!("-{trimmed}")
    } else {
        trimmed.to_string()
    }
}

fn is_delimiter(byte: u8) -> bool {
    matches!(
        byte,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

/// `/` followed by the name bytes, with `#xx` for anything a lexer would
/// otherwise split on.
pub fn escape_name(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 1);
    out.push(b'/');
    for &b in bytes {
        if !(0x21..=0x7E).contains(&b) || b == b'#' || is_delimiter(b) {
            out.extend_from_slice(format!("#{b:02X}").as_bytes());
        } else {
            out.push(b);
        }
    }
    out
}

pub fn escape_literal_string(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 2);
    for &b in bytes {
        match b {
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'(' => out.extend_from_slice(b"\\("),
            b')' => out.extend_from_slice(b"\\)"),
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\t' => out.extend_from_slice(b"\\t"),
            0x08 => out.extend_from_slice(b"\\b"),
            0x0C => out.extend_from_slice(b"\\f"),
            _ => out.push(b),
        }
    }
    out
}

pub fn encode_hex(bytes: &[u8]) -> Vec<u8> {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = Vec::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(HEX[(b >> 4) as usize]);
        out.push(HEX[(b & 0x0F) as usize]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encryption::testing::XorEncryption;
    use crate::objects::PdfStream;

    fn render(object: &PdfObject) -> String {
        let mut out = PdfOutputStream::new(Vec::new());
        out.write_object(object).unwrap();
        String::from_utf8_lossy(&out.into_inner()).into_owned()
    }

    #[test]
    fn test_position_tracking() {
        let mut out = PdfOutputStream::new(Vec::new());
        out.write_str("abc").unwrap();
        out.write_all(b"de").unwrap();
        assert_eq!(out.position(), 5);

        let out = PdfOutputStream::with_position(Vec::new(), 100);
        assert_eq!(out.position(), 100);
    }

    #[test]
    fn test_primitives() {
        assert_eq!(render(&PdfObject::Null), "null");
        assert_eq!(render(&PdfObject::from(true)), "true");
        assert_eq!(render(&PdfObject::from(-17)), "-17");
        assert_eq!(render(&PdfObject::from(0.5)), "0.5");
        assert_eq!(render(&PdfObject::name("Type")), "/Type");
        assert_eq!(render(&PdfObject::from(PdfLiteral::new("0 0 m"))), "0 0 m");
    }

    #[test]
    fn test_dictionary_layout() {
        let mut dict = PdfDictionary::new();
        dict.set("Type", PdfName::new("Example"));
        dict.set("Value", 42);
        assert_eq!(
            render(&PdfObject::from(dict)),
            "<< /Type /Example /Value 42 >>"
        );
        assert_eq!(render(&PdfObject::from(PdfDictionary::new())), "<< >>");
    }

    #[test]
    fn test_array_layout() {
        let array = PdfObject::from(vec![
            PdfObject::from(1),
            PdfObject::name("A"),
            PdfObject::Null,
        ]);
        assert_eq!(render(&array), "[1 /A null]");
    }

    #[test]
    fn test_real_formatting() {
        assert_eq!(format_real(0.0, false), "0");
        assert_eq!(format_real(0.000001, false), "0");
        assert_eq!(format_real(0.123456, false), "0.12346");
        assert_eq!(format_real(1.5, false), "1.5");
        assert_eq!(format_real(-2.25, false), "-2.25");
        assert_eq!(format_real(3.14159, false), "3.14");
        assert_eq!(format_real(100.0, false), "100");
        assert_eq!(format_real(40000.6, false), "40001");
        assert_eq!(format_real(3.14159265, true), "3.14159265");
        assert_eq!(format_real(f64::NAN, false), "0");
    }

    #[test]
    fn test_name_escaping() {
        assert_eq!(escape_name(b"A B"), b"/A#20B");
        assert_eq!(escape_name(b"a#b"), b"/a#23b");
        assert_eq!(escape_name(b"x/y"), b"/x#2Fy");
        assert_eq!(escape_name(&[0xE9]), b"/#E9");
    }

    #[test]
    fn test_literal_string_escaping() {
        let s = PdfObject::from(PdfString::from_bytes(b"a(b)\\c\n".to_vec()));
        assert_eq!(render(&s), "(a\\(b\\)\\\\c\\n)");
    }

    #[test]
    fn test_hex_string() {
        let s = PdfObject::from(PdfString::hex(vec![0x00, 0xAB, 0x10]));
        assert_eq!(render(&s), "<00AB10>");
    }

    #[test]
    fn test_foreign_reference_rejected() {
        let mine = DocumentId::next();
        let other = DocumentId::next();
        let mut out = PdfOutputStream::new(Vec::new());
        out.set_document(mine);

        out.write_reference(IndirectRef::new(ObjectId::new(3, 0), mine))
            .unwrap();
        let err = out
            .write_reference(IndirectRef::new(ObjectId::new(4, 0), other))
            .unwrap_err();
        assert!(matches!(err, PdfError::ForeignReference(id) if id == ObjectId::new(4, 0)));
        assert_eq!(out.into_inner(), b"3 0 R");
    }

    #[test]
    fn test_strings_encrypted_with_current_object() {
        let mut out = PdfOutputStream::new(Vec::new());
        out.set_encryption(Some(Arc::new(XorEncryption::default())));
        out.set_current_object(Some(ObjectId::new(1, 0)));
        out.write_string(&PdfString::hex(vec![0x00])).unwrap();

        out.set_current_object(None);
        out.write_string(&PdfString::hex(vec![0x00])).unwrap();
        assert_eq!(out.into_inner(), b"<81><00>");
    }

    #[test]
    fn test_embedded_only_mode_leaves_strings() {
        let mut out = PdfOutputStream::new(Vec::new());
        out.set_encryption(Some(Arc::new(XorEncryption {
            embedded_only: true,
            ..Default::default()
        })));
        out.set_current_object(Some(ObjectId::new(1, 0)));
        out.write_string(&PdfString::hex(vec![0x00])).unwrap();
        assert_eq!(out.into_inner(), b"<00>");
    }

    #[test]
    fn test_indirect_object_framing() {
        let mut out = PdfOutputStream::new(Vec::new());
        out.write_indirect_object(ObjectId::new(5, 0), &PdfObject::from(1))
            .unwrap();
        assert_eq!(out.into_inner(), b"5 0 obj\n1\nendobj\n");
    }

    #[test]
    fn test_buffered_stream() {
        let mut stream = PdfStream::new(b"BT ET".to_vec());
        stream.dictionary_mut().set("Length", 5);
        assert_eq!(
            render(&PdfObject::from(stream)),
            "<< /Length 5 >>\nstream\nBT ET\nendstream"
        );
    }

    #[test]
    fn test_released_stream_is_error() {
        let mut stream = PdfStream::new(Vec::new());
        stream.take_content();
        let mut out = PdfOutputStream::new(Vec::new());
        assert!(matches!(
            out.write_object(&PdfObject::from(stream)),
            Err(PdfError::InvalidStream(_))
        ));
    }
}
