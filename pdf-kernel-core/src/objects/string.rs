//! PDF string objects and text encodings.

use crate::encryption::ByteTransform;
use lazy_static::lazy_static;
use once_cell::unsync::OnceCell;
use std::collections::HashMap;
use std::fmt;

/// PDFDocEncoding code points that differ from Latin-1 (0x18..=0x1F).
const PDF_DOC_LOW: [char; 8] = [
    '\u{02D8}', '\u{02C7}', '\u{02C6}', '\u{02D9}', '\u{02DD}', '\u{02DB}', '\u{02DA}', '\u{02DC}',
];

/// PDFDocEncoding code points for 0x80..=0xA0. 0x9F is undefined.
const PDF_DOC_HIGH: [char; 33] = [
    '\u{2022}', '\u{2020}', '\u{2021}', '\u{2026}', '\u{2014}', '\u{2013}', '\u{0192}', '\u{2044}',
    '\u{2039}', '\u{203A}', '\u{2212}', '\u{2030}', '\u{201E}', '\u{201C}', '\u{201D}', '\u{2018}',
    '\u{2019}', '\u{201A}', '\u{2122}', '\u{FB01}', '\u{FB02}', '\u{0141}', '\u{0152}', '\u{0160}',
    '\u{0178}', '\u{017D}', '\u{0131}', '\u{0142}', '\u{0153}', '\u{0161}', '\u{017E}', '\u{FFFD}',
    '\u{20AC}',
];

lazy_static! {
    static ref PDF_DOC_REVERSE: HashMap<char, u8> = {
        let mut map = HashMap::new();
        for byte in 0u8..=255 {
            if let Some(ch) = pdf_doc_char(byte) {
                map.insert(ch, byte);
            }
        }
        map
    };
}

fn pdf_doc_char(byte: u8) -> Option<char> {
    match byte {
        0x18..=0x1F => Some(PDF_DOC_LOW[(byte - 0x18) as usize]),
        0x7F | 0x9F | 0xAD => None,
        0x80..=0xA0 => Some(PDF_DOC_HIGH[(byte - 0x80) as usize]),
        _ => Some(byte as char),
    }
}

/// Text encodings a string value may be converted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    PdfDocEncoding,
    /// UTF-16BE with a leading byte order mark
    Utf16Be,
    /// UTF-8 with a leading byte order mark (PDF 2.0)
    Utf8,
}

impl TextEncoding {
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            TextEncoding::PdfDocEncoding => text
                .chars()
                .map(|c| PDF_DOC_REVERSE.get(&c).copied().unwrap_or(b'?'))
                .collect(),
            TextEncoding::Utf16Be => {
                let mut bytes = vec![0xFE, 0xFF];
                for unit in text.encode_utf16() {
                    bytes.extend_from_slice(&unit.to_be_bytes());
                }
                bytes
            }
            TextEncoding::Utf8 => {
                let mut bytes = vec![0xEF, 0xBB, 0xBF];
                bytes.extend_from_slice(text.as_bytes());
                bytes
            }
        }
    }

    /// Detects the encoding of stored string bytes from their byte order mark.
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(&[0xFE, 0xFF]) {
            TextEncoding::Utf16Be
        } else if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
            TextEncoding::Utf8
        } else {
            TextEncoding::PdfDocEncoding
        }
    }

    pub fn decode(bytes: &[u8]) -> String {
        match Self::detect(bytes) {
            TextEncoding::Utf16Be => {
                let units: Vec<u16> = bytes[2..]
                    .chunks(2)
                    .map(|pair| u16::from_be_bytes([pair[0], *pair.get(1).unwrap_or(&0)]))
                    .collect();
                String::from_utf16_lossy(&units)
            }
            TextEncoding::Utf8 => String::from_utf8_lossy(&bytes[3..]).into_owned(),
            TextEncoding::PdfDocEncoding => bytes
                .iter()
                .map(|&b| pdf_doc_char(b).unwrap_or('\u{FFFD}'))
                .collect(),
        }
    }

    /// PDFDocEncoding when every character fits, UTF-16BE otherwise.
    fn best_for(text: &str) -> Self {
        if text.chars().all(|c| PDF_DOC_REVERSE.contains_key(&c)) {
            TextEncoding::PdfDocEncoding
        } else {
            TextEncoding::Utf16Be
        }
    }
}

/// PDF string object.
///
/// Keeps the stored bytes (`content`) and the Unicode value lazily in sync:
/// whichever form is missing is regenerated from the other on access.
#[derive(Clone)]
pub struct PdfString {
    content: OnceCell<Vec<u8>>,
    value: OnceCell<String>,
    encoding: Option<TextEncoding>,
    hex: bool,
    encrypted: bool,
}

impl PdfString {
    /// Text string; encoded on demand with [`TextEncoding::PdfDocEncoding`]
    /// when possible, UTF-16BE otherwise.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            content: OnceCell::new(),
            value: OnceCell::from(value.into()),
            encoding: None,
            hex: false,
            encrypted: false,
        }
    }

    pub fn with_encoding(value: impl Into<String>, encoding: TextEncoding) -> Self {
        Self {
            encoding: Some(encoding),
            ..Self::new(value)
        }
    }

    /// Byte string, as stored in a file.
    pub fn from_bytes(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: OnceCell::from(content.into()),
            value: OnceCell::new(),
            encoding: None,
            hex: false,
            encrypted: false,
        }
    }

    pub fn hex(content: impl Into<Vec<u8>>) -> Self {
        Self {
            hex: true,
            ..Self::from_bytes(content)
        }
    }

    pub fn is_hex(&self) -> bool {
        self.hex
    }

    pub fn set_hex(&mut self, hex: bool) {
        self.hex = hex;
    }

    pub fn encoding(&self) -> Option<TextEncoding> {
        self.encoding
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.content.get_or_init(|| match self.value.get() {
            Some(value) => self
                .encoding
                .unwrap_or_else(|| TextEncoding::best_for(value))
                .encode(value),
            None => Vec::new(),
        })
    }

    /// Unicode value of the string. Meaningless while the string holds
    /// ciphertext.
    pub fn value(&self) -> &str {
        self.value.get_or_init(|| match self.content.get() {
            Some(bytes) => TextEncoding::decode(bytes),
            None => String::new(),
        })
    }

    pub fn has_content(&self) -> bool {
        self.content.get().is_some()
    }

    pub fn has_value(&self) -> bool {
        self.value.get().is_some()
    }

    /// Replaces the stored bytes with their encrypted form. The cached value
    /// is dropped since it no longer describes the content.
    pub fn encrypt(&mut self, transform: &mut dyn ByteTransform) {
        let mut encrypted = transform.update(self.as_bytes());
        encrypted.extend(transform.finish());
        self.content = OnceCell::from(encrypted);
        self.value = OnceCell::new();
        self.encrypted = true;
    }

    /// Replaces ciphertext with plaintext and repopulates the value.
    pub fn decrypt(&mut self, transform: &mut dyn ByteTransform) {
        let mut plain = transform.update(self.as_bytes());
        plain.extend(transform.finish());
        let value = TextEncoding::decode(&plain);
        self.content = OnceCell::from(plain);
        self.value = OnceCell::from(value);
        self.encrypted = false;
    }
}

impl PartialEq for PdfString {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl fmt::Debug for PdfString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.encrypted {
            write!(f, "PdfString(<{} encrypted bytes>)", self.as_bytes().len())
        } else {
            write!(f, "PdfString({:?})", self.value())
        }
    }
}

impl From<&str> for PdfString {
    fn from(value: &str) -> Self {
        PdfString::new(value)
    }
}

impl From<String> for PdfString {
    fn from(value: String) -> Self {
        PdfString::new(value)
    }
}
