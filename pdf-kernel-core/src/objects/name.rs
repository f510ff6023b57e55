use indexmap::Equivalent;
use once_cell::unsync::OnceCell;
use std::fmt;
use std::hash::{Hash, Hasher};

/// PDF name object.
///
/// A name built by application code starts from its text value; a name read
/// from a file starts from its raw bytes (after `#xx` decoding). The other
/// form is produced on first access and cached.
#[derive(Clone)]
pub struct PdfName {
    content: OnceCell<Vec<u8>>,
    value: OnceCell<String>,
}

impl PdfName {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            content: OnceCell::new(),
            value: OnceCell::from(value.into()),
        }
    }

    pub fn from_bytes(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: OnceCell::from(content.into()),
            value: OnceCell::new(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.content.get_or_init(|| match self.value.get() {
            Some(value) => value.as_bytes().to_vec(),
            None => Vec::new(),
        })
    }

    pub fn as_str(&self) -> &str {
        self.value.get_or_init(|| match self.content.get() {
            Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            None => String::new(),
        })
    }

    /// Whether the raw byte form has been materialized.
    pub fn has_content(&self) -> bool {
        self.content.get().is_some()
    }

    /// Whether the text form has been materialized.
    pub fn has_value(&self) -> bool {
        self.value.get().is_some()
    }
}

impl PartialEq for PdfName {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for PdfName {}

// UTF-8 names hash like `str` so dictionaries can be queried with `&str`.
impl Hash for PdfName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match std::str::from_utf8(self.as_bytes()) {
            Ok(s) => s.hash(state),
            Err(_) => self.as_bytes().hash(state),
        }
    }
}

impl Equivalent<PdfName> for str {
    fn equivalent(&self, key: &PdfName) -> bool {
        self.as_bytes() == key.as_bytes()
    }
}

impl PartialOrd for PdfName {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PdfName {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl PartialEq<str> for PdfName {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for PdfName {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl fmt::Debug for PdfName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.as_str())
    }
}

impl fmt::Display for PdfName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.as_str())
    }
}

impl From<&str> for PdfName {
    fn from(value: &str) -> Self {
        PdfName::new(value)
    }
}

impl From<String> for PdfName {
    fn from(value: String) -> Self {
        PdfName::new(value)
    }
}
