//! URI actions for opening web links

use crate::objects::{PdfDictionary, PdfName, PdfString};

/// URI action - resolve and open a URI
#[derive(Debug, Clone, PartialEq)]
pub struct UriAction {
    pub uri: String,
    /// Append the click position to the URI (image maps)
    pub is_map: bool,
}

impl UriAction {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            is_map: false,
        }
    }

    /// Create URI action for email
    pub fn email(address: impl Into<String>) -> Self {
        Self::new(format!("mailto:{}", address.into()))
    }

    pub fn with_map(mut self, is_map: bool) -> Self {
        self.is_map = is_map;
        self
    }

    pub fn to_dict(&self) -> PdfDictionary {
        let mut dict = PdfDictionary::with_type("Action");
        dict.set("S", PdfName::new("URI"));
        // URIs are 7-bit ASCII; no text encoding marker
        dict.set("URI", PdfString::from_bytes(self.uri.as_bytes()));
        if self.is_map {
            dict.set("IsMap", true);
        }
        dict
    }
}
