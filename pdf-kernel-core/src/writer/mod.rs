//! PDF writing functionality

pub mod object_stream;
pub mod output;
mod pdf_writer;
pub mod smart;
pub mod xref_stream_writer;

pub use object_stream::{ObjectStream, MAX_OBJ_STREAM_SIZE};
pub use output::PdfOutputStream;
pub use pdf_writer::{format_pdf_date, PdfWriter};
pub use xref_stream_writer::{XrefEntry, XrefStreamWriter};

use crate::compression::CompressionLevel;
use crate::pdf_version::FULL_COMPRESSION_MIN;

/// Writer settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WriterConfig {
    /// Version written into the `%PDF-` header; `None` keeps the
    /// document's own version
    pub pdf_version: Option<String>,
    /// Pack eligible objects into object streams and write an xref stream
    pub full_compression: bool,
    /// Level used for streams that do not set their own
    pub compression_level: CompressionLevel,
    /// Deduplicate structurally equal objects while copying
    pub smart_mode: bool,
    /// Incremental update of an opened document
    pub append_mode: bool,
    /// Ten decimals for reals instead of the compact format
    pub high_precision: bool,
    /// Fixed file identifier for reproducible output
    pub file_id: Option<[u8; 16]>,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            pdf_version: None,
            full_compression: false,
            compression_level: CompressionLevel::Default,
            smart_mode: false,
            append_mode: false,
            high_precision: false,
            file_id: None,
        }
    }
}

impl WriterConfig {
    pub fn with_full_compression(mut self) -> Self {
        self.full_compression = true;
        self
    }

    pub fn with_pdf_version(mut self, version: impl Into<String>) -> Self {
        self.pdf_version = Some(version.into());
        self
    }

    /// Header version for a document currently at `document_version`.
    ///
    /// Full compression needs object streams, so it raises anything older
    /// than PDF 1.5.
    pub fn resolve_version(&self, document_version: &str) -> String {
        let version = self.pdf_version.as_deref().unwrap_or(document_version);
        if self.full_compression && version < FULL_COMPRESSION_MIN {
            FULL_COMPRESSION_MIN.to_string()
        } else {
            version.to_string()
        }
    }

    pub fn with_smart_mode(mut self) -> Self {
        self.smart_mode = true;
        self
    }

    pub fn with_append_mode(mut self) -> Self {
        self.append_mode = true;
        self
    }

    pub fn with_compression_level(mut self, level: CompressionLevel) -> Self {
        self.compression_level = level;
        self
    }

    /// Parses a JSON configuration; missing fields keep their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| crate::error::PdfError::InvalidOperation(format!("invalid writer config: {e}")))
    }
}
