//! # pdf-kernel
//!
//! The object and persistence core of a PDF library: an in-memory object
//! graph, the cross-reference table that addresses it, and a writer that
//! serializes it either as a complete file or as an incremental update of an
//! existing one.
//!
//! ## Features
//!
//! - **Object model**: dictionaries, arrays, streams and indirect references
//!   with per-object lifecycle state
//! - **Cross-reference table**: object number allocation, free-list reuse and
//!   generation tracking
//! - **Writer**: classic xref tables or full compression (object streams plus
//!   an xref stream), early flushing to bound memory
//! - **Append mode**: incremental updates that leave the original bytes intact
//! - **Smart mode**: content-addressed deduplication while copying objects
//!   between documents
//! - **Encryption hook**: strings and streams pass through a pluggable
//!   per-object transform
//!
//! ## Quick Start
//!
//! ```rust
//! use pdf_kernel::{PdfDictionary, PdfDocument, PdfWriter, WriterConfig};
//!
//! # fn main() -> pdf_kernel::Result<()> {
//! let mut doc = PdfDocument::new();
//! let pages = doc.add_object(PdfDictionary::with_type("Pages"));
//! let mut catalog = PdfDictionary::with_type("Catalog");
//! catalog.set("Pages", pages);
//! let root = doc.add_object(catalog);
//! doc.set_root(root);
//!
//! let writer = PdfWriter::with_config(Vec::new(), WriterConfig::default());
//! let bytes = writer.close(&mut doc)?;
//! assert!(bytes.starts_with(b"%PDF-1.7"));
//!
//! let mut reread = PdfDocument::open(bytes)?;
//! assert!(reread.catalog()?.is_some());
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod compression;
pub mod document;
pub mod encryption;
pub mod error;
pub mod meta;
pub mod objects;
pub mod parser;
pub mod writer;
pub mod xref;

pub use compression::CompressionLevel;
pub use document::PdfDocument;
pub use error::{PdfError, Result};
pub use objects::{
    IndirectRef, ObjectId, ObjectState, PdfArray, PdfDictionary, PdfName, PdfNumber, PdfObject,
    PdfStream, PdfString,
};
pub use writer::{PdfWriter, WriterConfig};
pub use xref::XrefTable;

/// Current version of pdf-kernel
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Supported PDF versions
pub mod pdf_version {
    /// Versions written and read
    pub const SUPPORTED_VERSIONS: &[&str] =
        &["1.0", "1.1", "1.2", "1.3", "1.4", "1.5", "1.6", "1.7", "2.0"];
    /// Object and xref streams need at least this version
    pub const FULL_COMPRESSION_MIN: &str = "1.5";
}
