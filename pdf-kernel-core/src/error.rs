use crate::objects::{ObjectId, ObjectType};
use crate::parser::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write object {id}: {source}")]
    WriteFailed {
        id: ObjectId,
        #[source]
        source: std::io::Error,
    },

    #[error("Object {0} has already been flushed and released")]
    ObjectReleased(ObjectId),

    #[error("Indirect reference {0} belongs to another document")]
    ForeignReference(ObjectId),

    #[error("Unsupported /{key} value of type {found:?}")]
    UnsupportedFilterValue {
        key: &'static str,
        found: ObjectType,
    },

    #[error("Invalid stream: {0}")]
    InvalidStream(String),

    #[error("Compression error: {0}")]
    CompressionError(String),

    #[error("Encryption error: {0}")]
    EncryptionError(String),

    #[error("Invalid object reference: {0} {1} R")]
    InvalidObjectReference(u32, u16),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

impl PdfError {
    /// Attaches the object being written to a bare I/O failure.
    pub(crate) fn while_writing(self, id: ObjectId) -> Self {
        match self {
            PdfError::Io(source) => PdfError::WriteFailed { id, source },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, PdfError>;
