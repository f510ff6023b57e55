//! PDF Parser Module
//!
//! Reads the syntax this crate writes (and what other producers write) back
//! into the in-memory object model: tokens, objects, cross-reference
//! sections and object streams.

pub mod filters;
pub mod lexer;
pub mod object_stream;
pub mod objects;
pub mod xref;

pub use self::lexer::{Lexer, Token};
pub use self::objects::ObjectParser;
pub use self::xref::XrefData;

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// PDF Parser errors
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid PDF header")]
    InvalidHeader,

    #[error("Syntax error at position {position}: {message}")]
    SyntaxError { position: usize, message: String },

    #[error("Unexpected token at position {position}: expected {expected}, found {found}")]
    UnexpectedToken {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("Invalid object reference: {0} {1} R")]
    InvalidReference(u32, u16),

    #[error("Missing required key: {0}")]
    MissingKey(String),

    #[error("startxref not found")]
    MissingStartXref,

    #[error("Invalid xref section at offset {0}")]
    InvalidXRef(usize),

    #[error("Circular xref chain at offset {0}")]
    CircularReference(usize),

    #[error("Stream decode error: {0}")]
    StreamDecodeError(String),

    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),
}

/// Reads the `%PDF-x.y` header and returns the version string.
pub fn parse_header(data: &[u8]) -> ParseResult<String> {
    // Some producers put junk before the header; tolerate a little of it.
    let window = &data[..data.len().min(1024)];
    let start = window
        .windows(5)
        .position(|w| w == b"%PDF-")
        .ok_or(ParseError::InvalidHeader)?;
    let version: String = window[start + 5..]
        .iter()
        .take_while(|&&b| b.is_ascii_digit() || b == b'.')
        .map(|&b| b as char)
        .collect();
    if version.is_empty() {
        return Err(ParseError::InvalidHeader);
    }
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        assert_eq!(parse_header(b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n").unwrap(), "1.7");
        assert_eq!(parse_header(b"garbage%PDF-2.0\r\n").unwrap(), "2.0");
    }

    #[test]
    fn test_parse_header_missing() {
        assert!(matches!(
            parse_header(b"not a pdf"),
            Err(ParseError::InvalidHeader)
        ));
        assert!(matches!(
            parse_header(b"%PDF-x"),
            Err(ParseError::InvalidHeader)
        ));
    }

    #[test]
    fn test_error_display() {
        let err = ParseError::SyntaxError {
            position: 12,
            message: "Unterminated string".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Syntax error at position 12: Unterminated string"
        );
        assert_eq!(
            ParseError::InvalidReference(3, 0).to_string(),
            "Invalid object reference: 3 0 R"
        );
    }
}
