//! PDF Object Stream Parser
//!
//! Handles compressed objects stored in object streams (PDF 1.5+)

use super::filters::decode_stream;
use super::lexer::{Lexer, Token};
use super::objects::ObjectParser;
use super::{ParseError, ParseResult};
use crate::objects::{DocumentId, PdfObject, PdfStream};

/// Decoded contents of one `/Type /ObjStm` stream.
#[derive(Debug, Clone)]
pub struct ObjectStreamContents {
    /// `(object number, object)` in index order
    objects: Vec<(u32, PdfObject)>,
}

impl ObjectStreamContents {
    /// Decodes `stream` and parses every object it holds.
    pub fn parse(stream: &PdfStream, document: DocumentId) -> ParseResult<Self> {
        let dict = stream.dictionary();
        let n = dict
            .get_integer("N")
            .filter(|&n| n >= 0)
            .ok_or_else(|| ParseError::MissingKey("N".to_string()))? as usize;
        let first = dict
            .get_integer("First")
            .filter(|&f| f >= 0)
            .ok_or_else(|| ParseError::MissingKey("First".to_string()))? as usize;
        let raw = stream.content().bytes().ok_or_else(|| {
            ParseError::StreamDecodeError("object stream has no content".to_string())
        })?;
        let data = decode_stream(raw, dict)?;

        let mut header = Lexer::new(&data[..first.min(data.len())]);
        let mut slots = Vec::with_capacity(n);
        for _ in 0..n {
            match (header.next_token()?, header.next_token()?) {
                (Token::Integer(number), Token::Integer(offset)) if number >= 0 && offset >= 0 => {
                    slots.push((number as u32, offset as usize))
                }
                _ => {
                    return Err(ParseError::SyntaxError {
                        position: header.position(),
                        message: "malformed object stream header".to_string(),
                    })
                }
            }
        }

        let mut objects = Vec::with_capacity(n);
        for (number, offset) in slots {
            let mut parser = ObjectParser::new(&data, document).at(first + offset);
            objects.push((number, parser.parse_object()?));
        }
        Ok(Self { objects })
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Object at `index`, checked against the expected object number.
    pub fn get(&self, index: usize, number: u32) -> Option<&PdfObject> {
        self.objects
            .get(index)
            .filter(|(n, _)| *n == number)
            .map(|(_, object)| object)
            // Some writers index inconsistently; fall back to a search.
            .or_else(|| {
                self.objects
                    .iter()
                    .find(|(n, _)| *n == number)
                    .map(|(_, object)| object)
            })
    }
}
