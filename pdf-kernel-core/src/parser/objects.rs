//! PDF Object Parser
//!
//! Parses PDF objects from tokens according to ISO 32000-1 Section 7.3

use super::lexer::{is_whitespace, Lexer, Token};
use super::{ParseError, ParseResult};
use crate::objects::{
    DocumentId, IndirectRef, ObjectId, OriginalBytes, PdfArray, PdfDictionary, PdfName,
    PdfObject, PdfStream, PdfString, StreamContent, MAX_GENERATION,
};
use std::sync::Arc;
use tracing::warn;

/// Resolves an indirect `/Length` while a stream body is being located.
pub type LengthResolver<'r> = &'r dyn Fn(IndirectRef) -> Option<i64>;

/// Recursive-descent parser producing [`PdfObject`]s bound to one document.
pub struct ObjectParser<'a> {
    lexer: Lexer<'a>,
    document: DocumentId,
    source: Option<Arc<[u8]>>,
}

impl<'a> ObjectParser<'a> {
    pub fn new(data: &'a [u8], document: DocumentId) -> Self {
        Self {
            lexer: Lexer::new(data),
            document,
            source: None,
        }
    }

    /// Moves the parser to `position`.
    pub fn at(mut self, position: usize) -> Self {
        self.lexer.set_position(position);
        self
    }

    /// Shared copy of the bytes being parsed. Stream bodies then point into
    /// it instead of being copied out.
    pub fn with_source(mut self, source: Arc<[u8]>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn position(&self) -> usize {
        self.lexer.position()
    }

    pub fn lexer_mut(&mut self) -> &mut Lexer<'a> {
        &mut self.lexer
    }

    fn unexpected(&self, expected: &str, found: &Token) -> ParseError {
        ParseError::UnexpectedToken {
            position: self.lexer.position(),
            expected: expected.to_string(),
            found: format!("{found:?}"),
        }
    }

    /// Parses one direct object (a reference counts as direct here).
    pub fn parse_object(&mut self) -> ParseResult<PdfObject> {
        let token = self.lexer.next_token()?;
        self.parse_from_token(token)
    }

    fn parse_from_token(&mut self, token: Token) -> ParseResult<PdfObject> {
        match token {
            Token::Null => Ok(PdfObject::Null),
            Token::Boolean(b) => Ok(PdfObject::Boolean(b)),
            Token::Integer(i) => self.integer_or_reference(i),
            Token::Real(r) => Ok(PdfObject::from(r)),
            Token::String(bytes) => Ok(PdfObject::String(PdfString::from_bytes(bytes))),
            Token::HexString(bytes) => Ok(PdfObject::String(PdfString::hex(bytes))),
            Token::Name(bytes) => Ok(PdfObject::Name(PdfName::from_bytes(bytes))),
            Token::ArrayStart => self.parse_array(),
            Token::DictStart => self.parse_dictionary().map(PdfObject::Dictionary),
            Token::Eof => Err(ParseError::SyntaxError {
                position: self.lexer.position(),
                message: "Unexpected end of input".to_string(),
            }),
            other => Err(self.unexpected("object", &other)),
        }
    }

    /// `n g R` is only recognized with the full three-token lookahead.
    fn integer_or_reference(&mut self, number: i64) -> ParseResult<PdfObject> {
        let saved = self.lexer.position();
        if let (Ok(number), Ok(Token::Integer(generation))) =
            (u32::try_from(number), self.lexer.next_token())
        {
            if (0..=i64::from(MAX_GENERATION)).contains(&generation)
                && matches!(self.lexer.next_token(), Ok(Token::R))
            {
                let id = ObjectId::new(number, generation as u16);
                return Ok(PdfObject::Reference(IndirectRef::new(id, self.document)));
            }
        }
        self.lexer.set_position(saved);
        Ok(PdfObject::from(number))
    }

    fn parse_array(&mut self) -> ParseResult<PdfObject> {
        let mut array = PdfArray::new();
        loop {
            match self.lexer.next_token()? {
                Token::ArrayEnd => break,
                token => array.push(self.parse_from_token(token)?),
            }
        }
        Ok(PdfObject::Array(array))
    }

    fn parse_dictionary(&mut self) -> ParseResult<PdfDictionary> {
        let mut dict = PdfDictionary::new();
        loop {
            match self.lexer.next_token()? {
                Token::DictEnd => break,
                Token::Name(key) => {
                    let value = self.parse_object()?;
                    dict.set(PdfName::from_bytes(key), value);
                }
                other => return Err(self.unexpected("name or >>", &other)),
            }
        }
        Ok(dict)
    }

    /// Parses `n g obj ... endobj` at the current position.
    pub fn parse_indirect_object(
        &mut self,
        resolve_length: LengthResolver<'_>,
    ) -> ParseResult<(ObjectId, PdfObject)> {
        let number = match self.lexer.next_token()? {
            Token::Integer(n) if n >= 0 => n as u32,
            other => return Err(self.unexpected("object number", &other)),
        };
        let generation = match self.lexer.next_token()? {
            Token::Integer(g) if (0..=i64::from(MAX_GENERATION)).contains(&g) => g as u16,
            other => return Err(self.unexpected("generation number", &other)),
        };
        match self.lexer.next_token()? {
            Token::Obj => {}
            other => return Err(self.unexpected("obj", &other)),
        }
        let id = ObjectId::new(number, generation);

        let mut object = self.parse_object()?;
        if matches!(self.lexer.peek_token(), Ok(Token::Stream)) {
            self.lexer.next_token()?;
            let dict = match object {
                PdfObject::Dictionary(dict) => dict,
                other => {
                    return Err(ParseError::SyntaxError {
                        position: self.lexer.position(),
                        message: format!("stream keyword after {:?}", other.object_type()),
                    })
                }
            };
            object = PdfObject::Stream(self.parse_stream_body(id, dict, resolve_length)?);
        }

        match self.lexer.peek_token() {
            Ok(Token::EndObj) => {
                self.lexer.next_token()?;
            }
            _ => warn!(object = %id, "missing endobj"),
        }
        Ok((id, object))
    }

    fn parse_stream_body(
        &mut self,
        id: ObjectId,
        dict: PdfDictionary,
        resolve_length: LengthResolver<'_>,
    ) -> ParseResult<PdfStream> {
        let data = self.lexer.data();
        let mut start = self.lexer.position();
        // `stream` is followed by CRLF or LF (a lone CR is tolerated).
        if data.get(start) == Some(&b'\r') {
            start += 1;
        }
        if data.get(start) == Some(&b'\n') {
            start += 1;
        }

        let declared = match dict.get("Length") {
            Some(PdfObject::Number(n)) if n.is_integer() => Some(n.as_i64()),
            Some(PdfObject::Reference(r)) => resolve_length(*r),
            _ => None,
        };
        let end = match declared
            .and_then(|len| usize::try_from(len).ok())
            .filter(|&len| endstream_follows(data, start + len))
        {
            Some(len) => start + len,
            None => {
                warn!(object = %id, ?declared, "stream /Length is wrong, scanning for endstream");
                scan_for_endstream(data, start).ok_or_else(|| ParseError::SyntaxError {
                    position: start,
                    message: "endstream not found".to_string(),
                })?
            }
        };

        let mut after = end;
        while after < data.len() && is_whitespace(data[after]) {
            after += 1;
        }
        self.lexer.set_position(after);
        match self.lexer.next_token()? {
            Token::EndStream => {}
            other => return Err(self.unexpected("endstream", &other)),
        }

        let content = match &self.source {
            Some(source) => StreamContent::Original(OriginalBytes::new(source.clone(), start..end)),
            None => StreamContent::Buffer(data[start..end].to_vec()),
        };
        Ok(PdfStream::from_content(dict, content))
    }
}

fn endstream_follows(data: &[u8], end: usize) -> bool {
    if end > data.len() {
        return false;
    }
    let rest = &data[end..];
    let skip = rest.iter().take_while(|&&b| is_whitespace(b)).count();
    rest[skip..].starts_with(b"endstream")
}

/// End of the body: the `endstream` keyword minus the EOL marker before it.
fn scan_for_endstream(data: &[u8], start: usize) -> Option<usize> {
    let found = data
        .get(start..)?
        .windows(9)
        .position(|w| w == b"endstream")
        .map(|p| start + p)?;
    let mut end = found;
    if end > start && data[end - 1] == b'\n' {
        end -= 1;
    }
    if end > start && data[end - 1] == b'\r' {
        end -= 1;
    }
    Some(end)
}

/// Parses a single object from `data` (no stream bodies).
pub fn parse_object(data: &[u8], document: DocumentId) -> ParseResult<PdfObject> {
    ObjectParser::new(data, document).parse_object()
}
