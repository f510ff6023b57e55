//! PDF Lexer
//!
//! Tokenizes PDF syntax according to ISO 32000-1 Section 7.2. Works on a
//! borrowed byte slice so callers can jump to arbitrary offsets (xref
//! entries, stream bodies) without re-reading the file.

use super::{ParseError, ParseResult};

/// PDF Token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Boolean: true or false
    Boolean(bool),

    /// Integer number
    Integer(i64),

    /// Real number
    Real(f64),

    /// Literal string `( ... )`, escapes resolved
    String(Vec<u8>),

    /// Hexadecimal string `< ... >`, decoded
    HexString(Vec<u8>),

    /// Name object without the leading slash, `#xx` escapes resolved
    Name(Vec<u8>),

    /// Left square bracket [
    ArrayStart,

    /// Right square bracket ]
    ArrayEnd,

    /// Dictionary start <<
    DictStart,

    /// Dictionary end >>
    DictEnd,

    /// Stream keyword
    Stream,

    /// Endstream keyword
    EndStream,

    /// Obj keyword
    Obj,

    /// Endobj keyword
    EndObj,

    /// R keyword of an indirect reference
    R,

    /// xref keyword
    XRef,

    /// trailer keyword
    Trailer,

    /// StartXRef keyword
    StartXRef,

    /// Null object
    Null,

    /// Any other keyword, e.g. `n` and `f` in xref tables
    Keyword(String),

    /// End of file
    Eof,
}

/// Byte-slice tokenizer.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    data: &'a [u8],
    position: usize,
}

/// PDF whitespace characters (Table 1).
pub(crate) fn is_whitespace(ch: u8) -> bool {
    matches!(ch, b'\0' | b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

/// PDF delimiter characters (Table 2).
pub(crate) fn is_delimiter(ch: u8) -> bool {
    matches!(
        ch,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

fn is_regular(ch: u8) -> bool {
    !is_whitespace(ch) && !is_delimiter(ch)
}

fn hex_value(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        _ => None,
    }
}

impl<'a> Lexer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Lexer positioned at `position`.
    pub fn at(data: &'a [u8], position: usize) -> Self {
        Self {
            data,
            position: position.min(data.len()),
        }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn set_position(&mut self, position: usize) {
        self.position = position.min(self.data.len());
    }

    fn peek_byte(&self) -> Option<u8> {
        self.data.get(self.position).copied()
    }

    fn syntax_error(&self, message: impl Into<String>) -> ParseError {
        ParseError::SyntaxError {
            position: self.position,
            message: message.into(),
        }
    }

    /// Skips whitespace and comments.
    pub fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_byte() {
            if is_whitespace(ch) {
                self.position += 1;
            } else if ch == b'%' {
                while let Some(c) = self.peek_byte() {
                    if c == b'\n' || c == b'\r' {
                        break;
                    }
                    self.position += 1;
                }
            } else {
                break;
            }
        }
    }

    /// Returns the next token without consuming it.
    pub fn peek_token(&mut self) -> ParseResult<Token> {
        let saved = self.position;
        let token = self.next_token();
        self.position = saved;
        token
    }

    /// Get the next token
    pub fn next_token(&mut self) -> ParseResult<Token> {
        self.skip_whitespace();

        let ch = match self.peek_byte() {
            Some(ch) => ch,
            None => return Ok(Token::Eof),
        };

        match ch {
            b'/' => self.read_name(),
            b'(' => self.read_literal_string(),
            b'<' => {
                if self.data.get(self.position + 1) == Some(&b'<') {
                    self.position += 2;
                    Ok(Token::DictStart)
                } else {
                    self.read_hex_string()
                }
            }
            b'>' => {
                if self.data.get(self.position + 1) == Some(&b'>') {
                    self.position += 2;
                    Ok(Token::DictEnd)
                } else {
                    Err(self.syntax_error("Expected '>' after '>'"))
                }
            }
            b'[' => {
                self.position += 1;
                Ok(Token::ArrayStart)
            }
            b']' => {
                self.position += 1;
                Ok(Token::ArrayEnd)
            }
            b'+' | b'-' | b'.' | b'0'..=b'9' => self.read_number(),
            _ if is_regular(ch) => Ok(self.read_keyword()),
            _ => Err(self.syntax_error(format!("Unexpected character: {}", ch as char))),
        }
    }

    /// Read a name object (e.g., /Type)
    fn read_name(&mut self) -> ParseResult<Token> {
        self.position += 1; // consume '/'
        let mut name = Vec::new();

        while let Some(ch) = self.peek_byte() {
            if !is_regular(ch) {
                break;
            }
            self.position += 1;

            // Handle hex codes in names (e.g., /A#20B means /A B)
            if ch == b'#' {
                let escaped = self
                    .data
                    .get(self.position..self.position + 2)
                    .and_then(|pair| Some((hex_value(pair[0])? << 4) | hex_value(pair[1])?));
                match escaped {
                    Some(value) => {
                        name.push(value);
                        self.position += 2;
                    }
                    // Lenient: a lone '#' stays literal.
                    None => name.push(b'#'),
                }
            } else {
                name.push(ch);
            }
        }

        Ok(Token::Name(name))
    }

    /// Read a literal string (parentheses)
    fn read_literal_string(&mut self) -> ParseResult<Token> {
        self.position += 1; // consume '('
        let mut string = Vec::new();
        let mut depth = 1;

        loop {
            let ch = self
                .peek_byte()
                .ok_or_else(|| self.syntax_error("Unterminated string"))?;
            self.position += 1;

            match ch {
                b'\\' => {
                    let next = self
                        .peek_byte()
                        .ok_or_else(|| self.syntax_error("Unterminated string"))?;
                    self.position += 1;
                    match next {
                        b'n' => string.push(b'\n'),
                        b'r' => string.push(b'\r'),
                        b't' => string.push(b'\t'),
                        b'b' => string.push(b'\x08'),
                        b'f' => string.push(b'\x0C'),
                        b'0'..=b'7' => {
                            let mut value = u32::from(next - b'0');
                            for _ in 0..2 {
                                match self.peek_byte() {
                                    Some(d @ b'0'..=b'7') => {
                                        self.position += 1;
                                        value = value * 8 + u32::from(d - b'0');
                                    }
                                    _ => break,
                                }
                            }
                            string.push((value & 0xFF) as u8);
                        }
                        // Line continuation
                        b'\r' => {
                            if self.peek_byte() == Some(b'\n') {
                                self.position += 1;
                            }
                        }
                        b'\n' => {}
                        other => string.push(other),
                    }
                }
                b'(' => {
                    depth += 1;
                    string.push(ch);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    string.push(ch);
                }
                // End-of-line markers inside strings read as a single LF.
                b'\r' => {
                    if self.peek_byte() == Some(b'\n') {
                        self.position += 1;
                    }
                    string.push(b'\n');
                }
                _ => string.push(ch),
            }
        }

        Ok(Token::String(string))
    }

    fn read_hex_string(&mut self) -> ParseResult<Token> {
        self.position += 1; // consume '<'
        let mut bytes = Vec::new();
        let mut high: Option<u8> = None;

        loop {
            let ch = self
                .peek_byte()
                .ok_or_else(|| self.syntax_error("Unterminated hex string"))?;
            self.position += 1;
            if ch == b'>' {
                break;
            }
            if is_whitespace(ch) {
                continue;
            }
            let value = hex_value(ch).ok_or_else(|| {
                self.syntax_error(format!("Invalid hex digit: {}", ch as char))
            })?;
            match high.take() {
                Some(h) => bytes.push((h << 4) | value),
                None => high = Some(value),
            }
        }
        // Odd digit count: the missing digit is 0.
        if let Some(h) = high {
            bytes.push(h << 4);
        }

        Ok(Token::HexString(bytes))
    }

    fn read_number(&mut self) -> ParseResult<Token> {
        let start = self.position;
        if matches!(self.peek_byte(), Some(b'+' | b'-')) {
            self.position += 1;
        }
        let mut has_dot = false;
        let mut has_digit = false;
        while let Some(ch) = self.peek_byte() {
            match ch {
                b'0'..=b'9' => has_digit = true,
                b'.' if !has_dot => has_dot = true,
                _ => break,
            }
            self.position += 1;
        }
        if !has_digit {
            self.position = start;
            return Err(self.syntax_error("Malformed number"));
        }

        let text = std::str::from_utf8(&self.data[start..self.position])
            .map_err(|_| self.syntax_error("Malformed number"))?;
        if !has_dot {
            if let Ok(value) = text.parse::<i64>() {
                return Ok(Token::Integer(value));
            }
        }
        // "4." and "-.5" are valid PDF reals; Rust's parser wants digits on
        // both sides of the dot in some of these.
        let normalized = match text.strip_suffix('.') {
            Some(head) => head.to_string(),
            None => text.replace("-.", "-0.").replace("+.", "0."),
        };
        normalized
            .parse::<f64>()
            .map(Token::Real)
            .map_err(|_| self.syntax_error(format!("Malformed number: {text}")))
    }

    fn read_keyword(&mut self) -> Token {
        let start = self.position;
        while let Some(ch) = self.peek_byte() {
            if !is_regular(ch) {
                break;
            }
            self.position += 1;
        }
        match &self.data[start..self.position] {
            b"true" => Token::Boolean(true),
            b"false" => Token::Boolean(false),
            b"null" => Token::Null,
            b"obj" => Token::Obj,
            b"endobj" => Token::EndObj,
            b"stream" => Token::Stream,
            b"endstream" => Token::EndStream,
            b"R" => Token::R,
            b"xref" => Token::XRef,
            b"trailer" => Token::Trailer,
            b"startxref" => Token::StartXRef,
            other => Token::Keyword(String::from_utf8_lossy(other).into_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(input: &[u8]) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            if token == Token::Eof {
                break;
            }
            out.push(token);
        }
        out
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            tokens(b"<< /Type /Catalog /Count 3 /Scale -0.5 >> [true false null]"),
            vec![
                Token::DictStart,
                Token::Name(b"Type".to_vec()),
                Token::Name(b"Catalog".to_vec()),
                Token::Name(b"Count".to_vec()),
                Token::Integer(3),
                Token::Name(b"Scale".to_vec()),
                Token::Real(-0.5),
                Token::DictEnd,
                Token::ArrayStart,
                Token::Boolean(true),
                Token::Boolean(false),
                Token::Null,
                Token::ArrayEnd,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokens(b"+17 -.002 4. 0.5 123456789012"),
            vec![
                Token::Integer(17),
                Token::Real(-0.002),
                Token::Real(4.0),
                Token::Real(0.5),
                Token::Integer(123456789012),
            ]
        );
        assert!(Lexer::new(b"- ").next_token().is_err());
    }

    #[test]
    fn test_name_escapes() {
        assert_eq!(
            tokens(b"/A#20B /Lime#23Green /Odd#"),
            vec![
                Token::Name(b"A B".to_vec()),
                Token::Name(b"Lime#Green".to_vec()),
                Token::Name(b"Odd#".to_vec()),
            ]
        );
    }

    #[test]
    fn test_literal_strings() {
        assert_eq!(
            tokens(b"(a (nested) string) (esc\\n\\(\\)\\\\) (\\101\\7) (split\\\nline)"),
            vec![
                Token::String(b"a (nested) string".to_vec()),
                Token::String(b"esc\n()\\".to_vec()),
                Token::String(b"A\x07".to_vec()),
                Token::String(b"splitline".to_vec()),
            ]
        );
    }

    #[test]
    fn test_literal_string_eol_normalized() {
        assert_eq!(tokens(b"(a\r\nb\rc)"), vec![Token::String(b"a\nb\nc".to_vec())]);
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new(b"(never closed").next_token().unwrap_err();
        assert!(matches!(err, ParseError::SyntaxError { .. }));
    }

    #[test]
    fn test_hex_strings() {
        assert_eq!(
            tokens(b"<48 65 6C6C 6F> <ABC> <>"),
            vec![
                Token::HexString(b"Hello".to_vec()),
                Token::HexString(vec![0xAB, 0xC0]),
                Token::HexString(vec![]),
            ]
        );
        assert!(Lexer::new(b"<4G>").next_token().is_err());
    }

    #[test]
    fn test_keywords_and_comments() {
        assert_eq!(
            tokens(b"% header comment\n1 0 obj\nendobj 5 0 R xref trailer startxref stream endstream n f"),
            vec![
                Token::Integer(1),
                Token::Integer(0),
                Token::Obj,
                Token::EndObj,
                Token::Integer(5),
                Token::Integer(0),
                Token::R,
                Token::XRef,
                Token::Trailer,
                Token::StartXRef,
                Token::Stream,
                Token::EndStream,
                Token::Keyword("n".to_string()),
                Token::Keyword("f".to_string()),
            ]
        );
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut lexer = Lexer::new(b"42 /Name");
        assert_eq!(lexer.peek_token().unwrap(), Token::Integer(42));
        assert_eq!(lexer.next_token().unwrap(), Token::Integer(42));
        assert_eq!(lexer.position(), 2);
        assert_eq!(lexer.next_token().unwrap(), Token::Name(b"Name".to_vec()));
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }

    #[test]
    fn test_stray_close_angle() {
        assert!(Lexer::new(b"> ").next_token().is_err());
    }
}
