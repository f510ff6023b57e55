//! Cross-reference reader: classic tables, xref streams, hybrid files and
//! the `/Prev` chain of incremental updates.

use super::filters::decode_stream;
use super::lexer::{Lexer, Token};
use super::objects::ObjectParser;
use super::{ParseError, ParseResult};
use crate::objects::{DocumentId, IndirectRef, ObjectId, PdfDictionary, PdfObject};
use crate::writer::xref_stream_writer::XrefEntry;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// Merged cross-reference information of a file.
#[derive(Debug, Clone)]
pub struct XrefData {
    /// Newest entry per object number
    pub entries: BTreeMap<u32, XrefEntry>,
    /// Newest trailer, with keys missing from it filled from older ones
    pub trailer: PdfDictionary,
    /// Offset of the newest section; `None` when the table was rebuilt
    pub startxref: Option<u64>,
}

fn no_length(_: IndirectRef) -> Option<i64> {
    None
}

/// Finds the offset after the last `startxref` keyword.
pub fn find_startxref(data: &[u8]) -> ParseResult<u64> {
    let tail_start = data.len().saturating_sub(2048);
    let keyword = data[tail_start..]
        .windows(9)
        .rposition(|w| w == b"startxref")
        .map(|p| tail_start + p)
        .ok_or(ParseError::MissingStartXref)?;
    let mut lexer = Lexer::at(data, keyword + 9);
    match lexer.next_token()? {
        Token::Integer(offset) if offset >= 0 && (offset as usize) < data.len() => Ok(offset as u64),
        _ => Err(ParseError::MissingStartXref),
    }
}

/// Reads the whole chain, falling back to a rebuild from object headers
/// when the cross-reference data is unusable.
pub fn read_xref(data: &[u8], document: DocumentId) -> ParseResult<XrefData> {
    match read_xref_chain(data, document) {
        Ok(xref) => Ok(xref),
        Err(err) => {
            warn!(%err, "cross-reference data is damaged, rebuilding from object headers");
            rebuild_xref(data, document)
        }
    }
}

/// Follows `startxref` and every `/Prev` link. Newer sections win.
pub fn read_xref_chain(data: &[u8], document: DocumentId) -> ParseResult<XrefData> {
    let startxref = find_startxref(data)?;
    let mut offset = startxref as usize;
    let mut visited = HashSet::new();
    let mut entries = BTreeMap::new();
    let mut trailer: Option<PdfDictionary> = None;

    loop {
        if !visited.insert(offset) {
            return Err(ParseError::CircularReference(offset));
        }
        let (section, section_trailer) = read_section(data, offset, document)?;
        debug!(offset, entries = section.len(), "read xref section");
        for (number, entry) in section {
            entries.entry(number).or_insert(entry);
        }
        let previous = section_trailer.get_integer("Prev");
        match trailer.as_mut() {
            None => trailer = Some(section_trailer),
            Some(newer) => {
                for (key, value) in section_trailer.iter() {
                    if !newer.contains_key(key.as_str()) {
                        newer.set(key.clone(), value.clone());
                    }
                }
            }
        }
        match previous {
            Some(prev) if prev >= 0 && (prev as usize) < data.len() => offset = prev as usize,
            Some(prev) => {
                warn!(prev, "ignoring out-of-range /Prev");
                break;
            }
            None => break,
        }
    }

    let trailer = trailer.ok_or(ParseError::InvalidXRef(startxref as usize))?;
    Ok(XrefData {
        entries,
        trailer,
        startxref: Some(startxref),
    })
}

fn read_section(
    data: &[u8],
    offset: usize,
    document: DocumentId,
) -> ParseResult<(Vec<(u32, XrefEntry)>, PdfDictionary)> {
    let mut lexer = Lexer::at(data, offset);
    if lexer.peek_token()? == Token::XRef {
        let (mut entries, trailer) = read_classic_section(data, offset, document)?;
        // Hybrid file: the stream refines entries the table lists as free.
        if let Some(stream_offset) = trailer.get_integer("XRefStm") {
            match read_stream_section(data, stream_offset as usize, document) {
                Ok((stream_entries, _)) => {
                    let overrides: BTreeMap<u32, XrefEntry> = stream_entries.into_iter().collect();
                    for (number, entry) in entries.iter_mut() {
                        if let Some(better) = overrides.get(number) {
                            *entry = *better;
                        }
                    }
                    let known: HashSet<u32> = entries.iter().map(|(n, _)| *n).collect();
                    entries.extend(overrides.into_iter().filter(|(n, _)| !known.contains(n)));
                }
                Err(err) => warn!(%err, "ignoring unreadable /XRefStm"),
            }
        }
        Ok((entries, trailer))
    } else {
        read_stream_section(data, offset, document)
    }
}

fn read_classic_section(
    data: &[u8],
    offset: usize,
    document: DocumentId,
) -> ParseResult<(Vec<(u32, XrefEntry)>, PdfDictionary)> {
    let invalid = || ParseError::InvalidXRef(offset);
    let mut lexer = Lexer::at(data, offset);
    if lexer.next_token()? != Token::XRef {
        return Err(invalid());
    }

    let mut entries = Vec::new();
    loop {
        let first = match lexer.next_token()? {
            Token::Trailer => break,
            Token::Integer(first) if first >= 0 => first as u32,
            _ => return Err(invalid()),
        };
        let count = match lexer.next_token()? {
            Token::Integer(count) if count >= 0 => count as u32,
            _ => return Err(invalid()),
        };
        for number in first..first.saturating_add(count) {
            let field = match lexer.next_token()? {
                Token::Integer(v) if v >= 0 => v as u64,
                _ => return Err(invalid()),
            };
            let generation = match lexer.next_token()? {
                Token::Integer(g) if (0..=i64::from(u16::MAX)).contains(&g) => g as u16,
                _ => return Err(invalid()),
            };
            let entry = match lexer.next_token()? {
                Token::Keyword(kind) if kind == "n" => XrefEntry::InUse {
                    offset: field,
                    generation,
                },
                Token::Keyword(kind) if kind == "f" => XrefEntry::Free {
                    next_free: field as u32,
                    generation,
                },
                _ => return Err(invalid()),
            };
            entries.push((number, entry));
        }
    }

    let mut parser = ObjectParser::new(data, document).at(lexer.position());
    let trailer = match parser.parse_object()? {
        PdfObject::Dictionary(dict) => dict,
        _ => return Err(invalid()),
    };
    Ok((entries, trailer))
}

fn read_field(row: &[u8]) -> u64 {
    row.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}

fn read_stream_section(
    data: &[u8],
    offset: usize,
    document: DocumentId,
) -> ParseResult<(Vec<(u32, XrefEntry)>, PdfDictionary)> {
    let invalid = || ParseError::InvalidXRef(offset);
    let mut parser = ObjectParser::new(data, document).at(offset);
    let (_, object) = parser.parse_indirect_object(&no_length)?;
    let PdfObject::Stream(stream) = object else {
        return Err(invalid());
    };
    let dict = stream.dictionary();
    if !dict.is_type("XRef") {
        return Err(invalid());
    }
    let raw = stream.content().bytes().ok_or_else(invalid)?;
    let decoded = decode_stream(raw, dict)?;

    let widths: Vec<usize> = dict
        .get_array("W")
        .ok_or_else(|| ParseError::MissingKey("W".to_string()))?
        .iter()
        .map(|w| w.as_integer().filter(|&w| (0..=8).contains(&w)).map(|w| w as usize))
        .collect::<Option<_>>()
        .ok_or_else(invalid)?;
    if widths.len() != 3 {
        return Err(invalid());
    }
    let size = dict.get_integer("Size").unwrap_or(0).max(0) as u32;
    let index: Vec<(u32, u32)> = match dict.get_array("Index") {
        Some(index) => {
            let values: Vec<u32> = index
                .iter()
                .map(|v| v.as_integer().filter(|&v| v >= 0).map(|v| v as u32))
                .collect::<Option<_>>()
                .ok_or_else(invalid)?;
            values.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect()
        }
        None => vec![(0, size)],
    };

    let row_len: usize = widths.iter().sum();
    if row_len == 0 {
        return Err(invalid());
    }
    let mut rows = decoded.chunks_exact(row_len);
    let mut entries = Vec::new();
    for (first, count) in index {
        for number in first..first.saturating_add(count) {
            let Some(row) = rows.next() else {
                warn!(offset, "xref stream shorter than its /Index");
                return Ok((entries, dict.clone()));
            };
            let (kind, rest) = row.split_at(widths[0]);
            let (second, third) = rest.split_at(widths[1]);
            // A zero-width type field defaults to type 1.
            let kind = if widths[0] == 0 { 1 } else { read_field(kind) };
            let second = read_field(second);
            let third = read_field(third);
            let entry = match kind {
                0 => XrefEntry::Free {
                    next_free: second as u32,
                    generation: third as u16,
                },
                1 => XrefEntry::InUse {
                    offset: second,
                    generation: third as u16,
                },
                2 => XrefEntry::Compressed {
                    stream: second as u32,
                    index: third as u32,
                },
                // Unknown types are references to the null object.
                _ => continue,
            };
            entries.push((number, entry));
        }
    }
    Ok((entries, dict.clone()))
}

fn starts_line(data: &[u8], position: usize) -> bool {
    position == 0 || matches!(data[position - 1], b'\n' | b'\r')
}

/// Rebuilds entries by scanning for `n g obj` headers. Later definitions
/// win, matching incremental-update order.
pub fn rebuild_xref(data: &[u8], document: DocumentId) -> ParseResult<XrefData> {
    let mut entries = BTreeMap::new();
    let mut position = 0;
    while position < data.len() {
        if data[position].is_ascii_digit() && starts_line(data, position) {
            let mut lexer = Lexer::at(data, position);
            if let (Ok(Token::Integer(number)), Ok(Token::Integer(generation)), Ok(Token::Obj)) =
                (lexer.next_token(), lexer.next_token(), lexer.next_token())
            {
                if let (Ok(number), Ok(generation)) =
                    (u32::try_from(number), u16::try_from(generation))
                {
                    entries.insert(
                        number,
                        XrefEntry::InUse {
                            offset: position as u64,
                            generation,
                        },
                    );
                }
            }
        }
        position += 1;
    }

    let trailer = match data.windows(7).rposition(|w| w == b"trailer") {
        Some(at) => {
            let mut parser = ObjectParser::new(data, document).at(at + 7);
            parser.parse_object().ok().and_then(|o| match o {
                PdfObject::Dictionary(d) => Some(d),
                _ => None,
            })
        }
        None => None,
    };
    let mut trailer = trailer.unwrap_or_default();
    if !trailer.contains_key("Root") {
        for (&number, entry) in entries.iter() {
            let XrefEntry::InUse { offset, generation } = *entry else {
                continue;
            };
            let mut parser = ObjectParser::new(data, document).at(offset as usize);
            if let Ok((_, PdfObject::Dictionary(dict))) = parser.parse_indirect_object(&no_length) {
                if dict.is_type("Catalog") {
                    let id = ObjectId::new(number, generation);
                    trailer.set("Root", IndirectRef::new(id, document));
                    break;
                }
            }
        }
    }
    if !trailer.contains_key("Root") {
        return Err(ParseError::MissingKey("Root".to_string()));
    }
    warn!(objects = entries.len(), "rebuilt cross-reference table");
    Ok(XrefData {
        entries,
        trailer,
        startxref: None,
    })
}
