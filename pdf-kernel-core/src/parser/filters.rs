//! PDF Stream Filters
//!
//! Decodes stream bodies read from existing files according to ISO 32000-1
//! Section 7.4. Filters are applied in `/Filter` order, each with the
//! `/DecodeParms` entry at the same index.

use super::{ParseError, ParseResult};
use crate::compression;
use crate::objects::{PdfDictionary, PdfObject};

/// Filters recognized by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// ASCII hex decode
    ASCIIHexDecode,

    /// ASCII 85 decode
    ASCII85Decode,

    /// Flate decode (zlib/deflate compression)
    FlateDecode,

    /// LZW decode
    LZWDecode,

    /// Run length decode
    RunLengthDecode,

    /// DCT decode (JPEG), left to image consumers
    DCTDecode,

    /// Crypt filter
    Crypt,
}

impl Filter {
    /// Parse filter from name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ASCIIHexDecode" | "AHx" => Some(Filter::ASCIIHexDecode),
            "ASCII85Decode" | "A85" => Some(Filter::ASCII85Decode),
            "FlateDecode" | "Fl" => Some(Filter::FlateDecode),
            "LZWDecode" | "LZW" => Some(Filter::LZWDecode),
            "RunLengthDecode" | "RL" => Some(Filter::RunLengthDecode),
            "DCTDecode" | "DCT" => Some(Filter::DCTDecode),
            "Crypt" => Some(Filter::Crypt),
            _ => None,
        }
    }
}

/// Filter names paired with their decode parameters.
fn filter_chain(dict: &PdfDictionary) -> ParseResult<Vec<(String, Option<&PdfDictionary>)>> {
    let names: Vec<String> = match dict.get("Filter") {
        None => return Ok(Vec::new()),
        Some(PdfObject::Name(name)) => vec![name.as_str().to_string()],
        Some(PdfObject::Array(array)) => array
            .iter()
            .map(|obj| match obj {
                PdfObject::Name(name) => Ok(name.as_str().to_string()),
                other => Err(ParseError::StreamDecodeError(format!(
                    "Invalid filter in array: {:?}",
                    other.object_type()
                ))),
            })
            .collect::<ParseResult<_>>()?,
        Some(other) => {
            return Err(ParseError::StreamDecodeError(format!(
                "Invalid Filter type: {:?}",
                other.object_type()
            )))
        }
    };

    let params: Vec<Option<&PdfDictionary>> = match dict.get("DecodeParms") {
        Some(PdfObject::Dictionary(params)) => vec![Some(params)],
        Some(PdfObject::Array(array)) => array.iter().map(PdfObject::as_dict).collect(),
        _ => Vec::new(),
    };

    Ok(names
        .into_iter()
        .enumerate()
        .map(|(i, name)| (name, params.get(i).copied().flatten()))
        .collect())
}

/// Decode stream data according to the filters in `dict`
pub fn decode_stream(data: &[u8], dict: &PdfDictionary) -> ParseResult<Vec<u8>> {
    let mut result = data.to_vec();
    for (name, params) in filter_chain(dict)? {
        let filter =
            Filter::from_name(&name).ok_or_else(|| ParseError::UnsupportedFilter(name.clone()))?;
        result = apply_filter(&result, filter, params)?;
    }
    Ok(result)
}

/// Apply a single filter to data
fn apply_filter(data: &[u8], filter: Filter, params: Option<&PdfDictionary>) -> ParseResult<Vec<u8>> {
    match filter {
        Filter::FlateDecode => decode_flate(data, params),
        Filter::ASCIIHexDecode => decode_ascii_hex(data),
        Filter::ASCII85Decode => decode_ascii85(data),
        other => Err(ParseError::UnsupportedFilter(format!("{other:?}"))),
    }
}

fn decode_flate(data: &[u8], params: Option<&PdfDictionary>) -> ParseResult<Vec<u8>> {
    let inflated = compression::decompress(data)
        .map_err(|e| ParseError::StreamDecodeError(format!("Flate decode error: {e}")))?;
    compression::unpredict(&inflated, params)
        .map_err(|e| ParseError::StreamDecodeError(format!("Predictor error: {e}")))
}

/// Decode ASCIIHexDecode data
pub fn decode_ascii_hex(data: &[u8]) -> ParseResult<Vec<u8>> {
    let mut result = Vec::new();
    let mut chars = data.iter().filter(|&&b| !b.is_ascii_whitespace());

    loop {
        let high = match chars.next() {
            Some(&b'>') | None => break,
            Some(&ch) => ch,
        };

        // Odd number of digits: pad with 0
        let low = match chars.next() {
            Some(&b'>') | None => b'0',
            Some(&ch) => ch,
        };

        let high_val = hex_digit_value(high).ok_or_else(|| {
            ParseError::StreamDecodeError(format!("Invalid hex digit: {}", high as char))
        })?;
        let low_val = hex_digit_value(low).ok_or_else(|| {
            ParseError::StreamDecodeError(format!("Invalid hex digit: {}", low as char))
        })?;

        result.push((high_val << 4) | low_val);
    }

    Ok(result)
}

fn hex_digit_value(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        _ => None,
    }
}

fn ascii85_group_value(group: &[u8]) -> ParseResult<u32> {
    let value = group
        .iter()
        .fold(0u64, |acc, &ch| acc * 85 + u64::from(ch - b'!'));
    u32::try_from(value)
        .map_err(|_| ParseError::StreamDecodeError("ASCII85 group out of range".to_string()))
}

/// Decode ASCII85Decode data
pub fn decode_ascii85(data: &[u8]) -> ParseResult<Vec<u8>> {
    let mut result = Vec::new();
    let body = data.strip_prefix(b"<~").unwrap_or(data);
    let mut chars = body.iter().copied().filter(|b| !b.is_ascii_whitespace());
    let mut group = Vec::with_capacity(5);

    while let Some(c) = chars.next() {
        match c {
            b'~' => {
                if chars.next() == Some(b'>') {
                    break;
                }
                return Err(ParseError::StreamDecodeError(
                    "Invalid ASCII85 end marker".to_string(),
                ));
            }
            // 'z' stands for four zero bytes
            b'z' if group.is_empty() => result.extend_from_slice(&[0, 0, 0, 0]),
            b'!'..=b'u' => {
                group.push(c);
                if group.len() == 5 {
                    result.extend_from_slice(&ascii85_group_value(&group)?.to_be_bytes());
                    group.clear();
                }
            }
            _ => {
                return Err(ParseError::StreamDecodeError(format!(
                    "Invalid ASCII85 character: {}",
                    c as char
                )))
            }
        }
    }

    // Partial final group: pad with 'u' and keep len - 1 bytes
    if !group.is_empty() {
        if group.len() == 1 {
            return Err(ParseError::StreamDecodeError(
                "ASCII85 final group too short".to_string(),
            ));
        }
        let keep = group.len() - 1;
        group.resize(5, b'u');
        let bytes = ascii85_group_value(&group)?.to_be_bytes();
        result.extend_from_slice(&bytes[..keep]);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{PdfArray, PdfName};

    #[test]
    fn test_ascii_hex_decode() {
        assert_eq!(decode_ascii_hex(b"48656C6C6F>").unwrap(), b"Hello");
        assert_eq!(decode_ascii_hex(b"48 65 6C 6C 6F>").unwrap(), b"Hello");
        assert_eq!(decode_ascii_hex(b"48656C6C6>").unwrap(), b"Hell`");
        assert_eq!(decode_ascii_hex(b"48656C6C6F").unwrap(), b"Hello");
        assert!(decode_ascii_hex(b">").unwrap().is_empty());
        assert!(decode_ascii_hex(b"GG>").is_err());
    }

    #[test]
    fn test_ascii85_decode() {
        assert_eq!(decode_ascii85(b"87cURD]j7BEbo80~>").unwrap(), b"Hello world!");
        assert_eq!(decode_ascii85(b"<~87cURD]j7BEbo80~>").unwrap(), b"Hello world!");
        assert_eq!(decode_ascii85(b"z~>").unwrap(), &[0, 0, 0, 0]);
        assert!(decode_ascii85(b"~>").unwrap().is_empty());
        assert!(decode_ascii85(b"invalid~>").is_err());
    }

    #[test]
    fn test_ascii85_partial_group() {
        // "Hello" = full group "87cUR" + partial "DZ"
        assert_eq!(decode_ascii85(b"87cURDZ~>").unwrap(), b"Hello");
    }

    #[test]
    fn test_filter_from_name() {
        assert_eq!(Filter::from_name("FlateDecode"), Some(Filter::FlateDecode));
        assert_eq!(Filter::from_name("AHx"), Some(Filter::ASCIIHexDecode));
        assert_eq!(Filter::from_name("UnknownFilter"), None);
    }

    #[test]
    fn test_decode_stream_no_filter() {
        let dict = PdfDictionary::new();
        assert_eq!(decode_stream(b"Hello, world!", &dict).unwrap(), b"Hello, world!");
    }

    #[test]
    fn test_decode_stream_filter_array() {
        let mut dict = PdfDictionary::new();
        dict.set(
            "Filter",
            PdfArray::from(vec![PdfObject::from(PdfName::new("ASCIIHexDecode"))]),
        );
        assert_eq!(decode_stream(b"48656C6C6F>", &dict).unwrap(), b"Hello");
    }

    #[test]
    fn test_decode_stream_unknown_filter() {
        let mut dict = PdfDictionary::new();
        dict.set("Filter", PdfName::new("UnknownFilter"));
        assert!(matches!(
            decode_stream(b"test data", &dict),
            Err(ParseError::UnsupportedFilter(name)) if name == "UnknownFilter"
        ));
    }

    #[test]
    fn test_decode_stream_unimplemented_filter() {
        let mut dict = PdfDictionary::new();
        dict.set("Filter", PdfName::new("LZWDecode"));
        assert!(decode_stream(b"test data", &dict).is_err());
    }

    #[test]
    fn test_decode_stream_invalid_filter_type() {
        let mut dict = PdfDictionary::new();
        dict.set("Filter", 42);
        assert!(decode_stream(b"test data", &dict).is_err());
    }

    #[cfg(feature = "compression")]
    #[test]
    fn test_flate_then_hex_chain() {
        use crate::compression::{compress, CompressionLevel};

        let hex = b"48656C6C6F>".to_vec();
        let packed = compress(&hex, CompressionLevel::Default).unwrap();
        let mut dict = PdfDictionary::new();
        dict.set(
            "Filter",
            vec![PdfObject::name("FlateDecode"), PdfObject::name("ASCIIHexDecode")],
        );
        dict.set("DecodeParms", vec![PdfObject::Null, PdfObject::Null]);
        assert_eq!(decode_stream(&packed, &dict).unwrap(), b"Hello");
    }

    #[cfg(feature = "compression")]
    #[test]
    fn test_flate_with_png_predictor() {
        use crate::compression::{compress, CompressionLevel};

        // Two rows of two bytes, PNG Up filter on the second row.
        let predicted = vec![0, 1, 2, 2, 1, 1];
        let packed = compress(&predicted, CompressionLevel::Default).unwrap();
        let mut params = PdfDictionary::new();
        params.set("Predictor", 12);
        params.set("Columns", 2);
        let mut dict = PdfDictionary::new();
        dict.set("Filter", PdfName::new("FlateDecode"));
        dict.set("DecodeParms", params);
        assert_eq!(decode_stream(&packed, &dict).unwrap(), vec![1, 2, 2, 3]);
    }
}
