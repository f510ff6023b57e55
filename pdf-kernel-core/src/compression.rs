//! Compression utilities for PDF streams

use crate::error::{PdfError, Result};
use crate::objects::{PdfArray, PdfDictionary, PdfName, PdfObject};

/// Deflate level requested for a stream or a whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompressionLevel {
    /// Inherit the level from the enclosing writer
    Undefined,
    #[default]
    Default,
    NoCompression,
    BestSpeed,
    BestCompression,
}

impl CompressionLevel {
    /// Maps a zlib-style 0..=9 level onto the named levels.
    pub fn from_level(level: u32) -> Self {
        match level {
            0 => CompressionLevel::NoCompression,
            1 => CompressionLevel::BestSpeed,
            l if l >= 9 => CompressionLevel::BestCompression,
            _ => CompressionLevel::Default,
        }
    }

    /// Replaces `Undefined` with `fallback` (and with `Default` when the
    /// fallback is undefined too).
    pub fn resolve(self, fallback: CompressionLevel) -> CompressionLevel {
        match (self, fallback) {
            (CompressionLevel::Undefined, CompressionLevel::Undefined) => CompressionLevel::Default,
            (CompressionLevel::Undefined, fallback) => fallback,
            (level, _) => level,
        }
    }

    /// Whether data written at this level gets deflated.
    pub fn is_enabled(self) -> bool {
        cfg!(feature = "compression") && self != CompressionLevel::NoCompression
    }

    #[cfg(feature = "compression")]
    pub(crate) fn to_flate(self) -> flate2::Compression {
        match self {
            CompressionLevel::NoCompression => flate2::Compression::none(),
            CompressionLevel::BestSpeed => flate2::Compression::fast(),
            CompressionLevel::BestCompression => flate2::Compression::best(),
            CompressionLevel::Undefined | CompressionLevel::Default => {
                flate2::Compression::default()
            }
        }
    }
}

/// Compress data using Flate/Zlib compression
#[cfg(feature = "compression")]
pub fn compress(data: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
    use flate2::write::ZlibEncoder;
    use std::io::Write;

    let mut encoder = ZlibEncoder::new(Vec::new(), level.to_flate());
    encoder.write_all(data).map_err(PdfError::Io)?;
    encoder.finish().map_err(PdfError::Io)
}

#[cfg(not(feature = "compression"))]
pub fn compress(_data: &[u8], _level: CompressionLevel) -> Result<Vec<u8>> {
    Err(PdfError::CompressionError(
        "built without the compression feature".to_string(),
    ))
}

/// Decompress data using Flate/Zlib decompression
#[cfg(feature = "compression")]
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    let mut decoder = ZlibDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| PdfError::CompressionError(e.to_string()))?;
    Ok(decompressed)
}

#[cfg(not(feature = "compression"))]
pub fn decompress(_data: &[u8]) -> Result<Vec<u8>> {
    Err(PdfError::CompressionError(
        "built without the compression feature".to_string(),
    ))
}

/// Prepends `FlateDecode` to `/Filter` and a matching `null` to
/// `/DecodeParms`, keeping both lists index-aligned.
pub fn update_compression_filter(dict: &mut PdfDictionary) -> Result<()> {
    let flate = PdfObject::Name(PdfName::new("FlateDecode"));
    let filter = match dict.remove("Filter") {
        None => flate,
        Some(name @ PdfObject::Name(_)) => PdfObject::from(vec![flate, name]),
        Some(PdfObject::Array(mut filters)) => {
            filters.insert(0, flate);
            PdfObject::Array(filters)
        }
        Some(other) => {
            let found = other.object_type();
            dict.set("Filter", other);
            return Err(PdfError::UnsupportedFilterValue {
                key: "Filter",
                found,
            });
        }
    };
    dict.set("Filter", filter);

    match dict.remove("DecodeParms") {
        None => {}
        Some(params @ PdfObject::Dictionary(_)) => {
            dict.set("DecodeParms", vec![PdfObject::Null, params]);
        }
        Some(PdfObject::Array(mut params)) => {
            params.insert(0, PdfObject::Null);
            dict.set("DecodeParms", params);
        }
        Some(other) => {
            let found = other.object_type();
            dict.set("DecodeParms", other);
            return Err(PdfError::UnsupportedFilterValue {
                key: "DecodeParms",
                found,
            });
        }
    }
    Ok(())
}

/// Drops a leading `FlateDecode` (and its `/DecodeParms` slot) after the
/// payload has been inflated.
pub(crate) fn strip_leading_flate(dict: &mut PdfDictionary) {
    match dict.remove("Filter") {
        Some(PdfObject::Array(filters)) => {
            let rest: PdfArray = filters.into_iter().skip(1).collect();
            match rest.len() {
                0 => {}
                1 => {
                    if let Some(only) = rest.into_iter().next() {
                        dict.set("Filter", only);
                    }
                }
                _ => dict.set("Filter", rest),
            }
            if let Some(PdfObject::Array(params)) = dict.remove("DecodeParms") {
                let rest: PdfArray = params.into_iter().skip(1).collect();
                if rest.iter().any(|p| !p.is_null()) {
                    dict.set("DecodeParms", rest);
                }
            }
        }
        Some(PdfObject::Name(_)) | None => {
            dict.remove("DecodeParms");
        }
        Some(other) => dict.set("Filter", other),
    }
}

/// Reverses a PNG (10..=15) or TIFF (2) predictor described by
/// `/DecodeParms`.
pub fn unpredict(data: &[u8], params: Option<&PdfDictionary>) -> Result<Vec<u8>> {
    let Some(params) = params else {
        return Ok(data.to_vec());
    };
    let predictor = params.get_integer("Predictor").unwrap_or(1);
    if predictor == 1 {
        return Ok(data.to_vec());
    }
    let colors = params.get_integer("Colors").unwrap_or(1).max(1) as usize;
    let bits = params.get_integer("BitsPerComponent").unwrap_or(8).max(1) as usize;
    let columns = params.get_integer("Columns").unwrap_or(1).max(1) as usize;
    let bpp = (colors * bits).div_ceil(8);
    let row_len = (colors * bits * columns).div_ceil(8);

    match predictor {
        2 => {
            if bits != 8 {
                return Err(PdfError::CompressionError(format!(
                    "TIFF predictor with {bits} bits per component"
                )));
            }
            let mut out = data.to_vec();
            for row in out.chunks_mut(row_len) {
                for i in bpp..row.len() {
                    row[i] = row[i].wrapping_add(row[i - bpp]);
                }
            }
            Ok(out)
        }
        10..=15 => {
            let mut out = Vec::with_capacity(data.len());
            let mut previous = vec![0u8; row_len];
            for chunk in data.chunks(row_len + 1) {
                let (tag, encoded) = match chunk.split_first() {
                    Some(split) => split,
                    None => break,
                };
                let mut row = encoded.to_vec();
                row.resize(row_len, 0);
                for i in 0..row_len {
                    let left = if i >= bpp { row[i - bpp] } else { 0 };
                    let up = previous[i];
                    let up_left = if i >= bpp { previous[i - bpp] } else { 0 };
                    row[i] = match *tag {
                        0 => row[i],
                        1 => row[i].wrapping_add(left),
                        2 => row[i].wrapping_add(up),
                        3 => row[i].wrapping_add(((left as u16 + up as u16) / 2) as u8),
                        4 => row[i].wrapping_add(paeth(left, up, up_left)),
                        other => {
                            return Err(PdfError::CompressionError(format!(
                                "unknown PNG filter type {other}"
                            )))
                        }
                    };
                }
                out.extend_from_slice(&row[..encoded.len().min(row_len)]);
                previous = row;
            }
            Ok(out)
        }
        other => Err(PdfError::CompressionError(format!(
            "unsupported predictor {other}"
        ))),
    }
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i16 + b as i16 - c as i16;
    let pa = (p - a as i16).abs();
    let pb = (p - b as i16).abs();
    let pc = (p - c as i16).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::ObjectType;

    #[test]
    fn test_compress_decompress_roundtrip() {
        let original = b"Hello, this is a test string that should be compressed and decompressed!";

        let compressed = compress(original, CompressionLevel::Default).unwrap();
        assert!(!compressed.is_empty());

        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, original);
    }

    #[test]
    fn test_levels_produce_valid_streams() {
        let data: Vec<u8> = (0..10000).map(|i| (i % 256) as u8).collect();
        for level in [
            CompressionLevel::NoCompression,
            CompressionLevel::BestSpeed,
            CompressionLevel::BestCompression,
        ] {
            let compressed = compress(&data, level).unwrap();
            assert_eq!(decompress(&compressed).unwrap(), data);
        }
    }

    #[test]
    fn test_resolve_level() {
        assert_eq!(
            CompressionLevel::Undefined.resolve(CompressionLevel::BestSpeed),
            CompressionLevel::BestSpeed
        );
        assert_eq!(
            CompressionLevel::Undefined.resolve(CompressionLevel::Undefined),
            CompressionLevel::Default
        );
        assert_eq!(
            CompressionLevel::NoCompression.resolve(CompressionLevel::BestSpeed),
            CompressionLevel::NoCompression
        );
        assert!(!CompressionLevel::NoCompression.is_enabled());
    }

    #[test]
    fn test_from_level() {
        assert_eq!(CompressionLevel::from_level(0), CompressionLevel::NoCompression);
        assert_eq!(CompressionLevel::from_level(1), CompressionLevel::BestSpeed);
        assert_eq!(CompressionLevel::from_level(5), CompressionLevel::Default);
        assert_eq!(CompressionLevel::from_level(9), CompressionLevel::BestCompression);
    }

    #[test]
    fn test_filter_added_when_absent() {
        let mut dict = PdfDictionary::new();
        update_compression_filter(&mut dict).unwrap();
        assert_eq!(dict.get_name("Filter").map(|n| n.as_str()), Some("FlateDecode"));
        assert!(!dict.contains_key("DecodeParms"));
    }

    #[test]
    fn test_filter_chaining_keeps_params_aligned() {
        let mut dict = PdfDictionary::new();
        dict.set("Filter", vec![PdfObject::name("ASCIIHexDecode")]);
        dict.set("DecodeParms", vec![PdfObject::from(PdfDictionary::new())]);

        update_compression_filter(&mut dict).unwrap();

        let filters = dict.get_array("Filter").unwrap();
        assert_eq!(filters.len(), 2);
        assert!(filters.get(0).and_then(|f| f.as_name()).is_some_and(|n| n == "FlateDecode"));
        assert!(filters
            .get(1)
            .and_then(|f| f.as_name())
            .is_some_and(|n| n == "ASCIIHexDecode"));

        let params = dict.get_array("DecodeParms").unwrap();
        assert_eq!(params.len(), 2);
        assert!(params.get(0).is_some_and(PdfObject::is_null));
        assert!(params.get(1).and_then(|p| p.as_dict()).is_some_and(|d| d.is_empty()));
    }

    #[test]
    fn test_single_name_and_dict_params() {
        let mut dict = PdfDictionary::new();
        dict.set("Filter", PdfName::new("DCTDecode"));
        let mut params = PdfDictionary::new();
        params.set("ColorTransform", 1);
        dict.set("DecodeParms", params);

        update_compression_filter(&mut dict).unwrap();

        assert_eq!(dict.get_array("Filter").map(|a| a.len()), Some(2));
        let params = dict.get_array("DecodeParms").unwrap();
        assert!(params.get(0).is_some_and(PdfObject::is_null));
        assert!(params.get(1).and_then(|p| p.as_dict()).is_some());
    }

    #[test]
    fn test_unsupported_filter_type() {
        let mut dict = PdfDictionary::new();
        dict.set("Filter", 5);
        match update_compression_filter(&mut dict) {
            Err(PdfError::UnsupportedFilterValue { key, found }) => {
                assert_eq!(key, "Filter");
                assert_eq!(found, ObjectType::Number);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_params_type() {
        let mut dict = PdfDictionary::new();
        dict.set("DecodeParms", PdfName::new("Oops"));
        assert!(matches!(
            update_compression_filter(&mut dict),
            Err(PdfError::UnsupportedFilterValue { key: "DecodeParms", .. })
        ));
    }

    #[test]
    fn test_strip_leading_flate() {
        let mut dict = PdfDictionary::new();
        dict.set(
            "Filter",
            vec![PdfObject::name("FlateDecode"), PdfObject::name("ASCIIHexDecode")],
        );
        dict.set("DecodeParms", vec![PdfObject::Null, PdfObject::Null]);
        strip_leading_flate(&mut dict);
        assert_eq!(
            dict.get_name("Filter").map(|n| n.as_str()),
            Some("ASCIIHexDecode")
        );
        assert!(!dict.contains_key("DecodeParms"));
    }

    #[test]
    fn test_png_up_predictor() {
        let mut params = PdfDictionary::new();
        params.set("Predictor", 12);
        params.set("Columns", 3);
        // two rows, both using the Up filter
        let data = [2, 1, 2, 3, 2, 1, 1, 1];
        let out = unpredict(&data, Some(&params)).unwrap();
        assert_eq!(out, vec![1, 2, 3, 2, 3, 4]);
    }

    #[test]
    fn test_tiff_predictor() {
        let mut params = PdfDictionary::new();
        params.set("Predictor", 2);
        params.set("Columns", 4);
        let out = unpredict(&[1, 1, 1, 1], Some(&params)).unwrap();
        assert_eq!(out, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_no_predictor_passthrough() {
        assert_eq!(unpredict(b"abc", None).unwrap(), b"abc");
    }
}
