//! Content keys for smart-mode deduplication.
//!
//! A key is the MD5 digest of a canonical serialization of an object graph:
//! dictionaries by sorted key, arrays in order, streams as their dictionary
//! plus a digest of the decoded body. A reference contributes the digest of
//! its target, computed once per [`DigestCache`] and reused wherever the
//! target is reached again. References are followed up to [`MAX_DEPTH`]
//! levels. Equal keys are treated as equal content; digest collisions are
//! not checked.

use crate::document::PdfDocument;
use crate::error::Result;
use crate::objects::{
    DocumentId, IndirectRef, ObjectId, PdfDictionary, PdfNumber, PdfObject, PdfStream,
    StreamContent,
};
use crate::parser::filters::decode_stream;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// How deep references are followed while hashing.
pub const MAX_DEPTH: usize = 100;

/// Digest identifying structurally equal content.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentKey([u8; 16]);

impl fmt::Debug for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentKey({:x})", md5::Digest(self.0))
    }
}

/// Digests of reference targets already hashed during one session.
///
/// `None` marks a target that cannot be hashed.
#[derive(Debug, Default)]
pub struct DigestCache {
    digests: HashMap<(DocumentId, ObjectId), Option<ContentKey>>,
    in_progress: HashSet<(DocumentId, ObjectId)>,
}

impl DigestCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    pub fn clear(&mut self) {
        self.digests.clear();
        self.in_progress.clear();
    }
}

/// Key for `object` read from `source`, or `None` when its content cannot
/// be observed without consuming it (reader-backed streams).
pub fn content_key(
    source: &mut PdfDocument,
    object: &PdfObject,
    cache: &mut DigestCache,
) -> Result<Option<ContentKey>> {
    let mut buffer = Vec::new();
    if !serialize(source, object, &mut buffer, MAX_DEPTH, cache)? {
        return Ok(None);
    }
    Ok(Some(ContentKey(md5::compute(&buffer).0)))
}

/// Key for the target of `reference`; equal to [`content_key`] of the
/// target itself.
pub fn reference_key(
    source: &mut PdfDocument,
    reference: IndirectRef,
    cache: &mut DigestCache,
) -> Result<Option<ContentKey>> {
    target_digest(source, reference, MAX_DEPTH, cache)
}

/// Digest of the target of `reference`, computed at most once per cache.
fn target_digest(
    source: &mut PdfDocument,
    reference: IndirectRef,
    depth: usize,
    cache: &mut DigestCache,
) -> Result<Option<ContentKey>> {
    let id = (source.id(), reference.id());
    if let Some(cached) = cache.digests.get(&id) {
        return Ok(*cached);
    }
    cache.in_progress.insert(id);
    let target = source.get_object(reference).map(|o| o.cloned().unwrap_or_default());
    let hashed = target.and_then(|target| {
        let mut buffer = Vec::new();
        let complete = serialize(source, &target, &mut buffer, depth, cache)?;
        Ok(complete.then(|| ContentKey(md5::compute(&buffer).0)))
    });
    cache.in_progress.remove(&id);
    let digest = hashed?;
    cache.digests.insert(id, digest);
    Ok(digest)
}

/// Appends the canonical form of `object` to `out`. Returns `false` when the
/// graph holds something that cannot be hashed.
fn serialize(
    source: &mut PdfDocument,
    object: &PdfObject,
    out: &mut Vec<u8>,
    depth: usize,
    cache: &mut DigestCache,
) -> Result<bool> {
    match object {
        PdfObject::Null => out.extend_from_slice(b"$N"),
        PdfObject::Boolean(b) => out.extend_from_slice(if *b { b"$T" } else { b"$F" }),
        PdfObject::Number(PdfNumber::Integer(i)) => {
            out.extend_from_slice(b"$I");
            out.extend_from_slice(&i.to_be_bytes());
        }
        PdfObject::Number(PdfNumber::Real(f)) => {
            out.extend_from_slice(b"$R");
            out.extend_from_slice(&f.to_bits().to_be_bytes());
        }
        PdfObject::Name(name) => {
            out.extend_from_slice(b"$n");
            push_bytes(out, name.as_bytes());
        }
        PdfObject::String(string) => {
            out.extend_from_slice(b"$s");
            push_bytes(out, string.as_bytes());
        }
        PdfObject::Literal(literal) => {
            out.extend_from_slice(b"$l");
            push_bytes(out, literal.as_bytes());
        }
        PdfObject::Array(array) => {
            out.extend_from_slice(b"$A");
            out.extend_from_slice(&(array.len() as u64).to_be_bytes());
            for element in array.iter() {
                if !serialize(source, element, out, depth, cache)? {
                    return Ok(false);
                }
            }
        }
        PdfObject::Dictionary(dict) => {
            out.extend_from_slice(b"$D");
            if !serialize_dictionary(source, dict, out, depth, cache)? {
                return Ok(false);
            }
        }
        PdfObject::Stream(stream) => {
            out.extend_from_slice(b"$S");
            if !serialize_stream(source, stream, out, depth, cache)? {
                return Ok(false);
            }
        }
        PdfObject::Reference(reference) => {
            let id = (source.id(), reference.id());
            let cached = cache.digests.get(&id).copied();
            if cached.is_none() && (depth == 0 || cache.in_progress.contains(&id)) {
                out.extend_from_slice(b"$r");
                out.extend_from_slice(&reference.number().to_be_bytes());
                out.extend_from_slice(&reference.generation().to_be_bytes());
                return Ok(true);
            }
            let digest = match cached {
                Some(digest) => digest,
                None => target_digest(source, *reference, depth - 1, cache)?,
            };
            match digest {
                Some(key) => {
                    out.extend_from_slice(b"$h");
                    out.extend_from_slice(&key.0);
                }
                None => return Ok(false),
            }
        }
    }
    Ok(true)
}

fn serialize_dictionary(
    source: &mut PdfDocument,
    dict: &PdfDictionary,
    out: &mut Vec<u8>,
    depth: usize,
    cache: &mut DigestCache,
) -> Result<bool> {
    let mut entries: Vec<_> = dict
        .iter()
        .filter(|(key, value)| !is_back_edge(key.as_str(), value))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in entries {
        push_bytes(out, key.as_bytes());
        if !serialize(source, value, out, depth, cache)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// `Parent` always points up a tree; `P` does when it holds a reference or
/// dictionary. Following them would hash the whole document.
fn is_back_edge(key: &str, value: &PdfObject) -> bool {
    match key {
        "Parent" => true,
        "P" => matches!(value, PdfObject::Reference(_) | PdfObject::Dictionary(_)),
        _ => false,
    }
}

fn serialize_stream(
    source: &mut PdfDocument,
    stream: &PdfStream,
    out: &mut Vec<u8>,
    depth: usize,
    cache: &mut DigestCache,
) -> Result<bool> {
    let mut dict = stream.dictionary().clone();
    dict.remove("Length");
    if !serialize_dictionary(source, &dict, out, depth, cache)? {
        return Ok(false);
    }
    let raw = match stream.content() {
        StreamContent::Buffer(bytes) => bytes.as_slice(),
        StreamContent::Original(original) => original.as_bytes(),
        StreamContent::Input(_) | StreamContent::Released => return Ok(false),
    };
    // Filters this crate cannot decode are hashed in encoded form.
    let digest = match decode_stream(raw, stream.dictionary()) {
        Ok(decoded) => md5::compute(decoded),
        Err(_) => md5::compute(raw),
    };
    out.extend_from_slice(&digest.0);
    Ok(true)
}

fn push_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
    out.extend_from_slice(bytes);
}
