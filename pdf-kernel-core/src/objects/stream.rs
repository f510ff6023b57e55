use crate::compression::CompressionLevel;
use crate::error::{PdfError, Result};
use crate::objects::{ObjectState, PdfDictionary, PdfName};
use std::fmt;
use std::io::Read;
use std::ops::Range;
use std::sync::{Arc, Mutex};

/// Shared handle to a one-shot byte source.
///
/// Clones share the same reader; the first write drains it and every later
/// attempt sees it as consumed.
#[derive(Clone)]
pub struct InputSource(Arc<Mutex<Option<Box<dyn Read + Send>>>>);

impl InputSource {
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        InputSource(Arc::new(Mutex::new(Some(Box::new(reader)))))
    }

    /// Takes the reader out. Returns `None` once it has been consumed.
    pub(crate) fn take(&self) -> Result<Option<Box<dyn Read + Send>>> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| PdfError::InvalidStream("input source lock poisoned".to_string()))?;
        Ok(guard.take())
    }

    fn same_source(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Raw (still encoded) stream body inside an opened file.
#[derive(Clone)]
pub struct OriginalBytes {
    data: Arc<[u8]>,
    range: Range<usize>,
}

impl OriginalBytes {
    pub(crate) fn new(data: Arc<[u8]>, range: Range<usize>) -> Self {
        Self { data, range }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[self.range.clone()]
    }
}

/// Where a stream's payload comes from.
#[derive(Clone)]
pub enum StreamContent {
    /// Authored bytes, encoded as `/Filter` describes (plain when absent)
    Buffer(Vec<u8>),
    /// Fresh content pumped from a reader at write time
    Input(InputSource),
    /// Encoded bytes of a stream read from an existing file
    Original(OriginalBytes),
    /// Payload dropped after flushing
    Released,
}

impl fmt::Debug for StreamContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamContent::Buffer(b) => write!(f, "Buffer({} bytes)", b.len()),
            StreamContent::Input(_) => write!(f, "Input"),
            StreamContent::Original(o) => write!(f, "Original({} bytes)", o.as_bytes().len()),
            StreamContent::Released => write!(f, "Released"),
        }
    }
}

impl PartialEq for StreamContent {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StreamContent::Input(a), StreamContent::Input(b)) => a.same_source(b),
            (StreamContent::Released, StreamContent::Released) => true,
            (StreamContent::Input(_), _) | (_, StreamContent::Input(_)) => false,
            (StreamContent::Released, _) | (_, StreamContent::Released) => false,
            (a, b) => a.bytes() == b.bytes(),
        }
    }
}

impl StreamContent {
    /// Bytes held in memory, if any.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            StreamContent::Buffer(b) => Some(b),
            StreamContent::Original(o) => Some(o.as_bytes()),
            StreamContent::Input(_) | StreamContent::Released => None,
        }
    }
}

/// PDF stream: a dictionary plus a payload.
#[derive(Debug, Clone)]
pub struct PdfStream {
    dictionary: PdfDictionary,
    content: StreamContent,
    compression_level: CompressionLevel,
    force_compression: bool,
    state: ObjectState,
}

impl PdfStream {
    pub fn new(data: Vec<u8>) -> Self {
        Self::with_dictionary(PdfDictionary::new(), data)
    }

    pub fn with_dictionary(dictionary: PdfDictionary, data: Vec<u8>) -> Self {
        Self::from_content(dictionary, StreamContent::Buffer(data))
    }

    /// Stream whose bytes are read from `reader` while the stream is written.
    pub fn from_reader(dictionary: PdfDictionary, reader: impl Read + Send + 'static) -> Self {
        Self::from_content(dictionary, StreamContent::Input(InputSource::new(reader)))
    }

    pub fn from_content(dictionary: PdfDictionary, content: StreamContent) -> Self {
        Self {
            dictionary,
            content,
            compression_level: CompressionLevel::Undefined,
            force_compression: false,
            state: ObjectState::MUST_BE_INDIRECT,
        }
    }

    pub fn dictionary(&self) -> &PdfDictionary {
        &self.dictionary
    }

    pub fn dictionary_mut(&mut self) -> &mut PdfDictionary {
        &mut self.dictionary
    }

    pub fn content(&self) -> &StreamContent {
        &self.content
    }

    pub fn set_data(&mut self, data: Vec<u8>) {
        self.content = StreamContent::Buffer(data);
    }

    /// Replaces the payload with [`StreamContent::Released`], returning it.
    pub fn take_content(&mut self) -> StreamContent {
        std::mem::replace(&mut self.content, StreamContent::Released)
    }

    pub fn into_parts(self) -> (PdfDictionary, StreamContent) {
        (self.dictionary, self.content)
    }

    pub fn compression_level(&self) -> CompressionLevel {
        self.compression_level
    }

    /// Level used for this stream; `Undefined` defers to the writer.
    /// Setting a level on a stream read from a file re-encodes its body.
    pub fn set_compression_level(&mut self, level: CompressionLevel) {
        self.compression_level = level;
    }

    pub fn force_compression(&self) -> bool {
        self.force_compression
    }

    /// Deflate the payload even when a `/Filter` is already present.
    pub fn set_force_compression(&mut self, force: bool) {
        self.force_compression = force;
    }

    pub fn set_filter(&mut self, filter: &str) {
        self.dictionary.set("Filter", PdfName::new(filter));
    }

    pub fn set_decode_params(&mut self, params: PdfDictionary) {
        self.dictionary.set("DecodeParms", params);
    }

    /// `/Type /Metadata` streams stay uncompressed.
    pub fn is_metadata(&self) -> bool {
        self.dictionary.is_type("Metadata")
    }

    pub fn state(&self) -> ObjectState {
        self.state
    }

    pub fn state_mut(&mut self) -> &mut ObjectState {
        &mut self.state
    }
}

impl PartialEq for PdfStream {
    fn eq(&self, other: &Self) -> bool {
        self.dictionary == other.dictionary && self.content == other.content
    }
}
