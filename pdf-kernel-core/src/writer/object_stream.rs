//! Object streams (PDF 1.5+): many small indirect objects packed into one
//! compressed stream.

use crate::objects::{IndirectRef, PdfDictionary, PdfName, PdfStream};

/// Objects per object stream before a new one is started.
pub const MAX_OBJ_STREAM_SIZE: usize = 200;

/// Object stream under construction.
#[derive(Debug)]
pub struct ObjectStream {
    reference: IndirectRef,
    extends: Option<IndirectRef>,
    /// `(object number, offset in body)` pairs, in index order
    header: Vec<(u32, usize)>,
    body: Vec<u8>,
}

impl ObjectStream {
    /// Empty stream stored as `reference`, chained to `extends`.
    pub fn new(reference: IndirectRef, extends: Option<IndirectRef>) -> Self {
        Self {
            reference,
            extends,
            header: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn reference(&self) -> IndirectRef {
        self.reference
    }

    pub fn len(&self) -> usize {
        self.header.len()
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.header.len() >= MAX_OBJ_STREAM_SIZE
    }

    /// Appends the serialized `object` for `number` and returns its index.
    pub fn add_object(&mut self, number: u32, object: &[u8]) -> u32 {
        if !self.body.is_empty() {
            self.body.push(b'\n');
        }
        self.header.push((number, self.body.len()));
        self.body.extend_from_slice(object);
        (self.header.len() - 1) as u32
    }

    /// Builds the `/Type /ObjStm` stream with `N`, `First` and `Extends`.
    /// The body is plain; the writer compresses it like any other stream.
    pub fn into_stream(self) -> PdfStream {
        let mut header = self
            .header
            .iter()
            .map(|(number, offset)| format!("{number} {offset}"))
            .collect::<Vec<_>>()
            .join(" ")
            .into_bytes();
        header.push(b'\n');

        let mut dict = PdfDictionary::new();
        dict.set("Type", PdfName::new("ObjStm"));
        dict.set("N", self.header.len());
        dict.set("First", header.len());
        if let Some(extends) = self.extends {
            dict.set("Extends", extends);
        }

        let mut data = header;
        data.extend_from_slice(&self.body);
        PdfStream::with_dictionary(dict, data)
    }
}
