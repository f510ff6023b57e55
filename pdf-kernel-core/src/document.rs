//! Document session: one object space, its cross-reference table and
//! trailer, and (for opened files) the original bytes objects load from.

use crate::error::{PdfError, Result};
use crate::objects::{
    DocumentId, IndirectRef, ObjectId, ObjectState, PdfDictionary, PdfObject,
};
use crate::parser::object_stream::ObjectStreamContents;
use crate::parser::{self, ObjectParser, ParseError};
use crate::writer::XrefEntry;
use crate::xref::{IndirectReference, Location, XrefTable};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Trailer keys that describe the section they were read from rather than
/// the document.
const SECTION_ONLY_KEYS: [&str; 8] = [
    "W", "Index", "Type", "Length", "Filter", "DecodeParms", "XRefStm", "Prev",
];

#[derive(Debug)]
struct OriginalFile {
    bytes: Arc<[u8]>,
    startxref: Option<u64>,
}

/// A PDF document being built or updated.
///
/// Objects are addressed by [`IndirectRef`] handles bound to this
/// document. Objects of an opened file are parsed on first access.
///
/// # Example
///
/// ```rust
/// use pdf_kernel::{PdfDictionary, PdfDocument};
///
/// let mut doc = PdfDocument::new();
/// let catalog = doc.add_object(PdfDictionary::with_type("Catalog"));
/// doc.set_root(catalog);
/// assert!(doc.catalog().unwrap().is_some());
/// ```
#[derive(Debug)]
pub struct PdfDocument {
    id: DocumentId,
    xref: XrefTable,
    trailer: PdfDictionary,
    version: String,
    original: Option<OriginalFile>,
    object_streams: HashMap<u32, ObjectStreamContents>,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    /// Empty document with no catalog.
    pub fn new() -> Self {
        let id = DocumentId::next();
        Self {
            id,
            xref: XrefTable::new(id),
            trailer: PdfDictionary::new(),
            version: "1.7".to_string(),
            original: None,
            object_streams: HashMap::new(),
        }
    }

    /// Reads the cross-reference data of `bytes`. Objects are parsed lazily.
    pub fn open(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let data: Arc<[u8]> = Arc::from(bytes.into());
        let version = parser::parse_header(&data)?;
        let id = DocumentId::next();
        let xref_data = parser::xref::read_xref(&data, id)?;

        let mut xref = XrefTable::new(id);
        for (&number, entry) in &xref_data.entries {
            if number == 0 {
                continue;
            }
            let reference = match *entry {
                XrefEntry::Free { generation, .. } => {
                    let mut r = IndirectReference::new(ObjectId::new(number, generation), id);
                    r.set_state(ObjectState::FREE);
                    r
                }
                XrefEntry::InUse { offset, generation } => {
                    let mut r = IndirectReference::new(ObjectId::new(number, generation), id);
                    r.set_offset(offset);
                    r
                }
                XrefEntry::Compressed { stream, index } => {
                    let mut r = IndirectReference::new(ObjectId::new(number, 0), id);
                    r.set_compressed(stream, index);
                    r.set_state(ObjectState::ORIGINAL_OBJECT_STREAM);
                    r
                }
            };
            xref.add(reference);
        }

        let mut trailer = xref_data.trailer;
        for key in SECTION_ONLY_KEYS {
            trailer.remove(key);
        }
        if trailer.contains_key("Encrypt") {
            warn!("document is encrypted; objects are kept as stored and only append mode preserves them");
        }
        debug!(
            version = %version,
            objects = xref.size(),
            startxref = ?xref_data.startxref,
            "opened document"
        );

        Ok(Self {
            id,
            xref,
            trailer,
            version,
            original: Some(OriginalFile {
                bytes: data,
                startxref: xref_data.startxref,
            }),
            object_streams: HashMap::new(),
        })
    }

    pub fn open_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::open(bytes)
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    pub fn xref(&self) -> &XrefTable {
        &self.xref
    }

    pub fn xref_mut(&mut self) -> &mut XrefTable {
        &mut self.xref
    }

    pub fn trailer(&self) -> &PdfDictionary {
        &self.trailer
    }

    pub fn trailer_mut(&mut self) -> &mut PdfDictionary {
        &mut self.trailer
    }

    /// Bytes of the file this document was opened from.
    pub fn original_bytes(&self) -> Option<&Arc<[u8]>> {
        self.original.as_ref().map(|o| &o.bytes)
    }

    /// Offset of the newest cross-reference section of the opened file.
    pub fn startxref(&self) -> Option<u64> {
        self.original.as_ref().and_then(|o| o.startxref)
    }

    pub fn is_encrypted(&self) -> bool {
        self.trailer.contains_key("Encrypt")
    }

    pub fn create_next_indirect_reference(&mut self) -> IndirectRef {
        self.xref.create_next_indirect_reference()
    }

    /// Makes `object` indirect and returns its reference.
    pub fn add_object(&mut self, object: impl Into<PdfObject>) -> IndirectRef {
        let reference = self.xref.create_next_indirect_reference();
        if let Some(entry) = self.xref.lookup_mut(reference) {
            entry.set_object(object.into());
        }
        reference
    }

    fn check_owner(&self, reference: IndirectRef) -> Result<()> {
        if reference.document() != self.id {
            return Err(PdfError::ForeignReference(reference.id()));
        }
        Ok(())
    }

    /// Object behind `reference`, parsed from the original file on first
    /// access. `None` for free and unknown references.
    pub fn get_object(&mut self, reference: IndirectRef) -> Result<Option<&PdfObject>> {
        self.check_owner(reference)?;
        if !self.prepare(reference)? {
            return Ok(None);
        }
        Ok(self.xref.lookup(reference).and_then(IndirectReference::object))
    }

    /// Like [`get_object`](Self::get_object) and marks the object
    /// `MODIFIED` so append mode writes it again.
    pub fn get_object_mut(&mut self, reference: IndirectRef) -> Result<Option<&mut PdfObject>> {
        self.check_owner(reference)?;
        if !self.prepare(reference)? {
            return Ok(None);
        }
        let Some(entry) = self.xref.lookup_mut(reference) else {
            return Ok(None);
        };
        if entry.check_state(ObjectState::READ_ONLY) {
            return Err(PdfError::ObjectReleased(reference.id()));
        }
        entry.set_state(ObjectState::MODIFIED);
        Ok(entry.object_mut())
    }

    /// Replaces the object behind `reference`.
    pub fn set_object(&mut self, reference: IndirectRef, object: impl Into<PdfObject>) -> Result<()> {
        self.check_owner(reference)?;
        let entry = self.xref.lookup_mut(reference).ok_or(PdfError::InvalidObjectReference(
            reference.number(),
            reference.generation(),
        ))?;
        if entry.is_free() {
            return Err(PdfError::InvalidOperation(format!(
                "object {} is free",
                reference.id()
            )));
        }
        if entry.check_state(ObjectState::READ_ONLY) {
            return Err(PdfError::ObjectReleased(reference.id()));
        }
        entry.set_object(object.into());
        entry.set_state(ObjectState::MODIFIED);
        Ok(())
    }

    /// Frees the object number and returns the detached object, if it was
    /// never flushed.
    pub fn free_object(&mut self, reference: IndirectRef) -> Result<Option<PdfObject>> {
        self.check_owner(reference)?;
        if self.xref.lookup(reference).is_none() {
            return Err(PdfError::InvalidObjectReference(
                reference.number(),
                reference.generation(),
            ));
        }
        Ok(self.xref.free_reference(reference.number()))
    }

    pub fn root(&self) -> Option<IndirectRef> {
        self.trailer.get_reference("Root")
    }

    pub fn set_root(&mut self, catalog: IndirectRef) {
        self.trailer.set("Root", catalog);
    }

    pub fn catalog(&mut self) -> Result<Option<&PdfDictionary>> {
        let Some(root) = self.root() else {
            return Ok(None);
        };
        Ok(self.get_object(root)?.and_then(PdfObject::as_dict))
    }

    pub fn catalog_mut(&mut self) -> Result<Option<&mut PdfDictionary>> {
        let Some(root) = self.root() else {
            return Ok(None);
        };
        Ok(self.get_object_mut(root)?.and_then(PdfObject::as_dict_mut))
    }

    /// Document information dictionary, created when the trailer has none.
    pub fn info_mut(&mut self) -> Result<&mut PdfDictionary> {
        let existing = match self.trailer.get_reference("Info") {
            Some(r) => matches!(self.get_object(r)?, Some(PdfObject::Dictionary(_))).then_some(r),
            None => None,
        };
        let reference = match existing {
            Some(r) => r,
            None => {
                let r = self.add_object(PdfDictionary::new());
                self.trailer.set("Info", r);
                r
            }
        };
        self.get_object_mut(reference)?
            .and_then(PdfObject::as_dict_mut)
            .ok_or(PdfError::InvalidObjectReference(
                reference.number(),
                reference.generation(),
            ))
    }

    /// Checks the entry and loads its object. Returns `false` when there is
    /// nothing to return.
    fn prepare(&mut self, reference: IndirectRef) -> Result<bool> {
        match self.xref.lookup(reference) {
            None => return Ok(false),
            Some(entry) if entry.is_free() => return Ok(false),
            Some(entry) if entry.is_flushed() && !entry.has_object() => {
                return Err(PdfError::ObjectReleased(reference.id()))
            }
            Some(_) => {}
        }
        self.load_object(reference.number())?;
        Ok(true)
    }

    /// Parses the object for `number` from the original file unless it is
    /// already in memory.
    pub(crate) fn load_object(&mut self, number: u32) -> Result<()> {
        let Some(entry) = self.xref.get(number) else {
            return Ok(());
        };
        if entry.has_object() || entry.is_free() || entry.is_flushed() || self.original.is_none() {
            return Ok(());
        }
        if entry.check_state(ObjectState::READING) {
            return Err(PdfError::Parse(ParseError::InvalidReference(
                number,
                entry.generation(),
            )));
        }
        let id = entry.id();
        let location = entry.location();
        if let Some(entry) = self.xref.get_mut(number) {
            entry.set_state(ObjectState::READING);
        }

        let loaded = match location {
            Location::Offset(0) => Ok(None),
            Location::Offset(offset) => self.parse_at(offset, id).map(Some),
            Location::Compressed { stream, index } => self.load_compressed(stream, index, number),
        };

        if let Some(entry) = self.xref.get_mut(number) {
            entry.clear_state(ObjectState::READING);
            if let Ok(Some(object)) = &loaded {
                entry.set_object(object.clone());
            }
        }
        loaded.map(|_| ())
    }

    fn parse_at(&self, offset: u64, expected: ObjectId) -> Result<PdfObject> {
        let Some(original) = &self.original else {
            return Ok(PdfObject::Null);
        };
        let data = Arc::clone(&original.bytes);
        let resolve = |r: IndirectRef| self.peek_integer(r);
        let mut parser = ObjectParser::new(&data, self.id)
            .at(offset as usize)
            .with_source(Arc::clone(&data));
        let (id, object) = parser.parse_indirect_object(&resolve)?;
        if id != expected {
            warn!(expected = %expected, found = %id, offset, "xref entry points at a different object");
        }
        Ok(object)
    }

    /// Integer value of `reference` without loading it into the table, used
    /// for indirect stream lengths.
    fn peek_integer(&self, reference: IndirectRef) -> Option<i64> {
        if reference.document() != self.id {
            return None;
        }
        let entry = self.xref.lookup(reference)?;
        if let Some(object) = entry.object() {
            return object.as_integer();
        }
        match entry.location() {
            Location::Offset(0) => None,
            Location::Offset(offset) => {
                let data = &self.original.as_ref()?.bytes;
                let mut parser = ObjectParser::new(data, self.id).at(offset as usize);
                let (_, object) = parser.parse_indirect_object(&|_: IndirectRef| None).ok()?;
                object.as_integer()
            }
            Location::Compressed { stream, index } => self
                .object_streams
                .get(&stream)?
                .get(index as usize, reference.number())?
                .as_integer(),
        }
    }

    fn load_compressed(&mut self, stream: u32, index: u32, number: u32) -> Result<Option<PdfObject>> {
        if !self.object_streams.contains_key(&stream) {
            let (offset, id) = match self.xref.get(stream) {
                Some(entry) => match entry.location() {
                    Location::Offset(offset) if offset > 0 => (offset, entry.id()),
                    _ => return Err(PdfError::InvalidObjectReference(stream, entry.generation())),
                },
                None => return Err(PdfError::InvalidObjectReference(stream, 0)),
            };
            let container = self.parse_at(offset, id)?;
            let PdfObject::Stream(container) = container else {
                return Err(PdfError::InvalidStream(format!(
                    "object stream {id} is not a stream"
                )));
            };
            let contents = ObjectStreamContents::parse(&container, self.id)?;
            debug!(stream, objects = contents.len(), "loaded object stream");
            self.object_streams.insert(stream, contents);
        }
        let object = self
            .object_streams
            .get(&stream)
            .and_then(|contents| contents.get(index as usize, number))
            .cloned();
        if object.is_none() {
            warn!(number, stream, index, "object missing from its object stream");
        }
        Ok(object)
    }
}
