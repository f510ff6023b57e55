use crate::objects::{DocumentId, IndirectRef, ObjectId, ObjectState, PdfObject};

/// Physical address of an indirect object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Byte offset of `n g obj` in the file
    Offset(u64),
    /// Slot inside an object stream
    Compressed { stream: u32, index: u32 },
}

/// Cross-reference entry: identity, address, lifecycle state, and the
/// object it refers to while that object is held in memory.
#[derive(Debug, Clone)]
pub struct IndirectReference {
    id: ObjectId,
    document: DocumentId,
    location: Location,
    state: ObjectState,
    object: Option<PdfObject>,
}

impl IndirectReference {
    pub fn new(id: ObjectId, document: DocumentId) -> Self {
        Self {
            id,
            document,
            location: Location::Offset(0),
            state: ObjectState::empty(),
            object: None,
        }
    }

    pub fn reference(&self) -> IndirectRef {
        IndirectRef::new(self.id, self.document)
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn number(&self) -> u32 {
        self.id.number()
    }

    pub fn generation(&self) -> u16 {
        self.id.generation()
    }

    pub(crate) fn set_generation(&mut self, generation: u16) {
        self.id = ObjectId::new(self.id.number(), generation);
    }

    pub fn document(&self) -> DocumentId {
        self.document
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// File offset, or -1 while the object is addressed through an object
    /// stream.
    pub fn offset(&self) -> i64 {
        match self.location {
            Location::Offset(offset) => offset as i64,
            Location::Compressed { .. } => -1,
        }
    }

    /// Index within the containing object stream, or -1 when the object is
    /// addressed by offset.
    pub fn index(&self) -> i64 {
        match self.location {
            Location::Compressed { index, .. } => index as i64,
            Location::Offset(_) => -1,
        }
    }

    pub fn object_stream_number(&self) -> Option<u32> {
        match self.location {
            Location::Compressed { stream, .. } => Some(stream),
            Location::Offset(_) => None,
        }
    }

    pub fn set_offset(&mut self, offset: u64) {
        self.location = Location::Offset(offset);
    }

    pub fn set_compressed(&mut self, stream: u32, index: u32) {
        self.location = Location::Compressed { stream, index };
    }

    pub fn state(&self) -> ObjectState {
        self.state
    }

    pub fn check_state(&self, state: ObjectState) -> bool {
        self.state.contains(state)
    }

    pub fn set_state(&mut self, state: ObjectState) {
        self.state.insert(state);
    }

    pub fn clear_state(&mut self, state: ObjectState) {
        self.state.remove(state);
    }

    pub fn is_free(&self) -> bool {
        self.check_state(ObjectState::FREE)
    }

    pub fn is_flushed(&self) -> bool {
        self.check_state(ObjectState::FLUSHED)
    }

    /// In-memory object, if loaded and not yet released.
    pub fn object(&self) -> Option<&PdfObject> {
        self.object.as_ref()
    }

    pub fn object_mut(&mut self) -> Option<&mut PdfObject> {
        self.object.as_mut()
    }

    pub fn has_object(&self) -> bool {
        self.object.is_some()
    }

    pub(crate) fn set_object(&mut self, object: PdfObject) {
        self.object = Some(object);
    }

    pub(crate) fn take_object(&mut self) -> Option<PdfObject> {
        self.object.take()
    }
}
