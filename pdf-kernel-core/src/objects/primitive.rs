use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// Largest generation number a cross-reference entry can carry.
pub const MAX_GENERATION: u16 = 65535;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    number: u32,
    generation: u16,
}

impl ObjectId {
    pub fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn generation(&self) -> u16 {
        self.generation
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.number, self.generation)
    }
}

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a document session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(u64);

impl DocumentId {
    pub(crate) fn next() -> Self {
        DocumentId(NEXT_DOCUMENT_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Handle to an indirect object of one document.
///
/// Equality and ordering look at `(number, generation)` only; the owning
/// document is checked separately when the handle is written.
#[derive(Debug, Clone, Copy)]
pub struct IndirectRef {
    id: ObjectId,
    document: DocumentId,
}

impl IndirectRef {
    pub fn new(id: ObjectId, document: DocumentId) -> Self {
        Self { id, document }
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

    pub fn document(&self) -> DocumentId {
        self.document
    }
}

impl PartialEq for IndirectRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for IndirectRef {}

impl Hash for IndirectRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for IndirectRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndirectRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for IndirectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.id.fmt(f)
    }
}

/// PDF numeric object: integers are kept exact, everything else is a double.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PdfNumber {
    Integer(i64),
    Real(f64),
}

impl PdfNumber {
    pub fn as_i64(&self) -> i64 {
        match *self {
            PdfNumber::Integer(i) => i,
            PdfNumber::Real(f) => f as i64,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            PdfNumber::Integer(i) => i as f64,
            PdfNumber::Real(f) => f,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, PdfNumber::Integer(_))
    }
}

/// Pre-encoded bytes written to the output verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PdfLiteral(Vec<u8>);

impl PdfLiteral {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        PdfLiteral(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_display() {
        assert_eq!(ObjectId::new(7, 2).to_string(), "7 2 R");
    }

    #[test]
    fn test_object_id_ordering() {
        let mut ids = vec![
            ObjectId::new(3, 1),
            ObjectId::new(1, 5),
            ObjectId::new(3, 0),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![ObjectId::new(1, 5), ObjectId::new(3, 0), ObjectId::new(3, 1)]
        );
    }

    #[test]
    fn test_reference_equality_ignores_document() {
        let a = IndirectRef::new(ObjectId::new(4, 0), DocumentId::next());
        let b = IndirectRef::new(ObjectId::new(4, 0), DocumentId::next());
        assert_ne!(a.document(), b.document());
        assert_eq!(a, b);
    }

    #[test]
    fn test_document_ids_are_unique() {
        let first = DocumentId::next();
        let second = DocumentId::next();
        assert!(second.value() > first.value());
    }

    #[test]
    fn test_number_conversions() {
        assert_eq!(PdfNumber::Integer(42).as_f64(), 42.0);
        assert_eq!(PdfNumber::Real(2.75).as_i64(), 2);
        assert!(PdfNumber::Integer(0).is_integer());
        assert!(!PdfNumber::Real(0.0).is_integer());
    }
}
