//! In-memory PDF object model.

mod array;
mod dictionary;
mod name;
mod primitive;
mod state;
mod stream;
mod string;

pub use array::PdfArray;
pub use dictionary::PdfDictionary;
pub use name::PdfName;
pub use primitive::{DocumentId, IndirectRef, ObjectId, PdfLiteral, PdfNumber, MAX_GENERATION};
pub use state::ObjectState;
pub use stream::{InputSource, OriginalBytes, PdfStream, StreamContent};
pub use string::{PdfString, TextEncoding};

/// Closed set of PDF object kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Array,
    Dictionary,
    Stream,
    Boolean,
    Name,
    Null,
    Number,
    String,
    Literal,
    IndirectReference,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum PdfObject {
    #[default]
    Null,
    Boolean(bool),
    Number(PdfNumber),
    Name(PdfName),
    String(PdfString),
    Literal(PdfLiteral),
    Array(PdfArray),
    Dictionary(PdfDictionary),
    Stream(PdfStream),
    Reference(IndirectRef),
}

impl PdfObject {
    pub fn name(value: impl Into<String>) -> Self {
        PdfObject::Name(PdfName::new(value))
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            PdfObject::Null => ObjectType::Null,
            PdfObject::Boolean(_) => ObjectType::Boolean,
            PdfObject::Number(_) => ObjectType::Number,
            PdfObject::Name(_) => ObjectType::Name,
            PdfObject::String(_) => ObjectType::String,
            PdfObject::Literal(_) => ObjectType::Literal,
            PdfObject::Array(_) => ObjectType::Array,
            PdfObject::Dictionary(_) => ObjectType::Dictionary,
            PdfObject::Stream(_) => ObjectType::Stream,
            PdfObject::Reference(_) => ObjectType::IndirectReference,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PdfObject::Null)
    }

    /// State bits of a composite object; primitives carry none.
    pub fn state(&self) -> ObjectState {
        match self {
            PdfObject::Array(a) => a.state(),
            PdfObject::Dictionary(d) => d.state(),
            PdfObject::Stream(s) => s.state(),
            _ => ObjectState::empty(),
        }
    }

    pub fn check_state(&self, state: ObjectState) -> bool {
        self.state().contains(state)
    }

    pub fn set_state(&mut self, state: ObjectState, on: bool) {
        let bits = match self {
            PdfObject::Array(a) => a.state_mut(),
            PdfObject::Dictionary(d) => d.state_mut(),
            PdfObject::Stream(s) => s.state_mut(),
            _ => return,
        };
        bits.set(state, on);
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PdfObject::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PdfObject::Number(PdfNumber::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            PdfObject::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&PdfName> {
        match self {
            PdfObject::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&PdfString> {
        match self {
            PdfObject::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&PdfArray> {
        match self {
            PdfObject::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut PdfArray> {
        match self {
            PdfObject::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Dictionary of a dictionary or stream object.
    pub fn as_dict(&self) -> Option<&PdfDictionary> {
        match self {
            PdfObject::Dictionary(d) => Some(d),
            PdfObject::Stream(s) => Some(s.dictionary()),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut PdfDictionary> {
        match self {
            PdfObject::Dictionary(d) => Some(d),
            PdfObject::Stream(s) => Some(s.dictionary_mut()),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&PdfStream> {
        match self {
            PdfObject::Stream(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<IndirectRef> {
        match self {
            PdfObject::Reference(r) => Some(*r),
            _ => None,
        }
    }
}

impl From<bool> for PdfObject {
    fn from(b: bool) -> Self {
        PdfObject::Boolean(b)
    }
}

impl From<i32> for PdfObject {
    fn from(i: i32) -> Self {
        PdfObject::Number(PdfNumber::Integer(i as i64))
    }
}

impl From<i64> for PdfObject {
    fn from(i: i64) -> Self {
        PdfObject::Number(PdfNumber::Integer(i))
    }
}

impl From<u32> for PdfObject {
    fn from(i: u32) -> Self {
        PdfObject::Number(PdfNumber::Integer(i as i64))
    }
}

impl From<usize> for PdfObject {
    fn from(i: usize) -> Self {
        PdfObject::Number(PdfNumber::Integer(i as i64))
    }
}

impl From<f32> for PdfObject {
    fn from(f: f32) -> Self {
        PdfObject::Number(PdfNumber::Real(f as f64))
    }
}

impl From<f64> for PdfObject {
    fn from(f: f64) -> Self {
        PdfObject::Number(PdfNumber::Real(f))
    }
}

impl From<PdfNumber> for PdfObject {
    fn from(n: PdfNumber) -> Self {
        PdfObject::Number(n)
    }
}

impl From<PdfName> for PdfObject {
    fn from(n: PdfName) -> Self {
        PdfObject::Name(n)
    }
}

impl From<PdfString> for PdfObject {
    fn from(s: PdfString) -> Self {
        PdfObject::String(s)
    }
}

impl From<&str> for PdfObject {
    fn from(s: &str) -> Self {
        PdfObject::String(PdfString::new(s))
    }
}

impl From<String> for PdfObject {
    fn from(s: String) -> Self {
        PdfObject::String(PdfString::new(s))
    }
}

impl From<PdfLiteral> for PdfObject {
    fn from(l: PdfLiteral) -> Self {
        PdfObject::Literal(l)
    }
}

impl From<PdfArray> for PdfObject {
    fn from(a: PdfArray) -> Self {
        PdfObject::Array(a)
    }
}

impl From<Vec<PdfObject>> for PdfObject {
    fn from(v: Vec<PdfObject>) -> Self {
        PdfObject::Array(v.into())
    }
}

impl From<PdfDictionary> for PdfObject {
    fn from(d: PdfDictionary) -> Self {
        PdfObject::Dictionary(d)
    }
}

impl From<PdfStream> for PdfObject {
    fn from(s: PdfStream) -> Self {
        PdfObject::Stream(s)
    }
}

impl From<IndirectRef> for PdfObject {
    fn from(r: IndirectRef) -> Self {
        PdfObject::Reference(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_type_tags() {
        assert_eq!(PdfObject::Null.object_type(), ObjectType::Null);
        assert_eq!(PdfObject::from(1).object_type(), ObjectType::Number);
        assert_eq!(PdfObject::from(1.5).object_type(), ObjectType::Number);
        assert_eq!(PdfObject::name("A").object_type(), ObjectType::Name);
        assert_eq!(PdfObject::from("s").object_type(), ObjectType::String);
        assert_eq!(
            PdfObject::from(PdfLiteral::new("q")).object_type(),
            ObjectType::Literal
        );
        assert_eq!(
            PdfObject::from(PdfStream::new(vec![])).object_type(),
            ObjectType::Stream
        );
        let r = IndirectRef::new(ObjectId::new(1, 0), DocumentId::next());
        assert_eq!(
            PdfObject::from(r).object_type(),
            ObjectType::IndirectReference
        );
    }

    #[test]
    fn test_state_only_on_composites() {
        let mut dict = PdfObject::from(PdfDictionary::new());
        dict.set_state(ObjectState::MUST_BE_INDIRECT, true);
        assert!(dict.check_state(ObjectState::MUST_BE_INDIRECT));

        let mut number = PdfObject::from(3);
        number.set_state(ObjectState::MUST_BE_INDIRECT, true);
        assert!(number.state().is_empty());
    }

    #[test]
    fn test_stream_exposes_dictionary() {
        let mut stream = PdfStream::new(vec![1]);
        stream.dictionary_mut().set("Type", PdfName::new("XObject"));
        let obj = PdfObject::from(stream);
        assert!(obj.as_dict().is_some_and(|d| d.is_type("XObject")));
    }

    #[test]
    fn test_numeric_accessors() {
        assert_eq!(PdfObject::from(7).as_integer(), Some(7));
        assert_eq!(PdfObject::from(7).as_real(), Some(7.0));
        assert_eq!(PdfObject::from(0.5).as_integer(), None);
    }
}
