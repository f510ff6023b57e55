use crate::objects::{ObjectState, PdfObject};

#[derive(Debug, Clone, Default)]
pub struct PdfArray {
    elements: Vec<PdfObject>,
    state: ObjectState,
}

impl PdfArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
            state: ObjectState::empty(),
        }
    }

    pub fn push(&mut self, object: impl Into<PdfObject>) {
        self.elements.push(object.into());
    }

    pub fn pop(&mut self) -> Option<PdfObject> {
        self.elements.pop()
    }

    pub fn insert(&mut self, index: usize, object: impl Into<PdfObject>) {
        self.elements.insert(index, object.into());
    }

    pub fn remove(&mut self, index: usize) -> PdfObject {
        self.elements.remove(index)
    }

    pub fn get(&self, index: usize) -> Option<&PdfObject> {
        self.elements.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut PdfObject> {
        self.elements.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PdfObject> {
        self.elements.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PdfObject> {
        self.elements.iter_mut()
    }

    /// True when any element is the name `name`.
    pub fn contains_name(&self, name: &str) -> bool {
        self.elements
            .iter()
            .any(|e| e.as_name().is_some_and(|n| n == name))
    }

    pub fn state(&self) -> ObjectState {
        self.state
    }

    pub fn state_mut(&mut self) -> &mut ObjectState {
        &mut self.state
    }

    /// Writes this array as an indirect object whenever it appears as a child.
    pub fn make_indirect(mut self) -> Self {
        self.state.insert(ObjectState::MUST_BE_INDIRECT);
        self
    }
}

impl PartialEq for PdfArray {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

impl From<Vec<PdfObject>> for PdfArray {
    fn from(elements: Vec<PdfObject>) -> Self {
        Self {
            elements,
            state: ObjectState::empty(),
        }
    }
}

impl From<PdfArray> for Vec<PdfObject> {
    fn from(array: PdfArray) -> Self {
        array.elements
    }
}

impl FromIterator<PdfObject> for PdfArray {
    fn from_iter<T: IntoIterator<Item = PdfObject>>(iter: T) -> Self {
        iter.into_iter().collect::<Vec<_>>().into()
    }
}

impl IntoIterator for PdfArray {
    type Item = PdfObject;
    type IntoIter = std::vec::IntoIter<PdfObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}
