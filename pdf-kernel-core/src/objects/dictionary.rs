use crate::objects::{IndirectRef, ObjectState, PdfArray, PdfName, PdfObject};
use indexmap::IndexMap;

/// PDF dictionary. Keys keep insertion order so output is stable.
#[derive(Debug, Clone, Default)]
pub struct PdfDictionary {
    entries: IndexMap<PdfName, PdfObject>,
    state: ObjectState,
}

impl PdfDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
            state: ObjectState::empty(),
        }
    }

    /// Dictionary with `/Type /<kind>` already set.
    pub fn with_type(kind: &str) -> Self {
        let mut dict = Self::new();
        dict.set("Type", PdfName::new(kind));
        dict
    }

    pub fn set(&mut self, key: impl Into<PdfName>, value: impl Into<PdfObject>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&PdfObject> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut PdfObject> {
        self.entries.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<PdfObject> {
        self.entries.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &PdfName> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &PdfObject> {
        self.entries.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PdfName, &PdfObject)> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&PdfName, &mut PdfObject)> {
        self.entries.iter_mut()
    }

    pub fn get_name(&self, key: &str) -> Option<&PdfName> {
        self.get(key).and_then(PdfObject::as_name)
    }

    pub fn get_dict(&self, key: &str) -> Option<&PdfDictionary> {
        self.get(key).and_then(PdfObject::as_dict)
    }

    pub fn get_array(&self, key: &str) -> Option<&PdfArray> {
        self.get(key).and_then(PdfObject::as_array)
    }

    pub fn get_integer(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(PdfObject::as_integer)
    }

    pub fn get_reference(&self, key: &str) -> Option<IndirectRef> {
        self.get(key).and_then(PdfObject::as_reference)
    }

    /// True when `/Type` is the name `kind`.
    pub fn is_type(&self, kind: &str) -> bool {
        self.get_name("Type").is_some_and(|n| n == kind)
    }

    pub fn state(&self) -> ObjectState {
        self.state
    }

    pub fn state_mut(&mut self) -> &mut ObjectState {
        &mut self.state
    }

    /// Writes this dictionary as an indirect object whenever it appears as a
    /// child.
    pub fn make_indirect(mut self) -> Self {
        self.state.insert(ObjectState::MUST_BE_INDIRECT);
        self
    }
}

impl PartialEq for PdfDictionary {
    /// Key order is irrelevant for equality.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.entries.get(k).is_some_and(|o| o == v))
    }
}

impl FromIterator<(PdfName, PdfObject)> for PdfDictionary {
    fn from_iter<T: IntoIterator<Item = (PdfName, PdfObject)>>(iter: T) -> Self {
        let mut dict = PdfDictionary::new();
        for (key, value) in iter {
            dict.set(key, value);
        }
        dict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::PdfString;

    #[test]
    fn test_new_dictionary() {
        let dict = PdfDictionary::new();
        assert!(dict.is_empty());
        assert_eq!(dict.len(), 0);
    }

    #[test]
    fn test_set_and_get() {
        let mut dict = PdfDictionary::new();
        dict.set("Name", PdfString::new("Test"));
        dict.set("Age", 42);
        dict.set("Active", true);

        assert_eq!(
            dict.get("Name"),
            Some(&PdfObject::String(PdfString::new("Test")))
        );
        assert_eq!(dict.get_integer("Age"), Some(42));
        assert_eq!(dict.get("Active").and_then(|o| o.as_bool()), Some(true));
        assert_eq!(dict.get("Missing"), None);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut dict = PdfDictionary::new();
        dict.set("A", 1);
        dict.set("B", 2);
        dict.set("A", 3);

        let keys: Vec<_> = dict.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["A", "B"]);
        assert_eq!(dict.get_integer("A"), Some(3));
    }

    #[test]
    fn test_remove() {
        let mut dict = PdfDictionary::new();
        dict.set("Temp", 1);
        dict.set("Kept", 2);

        assert!(dict.contains_key("Temp"));
        assert_eq!(dict.remove("Temp").and_then(|o| o.as_integer()), Some(1));
        assert!(!dict.contains_key("Temp"));
        assert_eq!(dict.remove("Temp"), None);
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn test_lookup_with_byte_keys() {
        let mut dict = PdfDictionary::new();
        dict.set(PdfName::from_bytes(b"Length".to_vec()), 10);
        assert_eq!(dict.get_integer("Length"), Some(10));
    }

    #[test]
    fn test_type_helpers() {
        let dict = PdfDictionary::with_type("Catalog");
        assert!(dict.is_type("Catalog"));
        assert!(!dict.is_type("Page"));
    }

    #[test]
    fn test_equality_is_order_insensitive() {
        let mut a = PdfDictionary::new();
        a.set("X", 1);
        a.set("Y", 2);
        let mut b = PdfDictionary::new();
        b.set("Y", 2);
        b.set("X", 1);
        assert_eq!(a, b);

        b.set("Z", 3);
        assert_ne!(a, b);
    }
}
