//! Property-based tests for the object model and writer
//!
//! Random object graphs are written in both layouts and read back; the
//! parsed objects must equal the ones that went in.

use pdf_kernel::{
    ObjectId, PdfArray, PdfDictionary, PdfDocument, PdfName, PdfObject, PdfString, PdfWriter,
    WriterConfig,
};
use proptest::prelude::*;

prop_compose! {
    fn object_id_strategy()(
        number in 1u32..=999_999u32,
        generation in 0u16..=65535u16
    ) -> ObjectId {
        ObjectId::new(number, generation)
    }
}

// Reals are left out: the compact number format is not lossless.
fn leaf_strategy() -> impl Strategy<Value = PdfObject> {
    prop_oneof![
        Just(PdfObject::Null),
        any::<bool>().prop_map(PdfObject::from),
        any::<i32>().prop_map(PdfObject::from),
        "[a-zA-Z0-9 ()\\\\]{0,40}".prop_map(|s| PdfObject::from(PdfString::new(s))),
        prop::collection::vec(any::<u8>(), 0..20).prop_map(|b| PdfObject::from(PdfString::hex(b))),
        "[a-zA-Z][a-zA-Z0-9#/ ]{0,20}".prop_map(|s| PdfObject::from(PdfName::new(s))),
    ]
}

fn object_strategy() -> impl Strategy<Value = PdfObject> {
    leaf_strategy().prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6)
                .prop_map(|items| PdfObject::from(PdfArray::from(items))),
            prop::collection::vec(("[A-Z][a-z]{0,8}", inner), 0..6).prop_map(|entries| {
                let mut dict = PdfDictionary::new();
                for (key, value) in entries {
                    dict.set(key.as_str(), value);
                }
                PdfObject::from(dict)
            }),
        ]
    })
}

fn roundtrip(objects: &[PdfObject], config: WriterConfig) -> Vec<PdfObject> {
    let mut doc = PdfDocument::new();
    let refs: Vec<_> = objects.iter().map(|o| doc.add_object(o.clone())).collect();
    let bytes = PdfWriter::with_config(Vec::new(), config).close(&mut doc).unwrap();

    let mut reread = PdfDocument::open(bytes).unwrap();
    refs.iter()
        .map(|r| {
            let r = pdf_kernel::IndirectRef::new(r.id(), reread.id());
            reread.get_object(r).unwrap().cloned().unwrap_or_default()
        })
        .collect()
}

proptest! {
    #[test]
    fn test_object_id_display(id in object_id_strategy()) {
        let display = format!("{}", id);
        let expected = format!("{} {} R", id.number(), id.generation());
        prop_assert_eq!(display, expected);
    }

    #[test]
    fn test_classic_roundtrip(objects in prop::collection::vec(object_strategy(), 1..12)) {
        let parsed = roundtrip(&objects, WriterConfig::default());
        prop_assert_eq!(parsed, objects);
    }

    #[test]
    fn test_full_compression_roundtrip(objects in prop::collection::vec(object_strategy(), 1..12)) {
        let parsed = roundtrip(&objects, WriterConfig::default().with_full_compression());
        prop_assert_eq!(parsed, objects);
    }

    #[test]
    fn test_freed_numbers_are_reused_lowest_first(
        count in 2usize..20,
        freed in prop::collection::btree_set(0usize..20, 1..5)
    ) {
        let mut doc = PdfDocument::new();
        let refs: Vec<_> = (0..count).map(|i| doc.add_object(i as i64)).collect();
        let freed: Vec<_> = freed.into_iter().filter(|&i| i < count).collect();
        for &i in &freed {
            doc.free_object(refs[i]).unwrap();
        }
        for &i in &freed {
            let reused = doc.add_object(PdfObject::Null);
            prop_assert_eq!(reused.number(), refs[i].number());
        }
        let fresh = doc.add_object(PdfObject::Null);
        prop_assert_eq!(fresh.number(), count as u32 + 1);
    }
}
