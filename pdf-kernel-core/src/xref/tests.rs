use super::*;

fn table() -> XrefTable {
    XrefTable::new(DocumentId::next())
}

fn flush(table: &mut XrefTable, reference: IndirectRef, offset: u64) {
    let entry = table.lookup_mut(reference).unwrap();
    entry.set_offset(offset);
    entry.set_state(ObjectState::FLUSHED);
}

fn write(table: &mut XrefTable, info: TrailerInfo<'_>) -> (Option<u64>, String) {
    let mut out = PdfOutputStream::with_position(Vec::new(), 100);
    let start = table.write_xref_table_and_trailer(&mut out, info).unwrap();
    (start, String::from_utf8_lossy(&out.into_inner()).into_owned())
}

fn info<'a>(trailer: &'a PdfDictionary, id: &'a [u8]) -> TrailerInfo<'a> {
    TrailerInfo {
        trailer,
        file_id: (id, id),
        encrypt: None,
        previous: None,
        append_mode: false,
        full_compression: false,
        compression: CompressionLevel::NoCompression,
    }
}

#[test]
fn test_new_table_reserves_slot_zero() {
    let table = table();
    assert_eq!(table.size(), 1);
    let head = table.get(0).unwrap();
    assert!(head.is_free());
    assert_eq!(head.generation(), MAX_GENERATION);
}

#[test]
fn test_sequential_allocation() {
    let mut table = table();
    let a = table.create_next_indirect_reference();
    let b = table.create_next_indirect_reference();
    assert_eq!(a.number(), 1);
    assert_eq!(b.number(), 2);
    assert_eq!(table.size(), 3);
    assert!(table.get(1).unwrap().check_state(ObjectState::MODIFIED));
}

#[test]
fn test_capacity_doubles() {
    let mut table = table();
    let before = table.capacity();
    for _ in 0..before {
        table.create_next_indirect_reference();
    }
    assert_eq!(table.capacity(), before * 2);
    assert_eq!(table.size() as usize, before + 1);
}

#[test]
fn test_add_far_slot() {
    let mut table = table();
    let document = table.document();
    table.add(IndirectReference::new(ObjectId::new(500, 0), document));
    assert_eq!(table.size(), 501);
    assert!(table.capacity() > 500);
    assert!(table.get(499).is_none());
}

#[test]
fn test_freed_number_is_reused() {
    let mut table = table();
    let first = table.create_next_indirect_reference();
    table.create_next_indirect_reference();
    table.lookup_mut(first).unwrap().set_offset(77);

    table.free_reference(first.number());
    assert_eq!(table.free_numbers().collect::<Vec<_>>(), vec![1]);

    let reused = table.create_next_indirect_reference();
    assert_eq!(reused.number(), first.number());
    let entry = table.lookup(reused).unwrap();
    assert_eq!(entry.offset(), 0);
    assert!(!entry.is_free());
    assert_eq!(table.free_numbers().count(), 0);
}

#[test]
fn test_lowest_free_number_first() {
    let mut table = table();
    for _ in 0..5 {
        table.create_next_indirect_reference();
    }
    table.free_reference(4);
    table.free_reference(2);
    assert_eq!(table.create_next_indirect_reference().number(), 2);
    assert_eq!(table.create_next_indirect_reference().number(), 4);
    assert_eq!(table.create_next_indirect_reference().number(), 6);
}

#[test]
fn test_max_generation_is_retired() {
    let mut table = table();
    let document = table.document();
    table.add(IndirectReference::new(ObjectId::new(1, MAX_GENERATION), document));

    table.free_reference(1);
    assert!(table.get(1).unwrap().is_free());
    assert_eq!(table.free_numbers().count(), 0);
    assert_eq!(table.create_next_indirect_reference().number(), 2);
}

#[test]
fn test_free_detaches_unflushed_object() {
    let mut table = table();
    let r = table.create_next_indirect_reference();
    table.lookup_mut(r).unwrap().set_object(PdfObject::from(1));
    let detached = table.free_reference(r.number());
    assert_eq!(detached.and_then(|o| o.as_integer()), Some(1));
    assert!(!table.get(r.number()).unwrap().has_object());
}

#[test]
fn test_sections_from_gaps() {
    let present = [1, 2, 3, 7, 8, 10];
    let sections = compute_sections(11, |n| present.contains(&n));
    assert_eq!(sections, vec![(1, 3), (7, 2), (10, 1)]);
}

#[test]
fn test_sections_trailing_run_and_empty() {
    assert_eq!(compute_sections(4, |_| true), vec![(0, 4)]);
    assert!(compute_sections(4, |_| false).is_empty());
}

#[test]
fn test_full_mode_skips_unflushed() {
    let mut table = table();
    let a = table.create_next_indirect_reference();
    let _pending = table.create_next_indirect_reference();
    let c = table.create_next_indirect_reference();
    flush(&mut table, a, 10);
    flush(&mut table, c, 20);

    assert_eq!(table.create_sections(false), vec![(0, 2), (3, 1)]);
}

#[test]
fn test_full_mode_skips_free_generation_zero() {
    let mut table = table();
    let a = table.create_next_indirect_reference();
    let b = table.create_next_indirect_reference();
    flush(&mut table, a, 10);
    flush(&mut table, b, 20);
    table.free_reference(a.number());

    assert_eq!(table.create_sections(false), vec![(0, 1), (2, 1)]);
}

#[test]
fn test_append_mode_only_modified() {
    let mut table = table();
    let document = table.document();
    for n in 1..=4 {
        table.add(IndirectReference::new(ObjectId::new(n, 0), document));
    }
    table.get_mut(2).unwrap().set_state(ObjectState::MODIFIED);
    table.get_mut(3).unwrap().set_state(ObjectState::MODIFIED);

    assert_eq!(table.create_sections(true), vec![(2, 2)]);
}

#[test]
fn test_append_mode_without_changes_is_noop() {
    let mut table = table();
    let document = table.document();
    table.add(IndirectReference::new(ObjectId::new(1, 0), document));

    let trailer = PdfDictionary::new();
    let id = [0u8; 16];
    let mut out = PdfOutputStream::new(Vec::new());
    let result = table
        .write_xref_table_and_trailer(
            &mut out,
            TrailerInfo {
                append_mode: true,
                previous: Some(10),
                ..info(&trailer, &id)
            },
        )
        .unwrap();
    assert_eq!(result, None);
    assert!(out.into_inner().is_empty());
}

#[test]
fn test_classic_table_output() {
    let mut table = table();
    let a = table.create_next_indirect_reference();
    let b = table.create_next_indirect_reference();
    flush(&mut table, a, 15);
    flush(&mut table, b, 64);

    let mut trailer = PdfDictionary::new();
    trailer.set("Root", a);
    trailer.set("W", vec![PdfObject::from(1)]);
    trailer.set("Type", PdfName::new("XRef"));
    let id = [0xABu8; 2];

    let (start, text) = write(&mut table, info(&trailer, &id));
    assert_eq!(start, Some(100));
    assert!(text.starts_with(
        "xref\n0 3\n0000000000 65535 f \n0000000015 00000 n \n0000000064 00000 n \ntrailer\n"
    ));
    assert!(text.contains("/Root 1 0 R"));
    assert!(text.contains("/Size 3"));
    assert!(text.contains("/ID [<ABAB> <ABAB>]"));
    assert!(!text.contains("/W"));
    assert!(!text.contains("/Type"));
    assert!(text.ends_with("startxref\n100\n%%EOF\n"));
}

#[test]
fn test_free_list_links_written_entries() {
    let mut table = table();
    let refs: Vec<_> = (0..4).map(|_| table.create_next_indirect_reference()).collect();
    for (i, r) in refs.iter().enumerate() {
        flush(&mut table, *r, 10 * (i as u64 + 1));
    }
    table.free_reference(2);
    table.free_reference(4);
    // A full rewrite keeps only free entries with a non-zero generation.
    table.get_mut(2).unwrap().set_generation(1);
    table.get_mut(4).unwrap().set_generation(3);

    let trailer = PdfDictionary::new();
    let id = [0u8; 1];
    let (_, text) = write(&mut table, info(&trailer, &id));
    assert!(text.contains(
        "0 5\n0000000002 65535 f \n0000000010 00000 n \n0000000004 00001 f \n0000000030 00000 n \n0000000000 00003 f \n"
    ));
}

#[test]
fn test_append_mode_bumps_freed_generation_and_sets_prev() {
    let mut table = table();
    let document = table.document();
    for n in 1..=3 {
        let mut entry = IndirectReference::new(ObjectId::new(n, 0), document);
        entry.set_offset(n as u64 * 10);
        table.add(entry);
    }
    table.free_reference(2);

    let trailer = PdfDictionary::new();
    let id = [1u8; 1];
    let (_, text) = write(
        &mut table,
        TrailerInfo {
            append_mode: true,
            previous: Some(42),
            ..info(&trailer, &id)
        },
    );
    assert!(text.starts_with("xref\n2 1\n0000000000 00001 f \n"));
    assert!(text.contains("/Prev 42"));
    assert_eq!(table.get(2).unwrap().generation(), 1);
    assert_eq!(table.create_next_indirect_reference().number(), 2);
}

#[test]
fn test_append_mode_retires_number_reaching_max_generation() {
    let mut table = table();
    let document = table.document();
    let mut entry = IndirectReference::new(ObjectId::new(1, MAX_GENERATION - 1), document);
    entry.set_offset(10);
    table.add(entry);
    table.free_reference(1);
    assert_eq!(table.free_numbers().collect::<Vec<_>>(), vec![1]);

    let trailer = PdfDictionary::new();
    let id = [1u8; 1];
    let (_, text) = write(
        &mut table,
        TrailerInfo {
            append_mode: true,
            previous: Some(42),
            ..info(&trailer, &id)
        },
    );
    assert!(text.starts_with("xref\n1 1\n0000000000 65535 f \n"));
    assert_eq!(table.get(1).unwrap().generation(), MAX_GENERATION);
    assert_eq!(table.free_numbers().count(), 0);
    assert_eq!(table.create_next_indirect_reference().number(), 2);
    assert_eq!(table.create_next_indirect_reference().number(), 3);
}

#[test]
fn test_append_xref_stream_keeps_freed_number_and_full_size() {
    let mut table = table();
    let document = table.document();
    for n in 1..=7 {
        let mut entry = IndirectReference::new(ObjectId::new(n, 0), document);
        entry.set_offset(n as u64 * 10);
        table.add(entry);
    }
    table.free_reference(2);

    let trailer = PdfDictionary::new();
    let id = [1u8; 1];
    let (_, text) = write(
        &mut table,
        TrailerInfo {
            append_mode: true,
            full_compression: true,
            previous: Some(42),
            ..info(&trailer, &id)
        },
    );
    assert!(text.starts_with("8 0 obj\n<<"));
    assert!(text.contains("/Index [2 1 8 1]"));
    assert!(text.contains("/Size 9"));
    assert!(text.contains("/Prev 42"));

    let freed = table.get(2).unwrap();
    assert!(freed.is_free());
    assert_eq!(freed.generation(), 1);
    assert_eq!(table.free_numbers().collect::<Vec<_>>(), vec![2]);
}

#[test]
fn test_xref_stream_output() {
    let mut table = table();
    let a = table.create_next_indirect_reference();
    flush(&mut table, a, 15);
    let b = table.create_next_indirect_reference();
    {
        let entry = table.lookup_mut(b).unwrap();
        entry.set_compressed(1, 0);
        entry.set_state(ObjectState::FLUSHED);
    }

    let mut trailer = PdfDictionary::new();
    trailer.set("Root", a);
    let id = [7u8; 1];
    let (start, text) = write(
        &mut table,
        TrailerInfo {
            full_compression: true,
            ..info(&trailer, &id)
        },
    );

    assert_eq!(start, Some(100));
    assert!(text.starts_with("3 0 obj\n<<"));
    assert!(text.contains("/Type /XRef"));
    assert!(text.contains("/W [1 4 2]"));
    assert!(text.contains("/Index [0 4]"));
    assert!(text.contains("/Size 4"));
    assert!(text.contains("/Length 28"));
    assert!(!text.contains("/Filter"));
    assert!(text.ends_with("endobj\nstartxref\n100\n%%EOF\n"));

    let xref_entry = table.get(3).unwrap();
    assert_eq!(xref_entry.offset(), 100);
    assert!(xref_entry.is_flushed());
}

#[test]
fn test_xref_stream_binary_rows() {
    let mut table = table();
    let a = table.create_next_indirect_reference();
    flush(&mut table, a, 0x0203);

    let trailer = PdfDictionary::new();
    let id = [7u8; 1];
    let mut out = PdfOutputStream::new(Vec::new());
    table
        .write_xref_table_and_trailer(
            &mut out,
            TrailerInfo {
                full_compression: true,
                ..info(&trailer, &id)
            },
        )
        .unwrap();
    let bytes = out.into_inner();
    let body_start = bytes
        .windows(7)
        .position(|w| w == b"stream\n")
        .map(|p| p + 7)
        .unwrap();
    assert_eq!(
        &bytes[body_start..body_start + 21],
        &[
            0, 0, 0, 0, 0, 0xFF, 0xFF, //
            1, 0, 0, 0x02, 0x03, 0, 0, //
            1, 0, 0, 0, 0, 0, 0,
        ]
    );
}
