//! Cross-reference table: the arena of indirect objects of one document.

mod reference;

pub use reference::{IndirectReference, Location};

use crate::compression::{self, CompressionLevel};
use crate::error::Result;
use crate::objects::{
    DocumentId, IndirectRef, ObjectId, ObjectState, PdfArray, PdfDictionary, PdfName, PdfObject,
    PdfString, MAX_GENERATION,
};
use crate::writer::output::PdfOutputStream;
use crate::writer::xref_stream_writer::{XrefEntry, XrefStreamWriter, XREF_FIELD_WIDTHS};
use std::collections::BTreeSet;
use std::io::Write;
use tracing::{debug, trace};

const INITIAL_CAPACITY: usize = 32;

/// Keys that only make sense in a cross-reference stream dictionary.
const XREF_STREAM_ONLY_KEYS: [&str; 7] = [
    "W", "Index", "Type", "Length", "Filter", "DecodeParms", "XRefStm",
];

/// Everything the trailer needs besides the table itself.
#[derive(Debug)]
pub struct TrailerInfo<'a> {
    /// Base trailer; `Root` and `Info` are taken from it
    pub trailer: &'a PdfDictionary,
    /// The two halves of `/ID`
    pub file_id: (&'a [u8], &'a [u8]),
    pub encrypt: Option<IndirectRef>,
    /// `startxref` of the file being updated
    pub previous: Option<u64>,
    pub append_mode: bool,
    pub full_compression: bool,
    pub compression: CompressionLevel,
}

/// Array-backed table indexed by object number. Slot 0 is reserved as the
/// head of the free list.
#[derive(Debug)]
pub struct XrefTable {
    entries: Vec<Option<IndirectReference>>,
    count: u32,
    free: BTreeSet<u32>,
    document: DocumentId,
}

impl XrefTable {
    pub fn new(document: DocumentId) -> Self {
        let mut head = IndirectReference::new(ObjectId::new(0, MAX_GENERATION), document);
        head.set_state(ObjectState::FREE);
        let mut entries = vec![None; INITIAL_CAPACITY];
        entries[0] = Some(head);
        Self {
            entries,
            count: 0,
            free: BTreeSet::new(),
            document,
        }
    }

    pub fn document(&self) -> DocumentId {
        self.document
    }

    /// Highest assigned object number plus one.
    pub fn size(&self) -> u32 {
        self.count + 1
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Registers `reference` at its object number slot, replacing any
    /// previous entry.
    pub fn add(&mut self, reference: IndirectReference) -> IndirectRef {
        let number = reference.number();
        self.ensure_capacity(number as usize);
        if number > self.count {
            self.count = number;
        }
        let handle = reference.reference();
        if reference.is_free() && reference.generation() < MAX_GENERATION && number != 0 {
            self.free.insert(number);
        } else {
            self.free.remove(&number);
        }
        self.entries[number as usize] = Some(reference);
        handle
    }

    fn ensure_capacity(&mut self, index: usize) {
        if index >= self.entries.len() {
            let mut capacity = self.entries.len().max(1);
            while capacity <= index {
                capacity *= 2;
            }
            self.entries.resize(capacity, None);
        }
    }

    pub fn get(&self, number: u32) -> Option<&IndirectReference> {
        self.entries.get(number as usize).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, number: u32) -> Option<&mut IndirectReference> {
        self.entries.get_mut(number as usize).and_then(Option::as_mut)
    }

    /// Entry for `reference` when number and generation both match.
    pub fn lookup(&self, reference: IndirectRef) -> Option<&IndirectReference> {
        self.get(reference.number())
            .filter(|e| e.generation() == reference.generation())
    }

    pub fn lookup_mut(&mut self, reference: IndirectRef) -> Option<&mut IndirectReference> {
        self.get_mut(reference.number())
            .filter(|e| e.generation() == reference.generation())
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndirectReference> {
        self.entries.iter().flatten()
    }

    /// Object numbers currently available for reuse, lowest first.
    pub fn free_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.free.iter().copied()
    }

    /// Hands out the lowest free object number, or `size()` when none is
    /// free. The returned reference is marked `MODIFIED`.
    pub fn create_next_indirect_reference(&mut self) -> IndirectRef {
        if let Some(number) = self.free.pop_first() {
            if let Some(entry) = self.get_mut(number) {
                trace!(number, "reusing free object number");
                entry.set_offset(0);
                entry.clear_state(
                    ObjectState::FREE | ObjectState::FLUSHED | ObjectState::READ_ONLY,
                );
                entry.set_state(ObjectState::MODIFIED);
                return entry.reference();
            }
        }
        self.create_fresh_reference()
    }

    /// Appends a new object number past the end of the table, leaving the
    /// free set untouched.
    fn create_fresh_reference(&mut self) -> IndirectRef {
        let mut fresh = IndirectReference::new(ObjectId::new(self.count + 1, 0), self.document);
        fresh.set_state(ObjectState::MODIFIED);
        self.add(fresh)
    }

    /// Marks the entry free and returns its detached object, if it had one
    /// that was never flushed. Numbers whose generation reached the maximum
    /// are retired instead of being offered for reuse.
    pub fn free_reference(&mut self, number: u32) -> Option<PdfObject> {
        if number == 0 {
            return None;
        }
        let entry = self.get_mut(number)?;
        entry.set_state(ObjectState::FREE | ObjectState::MODIFIED);
        entry.clear_state(ObjectState::MUST_BE_FLUSHED);
        entry.set_offset(0);
        let detached = if entry.is_flushed() {
            None
        } else {
            entry.take_object()
        };
        let retired = entry.generation() >= MAX_GENERATION;
        if retired {
            self.free.remove(&number);
        } else {
            self.free.insert(number);
        }
        detached
    }

    /// Whether the entry for `number` takes part in the next xref section.
    fn is_present(&self, number: u32, append_mode: bool) -> bool {
        let Some(entry) = self.get(number) else {
            return false;
        };
        if append_mode {
            entry.check_state(ObjectState::MODIFIED)
        } else if entry.is_free() {
            entry.generation() > 0
        } else {
            entry.is_flushed()
        }
    }

    /// Runs of present entries as `(first, length)` pairs.
    pub fn create_sections(&self, append_mode: bool) -> Vec<(u32, u32)> {
        compute_sections(self.size(), |n| self.is_present(n, append_mode))
    }

    fn entry_for(&self, number: u32, next_free: &dyn Fn(u32) -> u32) -> XrefEntry {
        match self.get(number) {
            Some(entry) if entry.is_free() => XrefEntry::Free {
                next_free: next_free(number),
                generation: entry.generation(),
            },
            Some(entry) => match entry.location() {
                Location::Offset(offset) => XrefEntry::InUse {
                    offset,
                    generation: entry.generation(),
                },
                Location::Compressed { stream, index } => XrefEntry::Compressed { stream, index },
            },
            None => XrefEntry::Free {
                next_free: 0,
                generation: 0,
            },
        }
    }

    /// Bumps the generation of entries freed during this session so a later
    /// reuse in the same file lineage does not alias the old object.
    fn advance_freed_generations(&mut self) {
        let mut retired = Vec::new();
        for entry in self.entries.iter_mut().flatten() {
            if entry.number() == 0
                || !entry.is_free()
                || !entry.check_state(ObjectState::MODIFIED)
                || entry.generation() >= MAX_GENERATION
            {
                continue;
            }
            let generation = entry.generation() + 1;
            entry.set_generation(generation);
            if generation == MAX_GENERATION {
                retired.push(entry.number());
            }
        }
        for number in retired {
            self.free.remove(&number);
        }
    }

    /// Writes the cross-reference section and trailer and returns the
    /// offset it starts at. Returns `None` without writing anything when an
    /// incremental update has no changed entries.
    pub fn write_xref_table_and_trailer<W: Write>(
        &mut self,
        out: &mut PdfOutputStream<W>,
        info: TrailerInfo<'_>,
    ) -> Result<Option<u64>> {
        if info.append_mode {
            if self.create_sections(true).is_empty() {
                debug!("nothing changed, skipping incremental xref section");
                return Ok(None);
            }
            self.advance_freed_generations();
        }

        let start = out.position();
        // The xref stream never takes a freed number: that entry has to stay
        // free in this very section.
        let xref_stream = if info.full_compression {
            let reference = self.create_fresh_reference();
            if let Some(entry) = self.lookup_mut(reference) {
                entry.set_offset(start);
                entry.set_state(ObjectState::FLUSHED);
            }
            Some(reference)
        } else {
            None
        };

        let sections = self.create_sections(info.append_mode);
        let present_free: Vec<u32> = sections
            .iter()
            .flat_map(|&(first, len)| first..first + len)
            .filter(|&n| n != 0 && self.get(n).is_some_and(IndirectReference::is_free))
            .collect();
        let next_free = |number: u32| -> u32 {
            let after = present_free.partition_point(|&n| n <= number);
            present_free.get(after).copied().unwrap_or(0)
        };

        let rows: Vec<(u32, u32, Vec<XrefEntry>)> = sections
            .iter()
            .map(|&(first, len)| {
                let entries = (first..first + len)
                    .map(|number| self.entry_for(number, &next_free))
                    .collect();
                (first, len, entries)
            })
            .collect();
        debug!(
            sections = sections.len(),
            stream = xref_stream.is_some(),
            "writing cross-reference section"
        );

        match xref_stream {
            Some(reference) => {
                let mut encoder = XrefStreamWriter::new();
                for entry in rows.iter().flat_map(|(_, _, entries)| entries) {
                    encoder.push(*entry);
                }
                let size = sections
                    .last()
                    .map(|&(first, len)| first + len)
                    .unwrap_or(1)
                    .max(self.size());
                let mut dict = self.trailer_dictionary(&info, size);
                dict.set("Type", PdfName::new("XRef"));
                dict.set(
                    "W",
                    XREF_FIELD_WIDTHS
                        .iter()
                        .map(|&w| PdfObject::from(w))
                        .collect::<PdfArray>(),
                );
                dict.set(
                    "Index",
                    sections
                        .iter()
                        .flat_map(|&(first, len)| [PdfObject::from(first), PdfObject::from(len)])
                        .collect::<PdfArray>(),
                );
                let mut data = encoder.encode_entries();
                if info.compression.is_enabled() {
                    data = compression::compress(&data, info.compression)?;
                    dict.set("Filter", PdfName::new("FlateDecode"));
                }
                dict.set("Length", data.len());

                out.set_current_object(None);
                out.write_object_header(reference.id())?;
                out.write_stream(&dict, &data)?;
                out.write_object_footer()?;
            }
            None => {
                out.write_bytes(b"xref\n")?;
                for (first, len, entries) in &rows {
                    out.write_str(&format!("{first} {len}\n"))?;
                    for entry in entries {
                        out.write_str(&XrefStreamWriter::classic_line(entry))?;
                    }
                }
                let mut dict = self.trailer_dictionary(&info, self.size());
                for key in XREF_STREAM_ONLY_KEYS {
                    dict.remove(key);
                }
                out.set_current_object(None);
                out.write_bytes(b"trailer\n")?;
                out.write_dictionary(&dict)?;
                out.write_bytes(b"\n")?;
            }
        }

        out.write_str(&format!("startxref\n{start}\n%%EOF\n"))?;
        Ok(Some(start))
    }

    fn trailer_dictionary(&self, info: &TrailerInfo<'_>, size: u32) -> PdfDictionary {
        let mut dict = info.trailer.clone();
        dict.remove("Prev");
        dict.remove("Encrypt");
        dict.set("Size", size);
        dict.set(
            "ID",
            vec![
                PdfObject::from(PdfString::hex(info.file_id.0.to_vec())),
                PdfObject::from(PdfString::hex(info.file_id.1.to_vec())),
            ],
        );
        if let Some(encrypt) = info.encrypt {
            dict.set("Encrypt", encrypt);
        }
        if info.append_mode {
            if let Some(previous) = info.previous {
                dict.set("Prev", previous as i64);
            }
        }
        dict
    }
}

/// Groups the present numbers below `size` into contiguous sections.
pub fn compute_sections(size: u32, present: impl Fn(u32) -> bool) -> Vec<(u32, u32)> {
    let mut sections = Vec::new();
    let mut first = 0;
    let mut len = 0;
    for number in 0..size {
        if present(number) {
            if len == 0 {
                first = number;
            }
            len += 1;
        } else if len > 0 {
            sections.push((first, len));
            len = 0;
        }
    }
    if len > 0 {
        sections.push((first, len));
    }
    sections
}

#[cfg(test)]
mod tests;
