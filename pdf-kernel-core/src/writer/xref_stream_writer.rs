//! Binary entry encoding for cross-reference streams (PDF 1.5+).

/// Field widths used for every cross-reference stream this crate writes:
/// entry type, offset or object stream number, generation or index.
pub const XREF_FIELD_WIDTHS: [usize; 3] = [1, 4, 2];

/// One row of a cross-reference section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrefEntry {
    /// Type 0: free object, linked to the next free number
    Free { next_free: u32, generation: u16 },
    /// Type 1: object at a byte offset
    InUse { offset: u64, generation: u16 },
    /// Type 2: object inside an object stream
    Compressed { stream: u32, index: u32 },
}

/// Accumulates entries in section order and encodes them.
#[derive(Debug, Default)]
pub struct XrefStreamWriter {
    entries: Vec<XrefEntry>,
}

impl XrefStreamWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: XrefEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn encode_entries(&self) -> Vec<u8> {
        let row = XREF_FIELD_WIDTHS.iter().sum::<usize>();
        let mut data = Vec::with_capacity(self.entries.len() * row);
        let [w0, w1, w2] = XREF_FIELD_WIDTHS;

        for entry in &self.entries {
            match *entry {
                XrefEntry::Free {
                    next_free,
                    generation,
                } => {
                    Self::write_field(&mut data, 0, w0);
                    Self::write_field(&mut data, next_free as u64, w1);
                    Self::write_field(&mut data, generation as u64, w2);
                }
                XrefEntry::InUse { offset, generation } => {
                    Self::write_field(&mut data, 1, w0);
                    Self::write_field(&mut data, offset, w1);
                    Self::write_field(&mut data, generation as u64, w2);
                }
                XrefEntry::Compressed { stream, index } => {
                    Self::write_field(&mut data, 2, w0);
                    Self::write_field(&mut data, stream as u64, w1);
                    Self::write_field(&mut data, index as u64, w2);
                }
            }
        }

        data
    }

    /// Big-endian, truncated to `width` bytes.
    fn write_field(data: &mut Vec<u8>, value: u64, width: usize) {
        for i in (0..width).rev() {
            data.push(((value >> (i * 8)) & 0xFF) as u8);
        }
    }

    /// Classic table line for `entry`: `oooooooooo ggggg n \n`.
    pub fn classic_line(entry: &XrefEntry) -> String {
        match *entry {
            XrefEntry::Free {
                next_free,
                generation,
            } => format!("{next_free:010} {generation:05} f \n"),
            XrefEntry::InUse { offset, generation } => format!("{offset:010} {generation:05} n \n"),
            // Classic tables cannot address object streams.
            XrefEntry::Compressed { .. } => format!("{:010} {:05} f \n", 0, 0),
        }
    }
}
