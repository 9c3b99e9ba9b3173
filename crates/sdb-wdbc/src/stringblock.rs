//! String block reading and interning

use crate::Result;
use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom};

/// A materialized view of a WDBC string block
///
/// Offset 0 is always the empty string. Offsets outside the block decode
/// to the empty string rather than erroring, matching how the client
/// itself treats a dangling string reference as harmless.
#[derive(Debug, Clone, Default)]
pub struct StringBlock {
    data: Vec<u8>,
}

impl StringBlock {
    /// Parse a string block of `size` bytes starting at `offset`
    pub fn parse<R: Read + Seek>(reader: &mut R, offset: u64, size: u32) -> Result<Self> {
        reader.seek(SeekFrom::Start(offset))?;
        let mut data = vec![0u8; size as usize];
        reader.read_exact(&mut data)?;
        Ok(Self { data })
    }

    /// Wrap raw string block bytes directly
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Resolve a byte offset to its NUL-terminated string
    ///
    /// Returns `""` for offset 0 or any offset that falls outside the
    /// block, rather than failing the whole record.
    pub fn get(&self, offset: u32) -> &str {
        let offset = offset as usize;
        if offset >= self.data.len() {
            return "";
        }

        let mut end = offset;
        while end < self.data.len() && self.data[end] != 0 {
            end += 1;
        }

        std::str::from_utf8(&self.data[offset..end]).unwrap_or("")
    }

    /// Raw bytes of the block
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Size of the block in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the block is empty (never true for a valid WDBC file; it
    /// always carries at least the leading NUL)
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Interns strings while building a new string block for the writer
///
/// The empty string is always interned first at offset 0; later
/// insertions of an already-seen value collapse to the existing offset.
#[derive(Debug, Default)]
pub struct StringInterner {
    data: Vec<u8>,
    offsets: HashMap<String, u32>,
}

impl StringInterner {
    /// Create an interner pre-seeded with the leading NUL at offset 0
    pub fn new() -> Self {
        let mut interner = Self {
            data: vec![0u8],
            offsets: HashMap::new(),
        };
        interner.offsets.insert(String::new(), 0);
        interner
    }

    /// Intern `value`, returning its byte offset in the eventual block
    pub fn intern(&mut self, value: &str) -> u32 {
        if value.is_empty() {
            return 0;
        }

        if let Some(offset) = self.offsets.get(value) {
            return *offset;
        }

        let offset = self.data.len() as u32;
        self.data.extend_from_slice(value.as_bytes());
        self.data.push(0);
        self.offsets.insert(value.to_string(), offset);
        offset
    }

    /// Consume the interner, returning the finished string block bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_offset_is_always_empty_string() {
        let block = StringBlock::from_bytes(vec![0]);
        assert_eq!(block.get(0), "");
    }

    #[test]
    fn out_of_range_offset_decodes_to_empty_string() {
        let block = StringBlock::from_bytes(vec![0, b'a', b'b', 0]);
        assert_eq!(block.get(999), "");
    }

    #[test]
    fn reads_nul_terminated_string() {
        let block = StringBlock::from_bytes(vec![0, b'h', b'i', 0]);
        assert_eq!(block.get(1), "hi");
    }

    #[test]
    fn interner_collapses_duplicates() {
        let mut interner = StringInterner::new();
        let a = interner.intern("fireball");
        let b = interner.intern("fireball");
        let empty = interner.intern("");
        assert_eq!(a, b);
        assert_eq!(empty, 0);
        assert_ne!(a, 0);
    }

    #[test]
    fn interner_first_string_is_empty_at_offset_zero() {
        let interner = StringInterner::new();
        assert_eq!(interner.into_bytes(), vec![0]);
    }
}
