//! UTF-16 offset indexing over Rust strings.
//!
//! Annotation offsets come from the browser, which counts UTF-16 code units.
//! `Utf16Index` converts those offsets to byte positions so the rest of the
//! engine can slice `&str` safely.

use std::ops::Range;

/// UTF-16 length of a string.
pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Lookup table from UTF-16 unit offsets to byte offsets.
#[derive(Clone, Debug)]
pub struct Utf16Index<'a> {
    text: &'a str,
    /// `bytes[u]` is the byte offset of unit boundary `u`, for `u` in
    /// `0..=len_utf16`. A unit offset that falls inside a surrogate pair maps
    /// forward to the next char boundary.
    bytes: Vec<usize>,
}

impl<'a> Utf16Index<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut bytes = Vec::with_capacity(text.len() + 1);
        for (byte, ch) in text.char_indices() {
            bytes.push(byte);
            if ch.len_utf16() == 2 {
                bytes.push(byte + ch.len_utf8());
            }
        }
        bytes.push(text.len());
        Self { text, bytes }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn len_utf16(&self) -> usize {
        self.bytes.len() - 1
    }

    /// Byte offset for a unit offset, clamped to the end of the text.
    pub fn byte_at(&self, unit: usize) -> usize {
        self.bytes[unit.min(self.len_utf16())]
    }

    /// Slice by UTF-16 range. Out-of-range bounds are clamped.
    pub fn slice(&self, range: Range<usize>) -> &'a str {
        let start = self.byte_at(range.start);
        let end = self.byte_at(range.end).max(start);
        &self.text[start..end]
    }

    /// Unit offset of a byte offset that lies on a char boundary.
    pub fn unit_at_byte(&self, byte: usize) -> usize {
        // Surrogate midpoints share a byte offset with the following char, so
        // take the last unit at or before `byte`.
        self.bytes
            .partition_point(|&b| b <= byte)
            .saturating_sub(1)
    }

    /// All UTF-16 start offsets where `needle` occurs.
    pub fn find_all(&self, needle: &str) -> Vec<usize> {
        if needle.is_empty() {
            return Vec::new();
        }
        self.text
            .match_indices(needle)
            .map(|(byte, _)| self.unit_at_byte(byte))
            .collect()
    }
}
