// Completrie -- In-memory prefix-and-substring autocompletion index
// Copyright 2026 The Completrie Authors

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

//! Token-boundary parser (component D).
//!
//! Identifies the offsets in a normalized string at which to begin
//! suffix-indexing, so that a prefix query on any of those suffixes matches
//! the string at that token boundary. Grounded in
//! `original_source/parse.c`'s `next_start`/`normalize`, generalized from the
//! fixed ASCII-only byte classes there to two configurable `ByteSet`s.

/// A set of bytes, represented as a 256-bit bitmap.
///
/// This mirrors `original_source/parse.c`'s `bit_map_init`/`in_map`, which
/// packs a `char*` of characters into a 32-byte bitmap for O(1) membership
/// tests; we use four `u64` words instead of 32 `u8`s for the same effect.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ByteSet([u64; 4]);

impl ByteSet {
    /// The empty set.
    pub const fn empty() -> ByteSet {
        ByteSet([0; 4])
    }

    /// Build a set from an iterator of bytes.
    pub fn from_bytes<I: IntoIterator<Item = u8>>(bytes: I) -> ByteSet {
        let mut set = ByteSet::empty();
        for b in bytes {
            set.insert(b);
        }
        set
    }

    #[inline]
    pub fn insert(&mut self, byte: u8) {
        let word = (byte >> 6) as usize;
        let bit = byte & 0x3f;
        self.0[word] |= 1u64 << bit;
    }

    #[inline]
    pub fn contains(&self, byte: u8) -> bool {
        let word = (byte >> 6) as usize;
        let bit = byte & 0x3f;
        (self.0[word] >> bit) & 1 == 1
    }
}

/// Immutable parser configuration: the start-set and middle-set byte
/// classes.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    start_set: ByteSet,
    middle_set: ByteSet,
}

impl ParserConfig {
    pub fn new(start_set: ByteSet, middle_set: ByteSet) -> ParserConfig {
        ParserConfig { start_set, middle_set }
    }

    /// A parser that treats ASCII whitespace as the only word separator and
    /// has no unconditional start characters.
    pub fn whitespace_separated() -> ParserConfig {
        ParserConfig {
            start_set: ByteSet::empty(),
            middle_set: ByteSet::from_bytes(b" \t\n\r".iter().copied()),
        }
    }

    /// Find the offset of the next suffix start in `normalized`, scanning
    /// forward from `prev + 1` (or from the beginning, in "preceded by a
    /// middle byte" mode, when `prev` is `None`).
    ///
    /// Returns `None` when no further starts exist.
    pub fn next_start(&self, normalized: &[u8], prev: Option<usize>) -> Option<usize> {
        let token_start = match prev {
            None => 0,
            Some(p) => p + 1,
        };
        let mut prev_middle = prev.is_none();

        for (offset, &byte) in normalized.iter().enumerate().skip(token_start) {
            let is_middle = self.middle_set.contains(byte);
            if (prev_middle && !is_middle) || self.start_set.contains(byte) {
                return Some(offset);
            }
            prev_middle = is_middle;
        }

        None
    }
}

/// ASCII case-fold `input` into a same-length lowercase buffer.
///
/// Unicode-aware normalization is out of scope for the core; a caller that
/// needs it can normalize before calling `Index::upsert`, as
/// long as the replacement preserves the byte length of its input, since the
/// suffix offsets that `next_start` yields are computed against this output.
pub fn normalize(input: &[u8]) -> Vec<u8> {
    input.iter().map(|b| b.to_ascii_lowercase()).collect()
}

#[cfg(test)]
mod test {
    use super::{normalize, ByteSet, ParserConfig};

    #[test]
    fn byte_set_contains_inserted_bytes_only() {
        let set = ByteSet::from_bytes(b"ab".iter().copied());
        assert!(set.contains(b'a'));
        assert!(set.contains(b'b'));
        assert!(!set.contains(b'c'));
        assert!(!set.contains(0));
        assert!(!set.contains(255));
    }

    #[test]
    fn normalize_lowercases_without_changing_length() {
        let out = normalize(b"Hello World!");
        assert_eq!(out, b"hello world!");
        assert_eq!(out.len(), 12);
    }

    #[test]
    fn next_start_begins_at_zero_for_non_middle_leading_byte() {
        let parser = ParserConfig::whitespace_separated();
        let n = normalize(b"hello world");
        assert_eq!(parser.next_start(&n, None), Some(0));
    }

    #[test]
    fn next_start_skips_leading_middle_bytes() {
        let parser = ParserConfig::whitespace_separated();
        let n = normalize(b"  hello");
        assert_eq!(parser.next_start(&n, None), Some(2));
    }

    #[test]
    fn next_start_finds_word_boundaries() {
        let parser = ParserConfig::whitespace_separated();
        let n = normalize(b"hello world");
        let first = parser.next_start(&n, None);
        assert_eq!(first, Some(0));
        let second = parser.next_start(&n, first);
        assert_eq!(second, Some(6));
        let third = parser.next_start(&n, second);
        assert_eq!(third, None);
    }

    #[test]
    fn next_start_exhausts_on_trailing_whitespace() {
        let parser = ParserConfig::whitespace_separated();
        let n = normalize(b"hi  ");
        let first = parser.next_start(&n, None);
        assert_eq!(first, Some(0));
        assert_eq!(parser.next_start(&n, first), None);
    }

    #[test]
    fn start_set_forces_a_new_suffix_mid_token() {
        // Digits always start a new suffix, even mid-"token" under a
        // middle-set that does not treat letters and digits as separators.
        let digits = ByteSet::from_bytes(b"0123456789".iter().copied());
        let parser = ParserConfig::new(digits, ByteSet::empty());
        let n = normalize(b"track42");
        let first = parser.next_start(&n, None);
        assert_eq!(first, Some(0));
        let second = parser.next_start(&n, first);
        assert_eq!(second, Some(5));
    }
}
