// Completrie -- In-memory prefix-and-substring autocompletion index
// Copyright 2026 The Completrie Authors

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

//! The trie/hash hybrid index (component C).
//!
//! Grounded in `original_source/trie.c` and `trie.h`. The original tags a
//! child pointer's low bit to distinguish a trie node from a hash node,
//! exploiting pointer alignment; that's an optimization, not a contract, so
//! a tagged enum is the substitute in a language without pointer
//! bit-stealing. `Child` below is that enum.
//!
//! Hash-node splitting has no counterpart in `original_source/trie.c`,
//! where it is left as a `/* HUGE TODO: split */` comment; it is
//! implemented here, with the threshold check made after the triggering
//! insert completes rather than before it (see DESIGN.md).

use crate::config::IndexConfig;
use crate::dline::{Dline, RemoveState, UpsertMode, UpsertState};
use crate::error::{Error, Result};

/// Number of buckets in a hash node (`NUM_BUCKETS` in
/// `original_source/trie.h`). Kept as a fixed constant rather than a
/// configuration field.
pub const NUM_BUCKETS: usize = 64;

/// A trie child slot: either absent, a nested trie node, or a hash node.
pub(crate) enum Child {
    Trie(Box<TrieNode>),
    Hash(Box<HashNode>),
}

/// A 256-way byte-indexed node. Holds the dline of entries whose suffix is
/// empty at this node (i.e. terminates here), plus one child slot per
/// possible next byte.
pub(crate) struct TrieNode {
    terminated: Option<Dline>,
    children: Box<[Option<Child>; 256]>,
}

/// A fixed-width array of dline buckets, indexed by `hash(next byte) mod B`.
pub(crate) struct HashNode {
    buckets: Box<[Option<Dline>; NUM_BUCKETS]>,
    size: usize,
}

#[inline]
fn hash_bucket(normalized: &[u8], pos: usize) -> usize {
    // Suffixes that are exhausted exactly at this node use bucket 0 by
    // convention.
    match normalized.get(pos) {
        Some(&byte) => (byte as usize) % NUM_BUCKETS,
        None => 0,
    }
}

impl TrieNode {
    /// This node's terminating dline, if any (used by [`crate::stats`]).
    pub(crate) fn terminated_dline(&self) -> Option<&Dline> {
        self.terminated.as_ref()
    }

    /// This node's 256 child slots, in byte order (used by
    /// [`crate::stats`]).
    pub(crate) fn children_slice(&self) -> &[Option<Child>] {
        &self.children[..]
    }

    pub fn new() -> TrieNode {
        TrieNode {
            terminated: None,
            children: Box::new(std::array::from_fn(|_| None)),
        }
    }

    /// Build a trie prefix covering `[low, high]` at every level up to
    /// `depth` levels deep. Used at construction to avoid hot-path
    /// hash-to-trie splits during bulk load of a known byte range (e.g.
    /// printable ASCII).
    pub fn presplit(low: u8, high: u8, depth: u32) -> TrieNode {
        let mut node = TrieNode::new();
        if depth > 0 {
            for byte in low..=high {
                let child = TrieNode::presplit(low, high, depth - 1);
                node.children[byte as usize] = Some(Child::Trie(Box::new(child)));
                if byte == u8::MAX {
                    break;
                }
            }
        }
        node
    }

    /// `pos` is the current descent position (drives which byte selects the
    /// next child); `suffix_start` is the offset this suffix began at and is
    /// threaded through unchanged, becoming the stored `Entry::offset`.
    pub fn upsert(
        &mut self,
        full: &[u8],
        normalized: &[u8],
        pos: usize,
        suffix_start: usize,
        score: u32,
        state: &mut UpsertState,
        config: &IndexConfig,
    ) {
        if pos == normalized.len() {
            let new_dline =
                Dline::upsert(self.terminated.as_ref(), full, normalized, suffix_start, score, state);
            self.terminated = Some(new_dline);
            return;
        }

        let byte = normalized[pos] as usize;
        match self.children[byte].take() {
            None => {
                let mut hash = HashNode::new();
                hash.upsert(full, normalized, pos + 1, suffix_start, score, state);
                self.children[byte] = Some(maybe_split(hash, pos + 1, config));
            }
            Some(Child::Trie(mut child)) => {
                child.upsert(full, normalized, pos + 1, suffix_start, score, state, config);
                self.children[byte] = Some(Child::Trie(child));
            }
            Some(Child::Hash(mut hash)) => {
                hash.upsert(full, normalized, pos + 1, suffix_start, score, state);
                self.children[byte] = Some(maybe_split(*hash, pos + 1, config));
            }
        }
    }

    pub fn remove(
        &mut self,
        normalized: &[u8],
        pos: usize,
        suffix_start: usize,
        state: &mut RemoveState,
    ) -> Result<()> {
        if pos == normalized.len() {
            let new_dline = Dline::remove(self.terminated.as_ref(), normalized, suffix_start, state)?;
            self.terminated = new_dline;
            return Ok(());
        }

        let byte = normalized[pos] as usize;
        match &mut self.children[byte] {
            None => Err(Error::NotFound),
            Some(Child::Trie(child)) => child.remove(normalized, pos + 1, suffix_start, state),
            Some(Child::Hash(hash)) => hash.remove(normalized, pos + 1, suffix_start, state),
        }
    }

    /// Harvest matching entries under this node into the running top-K
    /// accumulator `acc`, tightening `min_score` as `acc` fills. Visits the
    /// terminating dline, then each present child in byte order, folding
    /// every scan into `acc` in turn.
    pub fn harvest(
        &self,
        query_suffix: &[u8],
        cap: usize,
        acc: &mut Vec<crate::dline::Entry>,
        min_score: &mut u32,
    ) {
        debug_assert!(query_suffix.is_empty());
        if let Some(dline) = &self.terminated {
            let mut fresh = Vec::new();
            dline.search(query_suffix, 0, *min_score, cap, &mut fresh);
            *acc = crate::merge::fold_into(std::mem::take(acc), &fresh, cap);
            *min_score = crate::merge::min_score(acc, cap);
        }
        for child in self.children.iter() {
            match child {
                None => {}
                Some(Child::Trie(node)) => node.harvest(query_suffix, cap, acc, min_score),
                Some(Child::Hash(hash)) => hash.harvest_all(cap, acc, min_score),
            }
        }
    }

    /// Descend by the bytes of `query_suffix`, for as long as children are
    /// trie nodes with matching children. Returns the frontier: `None` if
    /// descent hit an absent child, the node+remaining-query-bytes if
    /// descent exhausted the query while still inside the trie, or
    /// delegates to a hash node if one is reached first.
    pub fn descend<'a>(&'a self, query_suffix: &'a [u8]) -> Frontier<'a> {
        if query_suffix.is_empty() {
            return Frontier::Trie(self, query_suffix);
        }
        match self.children[query_suffix[0] as usize].as_ref() {
            None => Frontier::Absent,
            Some(Child::Trie(child)) => child.descend(&query_suffix[1..]),
            Some(Child::Hash(hash)) => Frontier::Hash(hash, &query_suffix[1..]),
        }
    }
}

/// Where trie descent for a search stopped.
pub(crate) enum Frontier<'a> {
    /// No entry anywhere below here can match; search should return empty.
    Absent,
    /// Stopped inside the trie, with `query_suffix` fully consumed.
    Trie(&'a TrieNode, &'a [u8]),
    /// Stopped at a hash node, with `query_suffix` possibly non-empty.
    Hash(&'a HashNode, &'a [u8]),
}

impl HashNode {
    /// This node's buckets, in index order (used by [`crate::stats`]).
    pub(crate) fn buckets_slice(&self) -> &[Option<Dline>] {
        &self.buckets[..]
    }

    pub fn new() -> HashNode {
        HashNode { buckets: Box::new(std::array::from_fn(|_| None)), size: 0 }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// `pos` selects the bucket (by the byte at that position); `suffix_start`
    /// is stored as the entry's offset, same distinction as
    /// [`TrieNode::upsert`].
    pub fn upsert(
        &mut self,
        full: &[u8],
        normalized: &[u8],
        pos: usize,
        suffix_start: usize,
        score: u32,
        state: &mut UpsertState,
    ) {
        let idx = hash_bucket(normalized, pos);
        let old_len = self.buckets[idx].as_ref().map(Dline::len).unwrap_or(0);
        let new_dline =
            Dline::upsert(self.buckets[idx].as_ref(), full, normalized, suffix_start, score, state);
        let new_len = new_dline.len();
        self.size += new_len - old_len;
        self.buckets[idx] = Some(new_dline);
    }

    pub fn remove(
        &mut self,
        normalized: &[u8],
        pos: usize,
        suffix_start: usize,
        state: &mut RemoveState,
    ) -> Result<()> {
        let idx = hash_bucket(normalized, pos);
        let new_dline = Dline::remove(self.buckets[idx].as_ref(), normalized, suffix_start, state)?;
        self.size -= 1;
        self.buckets[idx] = new_dline;
        Ok(())
    }

    /// Harvest from every bucket (used when the query is exhausted exactly
    /// at a hash node: all buckets are candidates).
    pub fn harvest_all(&self, cap: usize, acc: &mut Vec<crate::dline::Entry>, min_score: &mut u32) {
        for bucket in self.buckets.iter() {
            if let Some(dline) = bucket {
                let mut fresh = Vec::new();
                dline.search(&[], 0, *min_score, cap, &mut fresh);
                *acc = crate::merge::fold_into(std::mem::take(acc), &fresh, cap);
                *min_score = crate::merge::min_score(acc, cap);
            }
        }
    }

    /// Harvest only the one bucket that can contain matches for
    /// `query_suffix` (used when the query still has remaining bytes).
    /// `depth` is how many bytes of descent it took to reach this node,
    /// passed through to [`Dline::search`] to align the comparison.
    pub fn harvest_one(
        &self,
        query_suffix: &[u8],
        depth: usize,
        cap: usize,
        acc: &mut Vec<crate::dline::Entry>,
        min_score: &mut u32,
    ) {
        let idx = hash_bucket(query_suffix, 0);
        if let Some(dline) = &self.buckets[idx] {
            let mut fresh = Vec::new();
            dline.search(query_suffix, depth, *min_score, cap, &mut fresh);
            *acc = crate::merge::fold_into(std::mem::take(acc), &fresh, cap);
            *min_score = crate::merge::min_score(acc, cap);
        }
    }

    /// Re-upsert every entry of this hash node into a fresh trie node at
    /// depth `pos`, used by `maybe_split`. Every re-insert is primed with
    /// `UpsertMode::Insert` and the entry's existing global record, so no
    /// new global record is created.
    fn split_into_trie(&self, pos: usize, config: &IndexConfig) -> TrieNode {
        let mut node = TrieNode::new();
        for bucket in self.buckets.iter() {
            if let Some(dline) = bucket {
                dline.iterate(|entry| {
                    let mut state = UpsertState {
                        mode: UpsertMode::Insert,
                        global: Some(entry.global.clone()),
                        old_score: None,
                    };
                    node.upsert(
                        entry.global.full_bytes(),
                        entry.global.normalized_bytes(),
                        pos,
                        entry.offset as usize,
                        entry.score,
                        &mut state,
                        config,
                    );
                });
            }
        }
        node
    }
}

/// If `hash`'s size has reached the configured split threshold, replace it
/// with an equivalent trie node; otherwise keep it as a hash node. `pos` is
/// the depth `hash` sits at in its parent trie, supplied by the caller since
/// it is already known there.
fn maybe_split(hash: HashNode, pos: usize, config: &IndexConfig) -> Child {
    if hash.size() < config.hash_split_threshold {
        return Child::Hash(Box::new(hash));
    }

    Child::Trie(Box::new(hash.split_into_trie(pos, config)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::IndexConfig;

    fn upsert(node: &mut TrieNode, config: &IndexConfig, s: &str, score: u32) {
        let normalized = crate::parser::normalize(s.as_bytes());
        let mut state = UpsertState::new();
        node.upsert(s.as_bytes(), &normalized, 0, 0, score, &mut state, config);
    }

    fn harvest(node: &TrieNode, query: &str, cap: usize) -> Vec<(String, u32)> {
        let normalized = crate::parser::normalize(query.as_bytes());
        crate::merge::search(node, &normalized, cap)
            .iter()
            .map(|e| (String::from_utf8_lossy(e.global.full_bytes()).into_owned(), e.score))
            .collect()
    }

    #[test]
    fn upsert_and_harvest_round_trips() {
        let config = IndexConfig::default();
        let mut root = TrieNode::new();
        upsert(&mut root, &config, "hello", 10);
        upsert(&mut root, &config, "help", 20);

        let mut results = harvest(&root, "hel", 10);
        results.sort_by(|a, b| b.1.cmp(&a.1));
        assert_eq!(results, vec![("help".to_string(), 20), ("hello".to_string(), 10)]);
    }

    #[test]
    fn absent_prefix_yields_nothing() {
        let config = IndexConfig::default();
        let mut root = TrieNode::new();
        upsert(&mut root, &config, "hello", 10);
        assert!(harvest(&root, "zzz", 10).is_empty());
    }

    #[test]
    fn hash_node_splits_once_threshold_is_reached() {
        let mut config = IndexConfig::default();
        config.hash_split_threshold = 4;
        let mut root = TrieNode::new();

        for i in 0..8u32 {
            let word = format!("zzz{}", i);
            upsert(&mut root, &config, &word, i);
        }

        match root.descend(b"zzz") {
            Frontier::Trie(_, _) => {}
            _ => panic!("expected the zzz subtree to have split into a trie node"),
        }

        let mut results = harvest(&root, "zzz", 100);
        results.sort_by(|a, b| b.1.cmp(&a.1));
        assert_eq!(results.len(), 8);
        assert_eq!(results[0].1, 7);
    }

    #[test]
    fn remove_deletes_an_entry() {
        let config = IndexConfig::default();
        let mut root = TrieNode::new();
        upsert(&mut root, &config, "hello", 10);
        upsert(&mut root, &config, "help", 20);

        let normalized = crate::parser::normalize(b"hello");
        let mut state = RemoveState::default();
        root.remove(&normalized, 0, 0, &mut state).unwrap();

        let results = harvest(&root, "hel", 10);
        assert_eq!(results, vec![("help".to_string(), 20)]);
    }

    #[test]
    fn remove_missing_is_not_found() {
        let config = IndexConfig::default();
        let mut root = TrieNode::new();
        upsert(&mut root, &config, "hello", 10);

        let normalized = crate::parser::normalize(b"bye");
        let mut state = RemoveState::default();
        assert_eq!(root.remove(&normalized, 0, 0, &mut state), Err(Error::NotFound));
    }
}
