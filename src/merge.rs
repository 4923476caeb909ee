// Completrie -- In-memory prefix-and-substring autocompletion index
// Copyright 2026 The Completrie Authors

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

//! Top-K merge over sorted entry streams (component E, the merge half).
//!
//! Grounded in `search.rs`'s `IndexIter`/`Union`: a `BinaryHeap` of cursors
//! into each stream, ordered in reverse so the heap behaves as a min-heap
//! over the streams' natural descending order, popped one winner at a time.
//! That file merges exactly two ranges; here the same cursor-in-a-heap shape
//! is generalized to however many streams a harvest step produces (a
//! terminating dline plus zero or more child subtrees), since the trie
//! harvest in `trie.rs` folds in one stream at a time rather than collecting
//! them all up front.

use std::cmp;
use std::collections::BinaryHeap;

use crate::dline::Entry;
use crate::global_record;
use crate::trie::{Frontier, TrieNode};

/// A read-only cursor over one sorted `Entry` slice, ordered by the same
/// `(score, global-ref, suffix-length)` composite key the slice is already
/// sorted by, so the heap pops the correct entry on a cross-stream tie.
struct Cursor<'a> {
    entries: &'a [Entry],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(entries: &'a [Entry]) -> Option<Cursor<'a>> {
        if entries.is_empty() {
            None
        } else {
            Some(Cursor { entries, pos: 0 })
        }
    }

    fn peek(&self) -> &Entry {
        &self.entries[self.pos]
    }

    /// Advance past the current head, returning `None` if the stream is now
    /// exhausted.
    fn advance(mut self) -> Option<Cursor<'a>> {
        self.pos += 1;
        if self.pos < self.entries.len() {
            Some(self)
        } else {
            None
        }
    }

    fn key(&self) -> (u32, usize, u32) {
        let e = self.peek();
        (e.score, global_record::identity(&e.global), e.suffix_len())
    }
}

// BinaryHeap is a max-heap, so this pops the stream whose head is largest
// under the composite key -- i.e. the entry that should come out next.
impl<'a> cmp::Ord for Cursor<'a> {
    fn cmp(&self, other: &Cursor<'a>) -> cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

impl<'a> cmp::PartialOrd for Cursor<'a> {
    fn partial_cmp(&self, other: &Cursor<'a>) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<'a> cmp::PartialEq for Cursor<'a> {
    fn eq(&self, other: &Cursor<'a>) -> bool {
        self.key() == other.key()
    }
}

impl<'a> cmp::Eq for Cursor<'a> {}

/// Merge `streams`, each already sorted by `(score DESC, global-ref DESC,
/// suffix-length DESC)`, into a single stream with the same ordering,
/// capped at `cap` entries.
///
/// Entries sharing `(score, global-ref)` across streams are two suffix
/// occurrences of the same record; only one is kept, preferring the longer
/// suffix (the one that starts earliest in the record). Because every
/// stream is already sorted with suffix-length as the tie-break, the heap
/// naturally pops the longest-suffix member of a tied group first.
pub(crate) fn merge(streams: &[&[Entry]], cap: usize) -> Vec<Entry> {
    let mut heap: BinaryHeap<Cursor> = streams.iter().filter_map(|s| Cursor::new(s)).collect();

    let mut out = Vec::with_capacity(cap.min(16));
    let mut last_key: Option<(u32, usize)> = None;

    while out.len() < cap {
        let cursor = match heap.pop() {
            Some(c) => c,
            None => break,
        };
        let entry = cursor.peek().clone();
        if let Some(advanced) = cursor.advance() {
            heap.push(advanced);
        }

        let key = (entry.score, global_record::identity(&entry.global));
        if last_key == Some(key) {
            continue;
        }
        last_key = Some(key);
        out.push(entry);
    }

    out
}

/// Fold a freshly scanned stream into a running top-K accumulator, which is
/// itself already sorted and deduplicated.
pub(crate) fn fold_into(acc: Vec<Entry>, fresh: &[Entry], cap: usize) -> Vec<Entry> {
    if fresh.is_empty() {
        return acc;
    }
    merge(&[&acc, fresh], cap)
}

/// Run a full search: descend `root` to the frontier for `query_suffix`,
/// then harvest and merge from there, capped at `cap` entries.
pub(crate) fn search(root: &TrieNode, query_suffix: &[u8], cap: usize) -> Vec<Entry> {
    let mut acc = Vec::new();
    let mut min_score = 0u32;

    match root.descend(query_suffix) {
        Frontier::Absent => {}
        Frontier::Trie(node, rest) => node.harvest(rest, cap, &mut acc, &mut min_score),
        Frontier::Hash(hash, rest) => {
            if rest.is_empty() {
                hash.harvest_all(cap, &mut acc, &mut min_score);
            } else {
                let depth = query_suffix.len() - rest.len();
                hash.harvest_one(rest, depth, cap, &mut acc, &mut min_score);
            }
        }
    }

    acc
}

/// The score threshold below which further scanning cannot improve `acc`:
/// 0 until `acc` reaches `cap` entries, then the score of its last (lowest)
/// entry. Callers use this to prune a scan early once it can no longer
/// displace anything already collected.
pub(crate) fn min_score(acc: &[Entry], cap: usize) -> u32 {
    if acc.len() < cap {
        0
    } else {
        acc.last().map(|e| e.score).unwrap_or(0)
    }
}
