// Completrie -- In-memory prefix-and-substring autocompletion index
// Copyright 2026 The Completrie Authors

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

//! A queryable snapshot of the structures live under an [`crate::Index`].
//!
//! Plays the diagnostic role `original_source/dline.c`'s `dline_debug`
//! plays there, but returns a value instead of printing one, since this
//! crate has no I/O of its own and leaves logging/printing to the caller.

use std::collections::HashSet;

use crate::global_record;
use crate::trie::{Child, HashNode, TrieNode};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Distinct global records reachable from the index. A record stays
    /// alive until its last suffix is removed, so one is counted once here
    /// regardless of how many suffixes of it are indexed.
    pub global_records: usize,
    /// Total non-empty dlines, across both trie-node terminators and
    /// hash-node buckets.
    pub dlines: usize,
    /// Total entries across every dline.
    pub entries: usize,
    pub trie_nodes: usize,
    pub hash_nodes: usize,
}

pub fn collect(root: &TrieNode) -> IndexStats {
    let mut stats = IndexStats::default();
    let mut seen = HashSet::new();
    visit_trie(root, &mut stats, &mut seen);
    stats
}

fn visit_trie(node: &TrieNode, stats: &mut IndexStats, seen: &mut HashSet<usize>) {
    stats.trie_nodes += 1;

    if let Some(dline) = node.terminated_dline() {
        count_dline(dline, stats, seen);
    }

    for child in node.children_slice() {
        match child {
            None => {}
            Some(Child::Trie(child)) => visit_trie(child, stats, seen),
            Some(Child::Hash(hash)) => visit_hash(hash, stats, seen),
        }
    }
}

fn visit_hash(hash: &HashNode, stats: &mut IndexStats, seen: &mut HashSet<usize>) {
    stats.hash_nodes += 1;
    for bucket in hash.buckets_slice() {
        if let Some(dline) = bucket {
            count_dline(dline, stats, seen);
        }
    }
}

fn count_dline(dline: &crate::dline::Dline, stats: &mut IndexStats, seen: &mut HashSet<usize>) {
    stats.dlines += 1;
    dline.iterate(|entry| {
        stats.entries += 1;
        seen.insert(global_record::identity(&entry.global));
    });
    stats.global_records = seen.len();
}
