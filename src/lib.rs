// Completrie -- In-memory prefix-and-substring autocompletion index
// Copyright 2026 The Completrie Authors

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

//! An in-memory prefix-and-substring autocompletion index.
//!
//! Given a corpus of scored strings, answers interactive queries of the
//! form "return the top-K stored strings, ordered by descending score,
//! whose normalized form contains the query as a prefix of some token".
//! Built for autocompletion of short human-readable labels where the user
//! may begin typing at any word boundary rather than the literal start of
//! the string.
//!
//! The crate is organized leaves-first:
//!
//! - [`global_record`] -- the canonical stored bytes of one indexed string.
//! - [`dline`] -- a sorted, immutable sequence of entries at one trie/hash
//!   location.
//! - [`trie`] -- the recursive trie/hash hybrid node.
//! - [`parser`] -- picks which suffixes of an input string to index.
//! - [`merge`] -- the top-K merge used by search.
//!
//! [`Index`] ties these together behind the three operations a caller
//! needs: [`Index::upsert`], [`Index::search`], [`Index::remove`].

pub mod config;
pub mod dline;
pub mod error;
pub mod global_record;
pub mod merge;
pub mod parser;
pub mod stats;
pub mod trie;

use std::rc::Rc;

use crate::config::IndexConfig;
use crate::dline::{RemoveState, UpsertState};
use crate::error::{Error, Result};
use crate::global_record::GlobalRecord;
use crate::trie::TrieNode;

/// One result of a [`Index::search`] call.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// The original, unnormalized bytes this record was upserted with.
    pub full_bytes: Vec<u8>,
    pub score: u32,
    /// Offset within the normalized record where the matched suffix
    /// begins; callers use this to highlight the match.
    pub match_start: u32,
    /// Length of the record's normalized form.
    pub normalized_len: u32,
}

/// The top-level autocompletion index.
pub struct Index {
    root: TrieNode,
    config: IndexConfig,
}

impl Index {
    /// Create an empty index with the given configuration. If the
    /// configuration requests a presplit range, the trie root is built with
    /// that prefix pre-expanded.
    pub fn new(config: IndexConfig) -> Index {
        let root = if config.has_presplit() {
            TrieNode::presplit(config.presplit_low, config.presplit_high, config.presplit_depth)
        } else {
            TrieNode::new()
        };
        Index { root, config }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Index `full_bytes` at `score`, creating or re-scoring it.
    ///
    /// Normalizes `full_bytes`, asks the parser for every suffix offset to
    /// index, and performs one dline upsert per offset, all sharing a
    /// single [`UpsertState`] so insert-vs-update is decided once per
    /// record rather than once per suffix.
    pub fn upsert(&mut self, full_bytes: &[u8], score: u32) -> Result<()> {
        if full_bytes.is_empty() {
            return Err(Error::BadArgument("full_bytes must not be empty"));
        }

        let normalized = parser::normalize(full_bytes);
        let mut state = UpsertState::new();
        let mut start = self.config.parser.next_start(&normalized, None);

        while let Some(offset) = start {
            self.root.upsert(full_bytes, &normalized, offset, offset, score, &mut state, &self.config);
            start = self.config.parser.next_start(&normalized, start);
        }

        Ok(())
    }

    /// Remove a previously upserted record, matched by its original bytes.
    ///
    /// Symmetric to [`Index::upsert`]: normalizes, asks the parser for the
    /// same suffix offsets, and removes every matching entry, sharing one
    /// [`RemoveState`] so later suffixes are matched by the global record's
    /// pointer identity rather than by re-scanning content.
    pub fn remove(&mut self, full_bytes: &[u8]) -> Result<Rc<GlobalRecord>> {
        if full_bytes.is_empty() {
            return Err(Error::BadArgument("full_bytes must not be empty"));
        }

        let normalized = parser::normalize(full_bytes);
        let mut state = RemoveState::default();
        let mut start = self.config.parser.next_start(&normalized, None);

        while let Some(offset) = start {
            self.root.remove(&normalized, offset, offset, &mut state)?;
            start = self.config.parser.next_start(&normalized, start);
        }

        // `next_start` always yields at least one offset for a non-empty
        // string, so if we got here at all, `remove` ran at least once and
        // populated `state.global` on its first hit.
        Ok(state.global.expect("remove ran at least one suffix"))
    }

    /// Return up to `config.max_results` entries whose normalized form
    /// contains the normalized `query_bytes` as a prefix of some indexed
    /// suffix, ordered by `(score DESC, global-ref DESC)` with one entry per
    /// matching record.
    pub fn search(&self, query_bytes: &[u8]) -> Vec<SearchHit> {
        let normalized_query = parser::normalize(query_bytes);
        let entries = merge::search(&self.root, &normalized_query, self.config.max_results);

        entries
            .iter()
            .map(|e| SearchHit {
                full_bytes: e.global.full_bytes().to_vec(),
                score: e.score,
                match_start: e.offset,
                normalized_len: e.global.len() as u32,
            })
            .collect()
    }

    /// Snapshot counts of the live structures under this index (see
    /// [`stats`]).
    pub fn stats(&self) -> stats::IndexStats {
        stats::collect(&self.root)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn whitespace_index() -> Index {
        Index::new(IndexConfig::default())
    }

    fn texts(hits: &[SearchHit]) -> Vec<(String, u32)> {
        hits.iter()
            .map(|h| (String::from_utf8_lossy(&h.full_bytes).into_owned(), h.score))
            .collect()
    }

    #[test]
    fn scenario_1_prefix_of_leading_word() {
        let mut index = whitespace_index();
        index.upsert(b"Hello World", 100).unwrap();
        index.upsert(b"Help Desk", 90).unwrap();

        assert_eq!(
            texts(&index.search(b"he")),
            vec![("Hello World".to_string(), 100), ("Help Desk".to_string(), 90)]
        );

        let wo = index.search(b"wo");
        assert_eq!(texts(&wo), vec![("Hello World".to_string(), 100)]);
        assert_eq!(wo[0].match_start, 6);
    }

    #[test]
    fn scenario_2_rescoring_changes_order() {
        let mut index = whitespace_index();
        index.upsert(b"alpha", 10).unwrap();
        index.upsert(b"beta", 20).unwrap();
        assert_eq!(
            texts(&index.search(b"")),
            vec![("beta".to_string(), 20), ("alpha".to_string(), 10)]
        );

        index.upsert(b"alpha", 30).unwrap();
        assert_eq!(
            texts(&index.search(b"")),
            vec![("alpha".to_string(), 30), ("beta".to_string(), 20)]
        );
    }

    #[test]
    fn scenario_3_dedup_across_suffixes() {
        let mut index = whitespace_index();
        index.upsert(b"foo foo", 50).unwrap();

        let hits = index.search(b"foo");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].match_start, 0);
        assert_eq!(hits[0].normalized_len, 7);
    }

    #[test]
    fn scenario_4_remove() {
        let mut index = whitespace_index();
        index.upsert(b"Hello World", 100).unwrap();
        index.upsert(b"Help Desk", 90).unwrap();
        index.remove(b"Hello World").unwrap();

        assert_eq!(texts(&index.search(b"he")), vec![("Help Desk".to_string(), 90)]);
        assert!(index.search(b"wo").is_empty());
    }

    #[test]
    fn scenario_5_hash_split_preserves_search() {
        let mut config = IndexConfig::default();
        config.hash_split_threshold = 4;
        let mut index = Index::new(config);

        for i in 0..8u32 {
            let word = format!("zzz{}", i);
            index.upsert(word.as_bytes(), i).unwrap();
        }

        let hits = index.search(b"zzz");
        assert_eq!(hits.len(), 8);
        assert_eq!(hits[0].score, 7);
        assert_eq!(hits[7].score, 0);
    }

    #[test]
    fn scenario_6_top_k_cap() {
        let mut config = IndexConfig::default();
        config.max_results = 3;
        let mut index = Index::new(config);

        for i in 1..=10u32 {
            let word = format!("a{}", i);
            index.upsert(word.as_bytes(), i).unwrap();
        }

        let hits = index.search(b"a");
        assert_eq!(hits.len(), 3);
        assert_eq!(hits.iter().map(|h| h.score).collect::<Vec<_>>(), vec![10, 9, 8]);
    }

    #[test]
    fn remove_of_absent_record_is_not_found() {
        let mut index = whitespace_index();
        index.upsert(b"hello", 1).unwrap();
        assert_eq!(index.remove(b"bye"), Err(Error::NotFound));
    }

    #[test]
    fn upsert_rejects_empty_input() {
        let mut index = whitespace_index();
        assert_eq!(index.upsert(b"", 1), Err(Error::BadArgument("full_bytes must not be empty")));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn word() -> impl Strategy<Value = String> {
        "[a-z]{1,8}( [a-z]{1,8}){0,2}"
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: if cfg!(miri) { 8 } else { 64 },
            .. ProptestConfig::default()
        })]

        /// Invariant 5 (round-trip): upserting a set of distinct words then
        /// removing all of them in any order leaves the index empty.
        #[test]
        fn round_trip_upsert_then_remove_all(
            words in proptest::collection::hash_set(word(), 1..12),
            seed in any::<u64>(),
        ) {
            let mut index = Index::new(IndexConfig::default());
            let mut words: Vec<String> = words.into_iter().collect();

            for (score, w) in words.iter().enumerate() {
                index.upsert(w.as_bytes(), score as u32).unwrap();
            }

            // A cheap deterministic shuffle of the removal order, seeded by
            // the generated `seed` rather than by a fresh RNG (Date.now /
            // thread_rng are off-limits for the index itself, and a fixed
            // permutation still exercises "any order" across proptest runs).
            let n = words.len();
            for i in (1..n).rev() {
                let j = (seed as usize).wrapping_add(i).wrapping_mul(2654435761) % (i + 1);
                words.swap(i, j);
            }

            for w in &words {
                index.remove(w.as_bytes()).unwrap();
            }

            let stats = index.stats();
            prop_assert_eq!(stats.global_records, 0);
            prop_assert_eq!(stats.entries, 0);
            prop_assert!(index.search(b"").is_empty());
        }

        /// Invariant 7 (score monotonicity): re-upserting the same string at
        /// a new score always makes search report the latest score.
        #[test]
        fn rescoring_updates_the_reported_score(
            w in word(),
            s1 in 0u32..1000,
            s2 in 0u32..1000,
        ) {
            let mut index = Index::new(IndexConfig::default());
            index.upsert(w.as_bytes(), s1).unwrap();
            index.upsert(w.as_bytes(), s2).unwrap();

            let hits = index.search(w.as_bytes());
            let hit = hits.iter().find(|h| h.full_bytes == w.as_bytes());
            prop_assert_eq!(hit.map(|h| h.score), Some(s2));
        }

        /// Invariant 8 (search ordering): results for any query come back
        /// sorted by score descending, with no repeated record.
        #[test]
        fn search_results_are_sorted_and_deduplicated(
            words in proptest::collection::vec((word(), 0u32..1000), 1..20),
        ) {
            let mut index = Index::new(IndexConfig::default());
            for (w, score) in &words {
                index.upsert(w.as_bytes(), *score).unwrap();
            }

            let hits = index.search(b"");
            for pair in hits.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }

            let mut seen = std::collections::HashSet::new();
            for h in &hits {
                prop_assert!(seen.insert(h.full_bytes.clone()));
            }
        }
    }
}
