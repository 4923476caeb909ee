// Completrie -- In-memory prefix-and-substring autocompletion index
// Copyright 2026 The Completrie Authors

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

//! The data line (component B): a contiguous, immutable, sorted sequence of
//! `(global-ref, score, suffix)` entries.
//!
//! Grounded in `original_source/dline.c`. The original packs entries into a
//! single malloc'd buffer terminated by a magic sentinel pointer value, with
//! every mutation reallocating a fresh buffer; here a `Dline` is a boxed
//! slice of `Entry` rebuilt on every mutation, and the empty dline is
//! represented by `None` rather than by a dline containing only the
//! terminator, mirroring the original's null-pointer representation.
//!
//! Suffix bytes are not copied into the entry (the original copies them
//! inline after the entry header); instead an entry stores the offset into
//! its `GlobalRecord`'s normalized bytes, since the suffix is always a
//! subrange of that record. This avoids a second allocation per suffix while
//! preserving the same observable contents.

use std::rc::Rc;

use crate::global_record::{self, GlobalRecord};

/// One `(global-ref, score, suffix)` tuple within a dline.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub global: Rc<GlobalRecord>,
    pub score: u32,
    /// Offset into `global.normalized_bytes()` at which this entry's suffix
    /// begins.
    pub offset: u32,
}

impl Entry {
    pub fn suffix_len(&self) -> u32 {
        self.global.len() as u32 - self.offset
    }

    pub fn suffix_bytes(&self) -> &[u8] {
        &self.global.normalized_bytes()[self.offset as usize..]
    }

    /// The composite sort key `(score DESC, global-ref DESC, suffix-length
    /// DESC)`. Returned in a form where a plain
    /// ascending tuple comparison reproduces the DESC/DESC/DESC order, so
    /// `entries` can be kept sorted by `key(a) >= key(b)`.
    fn key(&self) -> (u32, usize, u32) {
        (self.score, global_record::identity(&self.global), self.suffix_len())
    }
}

/// A non-empty, immutable, sorted block of entries at one trie/hash
/// location. The empty dline is represented by `Option<Dline>` being `None`
/// rather than by a `Dline` with zero entries.
#[derive(Debug, Clone, Default)]
pub(crate) struct Dline(Vec<Entry>);

/// Which phase of a multi-suffix upsert we are in.
///
/// Carried in `UpsertState` across every suffix of one logical `Index::upsert`
/// call, so insert-vs-update is decided at most once per indexed string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UpsertMode {
    /// We don't yet know whether this is a first occurrence or a re-score.
    Initial,
    /// Definitely a first occurrence: create a new global record, if one
    /// hasn't been created for an earlier suffix already.
    Insert,
    /// Definitely a re-score: remove the old entry, then insert at the new
    /// score, keeping the same global record.
    Update,
}

#[derive(Debug, Clone)]
pub(crate) struct UpsertState {
    pub mode: UpsertMode,
    pub global: Option<Rc<GlobalRecord>>,
    pub old_score: Option<u32>,
}

impl UpsertState {
    pub fn new() -> UpsertState {
        UpsertState { mode: UpsertMode::Initial, global: None, old_score: None }
    }
}

/// State threaded across the suffixes of one logical `Index::remove` call,
/// so that after the first suffix is matched by content, later suffixes of
/// the same record are matched by pointer identity instead.
#[derive(Debug, Clone, Default)]
pub(crate) struct RemoveState {
    pub global: Option<Rc<GlobalRecord>>,
}

impl Dline {
    pub fn entries(&self) -> &[Entry] {
        &self.0
    }

    fn insert_sorted(&mut self, entry: Entry) {
        let key = entry.key();
        let pos = self.0.iter().position(|e| e.key() < key).unwrap_or(self.0.len());
        self.0.insert(pos, entry);
    }

    /// Whether `normalized[start..]`, belonging to `global`, is already
    /// present as an entry -- matched by suffix bytes and by the full
    /// normalized contents of the referenced record. Returns the matching
    /// entry's score and global record, if any.
    fn find_by_content(
        existing: Option<&Dline>,
        normalized: &[u8],
        start: usize,
    ) -> Option<(u32, Rc<GlobalRecord>)> {
        let suffix = &normalized[start..];
        let entries = existing.map(Dline::entries).unwrap_or(&[]);
        entries.iter().find_map(|e| {
            if e.suffix_bytes() == suffix && e.global.normalized_bytes() == normalized {
                Some((e.score, e.global.clone()))
            } else {
                None
            }
        })
    }

    /// Find an entry matching `normalized[start..]`, by global-record
    /// pointer identity if `known_global` is set, otherwise by content.
    fn find_index(
        entries: &[Entry],
        normalized: &[u8],
        start: usize,
        known_global: Option<&Rc<GlobalRecord>>,
    ) -> Option<usize> {
        let suffix = &normalized[start..];
        entries.iter().position(|e| {
            if e.suffix_bytes() != suffix {
                return false;
            }
            match known_global {
                Some(g) => Rc::ptr_eq(g, &e.global),
                None => e.global.normalized_bytes() == normalized,
            }
        })
    }

    /// Build (or rebuild) the dline with `(full, normalized, start)` upserted
    /// at `score`. `existing` is untouched; the caller swaps in the returned
    /// dline after this returns.
    pub fn upsert(
        existing: Option<&Dline>,
        full: &[u8],
        normalized: &[u8],
        start: usize,
        score: u32,
        state: &mut UpsertState,
    ) -> Dline {
        match state.mode {
            UpsertMode::Initial => {
                debug_assert!(state.global.is_none());
                match Dline::find_by_content(existing, normalized, start) {
                    Some((old_score, global)) => {
                        state.mode = UpsertMode::Update;
                        state.global = Some(global);
                        state.old_score = Some(old_score);
                    }
                    None => {
                        state.mode = UpsertMode::Insert;
                    }
                }
                Dline::upsert(existing, full, normalized, start, score, state)
            }
            UpsertMode::Insert => {
                let global = state
                    .global
                    .get_or_insert_with(|| GlobalRecord::new(full, normalized))
                    .clone();
                let mut entries = existing.map(|d| d.0.clone()).unwrap_or_default();
                let mut result = Dline(Vec::with_capacity(entries.len() + 1));
                result.0.append(&mut entries);
                result.insert_sorted(Entry { global, score, offset: start as u32 });
                result
            }
            UpsertMode::Update => {
                debug_assert!(state.global.is_some());
                let mut remove_state = RemoveState { global: state.global.clone() };
                let removed = Dline::remove(existing, normalized, start, &mut remove_state)
                    .expect("the entry being re-scored must already exist");
                state.mode = UpsertMode::Insert;
                Dline::upsert(removed.as_ref(), full, normalized, start, score, state)
            }
        }
    }

    /// Remove the entry for `normalized[start..]`. Returns `Ok(None)` if the
    /// removed entry was the sole entry (an empty dline), `Err(NotFound)` if
    /// no matching entry exists.
    pub fn remove(
        existing: Option<&Dline>,
        normalized: &[u8],
        start: usize,
        state: &mut RemoveState,
    ) -> crate::error::Result<Option<Dline>> {
        let entries = existing.map(Dline::entries).unwrap_or(&[]);
        let idx = Dline::find_index(entries, normalized, start, state.global.as_ref())
            .ok_or(crate::error::Error::NotFound)?;

        if state.global.is_none() {
            state.global = Some(entries[idx].global.clone());
        }

        if entries.len() == 1 {
            return Ok(None);
        }

        let mut remaining = Vec::with_capacity(entries.len() - 1);
        remaining.extend(entries.iter().enumerate().filter(|&(i, _)| i != idx).map(|(_, e)| e.clone()));
        Ok(Some(Dline(remaining)))
    }

    /// Linear scan for entries whose suffix is prefixed by
    /// `query_suffix`, with score at least `min_score`, deduplicating
    /// consecutive entries for the same global record.
    ///
    /// `depth` is how many bytes of the match have already been consumed by
    /// trie/hash descent before reaching this dline; `query_suffix` is what
    /// remains of the original query past that point, so the comparison
    /// skips `depth` bytes of each entry's own suffix before checking it.
    ///
    /// Because entries are grouped by `(score, global-ref)` and sorted by
    /// length DESC within a group, the first match for a given global record
    /// is the longest (earliest-starting) one; later entries for the same
    /// record are skipped.
    pub fn search(
        &self,
        query_suffix: &[u8],
        depth: usize,
        min_score: u32,
        out_cap: usize,
        out: &mut Vec<Entry>,
    ) {
        let mut prev_global: Option<usize> = None;

        for entry in &self.0 {
            if entry.score < min_score {
                break;
            }
            if out.len() == out_cap {
                break;
            }

            let suffix = &entry.suffix_bytes()[depth..];
            if suffix.len() < query_suffix.len() || &suffix[..query_suffix.len()] != query_suffix {
                continue;
            }

            let id = global_record::identity(&entry.global);
            if prev_global == Some(id) {
                continue;
            }
            prev_global = Some(id);
            out.push(entry.clone());
        }
    }

    /// Visit every entry in stored order; used by hash-node splitting.
    pub fn iterate<F: FnMut(&Entry)>(&self, mut f: F) {
        for entry in &self.0 {
            f(entry);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
