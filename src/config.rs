// Completrie -- In-memory prefix-and-substring autocompletion index
// Copyright 2026 The Completrie Authors

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

// Configuration module inspired by the one in Tako (github.com/ruuda/tako),
// which is copyright 2018 Arian van Putten, Ruud van Asseldonk, Tako Marks,
// and licensed under the Apache 2.0 License.

//! Index configuration: parser byte-classes, presplit range/depth, K, and
//! the hash-node split threshold.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::parser::{ByteSet, ParserConfig};

/// Default split threshold. `original_source/trie.c` never implements
/// hash-node splitting, so there is no constant to match; 15000 keeps
/// splits infrequent without letting a hash node grow unbounded.
pub const DEFAULT_HASH_SPLIT_THRESHOLD: usize = 15_000;

/// Default maximum results per query, from `original_source/http.c`'s
/// `NUM_RESULTS`.
pub const DEFAULT_MAX_RESULTS: usize = 25;

#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub parser: ParserConfig,
    pub max_results: usize,
    pub hash_split_threshold: usize,
    pub presplit_low: u8,
    pub presplit_high: u8,
    pub presplit_depth: u32,
}

impl Default for IndexConfig {
    /// Whitespace-separated tokenization, no presplit, and the defaults
    /// above.
    fn default() -> IndexConfig {
        IndexConfig {
            parser: ParserConfig::whitespace_separated(),
            max_results: DEFAULT_MAX_RESULTS,
            hash_split_threshold: DEFAULT_HASH_SPLIT_THRESHOLD,
            presplit_low: 1,
            presplit_high: 0,
            presplit_depth: 0,
        }
    }
}

impl fmt::Display for IndexConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "  max_results          = {}", self.max_results)?;
        writeln!(f, "  hash_split_threshold = {}", self.hash_split_threshold)?;
        writeln!(f, "  presplit_low         = {}", self.presplit_low)?;
        writeln!(f, "  presplit_high        = {}", self.presplit_high)?;
        write!(f, "  presplit_depth       = {}", self.presplit_depth)?;
        Ok(())
    }
}

impl IndexConfig {
    /// Whether this config asks for a non-empty presplit range.
    pub fn has_presplit(&self) -> bool {
        self.presplit_depth > 0 && self.presplit_low <= self.presplit_high
    }

    /// Parse a line-oriented configuration, in the same `key = value`
    /// format the daemon config parser uses (one entry per line, `#`
    /// comments, blank lines allowed). `start_set`/`middle_set` take a raw
    /// string of bytes to include in the set, taken literally (not
    /// escaped).
    pub fn parse<I, S>(lines: I) -> Result<IndexConfig>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut start_set = ByteSet::empty();
        let mut middle_set = ByteSet::empty();
        let mut max_results = None;
        let mut hash_split_threshold = None;
        let mut presplit_low = None;
        let mut presplit_high = None;
        let mut presplit_depth = None;

        for (lineno, line_raw) in lines.into_iter().enumerate() {
            let line = line_raw.as_ref();

            if line.is_empty() {
                continue;
            }
            if line.starts_with('#') {
                continue;
            }

            let n = match line.find('=') {
                Some(n) => n,
                None => {
                    let msg = "Line contains no '='. \
                        Expected key-value pair like 'max_results = 25'.";
                    return Err(Error::InvalidConfig(lineno, msg));
                }
            };

            let key = line[..n].trim();
            let value = line[n + 1..].trim();

            match key {
                "start_set" => start_set = ByteSet::from_bytes(value.bytes()),
                "middle_set" => middle_set = ByteSet::from_bytes(value.bytes()),
                "max_results" => match usize::from_str(value) {
                    Ok(n) => max_results = Some(n),
                    Err(_) => return Err(Error::InvalidConfig(lineno, "max_results must be an integer")),
                },
                "hash_split_threshold" => match usize::from_str(value) {
                    Ok(n) => hash_split_threshold = Some(n),
                    Err(_) => {
                        return Err(Error::InvalidConfig(lineno, "hash_split_threshold must be an integer"))
                    }
                },
                "presplit_low" => match value.parse::<u8>() {
                    Ok(b) => presplit_low = Some(b),
                    Err(_) => return Err(Error::InvalidConfig(lineno, "presplit_low must be a byte 0-255")),
                },
                "presplit_high" => match value.parse::<u8>() {
                    Ok(b) => presplit_high = Some(b),
                    Err(_) => return Err(Error::InvalidConfig(lineno, "presplit_high must be a byte 0-255")),
                },
                "presplit_depth" => match value.parse::<u32>() {
                    Ok(d) => presplit_depth = Some(d),
                    Err(_) => return Err(Error::InvalidConfig(lineno, "presplit_depth must be an integer")),
                },
                _ => {
                    let msg = "Unknown key. See the configuration docs for supported keys.";
                    return Err(Error::InvalidConfig(lineno, msg));
                }
            }
        }

        let defaults = IndexConfig::default();
        Ok(IndexConfig {
            parser: ParserConfig::new(start_set, middle_set),
            max_results: max_results.unwrap_or(defaults.max_results),
            hash_split_threshold: hash_split_threshold.unwrap_or(defaults.hash_split_threshold),
            presplit_low: presplit_low.unwrap_or(defaults.presplit_low),
            presplit_high: presplit_high.unwrap_or(defaults.presplit_high),
            presplit_depth: presplit_depth.unwrap_or(defaults.presplit_depth),
        })
    }
}

#[cfg(test)]
mod test {
    use super::IndexConfig;

    #[test]
    fn config_can_be_parsed() {
        let config_lines = [
            "# This is a comment.",
            "middle_set =  ",
            "max_results = 10",
            "hash_split_threshold = 500",
            "",
            "presplit_low = 97",
            "presplit_high = 122",
            "presplit_depth = 2",
        ];
        let config = IndexConfig::parse(&config_lines).unwrap();
        assert_eq!(config.max_results, 10);
        assert_eq!(config.hash_split_threshold, 500);
        assert_eq!(config.presplit_low, 97);
        assert_eq!(config.presplit_high, 122);
        assert_eq!(config.presplit_depth, 2);
        assert!(config.has_presplit());
    }

    #[test]
    fn defaults_have_no_presplit() {
        let config = IndexConfig::default();
        assert!(!config.has_presplit());
        assert_eq!(config.max_results, super::DEFAULT_MAX_RESULTS);
    }

    #[test]
    fn rejects_unknown_key() {
        let result = IndexConfig::parse(&["bogus = 1"]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_line_without_equals() {
        let result = IndexConfig::parse(&["not a key value line"]);
        assert!(result.is_err());
    }
}
