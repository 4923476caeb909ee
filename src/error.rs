// Completrie -- In-memory prefix-and-substring autocompletion index
// Copyright 2026 The Completrie Authors

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

use std::fmt;
use std::result;

/// Error kinds returned by core operations.
///
/// Allocation failure is not represented here: every allocation in this
/// crate goes through `Box`/`Vec`/`Rc`, which abort the process on
/// allocation failure rather than returning a `Result`, so there is no call
/// site that could produce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Null/empty required input, or an illegal state transition.
    BadArgument(&'static str),

    /// `remove` of a string that is not present in the index.
    NotFound,

    /// Error in config file on a given line.
    InvalidConfig(usize, &'static str),

    /// A key is missing in the config.
    IncompleteConfig(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::BadArgument(msg) => write!(f, "bad argument: {}", msg),
            Error::NotFound => write!(f, "no matching entry to remove"),
            Error::InvalidConfig(line, msg) => {
                write!(f, "invalid config on line {}: {}", line, msg)
            }
            Error::IncompleteConfig(msg) => write!(f, "incomplete config: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;

#[cfg(test)]
mod test {
    use super::Error;

    #[test]
    fn displays_a_message() {
        let err = Error::BadArgument("empty string");
        assert_eq!(err.to_string(), "bad argument: empty string");
    }
}
