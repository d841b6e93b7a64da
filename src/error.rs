//! Error types for the rotor machine simulator.

use thiserror::Error;

/// Errors produced by the simulator.
///
/// Configuration and setup calls either fully succeed or return one of
/// these without mutating the object they were called on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnigmaError {
    /// Structurally invalid alphabet, cycle notation, rotor set, machine
    /// dimensions, settings string or message.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Numeric index outside `[0, size)`.
    #[error("Index {index} is outside the valid range [0, {size})")]
    Range {
        /// The rejected index.
        index: i64,
        /// Exclusive upper bound of the valid range.
        size: usize,
    },

    /// Symbol absent from the relevant alphabet.
    #[error("Symbol '{symbol}' is not in the alphabet")]
    Lookup {
        /// The rejected symbol.
        symbol: char,
    },

    /// Failure reading messages or writing results.
    #[error("IO error: {0}")]
    Io(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EnigmaError>;

impl EnigmaError {
    /// Shorthand for a [`EnigmaError::Config`] with the given message.
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        EnigmaError::Config(msg.into())
    }

    /// Shorthand for a [`EnigmaError::Range`].
    pub(crate) fn range(index: impl TryInto<i64>, size: usize) -> Self {
        EnigmaError::Range {
            index: index.try_into().unwrap_or(i64::MAX),
            size,
        }
    }
}

impl From<std::io::Error> for EnigmaError {
    fn from(err: std::io::Error) -> Self {
        EnigmaError::Io(err.to_string())
    }
}
