//! Alphabet: ordered set of encodable symbols.
//!
//! Maps each symbol to a dense index in `[0, size)` and back. Every other
//! component addresses symbols through an [`Alphabet`].

use std::collections::HashMap;
use std::fmt;

use crate::error::{EnigmaError, Result};
use crate::utils::text::is_reserved;

/// The 26 upper-case Latin letters.
pub const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// An ordered set of distinct symbols with a dense integer index per symbol.
///
/// Immutable after construction.
#[derive(Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
    positions: HashMap<char, usize>,
}

impl Alphabet {
    /// Creates an alphabet from `chars`, where symbol number `k` has index `k`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Config`] if any symbol is whitespace, `*`, `(`
    /// or `)`, or if any symbol is repeated.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::Alphabet;
    ///
    /// let alpha = Alphabet::new("3BbcD/").unwrap();
    /// assert_eq!(alpha.size(), 6);
    /// assert_eq!(alpha.to_index('c').unwrap(), 3);
    ///
    /// assert!(Alphabet::new("3*5=15").is_err());
    /// ```
    pub fn new(chars: &str) -> Result<Self> {
        let symbols: Vec<char> = chars.chars().collect();
        let mut positions = HashMap::with_capacity(symbols.len());
        for (i, &c) in symbols.iter().enumerate() {
            if is_reserved(c) {
                return Err(EnigmaError::config(format!(
                    "{:?} is an invalid character in the alphabet",
                    c
                )));
            }
            if positions.insert(c, i).is_some() {
                return Err(EnigmaError::config(format!(
                    "{:?} is repeated in the alphabet",
                    c
                )));
            }
        }
        Ok(Alphabet { symbols, positions })
    }

    /// Creates the upper-case alphabet `A..=Z`.
    pub fn upper() -> Self {
        let symbols: Vec<char> = UPPER.chars().collect();
        let positions = symbols.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        Alphabet { symbols, positions }
    }

    /// Returns the number of symbols.
    pub fn size(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if the alphabet has no symbols.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Returns true if `symbol` belongs to the alphabet.
    pub fn contains(&self, symbol: char) -> bool {
        self.positions.contains_key(&symbol)
    }

    /// Returns the symbol at `index`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Range`] if `index >= size()`.
    pub fn to_symbol(&self, index: usize) -> Result<char> {
        self.symbols
            .get(index)
            .copied()
            .ok_or_else(|| EnigmaError::range(index, self.size()))
    }

    /// Returns the index of `symbol`. Inverse of [`to_symbol`](Self::to_symbol).
    ///
    /// # Errors
    /// Returns [`EnigmaError::Lookup`] if `symbol` is not in the alphabet.
    pub fn to_index(&self, symbol: char) -> Result<usize> {
        self.positions
            .get(&symbol)
            .copied()
            .ok_or(EnigmaError::Lookup { symbol })
    }

    /// Iterates over the symbols in index order.
    pub fn symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.symbols.iter().copied()
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::upper()
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.symbols {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Alphabet({:?})", self.to_string())
    }
}
