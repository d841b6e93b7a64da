//! Permutation: cycle-notation permutation over an alphabet.
//!
//! A permutation is written as disjoint cycles, e.g. `"(AELT) (BK) (S)"`.
//! Each symbol of a cycle maps to the next one (wrapping at the end) and
//! symbols not named by any cycle map to themselves.
//!
//! Cycles are stored as index lists together with a per-index owner table,
//! so forward and inverse lookups are O(1).

use std::collections::HashMap;
use std::fmt;

use crate::alphabet::Alphabet;
use crate::error::{EnigmaError, Result};
use crate::utils::text::is_reserved;

/// Returns `p` modulo `size`, normalized to `[0, size)`.
///
/// Returns 0 when `size` is 0.
///
/// # Examples
///
/// ```
/// use enigma::permutation::wrap;
///
/// assert_eq!(wrap(7, 4), 3);
/// assert_eq!(wrap(-1, 26), 25);
/// ```
pub fn wrap(p: i64, size: usize) -> usize {
    p.checked_rem_euclid(size as i64).unwrap_or(0) as usize
}

/// A permutation of `[0, alphabet size)` given in cycle notation.
#[derive(Clone, PartialEq, Eq)]
pub struct Permutation {
    alphabet: Alphabet,
    cycles: Vec<Vec<usize>>,
    /// For each alphabet index: (cycle number, position within that cycle).
    owner: Vec<Option<(usize, usize)>>,
}

impl Permutation {
    /// Parses `cycles` as cycle notation over `alphabet`.
    ///
    /// Whitespace between cycles is ignored.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Config`] if the notation contains an empty
    /// cycle `()`, nested or unbalanced parentheses, a `*`, whitespace
    /// inside a cycle, a symbol outside any cycle, a symbol not in
    /// `alphabet`, or any symbol more than once.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::{Alphabet, Permutation};
    ///
    /// let alpha = Alphabet::new("ABCD").unwrap();
    /// let perm = Permutation::new("(AC) (B)", &alpha).unwrap();
    /// assert_eq!(perm.permute(0).unwrap(), 2);
    /// assert_eq!(perm.permute_symbol('D').unwrap(), 'D');
    ///
    /// assert!(Permutation::new("()", &alpha).is_err());
    /// ```
    pub fn new(cycles: &str, alphabet: &Alphabet) -> Result<Self> {
        check_cycles(cycles, alphabet)?;

        let mut parsed: Vec<Vec<usize>> = Vec::new();
        for c in cycles.chars().filter(|c| !c.is_whitespace()) {
            match c {
                '(' => parsed.push(Vec::new()),
                ')' => {}
                _ => {
                    let index = alphabet.to_index(c)?;
                    if let Some(current) = parsed.last_mut() {
                        current.push(index);
                    }
                }
            }
        }

        let mut owner = vec![None; alphabet.size()];
        for (n, cycle) in parsed.iter().enumerate() {
            for (pos, &index) in cycle.iter().enumerate() {
                owner[index] = Some((n, pos));
            }
        }

        Ok(Permutation {
            alphabet: alphabet.clone(),
            cycles: parsed,
            owner,
        })
    }

    /// Creates the identity permutation over `alphabet`.
    pub fn identity(alphabet: &Alphabet) -> Self {
        Permutation {
            alphabet: alphabet.clone(),
            cycles: Vec::new(),
            owner: vec![None; alphabet.size()],
        }
    }

    /// Returns the size of the permuted alphabet.
    pub fn size(&self) -> usize {
        self.alphabet.size()
    }

    /// Returns the alphabet this permutation was built over.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Applies the permutation to `p` modulo the alphabet size.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Range`] if the alphabet is empty.
    pub fn permute(&self, p: i64) -> Result<usize> {
        let index = self.wrapped(p)?;
        Ok(self.step(index, 1))
    }

    /// Applies the inverse permutation to `c` modulo the alphabet size.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Range`] if the alphabet is empty.
    pub fn invert(&self, c: i64) -> Result<usize> {
        let index = self.wrapped(c)?;
        Ok(self.step(index, -1))
    }

    /// Applies the permutation to the symbol `p`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Lookup`] if `p` is not in the alphabet.
    pub fn permute_symbol(&self, p: char) -> Result<char> {
        let index = self.alphabet.to_index(p)?;
        self.alphabet.to_symbol(self.step(index, 1))
    }

    /// Applies the inverse permutation to the symbol `c`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Lookup`] if `c` is not in the alphabet.
    pub fn invert_symbol(&self, c: char) -> Result<char> {
        let index = self.alphabet.to_index(c)?;
        self.alphabet.to_symbol(self.step(index, -1))
    }

    /// Returns true iff no index maps to itself.
    ///
    /// An empty alphabet is vacuously a derangement.
    pub fn derangement(&self) -> bool {
        self.owner
            .iter()
            .all(|slot| matches!(slot, Some((n, _)) if self.cycles[*n].len() >= 2))
    }

    /// Returns the cycle containing the symbol at `index`, or an empty
    /// string if that symbol is an implicit fixed point.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Range`] if `index >= size()`.
    pub fn get_cycle(&self, index: usize) -> Result<String> {
        match self.owner.get(index) {
            Some(Some((n, _))) => self.render(&self.cycles[*n]),
            Some(None) => Ok(String::new()),
            None => Err(EnigmaError::range(index, self.size())),
        }
    }

    /// Returns the cycle containing `symbol`, or an empty string if
    /// `symbol` is an implicit fixed point.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Lookup`] if `symbol` is not in the alphabet.
    pub fn get_cycle_of(&self, symbol: char) -> Result<String> {
        let index = self.alphabet.to_index(symbol)?;
        self.get_cycle(index)
    }

    fn wrapped(&self, p: i64) -> Result<usize> {
        if self.alphabet.is_empty() {
            return Err(EnigmaError::range(p, 0));
        }
        Ok(wrap(p, self.size()))
    }

    /// Moves `delta` places along the cycle owning `index`.
    fn step(&self, index: usize, delta: i64) -> usize {
        match self.owner[index] {
            Some((n, pos)) => {
                let cycle = &self.cycles[n];
                cycle[wrap(pos as i64 + delta, cycle.len())]
            }
            None => index,
        }
    }

    fn render(&self, cycle: &[usize]) -> Result<String> {
        cycle.iter().map(|&i| self.alphabet.to_symbol(i)).collect()
    }
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, cycle) in self.cycles.iter().enumerate() {
            if n > 0 {
                f.write_str(" ")?;
            }
            f.write_str("(")?;
            for &i in cycle {
                if let Ok(c) = self.alphabet.to_symbol(i) {
                    write!(f, "{}", c)?;
                }
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Permutation({:?} over {:?})", self.to_string(), self.alphabet)
    }
}

/// Validates cycle notation in a single left-to-right scan.
///
/// A symbol that occurs more than once is reported at its first
/// occurrence, once that occurrence has passed its own checks.
fn check_cycles(cycles: &str, alphabet: &Alphabet) -> Result<()> {
    if cycles.contains("()") {
        return Err(EnigmaError::config("() is an invalid cycle"));
    }

    let mut occurrences: HashMap<char, usize> = HashMap::new();
    for c in cycles.chars().filter(|&c| !is_reserved(c)) {
        *occurrences.entry(c).or_insert(0) += 1;
    }

    let mut open = false;
    let mut opened = 0usize;
    let mut closed = 0usize;
    for c in cycles.chars() {
        if is_reserved(c) {
            match c {
                '(' => {
                    if open {
                        return Err(EnigmaError::config("a parenthesis was not closed yet"));
                    }
                    open = true;
                    opened += 1;
                }
                ')' => {
                    if !open {
                        return Err(EnigmaError::config("a parenthesis was not opened yet"));
                    }
                    open = false;
                    closed += 1;
                }
                '*' => return Err(EnigmaError::config("* is not allowed in cycles")),
                _ => {
                    if open {
                        return Err(EnigmaError::config("no whitespace inside cycles"));
                    }
                }
            }
            continue;
        }

        if !alphabet.contains(c) {
            return Err(EnigmaError::config(format!(
                "{:?} in cycles must be in the alphabet",
                c
            )));
        }
        if !open {
            return Err(EnigmaError::config(format!(
                "{:?} must be inside parentheses",
                c
            )));
        }
        if occurrences.get(&c).copied().unwrap_or(0) > 1 {
            return Err(EnigmaError::config(format!(
                "{:?} is repeated in cycles",
                c
            )));
        }
    }

    if opened != closed {
        return Err(EnigmaError::config(
            "number of open and close parentheses must match in cycles",
        ));
    }
    Ok(())
}
