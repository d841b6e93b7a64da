//! Machine configuration loading.
//!
//! A configuration is whitespace-separated text:
//!
//! ```text
//! ABCDEFGHIJKLMNOPQRSTUVWXYZ
//! 5 3
//! I     MQ  (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)
//! Beta  N   (ALBEVFCYODJWUGNMQTZSKPR) (HIX)
//! B     R   (AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP) (RX) (SZ) (TV)
//! ```
//!
//! The alphabet comes first, then the number of rotor slots and pawls, then
//! any number of rotors. Each rotor is a name, a kind tag and its cycles:
//! `M` followed by the notch symbols for a moving rotor, `N` for a fixed
//! rotor and `R` for a reflector. Line breaks carry no meaning.

use std::str::FromStr;

use tracing::debug;

use crate::alphabet::Alphabet;
use crate::error::{EnigmaError, Result};
use crate::machine::Machine;
use crate::permutation::Permutation;
use crate::rotor::{Rotor, RotorArena};

/// A parsed configuration: everything needed to build a [`Machine`].
#[derive(Debug, Clone)]
pub struct MachineConfig {
    /// Symbols the machine encodes.
    pub alphabet: Alphabet,
    /// Number of rotor slots, reflector included.
    pub num_rotors: usize,
    /// Number of pawls, equal to the number of moving rotors in use.
    pub pawls: usize,
    /// Every rotor available to the machine.
    pub catalog: RotorArena,
}

impl MachineConfig {
    /// Parses configuration text.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Config`] if the text is truncated, a count is
    /// not a non-negative integer, a rotor name or kind starts with `(`, a
    /// kind tag is unknown, two rotors share a name, or any alphabet,
    /// cycle or notch is invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::config::MachineConfig;
    ///
    /// let config = MachineConfig::parse("ABCD 2 1  R R (AB)(CD)  M MC (ABC)").unwrap();
    /// assert_eq!(config.alphabet.size(), 4);
    /// assert_eq!(config.catalog.len(), 2);
    ///
    /// let mut machine = config.into_machine().unwrap();
    /// machine.insert_rotors(&["R", "M"]).unwrap();
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let mut tokens = text.split_whitespace().peekable();

        let alphabet = Alphabet::new(tokens.next().ok_or_else(truncated)?)?;
        let num_rotors = parse_count(tokens.next().ok_or_else(truncated)?, "rotors")?;
        let pawls = parse_count(tokens.next().ok_or_else(truncated)?, "pawls")?;

        let mut catalog = RotorArena::new();
        while let Some(name) = tokens.next() {
            check_not_cycle(name, "name")?;
            let kind = tokens.next().ok_or_else(|| {
                EnigmaError::config(format!("bad rotor description: {} has no kind", name))
            })?;
            check_not_cycle(kind, "kind")?;

            let mut cycles = String::new();
            while let Some(cycle) = tokens.next_if(|t| t.starts_with('(')) {
                cycles.push_str(cycle);
            }

            let rotor = build_rotor(name, kind, &cycles, &alphabet)?;
            debug!(rotor = %rotor, cycles = %cycles, "rotor loaded");
            catalog.add(rotor)?;
        }

        Ok(MachineConfig {
            alphabet,
            num_rotors,
            pawls,
            catalog,
        })
    }

    /// Builds the machine described by this configuration.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Config`] if the slot or pawl counts do not
    /// fit the catalog (see [`Machine::new`]).
    pub fn into_machine(self) -> Result<Machine> {
        Machine::new(self.alphabet, self.num_rotors, self.pawls, self.catalog)
    }
}

impl FromStr for MachineConfig {
    type Err = EnigmaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Parses configuration text straight into a [`Machine`].
///
/// # Errors
/// Any error of [`MachineConfig::parse`] or [`MachineConfig::into_machine`].
pub fn read_config(text: &str) -> Result<Machine> {
    MachineConfig::parse(text)?.into_machine()
}

fn build_rotor(name: &str, kind: &str, cycles: &str, alphabet: &Alphabet) -> Result<Rotor> {
    let mut tag = kind.chars();
    match tag.next() {
        Some('M') => {
            let perm = Permutation::new(cycles, alphabet)?;
            Rotor::moving(name, perm, tag.as_str())
        }
        Some('N') => Ok(Rotor::fixed(name, Permutation::new(cycles, alphabet)?)),
        Some('R') => Rotor::reflector(name, Permutation::new(cycles, alphabet)?),
        _ => Err(EnigmaError::config(format!(
            "rotor {} must be described with 'M', 'N' or 'R', got {:?}",
            name, kind
        ))),
    }
}

fn parse_count(token: &str, what: &str) -> Result<usize> {
    let value: i64 = token.parse().map_err(|_| {
        EnigmaError::config(format!("number of {} must be an integer, got {:?}", what, token))
    })?;
    usize::try_from(value).map_err(|_| {
        EnigmaError::config(format!("must use a reasonable number of {}: {}", what, value))
    })
}

fn check_not_cycle(token: &str, what: &str) -> Result<()> {
    if token.starts_with('(') {
        return Err(EnigmaError::config(format!(
            "rotor {} must not start with '(': {}",
            what, token
        )));
    }
    Ok(())
}

fn truncated() -> EnigmaError {
    EnigmaError::config("configuration file truncated")
}
