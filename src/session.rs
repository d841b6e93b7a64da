//! Message session: drives a configured machine over a message stream.
//!
//! The stream is line oriented. A line containing `*` is a setting line
//!
//! ```text
//! * B Beta III IV I AXLE AAAA (HQ) (EX) (IP) (TR) (BY)
//! ```
//!
//! naming the rotors (reflector first), their settings, an optional ring
//! setting and optional plugboard cycles. Every other line is a message
//! line, converted with the current machine state and written out in
//! groups of five symbols.

use std::io::{BufRead, Write};

use tracing::info;

use crate::error::{EnigmaError, Result};
use crate::machine::Machine;
use crate::permutation::Permutation;
use crate::utils::text::group_by_five;

/// A parsed setting line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Rotor names, reflector first.
    pub rotors: Vec<String>,
    /// One setting symbol per non-reflector slot, leftmost first.
    pub positions: String,
    /// Optional ring setting, same shape as `positions`.
    pub ring: Option<String>,
    /// Plugboard cycles, concatenated; empty means no swaps.
    pub plugboard: String,
}

impl Settings {
    /// Parses a setting line for a machine with `num_rotors` slots.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Config`] if the line does not start with a
    /// lone `*`, names fewer than `num_rotors` rotors, lacks the setting
    /// string, or the setting string starts with `(`.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::session::Settings;
    ///
    /// let s = Settings::parse("* B Beta III IV I AXLE (YF) (ZH)", 5).unwrap();
    /// assert_eq!(s.rotors, ["B", "Beta", "III", "IV", "I"]);
    /// assert_eq!(s.positions, "AXLE");
    /// assert_eq!(s.ring, None);
    /// assert_eq!(s.plugboard, "(YF)(ZH)");
    /// ```
    pub fn parse(line: &str, num_rotors: usize) -> Result<Self> {
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("*") => {}
            Some(other) => {
                return Err(EnigmaError::config(format!(
                    "{} must contain only an asterisk",
                    other
                )))
            }
            None => return Err(EnigmaError::config("setting line is empty")),
        }

        let mut rotors = Vec::with_capacity(num_rotors);
        for _ in 0..num_rotors {
            let name = tokens.next().ok_or_else(|| {
                EnigmaError::config(format!(
                    "setting line must name {} rotors, got {}",
                    num_rotors,
                    rotors.len()
                ))
            })?;
            rotors.push(name.to_string());
        }

        let positions = tokens
            .next()
            .ok_or_else(|| EnigmaError::config("setting line has no rotor setting"))?;
        if positions.starts_with('(') {
            return Err(EnigmaError::config(format!(
                "rotor setting must not start with '(': {}",
                positions
            )));
        }

        let mut ring = None;
        let mut plugboard = String::new();
        if let Some(next) = tokens.next() {
            if next.starts_with('(') {
                plugboard.push_str(next);
            } else {
                ring = Some(next.to_string());
            }
        }
        for cycle in tokens {
            plugboard.push_str(cycle);
        }

        Ok(Settings {
            rotors,
            positions: positions.to_string(),
            ring,
            plugboard,
        })
    }

    /// Applies these settings: inserts the rotors, sets them, sets the
    /// rings when given and replaces the plugboard.
    ///
    /// # Errors
    /// Any error from the plugboard cycles or from
    /// [`Machine::insert_rotors`], [`Machine::set_rotors`] and
    /// [`Machine::set_ring_rotors`].
    pub fn apply(&self, machine: &mut Machine) -> Result<()> {
        let plugboard = Permutation::new(&self.plugboard, machine.alphabet())?;
        machine.insert_rotors(&self.rotors)?;
        machine.set_rotors(&self.positions)?;
        if let Some(ring) = &self.ring {
            machine.set_ring_rotors(ring)?;
        }
        machine.set_plugboard(Some(plugboard));
        Ok(())
    }
}

/// Converts every whitespace-separated word of `line` and joins the results.
///
/// # Errors
/// Any error of [`Machine::convert_message`].
pub fn convert_line(machine: &mut Machine, line: &str) -> Result<String> {
    let mut converted = String::with_capacity(line.len());
    for word in line.split_whitespace() {
        converted.push_str(&machine.convert_message(word)?);
    }
    Ok(converted)
}

/// Runs `machine` over the message stream `input`, writing converted lines
/// to `output`.
///
/// Blank lines before the first setting line are skipped. Each message
/// line yields exactly one output line, so blank message lines stay blank.
///
/// # Errors
/// Returns [`EnigmaError::Config`] if the first non-blank line is not a
/// setting line or any setting/message is invalid, and
/// [`EnigmaError::Io`] on read or write failure. Processing stops at the
/// first error.
///
/// # Examples
///
/// ```
/// use enigma::config::read_config;
/// use enigma::session::process;
///
/// let mut machine = read_config("ABCD 2 1  R R (AB)(CD)  M MD (ABCD)").unwrap();
/// let input = "* R M A\nABBA\n";
/// let mut output = Vec::new();
///
/// process(&mut machine, input.as_bytes(), &mut output).unwrap();
/// assert_eq!(String::from_utf8(output).unwrap().lines().count(), 1);
/// ```
pub fn process<R: BufRead, W: Write>(
    machine: &mut Machine,
    input: R,
    mut output: W,
) -> Result<()> {
    let mut configured = false;
    for (number, line) in input.lines().enumerate() {
        let line = line?;
        if line.contains('*') {
            let settings = Settings::parse(&line, machine.num_rotors())?;
            settings.apply(machine)?;
            info!(
                line = number + 1,
                rotors = ?settings.rotors,
                positions = %settings.positions,
                "message settings applied"
            );
            configured = true;
            continue;
        }
        if !configured {
            if line.trim().is_empty() {
                continue;
            }
            return Err(EnigmaError::config(format!(
                "line {}: messages must be preceded by a setting line starting with '*'",
                number + 1
            )));
        }
        let converted = convert_line(machine, &line)?;
        writeln!(output, "{}", group_by_five(&converted))?;
    }
    output.flush()?;
    Ok(())
}
