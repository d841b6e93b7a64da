//! Machine: rotor stack, plugboard and ratchet.
//!
//! A machine owns a catalog of rotors and an ordered list of active slots.
//! Slot 0 holds the reflector; the remaining slots run left to right, and
//! the rightmost `pawls` slots are driven by the ratchet.
//!
//! Each keypress first advances the ratchet, then sends the signal through
//! the plugboard, right to left through every slot (the reflector turns it
//! around), left to right back through slots `1..`, and through the
//! plugboard again in reverse.

use tracing::{debug, trace};

use crate::alphabet::Alphabet;
use crate::error::{EnigmaError, Result};
use crate::permutation::Permutation;
use crate::rotor::{Rotor, RotorArena, RotorId};

/// How a pawl-driven rotor responds to one keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drive {
    /// Rightmost pawl: steps on every keypress.
    Always,
    /// The rotor to the right stepped off its notch and carries this one.
    Carried,
    /// Sitting at its own notch, so its pawl engages it together with the
    /// rotor to its left (double stepping).
    Notched,
    /// Stays put.
    Held,
}

impl Drive {
    /// Selects the drive of the rotor at `position` (1 = rightmost) among
    /// `pawls` pawl-driven rotors.
    ///
    /// The leftmost pawl rotor has nothing to its left to engage, so its
    /// own notch never moves it.
    fn select(position: usize, pawls: usize, carry: bool, at_notch: bool) -> Self {
        if position == 1 {
            Drive::Always
        } else if carry {
            Drive::Carried
        } else if at_notch && position != pawls {
            Drive::Notched
        } else {
            Drive::Held
        }
    }

    fn advances(self) -> bool {
        !matches!(self, Drive::Held)
    }
}

/// Decides which pawl-driven rotors advance on one keypress.
///
/// `notched[k]` is the pre-step notch state of the rotor at position
/// `k + 1` counting from the right. Returns, per position, whether that
/// rotor advances. A rotor passes the carry to its left neighbour iff it
/// advances while at its notch.
fn ratchet(notched: &[bool]) -> Vec<bool> {
    let pawls = notched.len();
    let mut carry = false;
    notched
        .iter()
        .enumerate()
        .map(|(k, &at_notch)| {
            let drive = Drive::select(k + 1, pawls, carry, at_notch);
            carry = drive.advances() && at_notch;
            drive.advances()
        })
        .collect()
}

/// A complete rotor machine.
#[derive(Debug, Clone)]
pub struct Machine {
    alphabet: Alphabet,
    num_rotors: usize,
    pawls: usize,
    catalog: RotorArena,
    slots: Vec<RotorId>,
    plugboard: Option<Permutation>,
}

impl Machine {
    /// Creates a machine over `alphabet` with `num_rotors` slots and `pawls`
    /// pawls, choosing its rotors from `catalog`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Config`] if `num_rotors <= 1`,
    /// `num_rotors > catalog.len()` or `pawls >= num_rotors`.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::{Alphabet, Machine, Permutation, Rotor, RotorArena};
    ///
    /// let alpha = Alphabet::new("ABCD").unwrap();
    /// let catalog = RotorArena::from_rotors(vec![
    ///     Rotor::reflector("R", Permutation::new("(AB) (CD)", &alpha).unwrap()).unwrap(),
    ///     Rotor::moving("M", Permutation::new("(ABC)", &alpha).unwrap(), "C").unwrap(),
    /// ])
    /// .unwrap();
    ///
    /// assert!(Machine::new(alpha.clone(), 2, 1, catalog.clone()).is_ok());
    /// assert!(Machine::new(alpha.clone(), 3, 1, catalog.clone()).is_err());
    /// assert!(Machine::new(alpha, 2, 2, catalog).is_err());
    /// ```
    pub fn new(
        alphabet: Alphabet,
        num_rotors: usize,
        pawls: usize,
        catalog: RotorArena,
    ) -> Result<Self> {
        if num_rotors <= 1 || num_rotors > catalog.len() {
            return Err(EnigmaError::config(format!(
                "must use a reasonable number of rotors: {} slots for {} available rotors",
                num_rotors,
                catalog.len()
            )));
        }
        if pawls >= num_rotors {
            return Err(EnigmaError::config(format!(
                "must use a reasonable number of pawls: {} pawls for {} slots",
                pawls, num_rotors
            )));
        }
        debug!(
            alphabet = %alphabet,
            num_rotors,
            pawls,
            available = catalog.len(),
            "machine constructed"
        );
        Ok(Machine {
            alphabet,
            num_rotors,
            pawls,
            catalog,
            slots: Vec::new(),
            plugboard: None,
        })
    }

    /// Returns the number of rotor slots.
    pub fn num_rotors(&self) -> usize {
        self.num_rotors
    }

    /// Returns the number of pawls (and so of moving rotors).
    pub fn num_pawls(&self) -> usize {
        self.pawls
    }

    /// Returns the machine alphabet.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Returns every rotor the machine can choose from.
    pub fn catalog(&self) -> &RotorArena {
        &self.catalog
    }

    /// Returns the current plugboard, if any.
    pub fn plugboard(&self) -> Option<&Permutation> {
        self.plugboard.as_ref()
    }

    /// Iterates over the active rotors from slot 0 (reflector) rightwards.
    pub fn active_rotors(&self) -> impl Iterator<Item = &Rotor> {
        self.slots.iter().map(move |&id| self.catalog.rotor(id))
    }

    /// Returns the current settings of slots `1..` as symbols.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Config`] if no rotors are inserted.
    pub fn rotor_settings(&self) -> Result<String> {
        self.require_rotors()?;
        self.active_rotors()
            .skip(1)
            .map(|r| r.alphabet().to_symbol(r.setting()))
            .collect()
    }

    /// Fills the slots with the catalog rotors named by `rotors`, in order;
    /// `rotors[0]` names the reflector. Every chosen rotor is reset to
    /// setting 0 and ring 0.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Config`] if `rotors` does not have
    /// `num_rotors()` entries, names an unknown or repeated rotor, names a
    /// rotor over a different alphabet, does not start with a reflector, or does not contain exactly `num_pawls()`
    /// moving rotors. The machine is unchanged on error.
    pub fn insert_rotors<S: AsRef<str>>(&mut self, rotors: &[S]) -> Result<()> {
        if rotors.len() != self.num_rotors {
            return Err(EnigmaError::config(format!(
                "there must be {} rotors to insert, got {}",
                self.num_rotors,
                rotors.len()
            )));
        }

        let mut chosen = Vec::with_capacity(rotors.len());
        let mut moving = 0usize;
        for (i, name) in rotors.iter().enumerate() {
            let name = name.as_ref();
            let id = self.catalog.find(name).ok_or_else(|| {
                EnigmaError::config(format!("only valid rotors may be inserted: {}", name))
            })?;
            let rotor = self.catalog.rotor(id);
            if rotor.alphabet() != &self.alphabet {
                return Err(EnigmaError::config(format!(
                    "rotor {} must use the machine's alphabet {}, not {}",
                    name,
                    self.alphabet,
                    rotor.alphabet()
                )));
            }
            if i == 0 && !rotor.reflecting() {
                return Err(EnigmaError::config(format!(
                    "first rotor must be a reflector, {} is not",
                    name
                )));
            }
            if rotor.rotates() {
                moving += 1;
            }
            if rotors[i + 1..].iter().any(|other| other.as_ref() == name) {
                return Err(EnigmaError::config(format!(
                    "there must not be repeated rotors: {}",
                    name
                )));
            }
            chosen.push(id);
        }
        if moving != self.pawls {
            return Err(EnigmaError::config(format!(
                "there must be {} moving rotors to insert, got {}",
                self.pawls, moving
            )));
        }

        for &id in &chosen {
            self.catalog.rotor_mut(id).reset();
        }
        self.slots = chosen;
        debug!(
            rotors = ?rotors.iter().map(|s| s.as_ref()).collect::<Vec<&str>>(),
            "rotors inserted"
        );
        Ok(())
    }

    /// Sets the rotors in slots `1..` to the symbols of `setting`, leftmost
    /// first. The reflector is never set this way.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Config`] if no rotors are inserted, if
    /// `setting` does not have `num_rotors() - 1` symbols, or if a symbol is
    /// not in the alphabet. The machine is unchanged on error.
    pub fn set_rotors(&mut self, setting: &str) -> Result<()> {
        let positions = self.resolve_setting(setting, "setting")?;
        for (&id, posn) in self.slots[1..].iter().zip(positions) {
            self.catalog.rotor_mut(id).set(posn)?;
        }
        debug!(setting, "rotor settings applied");
        Ok(())
    }

    /// Sets the ring offsets of slots `1..` to the symbols of `setting`,
    /// leftmost first.
    ///
    /// # Errors
    /// Same conditions as [`set_rotors`](Self::set_rotors).
    pub fn set_ring_rotors(&mut self, setting: &str) -> Result<()> {
        let positions = self.resolve_setting(setting, "ring setting")?;
        for (&id, posn) in self.slots[1..].iter().zip(positions) {
            self.catalog.rotor_mut(id).set_ring(posn)?;
        }
        debug!(ring = setting, "ring settings applied");
        Ok(())
    }

    /// Replaces the plugboard; `None` means no plugboard.
    pub fn set_plugboard(&mut self, plugboard: Option<Permutation>) {
        debug!(
            plugboard = %plugboard.as_ref().map(ToString::to_string).unwrap_or_default(),
            "plugboard applied"
        );
        self.plugboard = plugboard;
    }

    /// Advances the ratchet, then converts the index `c` through the
    /// machine and returns the resulting index.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Range`] if `c` is outside the alphabet (the
    /// rotors do not move), or [`EnigmaError::Config`] if no rotors are
    /// inserted.
    pub fn convert(&mut self, c: usize) -> Result<usize> {
        if c >= self.alphabet.size() {
            return Err(EnigmaError::range(c, self.alphabet.size()));
        }
        self.require_rotors()?;
        self.advance_rotors();

        let mut result = c;
        if let Some(plugboard) = &self.plugboard {
            result = plugboard.permute(result as i64)?;
        }
        for &id in self.slots.iter().rev() {
            result = self.catalog.rotor(id).convert_forward(result)?;
        }
        for &id in &self.slots[1..] {
            result = self.catalog.rotor(id).convert_backward(result)?;
        }
        if let Some(plugboard) = &self.plugboard {
            result = plugboard.invert(result as i64)?;
        }

        trace!(
            input = c,
            output = result,
            positions = %self.rotor_settings().unwrap_or_default(),
            "keypress"
        );
        Ok(result)
    }

    /// Converts every symbol of `msg` in order and returns the result.
    ///
    /// The whole message is checked against the alphabet first, so a
    /// rejected message leaves the rotors where they were.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Config`] if a symbol of `msg` is not in the
    /// alphabet or no rotors are inserted.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::{Alphabet, Machine, Permutation, Rotor, RotorArena};
    ///
    /// let alpha = Alphabet::upper();
    /// let perm = |c: &str| Permutation::new(c, &alpha).unwrap();
    /// let catalog = RotorArena::from_rotors(vec![
    ///     Rotor::reflector("B", perm("(AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP) (RX) (SZ) (TV)")).unwrap(),
    ///     Rotor::fixed("Beta", perm("(ALBEVFCYODJWUGNMQTZSKPR) (HIX)")),
    ///     Rotor::moving("III", perm("(ABDHPEJT) (CFLVMZOYQIRWUKXSG) (N)"), "V").unwrap(),
    ///     Rotor::moving("IV", perm("(AEPLIYWCOXMRFZBSTGJQNH) (DV) (KU)"), "J").unwrap(),
    ///     Rotor::moving("I", perm("(AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)"), "Q").unwrap(),
    /// ])
    /// .unwrap();
    ///
    /// let mut machine = Machine::new(alpha.clone(), 5, 3, catalog).unwrap();
    /// machine.insert_rotors(&["B", "Beta", "III", "IV", "I"]).unwrap();
    /// machine.set_rotors("AXLE").unwrap();
    /// machine.set_plugboard(Some(perm("(HQ) (EX) (IP) (TR) (BY)")));
    ///
    /// assert_eq!(machine.convert_message("FROMH").unwrap(), "QVPQS");
    /// ```
    pub fn convert_message(&mut self, msg: &str) -> Result<String> {
        if let Some(bad) = msg.chars().find(|&c| !self.alphabet.contains(c)) {
            return Err(EnigmaError::config(format!(
                "{:?} must be in the machine's alphabet",
                bad
            )));
        }
        self.require_rotors()?;

        let mut result = String::with_capacity(msg.len());
        for c in msg.chars() {
            let index = self.alphabet.to_index(c)?;
            let converted = self.convert(index)?;
            result.push(self.alphabet.to_symbol(converted)?);
        }
        Ok(result)
    }

    /// Steps the pawl-driven rotors for one keypress.
    fn advance_rotors(&mut self) {
        let moving = &self.slots[self.slots.len() - self.pawls..];
        let notched: Vec<bool> = moving
            .iter()
            .rev()
            .map(|&id| self.catalog.rotor(id).at_notch())
            .collect();
        let plan = ratchet(&notched);
        for (&id, advance) in moving.iter().rev().zip(plan) {
            if advance {
                self.catalog.rotor_mut(id).advance();
            }
        }
    }

    /// Validates a per-slot settings string and maps it to rotor positions.
    fn resolve_setting(&self, setting: &str, what: &str) -> Result<Vec<usize>> {
        self.require_rotors()?;
        let len = setting.chars().count();
        if len != self.num_rotors - 1 {
            return Err(EnigmaError::config(format!(
                "{} length must be one less than the number of rotors: expected {}, got {}",
                what,
                self.num_rotors - 1,
                len
            )));
        }
        setting
            .chars()
            .zip(&self.slots[1..])
            .map(|(c, &id)| {
                if !self.alphabet.contains(c) {
                    return Err(EnigmaError::config(format!(
                        "{:?} must be in the machine's alphabet",
                        c
                    )));
                }
                self.catalog.rotor(id).alphabet().to_index(c).map_err(|_| {
                    EnigmaError::config(format!(
                        "{:?} is not a position of rotor {}",
                        c,
                        self.catalog.rotor(id).name()
                    ))
                })
            })
            .collect()
    }

    fn require_rotors(&self) -> Result<()> {
        if self.slots.is_empty() {
            return Err(EnigmaError::config("no rotors have been inserted"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAVAL: [(&str, &str, &str); 6] = [
        ("B", "R", "(AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP) (RX) (SZ) (TV)"),
        ("Beta", "N", "(ALBEVFCYODJWUGNMQTZSKPR) (HIX)"),
        ("III", "MV", "(ABDHPEJT) (CFLVMZOYQIRWUKXSG) (N)"),
        ("IV", "MJ", "(AEPLIYWCOXMRFZBSTGJQNH) (DV) (KU)"),
        ("I", "MQ", "(AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)"),
        ("II", "ME", "(FIXVYOMW) (CDKLHUP) (ESZ) (BJ) (GR) (NT) (A) (Q)"),
    ];

    fn naval_catalog() -> RotorArena {
        let alpha = Alphabet::upper();
        RotorArena::from_rotors(NAVAL.iter().map(|&(name, kind, cycles)| {
            let perm = Permutation::new(cycles, &alpha).unwrap();
            match kind {
                "R" => Rotor::reflector(name, perm).unwrap(),
                "N" => Rotor::fixed(name, perm),
                _ => Rotor::moving(name, perm, &kind[1..]).unwrap(),
            }
        }))
        .unwrap()
    }

    fn axle_machine() -> Machine {
        let alpha = Alphabet::upper();
        let mut m = Machine::new(alpha.clone(), 5, 3, naval_catalog()).unwrap();
        m.insert_rotors(&["B", "Beta", "III", "IV", "I"]).unwrap();
        m.set_rotors("AXLE").unwrap();
        m.set_ring_rotors("AAAA").unwrap();
        m.set_plugboard(Some(Permutation::new("(YF) (ZH)", &alpha).unwrap()));
        m
    }

    fn idx(c: char) -> usize {
        Alphabet::upper().to_index(c).unwrap()
    }

    #[test]
    fn test_dimensions() {
        let m = axle_machine();
        assert_eq!(m.num_rotors(), 5);
        assert_eq!(m.num_pawls(), 3);
        assert_eq!(m.catalog().len(), 6);
        assert_eq!(m.alphabet().size(), 26);
    }

    #[test]
    fn test_convert_char() {
        let mut m = axle_machine();
        assert_eq!(m.convert(idx('Y')).unwrap(), idx('Z'));
    }

    #[test]
    fn test_convert_message() {
        let mut m = axle_machine();
        m.set_plugboard(Some(
            Permutation::new("(HQ) (EX) (IP) (TR) (BY)", &Alphabet::upper()).unwrap(),
        ));
        assert_eq!(m.convert_message("FROMH").unwrap(), "QVPQS");
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        let alpha = Alphabet::upper();
        for (rotors, pawls) in [(1, 0), (7, 3), (5, 5), (5, 9)] {
            assert!(
                matches!(
                    Machine::new(alpha.clone(), rotors, pawls, naval_catalog()),
                    Err(EnigmaError::Config(_))
                ),
                "{} rotors / {} pawls should be rejected",
                rotors,
                pawls
            );
        }
    }

    #[test]
    fn test_insert_rejects_invalid_selections() {
        let cases: [&[&str]; 6] = [
            &["I", "III", "IV", "Beta", "B"],
            &["B", "Beta", "III", "IV", "i"],
            &["B", "Beta", "I", "IV", "I"],
            &["B", "Beta", "III", "IV"],
            &["B", "Beta", "III", "IV", "I", "II"],
            &["B", "II", "III", "IV", "I"],
        ];
        for names in cases {
            let mut m = axle_machine();
            assert!(
                matches!(m.insert_rotors(names), Err(EnigmaError::Config(_))),
                "{:?} should be rejected",
                names
            );
            assert_eq!(m.rotor_settings().unwrap(), "AXLE", "{:?} mutated state", names);
        }
    }

    #[test]
    fn test_insert_rejects_foreign_alphabet() {
        let small = Alphabet::new("ABCD").unwrap();
        let wide = Alphabet::new("ABCDEF").unwrap();
        let catalog = RotorArena::from_rotors(vec![
            Rotor::reflector("R", Permutation::new("(AB) (CD)", &small).unwrap()).unwrap(),
            Rotor::moving("W", Permutation::new("(ABCDEF)", &wide).unwrap(), "A").unwrap(),
            Rotor::moving("M", Permutation::new("(ABCD)", &small).unwrap(), "A").unwrap(),
        ])
        .unwrap();
        let mut m = Machine::new(small, 2, 1, catalog).unwrap();

        assert!(matches!(
            m.insert_rotors(&["R", "W"]),
            Err(EnigmaError::Config(_))
        ));
        assert!(matches!(m.convert(0), Err(EnigmaError::Config(_))));

        m.insert_rotors(&["R", "M"]).unwrap();
        assert!(m.convert(0).is_ok());
    }

    #[test]
    fn test_insert_resets_settings_and_rings() {
        let mut m = axle_machine();
        m.set_ring_rotors("BCDE").unwrap();
        m.insert_rotors(&["B", "Beta", "III", "IV", "I"]).unwrap();
        assert_eq!(m.rotor_settings().unwrap(), "AAAA");
        assert!(m.active_rotors().all(|r| r.ring() == 0));
    }

    #[test]
    fn test_active_rotors_order() {
        let m = axle_machine();
        let names: Vec<&str> = m.active_rotors().map(Rotor::name).collect();
        assert_eq!(names, ["B", "Beta", "III", "IV", "I"]);
    }

    #[test]
    fn test_set_rotors_rejects_bad_settings() {
        let mut m = axle_machine();
        for bad in ["AXL", "AXLEE", "axle"] {
            assert!(matches!(m.set_rotors(bad), Err(EnigmaError::Config(_))));
            assert!(matches!(m.set_ring_rotors(bad), Err(EnigmaError::Config(_))));
        }
        assert_eq!(m.rotor_settings().unwrap(), "AXLE");
    }

    #[test]
    fn test_convert_rejects_out_of_range_without_stepping() {
        let mut m = axle_machine();
        assert_eq!(m.convert(26), Err(EnigmaError::Range { index: 26, size: 26 }));
        assert_eq!(m.rotor_settings().unwrap(), "AXLE");
    }

    #[test]
    fn test_convert_message_is_atomic() {
        let mut m = axle_machine();
        assert!(matches!(
            m.convert_message("HELLOmsg"),
            Err(EnigmaError::Config(_))
        ));
        assert_eq!(m.rotor_settings().unwrap(), "AXLE");
    }

    #[test]
    fn test_requires_inserted_rotors() {
        let mut m = Machine::new(Alphabet::upper(), 5, 3, naval_catalog()).unwrap();
        assert!(matches!(m.convert(0), Err(EnigmaError::Config(_))));
        assert!(matches!(m.convert_message("A"), Err(EnigmaError::Config(_))));
        assert!(matches!(m.set_rotors("AAAA"), Err(EnigmaError::Config(_))));
        assert!(matches!(m.rotor_settings(), Err(EnigmaError::Config(_))));
    }

    #[test]
    fn test_empty_message() {
        let mut m = axle_machine();
        assert_eq!(m.convert_message("").unwrap(), "");
        assert_eq!(m.rotor_settings().unwrap(), "AXLE");
    }

    #[test]
    fn test_no_plugboard() {
        let mut m = axle_machine();
        m.set_plugboard(None);
        assert!(m.plugboard().is_none());
        assert_eq!(m.convert_message("HELLOWORLD").unwrap(), "FHVGJZUKSG");
    }

    #[test]
    fn test_first_keypress_steps_rightmost_only() {
        let mut m = axle_machine();
        m.convert(0).unwrap();
        assert_eq!(m.rotor_settings().unwrap(), "AXLF");
    }

    #[test]
    fn test_drive_selection() {
        assert_eq!(Drive::select(1, 3, false, false), Drive::Always);
        assert_eq!(Drive::select(1, 3, false, true), Drive::Always);
        assert_eq!(Drive::select(2, 3, true, false), Drive::Carried);
        assert_eq!(Drive::select(3, 3, true, true), Drive::Carried);
        assert_eq!(Drive::select(2, 3, false, true), Drive::Notched);
        assert_eq!(Drive::select(3, 3, false, true), Drive::Held);
        assert_eq!(Drive::select(2, 3, false, false), Drive::Held);
    }

    #[test]
    fn test_ratchet_every_notch_combination() {
        for pawls in 0..=4usize {
            for mask in 0..(1u32 << pawls) {
                let notched: Vec<bool> = (0..pawls).map(|k| mask & (1 << k) != 0).collect();
                let plan = ratchet(&notched);
                assert_eq!(plan.len(), pawls);
                for k in 0..pawls {
                    let expected = k == 0
                        || notched[k - 1]
                        || (notched[k] && k + 1 < pawls);
                    assert_eq!(
                        plan[k], expected,
                        "pawls={} notched={:?} position={}",
                        pawls, notched, k + 1
                    );
                }
            }
        }
    }
}
