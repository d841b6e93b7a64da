//! Rotor: a permutation mounted on a rotating contact ring.
//!
//! All rotor variants share one struct; what differs between a reflector,
//! a fixed rotor and a moving rotor is captured by [`RotorKind`] and
//! dispatched with `match`.
//!
//! Rotors live in a [`RotorArena`] and are referenced by [`RotorId`]. A
//! machine keeps the arena as its catalog and its active slots hold ids,
//! so resetting a rotor on insertion is an explicit arena operation.

use std::fmt;

use crate::alphabet::Alphabet;
use crate::error::{EnigmaError, Result};
use crate::permutation::{wrap, Permutation};

/// What a rotor is able to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotorKind {
    /// Does not move; its permutation must be a derangement.
    Reflector,
    /// Does not move and does not reflect.
    Fixed,
    /// Has a ratchet and advances; `notches` are alphabet indices.
    Moving {
        /// Settings at which the rotor to the left is allowed to advance.
        notches: Vec<usize>,
    },
}

/// A rotor: a named permutation with a rotational setting and a ring offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotor {
    name: String,
    permutation: Permutation,
    kind: RotorKind,
    setting: usize,
    ring: usize,
}

impl Rotor {
    /// Creates a reflector named `name`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Config`] if `permutation` is not a derangement.
    pub fn reflector(name: &str, permutation: Permutation) -> Result<Self> {
        if !permutation.derangement() {
            return Err(EnigmaError::config(format!(
                "reflector {}'s permutation must be a derangement",
                name
            )));
        }
        Ok(Self::build(name, permutation, RotorKind::Reflector))
    }

    /// Creates a non-moving, non-reflecting rotor named `name`.
    pub fn fixed(name: &str, permutation: Permutation) -> Self {
        Self::build(name, permutation, RotorKind::Fixed)
    }

    /// Creates a moving rotor named `name` with a notch at each symbol of
    /// `notches`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Config`] if a notch symbol is not in the
    /// permutation's alphabet.
    ///
    /// # Examples
    ///
    /// ```
    /// use enigma::{Alphabet, Permutation, Rotor};
    ///
    /// let alpha = Alphabet::upper();
    /// let perm = Permutation::new("(AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)", &alpha).unwrap();
    /// let mut rotor = Rotor::moving("I", perm, "Q").unwrap();
    ///
    /// rotor.set_symbol('Q').unwrap();
    /// assert!(rotor.at_notch());
    /// rotor.advance();
    /// assert_eq!(rotor.setting(), 17);
    /// ```
    pub fn moving(name: &str, permutation: Permutation, notches: &str) -> Result<Self> {
        let alphabet = permutation.alphabet();
        let mut indices = Vec::with_capacity(notches.len());
        for c in notches.chars() {
            let index = alphabet.to_index(c).map_err(|_| {
                EnigmaError::config(format!(
                    "notch {:?} of rotor {} must be in the alphabet",
                    c, name
                ))
            })?;
            indices.push(index);
        }
        Ok(Self::build(
            name,
            permutation,
            RotorKind::Moving { notches: indices },
        ))
    }

    fn build(name: &str, permutation: Permutation, kind: RotorKind) -> Self {
        Rotor {
            name: name.to_string(),
            permutation,
            kind,
            setting: 0,
            ring: 0,
        }
    }

    /// Returns my name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns my alphabet (the alphabet of my permutation).
    pub fn alphabet(&self) -> &Alphabet {
        self.permutation.alphabet()
    }

    /// Returns the permutation I implement at setting 0.
    pub fn permutation(&self) -> &Permutation {
        &self.permutation
    }

    /// Returns my capability set.
    pub fn kind(&self) -> &RotorKind {
        &self.kind
    }

    /// Returns the size of my alphabet.
    pub fn size(&self) -> usize {
        self.permutation.size()
    }

    /// Returns true iff I have a ratchet and can move.
    pub fn rotates(&self) -> bool {
        matches!(self.kind, RotorKind::Moving { .. })
    }

    /// Returns true iff I reflect.
    pub fn reflecting(&self) -> bool {
        matches!(self.kind, RotorKind::Reflector)
    }

    /// Returns my current setting.
    pub fn setting(&self) -> usize {
        self.setting
    }

    /// Returns my ring setting.
    pub fn ring(&self) -> usize {
        self.ring
    }

    /// Sets my setting to `posn`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Range`] if `posn >= size()`.
    pub fn set(&mut self, posn: usize) -> Result<()> {
        self.setting = self.checked(posn)?;
        Ok(())
    }

    /// Sets my setting to the index of `cposn`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Lookup`] if `cposn` is not in my alphabet.
    pub fn set_symbol(&mut self, cposn: char) -> Result<()> {
        self.setting = self.alphabet().to_index(cposn)?;
        Ok(())
    }

    /// Sets my ring setting to `posn`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Range`] if `posn >= size()`.
    pub fn set_ring(&mut self, posn: usize) -> Result<()> {
        self.ring = self.checked(posn)?;
        Ok(())
    }

    /// Sets my ring setting to the index of `cposn`.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Lookup`] if `cposn` is not in my alphabet.
    pub fn set_ring_symbol(&mut self, cposn: char) -> Result<()> {
        self.ring = self.alphabet().to_index(cposn)?;
        Ok(())
    }

    /// Returns to setting 0 and ring 0.
    pub(crate) fn reset(&mut self) {
        self.setting = 0;
        self.ring = 0;
    }

    /// Converts the contact index `p` through my permutation.
    ///
    /// The wiring is shifted by `setting - ring`: the input is rotated into
    /// the wiring's frame, permuted, and rotated back.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Range`] if `p >= size()`.
    pub fn convert_forward(&self, p: usize) -> Result<usize> {
        let p = self.checked(p)?;
        let offset = self.offset();
        let permuted = self.permutation.permute(p as i64 + offset)?;
        Ok(wrap(permuted as i64 - offset, self.size()))
    }

    /// Converts the contact index `e` through the inverse of my permutation.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Range`] if `e >= size()`.
    pub fn convert_backward(&self, e: usize) -> Result<usize> {
        let e = self.checked(e)?;
        let offset = self.offset();
        let inverted = self.permutation.invert(e as i64 + offset)?;
        Ok(wrap(inverted as i64 - offset, self.size()))
    }

    /// Returns true iff I am positioned to let the rotor to my left advance.
    pub fn at_notch(&self) -> bool {
        match &self.kind {
            RotorKind::Moving { notches } => notches.contains(&self.setting),
            RotorKind::Reflector | RotorKind::Fixed => false,
        }
    }

    /// Advances me one position if I have a ratchet.
    pub fn advance(&mut self) {
        match self.kind {
            RotorKind::Moving { .. } => {
                self.setting = wrap(self.setting as i64 + 1, self.size());
            }
            RotorKind::Reflector | RotorKind::Fixed => {}
        }
    }

    fn offset(&self) -> i64 {
        self.setting as i64 - self.ring as i64
    }

    fn checked(&self, posn: usize) -> Result<usize> {
        if posn < self.size() {
            Ok(posn)
        } else {
            Err(EnigmaError::range(posn, self.size()))
        }
    }
}

impl fmt::Display for Rotor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            RotorKind::Reflector => write!(f, "Reflector {}", self.name),
            RotorKind::Fixed => write!(f, "Fixed Rotor {}", self.name),
            RotorKind::Moving { .. } => write!(f, "Rotor {}", self.name),
        }
    }
}

/// Identifier of a rotor within a [`RotorArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RotorId(pub usize);

/// Catalog of uniquely named rotors, addressed by [`RotorId`].
///
/// Stores every rotor in a contiguous `Vec`; ids are stable for the life
/// of the arena.
#[derive(Debug, Clone, Default)]
pub struct RotorArena {
    rotors: Vec<Rotor>,
}

impl RotorArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        RotorArena { rotors: Vec::new() }
    }

    /// Creates an arena holding `rotors` in order.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Config`] if two rotors share a name.
    pub fn from_rotors(rotors: impl IntoIterator<Item = Rotor>) -> Result<Self> {
        let mut arena = RotorArena::new();
        for rotor in rotors {
            arena.add(rotor)?;
        }
        Ok(arena)
    }

    /// Adds `rotor` and returns its id.
    ///
    /// # Errors
    /// Returns [`EnigmaError::Config`] if a rotor with the same name is
    /// already present.
    pub fn add(&mut self, rotor: Rotor) -> Result<RotorId> {
        if self.find(rotor.name()).is_some() {
            return Err(EnigmaError::config(format!(
                "rotor {} is defined more than once",
                rotor.name()
            )));
        }
        let id = RotorId(self.rotors.len());
        self.rotors.push(rotor);
        Ok(id)
    }

    /// Returns the number of rotors.
    pub fn len(&self) -> usize {
        self.rotors.len()
    }

    /// Returns true if the arena holds no rotors.
    pub fn is_empty(&self) -> bool {
        self.rotors.is_empty()
    }

    /// Returns the id of the rotor named `name`, if any.
    pub fn find(&self, name: &str) -> Option<RotorId> {
        self.rotors
            .iter()
            .position(|r| r.name() == name)
            .map(RotorId)
    }

    /// Returns the rotor with id `id`, if any.
    pub fn get(&self, id: RotorId) -> Option<&Rotor> {
        self.rotors.get(id.0)
    }

    /// Iterates over all rotors in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Rotor> {
        self.rotors.iter()
    }

    pub(crate) fn rotor(&self, id: RotorId) -> &Rotor {
        &self.rotors[id.0]
    }

    pub(crate) fn rotor_mut(&mut self, id: RotorId) -> &mut Rotor {
        &mut self.rotors[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROTOR_I: &str = "(AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)";
    const BETA: &str = "(ALBEVFCYODJWUGNMQTZSKPR) (HIX)";
    const GAMMA: &str = "(AFNIRLBSQWVXGUZDKMTPCOYJHE)";
    const REFLECTOR_B: &str = "(AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP) (RX) (SZ) (TV)";

    /// Forward images of A..Z for Beta at setting 0.
    const BETA_MAP: &str = "LEYJVCNIXWPBQMDRTAKZGFUHOS";
    /// Forward images of A..Z for Gamma at setting 0.
    const GAMMA_MAP: &str = "FSOKANUERHMBTIYCWLQPZXVGJD";

    fn upper_perm(cycles: &str) -> Permutation {
        Permutation::new(cycles, &Alphabet::upper()).unwrap()
    }

    /// Checks that `rotor` maps each symbol of A..Z to the corresponding
    /// symbol of `to_alpha`, and back.
    fn check_rotor(test_id: &str, rotor: &Rotor, to_alpha: &str) {
        let alpha = Alphabet::upper();
        assert_eq!(rotor.size(), to_alpha.chars().count(), "{} (wrong length)", test_id);
        for (ci, e) in to_alpha.chars().enumerate() {
            let ei = alpha.to_index(e).unwrap();
            assert_eq!(
                rotor.convert_forward(ci).unwrap(),
                ei,
                "{}: wrong translation of {}",
                test_id,
                ci
            );
            assert_eq!(
                rotor.convert_backward(ei).unwrap(),
                ci,
                "{}: wrong inverse of {}",
                test_id,
                ei
            );
        }
    }

    #[test]
    fn test_accessors() {
        let p = Permutation::new("(DASY)", &Alphabet::new("ASDY").unwrap()).unwrap();
        let r = Rotor::fixed("Rotor Name", p.clone());
        assert_eq!(r.name(), "Rotor Name");
        assert_eq!(r.alphabet(), p.alphabet());
        assert_eq!(r.permutation(), &p);
        assert_eq!(r.size(), 4);
        assert!(!r.rotates());
        assert!(!r.reflecting());
        assert!(!r.at_notch());
        assert_eq!(r.kind(), &RotorKind::Fixed);
    }

    #[test]
    fn test_setting_and_ring() {
        let p = Permutation::new("(DASY)", &Alphabet::new("ASDY").unwrap()).unwrap();
        let mut r = Rotor::fixed("R", p);
        assert_eq!(r.setting(), 0);
        r.set(3).unwrap();
        assert_eq!(r.setting(), 3);
        r.set_symbol('A').unwrap();
        assert_eq!(r.setting(), 0);

        assert_eq!(r.ring(), 0);
        r.set_ring(2).unwrap();
        assert_eq!(r.ring(), 2);
        r.set_ring_symbol('S').unwrap();
        assert_eq!(r.ring(), 1);

        r.reset();
        assert_eq!((r.setting(), r.ring()), (0, 0));
    }

    #[test]
    fn test_set_rejects_bad_positions() {
        let p = Permutation::new("(DASY)", &Alphabet::new("ASDY").unwrap()).unwrap();
        let mut r = Rotor::fixed("R", p);
        assert_eq!(r.set(4), Err(EnigmaError::Range { index: 4, size: 4 }));
        assert_eq!(r.set_symbol('B'), Err(EnigmaError::Lookup { symbol: 'B' }));
        assert!(matches!(r.set_ring(4), Err(EnigmaError::Range { .. })));
        assert!(matches!(r.set_ring_symbol('B'), Err(EnigmaError::Lookup { .. })));
        assert_eq!(r.setting(), 0);
        assert_eq!(r.ring(), 0);
    }

    #[test]
    fn test_convert_small_alphabet() {
        let p = Permutation::new("(DASY)", &Alphabet::new("ASDY").unwrap()).unwrap();
        let r = Rotor::fixed("R", p);
        assert_eq!(r.convert_forward(1).unwrap(), 3);
        assert_eq!(r.convert_backward(2).unwrap(), 3);
    }

    #[test]
    fn test_convert_rejects_out_of_range() {
        let r = Rotor::fixed("Beta", upper_perm(BETA));
        assert_eq!(
            r.convert_forward(26),
            Err(EnigmaError::Range { index: 26, size: 26 })
        );
        assert!(matches!(r.convert_backward(99), Err(EnigmaError::Range { .. })));
    }

    #[test]
    fn test_fixed_rotor_at_zero() {
        let r = Rotor::fixed("Beta", upper_perm(BETA));
        check_rotor("Rotor Beta (A)", &r, BETA_MAP);
    }

    #[test]
    fn test_fixed_rotor_does_not_advance() {
        let mut r = Rotor::fixed("Gamma", upper_perm(GAMMA));
        r.advance();
        assert_eq!(r.setting(), 0);
        check_rotor("Rotor Gamma advanced", &r, GAMMA_MAP);
    }

    #[test]
    fn test_setting_shifts_wiring() {
        let mut r = Rotor::fixed("Beta", upper_perm(BETA));
        r.set_symbol('B').unwrap();
        // At setting B, contact A enters wiring position B (-> E) and
        // leaves one place back: D.
        assert_eq!(r.convert_forward(0).unwrap(), 3);
    }

    #[test]
    fn test_ring_cancels_setting() {
        let mut r = Rotor::fixed("Beta", upper_perm(BETA));
        r.set(7).unwrap();
        r.set_ring(7).unwrap();
        check_rotor("Rotor Beta set H ring H", &r, BETA_MAP);
    }

    #[test]
    fn test_reversible_for_every_setting() {
        let mut r = Rotor::moving("I", upper_perm(ROTOR_I), "Q").unwrap();
        for setting in 0..26 {
            for ring in [0, 5, 25] {
                r.set(setting).unwrap();
                r.set_ring(ring).unwrap();
                for p in 0..26 {
                    let e = r.convert_forward(p).unwrap();
                    assert_eq!(r.convert_backward(e).unwrap(), p);
                }
            }
        }
    }

    #[test]
    fn test_moving_rotor_notch_and_advance() {
        let mut r = Rotor::moving("I", upper_perm(ROTOR_I), "Q").unwrap();
        assert!(r.rotates());
        assert!(!r.reflecting());
        assert!(!r.at_notch());
        r.set_symbol('Q').unwrap();
        assert!(r.at_notch());
        r.advance();
        assert!(!r.at_notch());
        assert_eq!(r.setting(), 17);
    }

    #[test]
    fn test_moving_rotor_wraps_around() {
        let mut r = Rotor::moving("I", upper_perm(ROTOR_I), "Q").unwrap();
        r.set(25).unwrap();
        r.advance();
        assert_eq!(r.setting(), 0);
    }

    #[test]
    fn test_moving_rotor_multiple_notches() {
        let mut r = Rotor::moving("VI", upper_perm(GAMMA), "ZM").unwrap();
        let notched: Vec<usize> = (0..26)
            .filter(|&s| {
                r.set(s).unwrap();
                r.at_notch()
            })
            .collect();
        assert_eq!(notched, vec![12, 25]);
    }

    #[test]
    fn test_moving_rotor_rejects_bad_notch() {
        assert!(matches!(
            Rotor::moving("I", upper_perm(ROTOR_I), "q"),
            Err(EnigmaError::Config(_))
        ));
    }

    #[test]
    fn test_reflector() {
        let r = Rotor::reflector("B", upper_perm(REFLECTOR_B)).unwrap();
        assert!(r.reflecting());
        assert!(!r.rotates());
        let mut r2 = r.clone();
        r2.advance();
        assert_eq!(r2.setting(), 0);
        assert!(!r2.at_notch());
    }

    #[test]
    fn test_reflector_requires_derangement() {
        assert!(matches!(
            Rotor::reflector("No Derangement", upper_perm("")),
            Err(EnigmaError::Config(_))
        ));
        assert!(Rotor::reflector("Half", upper_perm("(AB) (C)")).is_err());
    }

    #[test]
    fn test_display() {
        let b = Rotor::reflector("B", upper_perm(REFLECTOR_B)).unwrap();
        let beta = Rotor::fixed("Beta", upper_perm(BETA));
        let i = Rotor::moving("I", upper_perm(ROTOR_I), "Q").unwrap();
        assert_eq!(b.to_string(), "Reflector B");
        assert_eq!(beta.to_string(), "Fixed Rotor Beta");
        assert_eq!(i.to_string(), "Rotor I");
    }

    #[test]
    fn test_arena_lookup() {
        let mut arena = RotorArena::new();
        assert!(arena.is_empty());
        let b = arena
            .add(Rotor::reflector("B", upper_perm(REFLECTOR_B)).unwrap())
            .unwrap();
        let beta = arena.add(Rotor::fixed("Beta", upper_perm(BETA))).unwrap();
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.find("B"), Some(b));
        assert_eq!(arena.find("Beta"), Some(beta));
        assert_eq!(arena.find("beta"), None);
        assert_eq!(arena.get(beta).map(Rotor::name), Some("Beta"));
        assert!(arena.get(RotorId(9)).is_none());
    }

    #[test]
    fn test_arena_rejects_duplicate_names() {
        let mut arena = RotorArena::new();
        arena.add(Rotor::fixed("Beta", upper_perm(BETA))).unwrap();
        assert!(matches!(
            arena.add(Rotor::fixed("Beta", upper_perm(GAMMA))),
            Err(EnigmaError::Config(_))
        ));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_arena_from_rotors() {
        let arena = RotorArena::from_rotors(vec![
            Rotor::fixed("Beta", upper_perm(BETA)),
            Rotor::fixed("Gamma", upper_perm(GAMMA)),
        ])
        .unwrap();
        assert_eq!(arena.iter().map(Rotor::name).collect::<Vec<_>>(), ["Beta", "Gamma"]);

        let duplicated = RotorArena::from_rotors(vec![
            Rotor::fixed("Beta", upper_perm(BETA)),
            Rotor::fixed("Beta", upper_perm(GAMMA)),
        ]);
        assert!(duplicated.is_err());
    }
}
