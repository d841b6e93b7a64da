//! Enigma-style rotor cipher machine.
//!
//! A machine maps each symbol of a configurable alphabet through a
//! plugboard, a stack of rotors and a reflector, then back out again. The
//! rotors step with a pawl-and-notch ratchet (including the double step of
//! the middle rotors), so the mapping changes on every keypress while
//! staying its own inverse: feeding ciphertext through an identically set
//! machine recovers the plaintext.
//!
//! # Architecture
//!
//! ```text
//! Alphabet     (ordered symbol set, index <-> symbol)
//!     ↓
//! Permutation  (bijection in cycle notation)
//!     ↓
//! Rotor        (permutation + setting + ring; reflector, fixed or moving)
//!     ↓ stored in a RotorArena, addressed by RotorId
//! Machine      (slots + plugboard + ratchet)
//!     ↓
//! config / session  (text configuration and message streams)
//! ```
//!
//! # Examples
//!
//! Build a machine from configuration text and encipher a message:
//!
//! ```
//! use enigma::read_config;
//!
//! let config = "\
//! ABCDEFGHIJKLMNOPQRSTUVWXYZ
//! 5 3
//! I    MQ (AELTPHQXRU) (BKNW) (CMOY) (DFG) (IV) (JZ) (S)
//! III  MV (ABDHPEJT) (CFLVMZOYQIRWUKXSG) (N)
//! IV   MJ (AEPLIYWCOXMRFZBSTGJQNH) (DV) (KU)
//! Beta N  (ALBEVFCYODJWUGNMQTZSKPR) (HIX)
//! B    R  (AE) (BN) (CK) (DQ) (FU) (GY) (HW) (IJ) (LO) (MP) (RX) (SZ) (TV)
//! ";
//!
//! let mut machine = read_config(config).unwrap();
//! machine.insert_rotors(&["B", "Beta", "III", "IV", "I"]).unwrap();
//! machine.set_rotors("AXLE").unwrap();
//! assert_eq!(machine.convert_message("HELLOWORLD").unwrap(), "FHVGJZUKSG");
//!
//! // Same settings, ciphertext in, plaintext out.
//! machine.set_rotors("AXLE").unwrap();
//! assert_eq!(machine.convert_message("FHVGJZUKSG").unwrap(), "HELLOWORLD");
//! ```

#![deny(clippy::all)]

pub mod alphabet;
pub mod config;
pub mod error;
pub mod machine;
pub mod permutation;
pub mod rotor;
pub mod session;
pub mod utils;

pub use alphabet::Alphabet;
pub use config::{read_config, MachineConfig};
pub use error::{EnigmaError, Result};
pub use machine::Machine;
pub use permutation::Permutation;
pub use rotor::{Rotor, RotorArena, RotorId, RotorKind};
pub use session::{process, Settings};
