//! Shared text helpers used by the cipher core and the session driver.

pub mod text;
