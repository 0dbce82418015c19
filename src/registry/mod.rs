//! Curve and hash registries
//!
//! Immutable lookup tables mapping the one-byte identifiers stored in a
//! container header to the curve and key-derivation function they stand for.
//! Lookups never fail loudly: unknown input yields a sentinel and the caller
//! decides which error to raise.

pub mod curves;
pub mod hashes;

pub use curves::{Curve, CurveId};
pub use hashes::{HashId, Kdf};
