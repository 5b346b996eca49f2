//! Masque Crypto: the masking primitive
//!
//! A [`MaskKey`] is a ChaCha20 key and nonce generated fresh for one run.
//! Masking XORs an element with the keystream that key produces, restarted
//! for every element. That makes the transform
//!
//! - deterministic and length-preserving,
//! - equality-preserving under one key (equal inputs give equal outputs),
//! - its own inverse (masking twice with the same key restores the input).
//!
//! Masks from different keys commute, so the Client can strip its own layer
//! from a Broker-masked element without either side learning the other's key.

pub mod key;
pub mod mask;

pub use key::{KeyGenerationError, KeySource, MaskKey, OsKeySource, KEY_LEN, NONCE_LEN};
