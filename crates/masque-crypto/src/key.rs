//! Ephemeral mask keys
//!
//! A key is created at the start of a run, lives only in that run's scope and
//! is zeroized when dropped. It is neither `Clone` nor serializable.

use masque_core::PsiError;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::fmt;
use std::sync::Arc;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// ChaCha20 key length in bytes
pub const KEY_LEN: usize = 32;

/// ChaCha20 (IETF) nonce length in bytes
pub const NONCE_LEN: usize = 12;

/// Secret key material plus nonce for one protocol run
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MaskKey {
    pub(crate) key: [u8; KEY_LEN],
    pub(crate) nonce: [u8; NONCE_LEN],
}

impl MaskKey {
    /// Generate a key from the operating system RNG
    pub fn generate() -> Result<Self, KeyGenerationError> {
        Self::generate_with(&mut OsRng)
    }

    /// Generate a key from the given cryptographic RNG
    pub fn generate_with<R>(rng: &mut R) -> Result<Self, KeyGenerationError>
    where
        R: RngCore + CryptoRng + ?Sized,
    {
        let mut mask_key = Self {
            key: [0u8; KEY_LEN],
            nonce: [0u8; NONCE_LEN],
        };
        rng.try_fill_bytes(&mut mask_key.key)?;
        rng.try_fill_bytes(&mut mask_key.nonce)?;
        Ok(mask_key)
    }
}

impl fmt::Debug for MaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaskKey").finish_non_exhaustive()
    }
}

/// The randomness source could not produce key material
///
/// Retrying is not meaningful; callers report it as an internal failure.
#[derive(Debug, thiserror::Error)]
#[error("mask key generation failed: {0}")]
pub struct KeyGenerationError(String);

impl From<rand::Error> for KeyGenerationError {
    fn from(err: rand::Error) -> Self {
        Self(err.to_string())
    }
}

impl From<KeyGenerationError> for PsiError {
    fn from(err: KeyGenerationError) -> Self {
        PsiError::internal(err.to_string())
    }
}

/// Produces a fresh [`MaskKey`] on every call
///
/// Implementations must never hand out the same key twice.
pub trait KeySource: Send + Sync {
    /// Generate a new key
    fn generate(&self) -> Result<MaskKey, KeyGenerationError>;
}

/// Key source backed by the operating system RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct OsKeySource;

impl KeySource for OsKeySource {
    fn generate(&self) -> Result<MaskKey, KeyGenerationError> {
        MaskKey::generate()
    }
}

impl<K: KeySource + ?Sized> KeySource for Arc<K> {
    fn generate(&self) -> Result<MaskKey, KeyGenerationError> {
        (**self).generate()
    }
}
