//! Deterministic and failing key sources

use masque_crypto::{KeyGenerationError, KeySource, MaskKey};
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Key source driven by a seeded ChaCha20 RNG
///
/// Successive keys differ, but a fresh source with the same seed replays the
/// same sequence.
#[derive(Debug)]
pub struct SeededKeySource {
    rng: Mutex<ChaCha20Rng>,
}

impl SeededKeySource {
    /// New source from a seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
        }
    }
}

impl KeySource for SeededKeySource {
    fn generate(&self) -> Result<MaskKey, KeyGenerationError> {
        let mut rng = self.rng.lock().unwrap();
        MaskKey::generate_with(&mut *rng)
    }
}

/// Key source whose randomness is always exhausted
#[derive(Debug, Default)]
pub struct ExhaustedKeySource {
    attempts: AtomicUsize,
}

impl ExhaustedKeySource {
    /// New exhausted source
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of generation attempts so far
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl KeySource for ExhaustedKeySource {
    fn generate(&self) -> Result<MaskKey, KeyGenerationError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        MaskKey::generate_with(&mut ExhaustedRng)
    }
}

/// RNG that fails every fallible fill
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustedRng;

impl RngCore for ExhaustedRng {
    fn next_u32(&mut self) -> u32 {
        0
    }

    fn next_u64(&mut self) -> u64 {
        0
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(0);
    }

    fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
        Err(rand::Error::new("entropy source exhausted"))
    }
}

impl CryptoRng for ExhaustedRng {}
