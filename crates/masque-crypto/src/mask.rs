//! Equality-preserving, self-inverse masking
//!
//! Every element gets its own ChaCha20 instance starting at block 0, so the
//! keystream byte XORed into offset `i` depends only on the key and `i`, never
//! on where the element sits in a batch.

use crate::key::MaskKey;
use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::{ChaCha20, Key, Nonce};
use masque_core::{Element, MaskedElement};

impl MaskKey {
    /// Mask `buf` in place
    ///
    /// Applying the same key twice restores the original bytes.
    pub fn apply_in_place(&self, buf: &mut [u8]) {
        let mut cipher = ChaCha20::new(Key::from_slice(&self.key), Nonce::from_slice(&self.nonce));
        cipher.apply_keystream(buf);
    }

    /// Mask `element`, returning a fresh buffer of the same length
    pub fn apply(&self, element: &[u8]) -> Vec<u8> {
        let mut out = element.to_vec();
        self.apply_in_place(&mut out);
        out
    }

    /// Mask a plaintext element
    pub fn mask(&self, element: &Element) -> MaskedElement {
        MaskedElement::new(self.apply(element.as_bytes()))
    }

    /// Mask a batch of plaintext elements, preserving order
    pub fn mask_all(&self, elements: &[Element]) -> Vec<MaskedElement> {
        elements.iter().map(|element| self.mask(element)).collect()
    }

    /// Add (or strip) this key's layer on an already masked element
    pub fn remask(&self, mut masked: MaskedElement) -> MaskedElement {
        self.apply_in_place(masked.as_mut_bytes());
        masked
    }

    /// [`remask`](Self::remask) over a batch, preserving order
    pub fn remask_all(&self, masked: Vec<MaskedElement>) -> Vec<MaskedElement> {
        masked.into_iter().map(|m| self.remask(m)).collect()
    }
}
