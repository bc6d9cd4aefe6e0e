//! The public wire form of an encrypted value.
//!
//! ```text
//! HEX(nonce) || HEX(ciphertext + tag)
//! ```
//!
//! There is no delimiter and no version prefix. The first `nonce_size * 2`
//! characters are always the nonce; the decoder relies on the caller knowing
//! `nonce_size` rather than rediscovering the boundary.

use thiserror::Error;

/// Errors produced when parsing an encrypted string.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnvelopeError {
    /// The string is too short to contain a nonce of the requested size.
    #[error("encrypted string is shorter than the {0}-byte nonce prefix")]
    Truncated(usize),

    /// One of the two halves is not valid hex.
    #[error("invalid hex in encrypted string: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// A nonce paired with the ciphertext (including the authentication tag)
/// it was used to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Raw nonce bytes.
    pub nonce: Vec<u8>,
    /// Raw ciphertext + authentication tag bytes.
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Pair a nonce with its ciphertext.
    pub fn new(nonce: Vec<u8>, ciphertext: Vec<u8>) -> Self {
        Self { nonce, ciphertext }
    }

    /// Encode to the uppercase hex wire string.
    pub fn encode(&self) -> String {
        let mut out = hex::encode_upper(&self.nonce);
        out.push_str(&hex::encode_upper(&self.ciphertext));
        out
    }

    /// Split `encrypted` at `nonce_size * 2` hex digits and decode both halves.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Truncated`] if the string cannot hold the
    /// nonce, or [`EnvelopeError::Hex`] if either half is not valid hex.
    pub fn decode(encrypted: &str, nonce_size: usize) -> Result<Self, EnvelopeError> {
        let split = nonce_size.saturating_mul(2);
        if encrypted.len() < split || !encrypted.is_char_boundary(split) {
            return Err(EnvelopeError::Truncated(nonce_size));
        }
        let (nonce_hex, text_hex) = encrypted.split_at(split);

        Ok(Self {
            nonce: hex::decode(nonce_hex)?,
            ciphertext: hex::decode(text_hex)?,
        })
    }
}
