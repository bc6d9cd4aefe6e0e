//! AES-GCM seal/open around a fresh random nonce.
//!
//! **Never reuse a nonce with the same key.** GCM nonce reuse breaks both
//! confidentiality and authentication, so [`seal`] draws a new nonce from the
//! random source on every call.

use common::{Envelope, ProviderError};
use tracing::debug;

use crate::options::EffectiveOptions;
use crate::provider::{Providers, SymmetricKey};

/// Byte length of the GCM authentication tag (128 bits).
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` under `key` with a fresh `options.nonce_size()`-byte
/// nonce.
///
/// # Errors
///
/// Returns the provider error if randomness, key usage, nonce size, or the
/// cipher itself fails.
pub async fn seal(
    key: &SymmetricKey,
    plaintext: &[u8],
    options: &EffectiveOptions,
    providers: &Providers,
) -> Result<Envelope, ProviderError> {
    let mut nonce = vec![0u8; options.nonce_size()];
    providers.random.fill(&mut nonce)?;

    let ciphertext = providers.aead.seal(key, &nonce, &[], plaintext).await?;
    debug!(
        nonce_size = nonce.len(),
        plaintext_len = plaintext.len(),
        ciphertext_len = ciphertext.len(),
        "sealed"
    );
    Ok(Envelope::new(nonce, ciphertext))
}

/// Verify and decrypt `envelope` under `key`.
///
/// # Errors
///
/// Returns the provider error on tag mismatch, wrong key, or a key that does
/// not permit decryption.
pub async fn open(
    key: &SymmetricKey,
    envelope: &Envelope,
    providers: &Providers,
) -> Result<Vec<u8>, ProviderError> {
    let plaintext = providers
        .aead
        .open(key, &envelope.nonce, &[], &envelope.ciphertext)
        .await?;
    debug!(
        nonce_size = envelope.nonce.len(),
        plaintext_len = plaintext.len(),
        "opened"
    );
    Ok(plaintext)
}
