//! Default capability provider built on the RustCrypto crates.
//!
//! - AES-GCM via `aes-gcm` for 128/192/256-bit keys and 12- or 16-byte nonces.
//! - SHA-1 via `sha1`, SHA-2 via `sha2`.
//! - Randomness from the OS CSPRNG.
//! - UTF-8 text only.

use std::fmt;

use aes_gcm::aead::consts::{U12, U16};
use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, Nonce, OsRng, Payload};
use aes_gcm::aes::{Aes128, Aes192, Aes256};
use aes_gcm::AesGcm;
use async_trait::async_trait;
use common::{ErrorKind, ProviderError};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

use super::{
    AeadProvider, DigestAlgorithm, DigestProvider, KeyUsage, KeyUsages, RandomSource,
    SymmetricKey, TextCodec,
};

/// Charset labels that resolve to UTF-8, compared case-insensitively.
const UTF8_LABELS: [&str; 3] = ["utf-8", "utf8", "unicode-1-1-utf-8"];

/// Key material held behind a [`SymmetricKey`] handle.
///
/// Private to this module, so the bytes cannot be read back by callers.
/// Zeroed on drop.
struct RawKey(Box<[u8]>);

impl Drop for RawKey {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl fmt::Debug for RawKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RawKey([REDACTED])")
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Seal,
    Open,
}

/// RustCrypto-backed implementation of every provider trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCryptoProvider;

impl RustCryptoProvider {
    pub fn new() -> Self {
        Self
    }

    fn make_key(raw: &[u8], usages: KeyUsages) -> SymmetricKey {
        SymmetricKey::from_handle(raw.len() * 8, usages, RawKey(raw.into()))
    }

    fn raw_key(key: &SymmetricKey, usage: KeyUsage) -> Result<&[u8], ProviderError> {
        if !key.usages().allows(usage) {
            return Err(ProviderError::invalid_access(format!(
                "key does not permit {}",
                usage.as_str()
            )));
        }
        key.handle::<RawKey>()
            .map(|raw| &raw.0[..])
            .ok_or_else(|| ProviderError::invalid_access("key was not created by this provider"))
    }

    fn run(
        direction: Direction,
        raw: &[u8],
        nonce: &[u8],
        aad: &[u8],
        data: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        match (raw.len(), nonce.len()) {
            (16, 12) => apply::<AesGcm<Aes128, U12>>(direction, raw, nonce, aad, data),
            (24, 12) => apply::<AesGcm<Aes192, U12>>(direction, raw, nonce, aad, data),
            (32, 12) => apply::<AesGcm<Aes256, U12>>(direction, raw, nonce, aad, data),
            (16, 16) => apply::<AesGcm<Aes128, U16>>(direction, raw, nonce, aad, data),
            (24, 16) => apply::<AesGcm<Aes192, U16>>(direction, raw, nonce, aad, data),
            (32, 16) => apply::<AesGcm<Aes256, U16>>(direction, raw, nonce, aad, data),
            (16 | 24 | 32, n) => Err(ProviderError::not_supported(format!(
                "nonce size {n} bytes is not supported (use 12 or 16)"
            ))),
            (k, _) => Err(ProviderError::new(
                ErrorKind::Data,
                format!("invalid AES key length: {k} bytes"),
            )),
        }
    }
}

/// Run one AEAD operation. The caller guarantees `raw` and `nonce` lengths
/// match `C`.
fn apply<C>(
    direction: Direction,
    raw: &[u8],
    nonce: &[u8],
    aad: &[u8],
    data: &[u8],
) -> Result<Vec<u8>, ProviderError>
where
    C: Aead + AeadCore + KeyInit,
{
    let cipher = C::new_from_slice(raw)
        .map_err(|_| ProviderError::new(ErrorKind::Data, "invalid AES key length"))?;
    let nonce = Nonce::<C>::from_slice(nonce);
    let payload = Payload { msg: data, aad };

    match direction {
        Direction::Seal => cipher.encrypt(nonce, payload),
        Direction::Open => cipher.decrypt(nonce, payload),
    }
    .map_err(|_| ProviderError::operation("aead operation failed"))
}

fn check_key_length(length_bits: usize) -> Result<(), ProviderError> {
    match length_bits {
        128 | 192 | 256 => Ok(()),
        other => Err(ProviderError::not_supported(format!(
            "AES key length must be 128, 192 or 256 bits (got {other})"
        ))),
    }
}

fn ensure_utf8(charset: &str) -> Result<(), ProviderError> {
    let label = charset.trim();
    if UTF8_LABELS.iter().any(|l| l.eq_ignore_ascii_case(label)) {
        Ok(())
    } else {
        Err(ProviderError::new(
            ErrorKind::Encoding,
            format!("unsupported charset: {charset}"),
        ))
    }
}

#[async_trait]
impl AeadProvider for RustCryptoProvider {
    async fn import_key(
        &self,
        raw: &[u8],
        usages: KeyUsages,
    ) -> Result<SymmetricKey, ProviderError> {
        check_key_length(raw.len() * 8)
            .map_err(|_| ProviderError::new(ErrorKind::Data, "invalid AES key length"))?;
        Ok(Self::make_key(raw, usages))
    }

    async fn generate_key(
        &self,
        length_bits: usize,
        usages: KeyUsages,
    ) -> Result<SymmetricKey, ProviderError> {
        check_key_length(length_bits)?;
        let mut raw = vec![0u8; length_bits / 8];
        self.fill(&mut raw)?;
        let key = Self::make_key(&raw, usages);
        raw.iter_mut().for_each(|b| *b = 0);
        Ok(key)
    }

    async fn seal(
        &self,
        key: &SymmetricKey,
        nonce: &[u8],
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        let raw = Self::raw_key(key, KeyUsage::Encrypt)?;
        Self::run(Direction::Seal, raw, nonce, aad, plaintext)
    }

    async fn open(
        &self,
        key: &SymmetricKey,
        nonce: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        let raw = Self::raw_key(key, KeyUsage::Decrypt)?;
        Self::run(Direction::Open, raw, nonce, aad, ciphertext)
    }
}

#[async_trait]
impl DigestProvider for RustCryptoProvider {
    async fn digest(
        &self,
        algorithm: DigestAlgorithm,
        data: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        let out = match algorithm {
            DigestAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
            DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            DigestAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
            DigestAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        };
        Ok(out)
    }
}

impl RandomSource for RustCryptoProvider {
    fn fill(&self, dest: &mut [u8]) -> Result<(), ProviderError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| ProviderError::operation(format!("OS random source failed: {e}")))
    }
}

impl TextCodec for RustCryptoProvider {
    fn encode(&self, charset: &str, text: &str) -> Result<Vec<u8>, ProviderError> {
        ensure_utf8(charset)?;
        Ok(text.as_bytes().to_vec())
    }

    /// Invalid sequences decode to U+FFFD rather than failing.
    fn decode(&self, charset: &str, bytes: &[u8]) -> Result<String, ProviderError> {
        ensure_utf8(charset)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}
