//! Capability providers: the primitives the pipeline orchestrates but does
//! not implement.
//!
//! Every facade call goes through a [`Providers`] bundle:
//! - [`AeadProvider`]: AES-GCM key import/generation, seal and open.
//! - [`DigestProvider`]: SHA-family digests.
//! - [`RandomSource`]: cryptographically secure random bytes.
//! - [`TextCodec`]: text <-> bytes under a named charset.
//!
//! The default bundle is backed by [`RustCryptoProvider`]. Tests swap in
//! mocks of the individual traits.

pub mod key;
pub mod rust_crypto;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use common::ProviderError;

pub use key::{KeyAlgorithm, KeyUsage, KeyUsages, SymmetricKey, AES_GCM};
pub use rust_crypto::RustCryptoProvider;

/// Digest algorithms accepted by [`DigestProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    /// All supported algorithms, in allow-list order.
    pub const ALL: [DigestAlgorithm; 4] = [
        DigestAlgorithm::Sha1,
        DigestAlgorithm::Sha256,
        DigestAlgorithm::Sha384,
        DigestAlgorithm::Sha512,
    ];

    /// Canonical uppercase name, e.g. `"SHA-256"`.
    pub fn name(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha1 => "SHA-1",
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Sha384 => "SHA-384",
            DigestAlgorithm::Sha512 => "SHA-512",
        }
    }

    /// Digest size in bytes.
    pub fn output_len(self) -> usize {
        match self {
            DigestAlgorithm::Sha1 => 20,
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha384 => 48,
            DigestAlgorithm::Sha512 => 64,
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when an algorithm name is not on the allow-list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported digest algorithm: {0}")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for DigestAlgorithm {
    type Err = UnknownAlgorithm;

    /// Case-insensitive match against [`DigestAlgorithm::ALL`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DigestAlgorithm::ALL
            .into_iter()
            .find(|alg| alg.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownAlgorithm(s.to_owned()))
    }
}

/// Authenticated encryption with AES-GCM and a 128-bit tag.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AeadProvider: Send + Sync {
    /// Import `raw` bytes as a non-extractable key restricted to `usages`.
    async fn import_key(&self, raw: &[u8], usages: KeyUsages)
        -> Result<SymmetricKey, ProviderError>;

    /// Generate a fresh random key of `length_bits` bits.
    async fn generate_key(
        &self,
        length_bits: usize,
        usages: KeyUsages,
    ) -> Result<SymmetricKey, ProviderError>;

    /// Encrypt `plaintext`, returning ciphertext with the tag appended.
    async fn seal(
        &self,
        key: &SymmetricKey,
        nonce: &[u8],
        aad: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, ProviderError>;

    /// Verify the tag and decrypt `ciphertext`.
    async fn open(
        &self,
        key: &SymmetricKey,
        nonce: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, ProviderError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DigestProvider: Send + Sync {
    async fn digest(
        &self,
        algorithm: DigestAlgorithm,
        data: &[u8],
    ) -> Result<Vec<u8>, ProviderError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait RandomSource: Send + Sync {
    /// Fill `dest` with cryptographically secure random bytes.
    fn fill(&self, dest: &mut [u8]) -> Result<(), ProviderError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait TextCodec: Send + Sync {
    fn encode(&self, charset: &str, text: &str) -> Result<Vec<u8>, ProviderError>;

    fn decode(&self, charset: &str, bytes: &[u8]) -> Result<String, ProviderError>;
}

/// The set of capabilities a [`crate::Krip`] instance runs on.
///
/// All members are `Arc`-shared, so cloning the bundle is cheap.
#[derive(Clone)]
pub struct Providers {
    pub aead: Arc<dyn AeadProvider>,
    pub digest: Arc<dyn DigestProvider>,
    pub random: Arc<dyn RandomSource>,
    pub text: Arc<dyn TextCodec>,
}

impl Providers {
    /// Bundle backed entirely by [`RustCryptoProvider`].
    pub fn rust_crypto() -> Self {
        let provider = Arc::new(RustCryptoProvider::new());
        Self {
            aead: provider.clone(),
            digest: provider.clone(),
            random: provider.clone(),
            text: provider,
        }
    }

    pub fn with_aead(mut self, aead: Arc<dyn AeadProvider>) -> Self {
        self.aead = aead;
        self
    }

    pub fn with_digest(mut self, digest: Arc<dyn DigestProvider>) -> Self {
        self.digest = digest;
        self
    }

    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub fn with_text(mut self, text: Arc<dyn TextCodec>) -> Self {
        self.text = text;
        self
    }
}

impl Default for Providers {
    fn default() -> Self {
        Self::rust_crypto()
    }
}

impl fmt::Debug for Providers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Providers { .. }")
    }
}
