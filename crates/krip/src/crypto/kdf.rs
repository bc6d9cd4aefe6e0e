//! Secret-to-key derivation.
//!
//! A non-key secret is normalized to bytes, digested with SHA-256 and the
//! 32-byte digest is imported as an AES-256-GCM key restricted to a single
//! purpose. There is no salt: the same secret always yields the same key.
//! Callers who need a fresh random key use `generate_secret` instead.

use common::ProviderError;
use tracing::debug;

use crate::options::EffectiveOptions;
use crate::provider::{DigestAlgorithm, KeyUsage, KeyUsages, Providers, SymmetricKey};
use crate::secret::{normalize, Secret};

/// Digest used to turn secret bytes into key material.
///
/// Fixed, and independent of the algorithm callers pick for `hash`.
pub const KEY_DERIVATION_HASH: DigestAlgorithm = DigestAlgorithm::Sha256;

/// Produce the key for `purpose` from `secret`.
///
/// A [`Secret::Key`] is returned unchanged (its own usages still apply).
///
/// # Errors
///
/// Propagates any text-encoding, digest, or key-import failure.
pub async fn derive_key(
    secret: &Secret,
    purpose: KeyUsage,
    options: &EffectiveOptions,
    providers: &Providers,
) -> Result<SymmetricKey, ProviderError> {
    let material = match secret.material() {
        Ok(material) => material,
        Err(key) => {
            debug!(purpose = purpose.as_str(), "using prepared key");
            return Ok(key.clone());
        }
    };

    let bytes = normalize(material, options, providers.text.as_ref())?;
    let digest = providers.digest.digest(KEY_DERIVATION_HASH, &bytes).await?;
    debug!(
        purpose = purpose.as_str(),
        hash = %KEY_DERIVATION_HASH,
        "derived key material from secret"
    );
    providers
        .aead
        .import_key(&digest, KeyUsages::only(purpose))
        .await
}
