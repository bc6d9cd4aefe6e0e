//! Content hashing of arbitrary payloads.

use common::ProviderError;
use tracing::debug;

use crate::options::EffectiveOptions;
use crate::provider::{DigestAlgorithm, Providers};
use crate::secret::{normalize, Payload};

/// Algorithm used when the caller does not name one.
pub const DEFAULT_ALGORITHM: DigestAlgorithm = DigestAlgorithm::Sha256;

/// Digest `payload` and render it as lowercase hex.
///
/// Per-byte rendering, which equals rendering the digest as 32-bit
/// big-endian words zero-padded to eight digits.
///
/// Bytes are hashed as-is; text is encoded under the configured charset;
/// other values are stringified first.
///
/// # Errors
///
/// Propagates text-encoding and digest failures.
pub async fn hash_payload(
    payload: &Payload,
    algorithm: DigestAlgorithm,
    options: &EffectiveOptions,
    providers: &Providers,
) -> Result<String, ProviderError> {
    let bytes = normalize(payload.material(), options, providers.text.as_ref())?;
    let digest = providers.digest.digest(algorithm, &bytes).await?;
    debug!(%algorithm, input_len = bytes.len(), "hashed payload");
    Ok(hex::encode(digest))
}
