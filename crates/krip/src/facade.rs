//! [`Krip`]: the public entry point.
//!
//! Each operation validates its inputs, resolves options, and runs the
//! pipeline stages in [`crate::crypto`]. Downstream failures are reported as a
//! uniform [`CryptError::ProcessingFailure`] so callers cannot tell a bad tag
//! from a bad key or malformed input.

use std::sync::Arc;

use common::protocol::EnvelopeError;
use common::{CryptError, Envelope, ErrorKind, Operation, ProviderError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ConfigError, Defaults};
use crate::crypto::{cipher, hasher, kdf};
use crate::options::{EffectiveOptions, Overrides};
use crate::provider::{DigestAlgorithm, KeyUsage, KeyUsages, Providers, SymmetricKey};
use crate::secret::{Payload, Secret};

/// Anything that can go wrong after validation. Never shown to callers
/// except through its [`ErrorKind`].
#[derive(Debug, Error)]
enum Failure {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Failure {
    fn kind(&self) -> ErrorKind {
        match self {
            Failure::Provider(e) => e.kind,
            Failure::Envelope(_) => ErrorKind::Data,
            Failure::Serialization(_) => ErrorKind::Serialization,
        }
    }

    fn into_crypt_error(self, operation: Operation) -> CryptError {
        let kind = self.kind();
        warn!(%operation, ?kind, "operation failed");
        debug!(%operation, cause = %self, "failure cause");
        CryptError::processing(operation, kind, self)
    }
}

/// Encrypts, decrypts, and hashes values.
///
/// Holds only read-only, `Arc`-shared state, so it is cheap to clone and
/// safe to use from many tasks at once.
#[derive(Clone, Debug, Default)]
pub struct Krip {
    providers: Providers,
    defaults: Arc<Defaults>,
}

impl Krip {
    /// Create an instance running on `providers` with `defaults`.
    pub fn new(providers: Providers, defaults: Defaults) -> Self {
        Self {
            providers,
            defaults: Arc::new(defaults),
        }
    }

    /// Default providers with defaults loaded from `KRIP_*` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment holds invalid defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(Providers::default(), Defaults::from_env()?))
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn providers(&self) -> &Providers {
        &self.providers
    }

    fn resolve(&self, overrides: Option<&Overrides>) -> EffectiveOptions {
        EffectiveOptions::resolve(&self.defaults, overrides)
    }

    /// Encrypt `value` with `secret`, returning the hex envelope.
    ///
    /// # Errors
    ///
    /// - Contract violation if `secret` is empty or otherwise falsy.
    /// - `Could not encrypt this value.` for any downstream failure.
    pub async fn encrypt<T>(
        &self,
        value: &T,
        secret: &Secret,
        overrides: Option<&Overrides>,
    ) -> Result<String, CryptError>
    where
        T: Serialize + ?Sized,
    {
        ensure_secret(secret)?;
        let options = self.resolve(overrides);
        let value = serde_json::to_value(value)
            .map_err(|e| Failure::from(e).into_crypt_error(Operation::Encrypt))?;

        self.seal_value(&value, secret, &options)
            .await
            .map_err(|f| f.into_crypt_error(Operation::Encrypt))
    }

    async fn seal_value(
        &self,
        value: &Value,
        secret: &Secret,
        options: &EffectiveOptions,
    ) -> Result<String, Failure> {
        let key = kdf::derive_key(secret, KeyUsage::Encrypt, options, &self.providers).await?;
        let text = options.stringify(value);
        let plaintext = self.providers.text.encode(options.charset(), &text)?;
        let envelope = cipher::seal(&key, &plaintext, options, &self.providers).await?;
        Ok(envelope.encode())
    }

    /// Decrypt a hex envelope produced by [`Krip::encrypt`].
    ///
    /// The result is whatever the configured parser makes of the plaintext:
    /// JSON by default, or the raw text as a string if it is not JSON.
    ///
    /// # Errors
    ///
    /// - Contract violation if `secret` is empty or otherwise falsy.
    /// - `Could not decrypt this value.` for any downstream failure,
    ///   including a wrong secret or tampered input.
    pub async fn decrypt(
        &self,
        encrypted: &str,
        secret: &Secret,
        overrides: Option<&Overrides>,
    ) -> Result<Value, CryptError> {
        ensure_secret(secret)?;
        let options = self.resolve(overrides);

        self.open_value(encrypted, secret, &options)
            .await
            .map_err(|f| f.into_crypt_error(Operation::Decrypt))
    }

    /// [`Krip::decrypt`] followed by conversion into `T`.
    ///
    /// # Errors
    ///
    /// As [`Krip::decrypt`]; a failed conversion is also reported as
    /// `Could not decrypt this value.`
    pub async fn decrypt_as<T>(
        &self,
        encrypted: &str,
        secret: &Secret,
        overrides: Option<&Overrides>,
    ) -> Result<T, CryptError>
    where
        T: DeserializeOwned,
    {
        let value = self.decrypt(encrypted, secret, overrides).await?;
        serde_json::from_value(value)
            .map_err(|e| Failure::from(e).into_crypt_error(Operation::Decrypt))
    }

    async fn open_value(
        &self,
        encrypted: &str,
        secret: &Secret,
        options: &EffectiveOptions,
    ) -> Result<Value, Failure> {
        let key = kdf::derive_key(secret, KeyUsage::Decrypt, options, &self.providers).await?;
        let envelope = Envelope::decode(encrypted, options.nonce_size())?;
        let plaintext = cipher::open(&key, &envelope, &self.providers).await?;
        let text = self.providers.text.decode(options.charset(), &plaintext)?;
        Ok(options.parse(&text))
    }

    /// Generate a fresh random key of `key_length` bits, usable for both
    /// encryption and decryption. Pass it back as [`Secret::Key`].
    ///
    /// # Errors
    ///
    /// Provider failures (e.g. an unsupported key length) are returned
    /// unwrapped as [`CryptError::Primitive`].
    pub async fn generate_secret(
        &self,
        overrides: Option<&Overrides>,
    ) -> Result<SymmetricKey, CryptError> {
        let options = self.resolve(overrides);
        let key = self
            .providers
            .aead
            .generate_key(options.key_length(), KeyUsages::BOTH)
            .await?;
        debug!(key_length = options.key_length(), "generated secret");
        Ok(key)
    }

    /// Hash `payload` with `algorithm` (default `SHA-256`), returning
    /// lowercase hex.
    ///
    /// # Errors
    ///
    /// - Contract violation if `algorithm` is not one of `SHA-1`, `SHA-256`,
    ///   `SHA-384`, `SHA-512` (case-insensitive).
    /// - `Could not hash this value.` for any downstream failure.
    pub async fn hash(
        &self,
        payload: impl Into<Payload>,
        algorithm: Option<&str>,
        overrides: Option<&Overrides>,
    ) -> Result<String, CryptError> {
        let algorithm = match algorithm {
            Some(name) => name.parse::<DigestAlgorithm>().map_err(|_| {
                CryptError::contract("algorithm", format!("one of {}", allowed_algorithms()))
            })?,
            None => hasher::DEFAULT_ALGORITHM,
        };
        let options = self.resolve(overrides);
        let payload = payload.into();

        hasher::hash_payload(&payload, algorithm, &options, &self.providers)
            .await
            .map_err(|e| Failure::from(e).into_crypt_error(Operation::Hash))
    }
}

fn ensure_secret(secret: &Secret) -> Result<(), CryptError> {
    if secret.is_provided() {
        Ok(())
    } else {
        Err(CryptError::contract("secret", "provided"))
    }
}

/// `"SHA-1", "SHA-256", "SHA-384", "SHA-512"`
fn allowed_algorithms() -> String {
    DigestAlgorithm::ALL
        .iter()
        .map(|alg| format!("\"{}\"", alg.name()))
        .collect::<Vec<_>>()
        .join(", ")
}
