//! Encrypt, decrypt and hash serializable values.
//!
//! ```no_run
//! # async fn run() -> Result<(), krip::CryptError> {
//! use krip::{Krip, Secret};
//! use serde_json::json;
//!
//! let krip = Krip::default();
//! let secret = Secret::from("MY_SPECIAL_KEY");
//!
//! let encrypted = krip.encrypt(&json!({"some": "data"}), &secret, None).await?;
//! let decrypted = krip.decrypt(&encrypted, &secret, None).await?;
//! assert_eq!(decrypted, json!({"some": "data"}));
//!
//! let digest = krip.hash(json!({"some": "data"}), None, None).await?;
//! assert_eq!(digest.len(), 64);
//! # Ok(())
//! # }
//! ```
//!
//! Encryption is AES-GCM under a key derived from the SHA-256 digest of the
//! secret, with a fresh random nonce per call. The output is
//! `HEX(nonce) || HEX(ciphertext + tag)`.

pub mod config;
pub mod crypto;
pub mod facade;
pub mod options;
pub mod provider;
pub mod secret;

pub use common::{CryptError, Envelope, ErrorKind, Operation, ProviderError};
pub use config::{ConfigError, Defaults};
pub use facade::Krip;
pub use options::{EffectiveOptions, Overrides};
pub use provider::{
    AeadProvider, DigestAlgorithm, DigestProvider, KeyAlgorithm, KeyUsage, KeyUsages, Providers,
    RandomSource, RustCryptoProvider, SymmetricKey, TextCodec,
};
pub use secret::{Payload, Secret};
