//! The encryption pipeline stages orchestrated by [`crate::Krip`].
//!
//! - [`kdf`]: secret -> purpose-bound AES-GCM key (SHA-256 of the secret).
//! - [`cipher`]: seal/open with a fresh random nonce and a 128-bit tag.
//! - [`hasher`]: payload -> lowercase hex digest.
//!
//! # Ciphertext format
//!
//! ```text
//! HEX(nonce) || HEX(ciphertext+tag)
//! ```
//!
//! See [`common::protocol`] for the envelope codec.

pub mod cipher;
pub mod hasher;
pub mod kdf;

pub use cipher::TAG_LEN;
pub use hasher::DEFAULT_ALGORITHM;
pub use kdf::KEY_DERIVATION_HASH;
