//! Error taxonomy and wire envelope shared across krip crates.

pub mod error;
pub mod protocol;

pub use error::{CryptError, ErrorKind, Operation, ProviderError};
pub use protocol::Envelope;
