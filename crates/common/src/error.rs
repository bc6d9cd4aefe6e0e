//! Error taxonomy shared across krip crates.

use std::fmt;

use thiserror::Error;

/// The public operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Encrypt,
    Decrypt,
    Hash,
}

impl Operation {
    /// Lowercase verb used in user-facing messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Encrypt => "encrypt",
            Operation::Decrypt => "decrypt",
            Operation::Hash => "hash",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Class of an underlying failure.
///
/// A [`CryptError::ProcessingFailure`] keeps this class while dropping the
/// message, so callers can tell a data error from an operation error but not
/// a bad tag from a bad key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The primitive rejected the operation itself (e.g. tag mismatch).
    Operation,
    /// The key does not permit the requested usage.
    InvalidAccess,
    /// A parameter (nonce size, key length, algorithm, charset) is unsupported.
    NotSupported,
    /// Input data is malformed (e.g. bad hex, truncated envelope).
    Data,
    /// Text could not be encoded or decoded.
    Encoding,
    /// A value could not be converted to or from its serialized form.
    Serialization,
}

/// Failure reported by a capability provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?} error: {message}")]
pub struct ProviderError {
    /// Failure class.
    pub kind: ErrorKind,
    /// Provider-specific detail. Never shown through a processing failure.
    pub message: String,
}

impl ProviderError {
    /// Construct a [`ProviderError`] from a kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotSupported, message)
    }

    pub fn invalid_access(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidAccess, message)
    }

    pub fn operation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Operation, message)
    }
}

/// The original error behind a processing failure.
///
/// Kept only for local debugging: it is printed by `Debug` but is neither part
/// of the `Display` message nor returned from `Error::source`.
pub struct Cause(Box<dyn std::error::Error + Send + Sync>);

impl Cause {
    pub fn new(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Box::new(err))
    }

    /// Borrow the wrapped error.
    pub fn get(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.0.as_ref()
    }
}

impl fmt::Debug for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cause({})", self.0)
    }
}

/// Top-level error returned by every public krip operation.
#[derive(Debug, Error)]
pub enum CryptError {
    /// The caller misused the API: missing secret, options that are not a
    /// plain mapping, or an unlisted hash algorithm. No work was performed.
    #[error("The {parameter} must be {requirement}.")]
    ContractViolation {
        parameter: &'static str,
        requirement: String,
    },

    /// Something downstream failed. The message is deliberately uniform.
    #[error("Could not {operation} this value.")]
    ProcessingFailure {
        operation: Operation,
        kind: ErrorKind,
        cause: Cause,
    },

    /// A provider failure surfaced without wrapping (key generation only).
    #[error(transparent)]
    Primitive(#[from] ProviderError),
}

impl CryptError {
    /// Build a contract violation for `parameter`.
    pub fn contract(parameter: &'static str, requirement: impl Into<String>) -> Self {
        CryptError::ContractViolation {
            parameter,
            requirement: requirement.into(),
        }
    }

    /// Wrap `cause` as a uniform processing failure for `operation`.
    pub fn processing(
        operation: Operation,
        kind: ErrorKind,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        CryptError::ProcessingFailure {
            operation,
            kind,
            cause: Cause::new(cause),
        }
    }

    /// Failure class, if this error carries one.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            CryptError::ContractViolation { .. } => None,
            CryptError::ProcessingFailure { kind, .. } => Some(*kind),
            CryptError::Primitive(e) => Some(e.kind),
        }
    }

    /// Returns `true` for caller misuse.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, CryptError::ContractViolation { .. })
    }

    /// Returns `true` for a wrapped downstream failure.
    pub fn is_processing_failure(&self) -> bool {
        matches!(self, CryptError::ProcessingFailure { .. })
    }

    /// The original error behind a processing failure, for local logging only.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            CryptError::ProcessingFailure { cause, .. } => Some(cause.get()),
            _ => None,
        }
    }
}
