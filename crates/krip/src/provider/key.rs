//! [`SymmetricKey`]: opaque, capability-typed AES-GCM key handle.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Algorithm name reported by every key krip produces.
pub const AES_GCM: &str = "AES-GCM";

/// A single operation a key may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyUsage {
    Encrypt,
    Decrypt,
}

impl KeyUsage {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyUsage::Encrypt => "encrypt",
            KeyUsage::Decrypt => "decrypt",
        }
    }
}

/// The set of operations a key permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyUsages {
    encrypt: bool,
    decrypt: bool,
}

impl KeyUsages {
    /// Usable for both directions; what freshly generated keys carry.
    pub const BOTH: KeyUsages = KeyUsages {
        encrypt: true,
        decrypt: true,
    };

    /// Restrict to exactly one usage.
    pub fn only(usage: KeyUsage) -> Self {
        match usage {
            KeyUsage::Encrypt => KeyUsages {
                encrypt: true,
                decrypt: false,
            },
            KeyUsage::Decrypt => KeyUsages {
                encrypt: false,
                decrypt: true,
            },
        }
    }

    pub fn allows(&self, usage: KeyUsage) -> bool {
        match usage {
            KeyUsage::Encrypt => self.encrypt,
            KeyUsage::Decrypt => self.decrypt,
        }
    }

    /// Usage names in alphabetical order, e.g. `["decrypt", "encrypt"]`.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::with_capacity(2);
        if self.decrypt {
            names.push(KeyUsage::Decrypt.as_str());
        }
        if self.encrypt {
            names.push(KeyUsage::Encrypt.as_str());
        }
        names
    }
}

impl From<KeyUsage> for KeyUsages {
    fn from(usage: KeyUsage) -> Self {
        KeyUsages::only(usage)
    }
}

/// Algorithm parameters of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyAlgorithm {
    /// Always [`AES_GCM`].
    pub name: &'static str,
    /// Key length in bits.
    pub length: usize,
}

/// An opaque symmetric key.
///
/// The key material lives behind a provider-specific handle and cannot be
/// read back through this type; keys are never extractable. Cloning is cheap
/// and shares the handle, so a caller may generate a key once and reuse it
/// across many operations.
#[derive(Clone)]
pub struct SymmetricKey {
    algorithm: KeyAlgorithm,
    usages: KeyUsages,
    handle: Arc<dyn Any + Send + Sync>,
}

impl SymmetricKey {
    /// Wrap a provider-specific `handle` as a key of `length_bits` bits.
    ///
    /// Only the provider that created the handle can use it again (see
    /// [`SymmetricKey::handle`]).
    pub fn from_handle<H>(length_bits: usize, usages: KeyUsages, handle: H) -> Self
    where
        H: Any + Send + Sync,
    {
        Self {
            algorithm: KeyAlgorithm {
                name: AES_GCM,
                length: length_bits,
            },
            usages,
            handle: Arc::new(handle),
        }
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// Always `false`.
    pub fn extractable(&self) -> bool {
        false
    }

    /// Always `"secret"`.
    pub fn key_type(&self) -> &'static str {
        "secret"
    }

    pub fn usages(&self) -> KeyUsages {
        self.usages
    }

    /// Downcast the handle to the provider type that created it.
    pub fn handle<H: Any>(&self) -> Option<&H> {
        self.handle.downcast_ref::<H>()
    }

    /// Returns `true` if both keys share the same underlying handle.
    pub fn same_key(&self, other: &SymmetricKey) -> bool {
        Arc::ptr_eq(&self.handle, &other.handle)
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("algorithm", &self.algorithm)
            .field("extractable", &false)
            .field("type", &self.key_type())
            .field("usages", &self.usages.names())
            .finish_non_exhaustive()
    }
}
