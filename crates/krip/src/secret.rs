//! Secrets and hashable payloads, and their normalization to bytes.

use std::borrow::Cow;
use std::fmt;

use common::ProviderError;
use serde::Serialize;
use serde_json::Value;

use crate::options::EffectiveOptions;
use crate::provider::{SymmetricKey, TextCodec};

/// What a caller encrypts or decrypts with.
///
/// Anything but [`Secret::Key`] is turned into a key by digesting its bytes
/// (see [`crate::crypto::kdf`]). A [`Secret::Key`] is used as-is, which lets
/// callers reuse a key from [`crate::Krip::generate_secret`].
#[derive(Clone)]
pub enum Secret {
    /// Password-like text, encoded under the configured charset.
    Text(String),
    /// Raw bytes, used unchanged.
    Bytes(Vec<u8>),
    /// Any other value, stringified and then encoded. A JSON string is
    /// treated like [`Secret::Text`].
    Value(Value),
    /// A ready-made key.
    Key(SymmetricKey),
}

impl Secret {
    /// Returns `false` for empty text and the JSON values `null`, `false`,
    /// `0` and `""`. Byte buffers always count, even when empty.
    pub fn is_provided(&self) -> bool {
        match self {
            Secret::Text(s) => !s.is_empty(),
            Secret::Bytes(_) => true,
            Secret::Value(v) => !is_falsy(v),
            Secret::Key(_) => true,
        }
    }

    /// The contents to normalize, or the prepared key itself.
    pub(crate) fn material(&self) -> Result<Material<'_>, &SymmetricKey> {
        match self {
            Secret::Text(s) => Ok(Material::Text(s)),
            Secret::Bytes(b) => Ok(Material::Bytes(b)),
            Secret::Value(v) => Ok(Material::of_value(v)),
            Secret::Key(k) => Err(k),
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret material.
        match self {
            Secret::Text(_) => f.write_str("Secret::Text([REDACTED])"),
            Secret::Bytes(_) => f.write_str("Secret::Bytes([REDACTED])"),
            Secret::Value(_) => f.write_str("Secret::Value([REDACTED])"),
            Secret::Key(k) => f.debug_tuple("Secret::Key").field(k).finish(),
        }
    }
}

impl From<&str> for Secret {
    fn from(s: &str) -> Self {
        Secret::Text(s.to_owned())
    }
}

impl From<String> for Secret {
    fn from(s: String) -> Self {
        Secret::Text(s)
    }
}

impl From<&[u8]> for Secret {
    fn from(b: &[u8]) -> Self {
        Secret::Bytes(b.to_vec())
    }
}

impl From<Vec<u8>> for Secret {
    fn from(b: Vec<u8>) -> Self {
        Secret::Bytes(b)
    }
}

impl From<Value> for Secret {
    fn from(v: Value) -> Self {
        Secret::Value(v)
    }
}

impl From<SymmetricKey> for Secret {
    fn from(k: SymmetricKey) -> Self {
        Secret::Key(k)
    }
}

/// A value to hash.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Hashed as its encoded text, without JSON quoting.
    Text(String),
    /// Hashed as-is.
    Bytes(Vec<u8>),
    /// Stringified, then encoded. A JSON string is hashed like
    /// [`Payload::Text`].
    Value(Value),
}

impl Payload {
    /// Convert any serializable value into a [`Payload::Value`].
    pub fn json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Self> {
        serde_json::to_value(value).map(Payload::Value)
    }

    pub(crate) fn material(&self) -> Material<'_> {
        match self {
            Payload::Text(s) => Material::Text(s),
            Payload::Bytes(b) => Material::Bytes(b),
            Payload::Value(v) => Material::of_value(v),
        }
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Text(s.to_owned())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Text(s)
    }
}

impl From<&[u8]> for Payload {
    fn from(b: &[u8]) -> Self {
        Payload::Bytes(b.to_vec())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(b: Vec<u8>) -> Self {
        Payload::Bytes(b)
    }
}

impl From<Value> for Payload {
    fn from(v: Value) -> Self {
        Payload::Value(v)
    }
}

/// Borrowed view over secret or payload contents before encoding.
#[derive(Clone, Copy)]
pub(crate) enum Material<'a> {
    Text(&'a str),
    Bytes(&'a [u8]),
    Value(&'a Value),
}

impl<'a> Material<'a> {
    /// JSON strings are text, not values to stringify.
    fn of_value(value: &'a Value) -> Self {
        match value {
            Value::String(s) => Material::Text(s),
            other => Material::Value(other),
        }
    }
}

/// Turn `material` into bytes: bytes pass through, text is encoded under
/// the configured charset, values are stringified first.
pub(crate) fn normalize<'a>(
    material: Material<'a>,
    options: &EffectiveOptions,
    codec: &dyn TextCodec,
) -> Result<Cow<'a, [u8]>, ProviderError> {
    match material {
        Material::Bytes(b) => Ok(Cow::Borrowed(b)),
        Material::Text(s) => codec.encode(options.charset(), s).map(Cow::Owned),
        Material::Value(v) => {
            let text = options.stringify(v);
            codec.encode(options.charset(), &text).map(Cow::Owned)
        }
    }
}
