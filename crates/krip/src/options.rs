//! Per-call options: caller [`Overrides`] merged onto [`Defaults`].

use std::fmt;
use std::sync::Arc;

use common::CryptError;
use serde_json::Value;

use crate::config::Defaults;

/// Converts an application value to the text that gets encrypted.
pub type Stringify = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Converts decrypted text back to an application value.
pub type Parse = Arc<dyn Fn(&str) -> Value + Send + Sync>;

/// Default stringifier: compact JSON, or the value's native string form if
/// JSON serialization fails.
pub fn stringify_json(value: &Value) -> String {
    match serde_json::to_string(value) {
        Ok(text) => text,
        Err(_) => native_string(value),
    }
}

/// Default parser: JSON, or the raw text as a string value if it is not JSON.
pub fn parse_json(text: &str) -> Value {
    match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => Value::String(text.to_owned()),
    }
}

fn native_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Caller-supplied overrides. Unset fields keep the defaults.
#[derive(Clone, Default)]
pub struct Overrides {
    pub charset: Option<String>,
    pub nonce_size: Option<usize>,
    pub key_length: Option<usize>,
    pub stringify: Option<Stringify>,
    pub parse: Option<Parse>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    pub fn with_nonce_size(mut self, nonce_size: usize) -> Self {
        self.nonce_size = Some(nonce_size);
        self
    }

    pub fn with_key_length(mut self, key_length: usize) -> Self {
        self.key_length = Some(key_length);
        self
    }

    pub fn with_stringify<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.stringify = Some(Arc::new(f));
        self
    }

    pub fn with_parse<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Value + Send + Sync + 'static,
    {
        self.parse = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for Overrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overrides")
            .field("charset", &self.charset)
            .field("nonce_size", &self.nonce_size)
            .field("key_length", &self.key_length)
            .field("stringify", &self.stringify.as_ref().map(|_| "<fn>"))
            .field("parse", &self.parse.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl TryFrom<&Value> for Overrides {
    type Error = CryptError;

    /// Read overrides from a JSON mapping.
    ///
    /// Recognized keys are `charset`, `nonceSize` (alias `ivSize`) and
    /// `keyLength`; other keys and `null` entries are ignored. `null` as a
    /// whole means "no overrides".
    ///
    /// # Errors
    ///
    /// Returns a contract violation if `value` is neither an object nor
    /// `null`, or if a recognized key has the wrong JSON type.
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let map = match value {
            Value::Null => return Ok(Overrides::default()),
            Value::Object(map) => map,
            _ => return Err(CryptError::contract("options", "a plain object")),
        };

        let mut overrides = Overrides::default();
        if let Some(charset) = non_null(map.get("charset")) {
            let charset = charset
                .as_str()
                .ok_or_else(|| CryptError::contract("charset option", "a string"))?;
            overrides.charset = Some(charset.to_owned());
        }
        // `nonceSize` wins when both spellings are present.
        for key in ["ivSize", "nonceSize"] {
            if let Some(size) = non_null(map.get(key)) {
                overrides.nonce_size = Some(as_count(size, "nonce size option")?);
            }
        }
        if let Some(length) = non_null(map.get("keyLength")) {
            overrides.key_length = Some(as_count(length, "key length option")?);
        }
        Ok(overrides)
    }
}

impl TryFrom<Value> for Overrides {
    type Error = CryptError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Overrides::try_from(&value)
    }
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn as_count(value: &Value, parameter: &'static str) -> Result<usize, CryptError> {
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| CryptError::contract(parameter, "a non-negative integer"))
}

/// The options one call actually runs with. Immutable once resolved.
#[derive(Clone)]
pub struct EffectiveOptions {
    charset: String,
    nonce_size: usize,
    key_length: usize,
    stringify: Stringify,
    parse: Parse,
}

impl EffectiveOptions {
    /// Shallow-merge `overrides` onto `defaults`.
    pub fn resolve(defaults: &Defaults, overrides: Option<&Overrides>) -> Self {
        let empty = Overrides::default();
        let o = overrides.unwrap_or(&empty);
        Self {
            charset: o.charset.clone().unwrap_or_else(|| defaults.charset.clone()),
            nonce_size: o.nonce_size.unwrap_or(defaults.nonce_size),
            key_length: o.key_length.unwrap_or(defaults.key_length),
            stringify: o
                .stringify
                .clone()
                .unwrap_or_else(|| Arc::new(stringify_json) as Stringify),
            parse: o.parse.clone().unwrap_or_else(|| Arc::new(parse_json) as Parse),
        }
    }

    pub fn charset(&self) -> &str {
        &self.charset
    }

    pub fn nonce_size(&self) -> usize {
        self.nonce_size
    }

    pub fn key_length(&self) -> usize {
        self.key_length
    }

    pub fn stringify(&self, value: &Value) -> String {
        (self.stringify)(value)
    }

    pub fn parse(&self, text: &str) -> Value {
        (self.parse)(text)
    }
}

impl fmt::Debug for EffectiveOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectiveOptions")
            .field("charset", &self.charset)
            .field("nonce_size", &self.nonce_size)
            .field("key_length", &self.key_length)
            .finish_non_exhaustive()
    }
}
