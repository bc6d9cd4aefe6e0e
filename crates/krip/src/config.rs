//! Process-wide defaults and their loading from the environment.
//!
//! Values are read once (typically at startup) and are read-only afterwards;
//! every call merges its own [`crate::Overrides`] on top of them.
//!
//! | Variable          | Field        | Default |
//! |-------------------|--------------|---------|
//! | `KRIP_CHARSET`    | `charset`    | `utf-8` |
//! | `KRIP_NONCE_SIZE` | `nonce_size` | `12`    |
//! | `KRIP_KEY_LENGTH` | `key_length` | `256`   |

use serde::Deserialize;
use thiserror::Error;

/// Environment variable prefix for [`Defaults::from_env`].
pub const ENV_PREFIX: &str = "KRIP";

/// Errors produced while loading [`Defaults`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load krip defaults: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid krip defaults: {0}")]
    Invalid(String),
}

/// Defaults applied when a call does not override them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Defaults {
    /// Text encoding for values and secrets.
    #[serde(default = "default_charset")]
    pub charset: String,

    /// Random nonce length in bytes.
    #[serde(default = "default_nonce_size")]
    pub nonce_size: usize,

    /// Length in bits of keys from `generate_secret`.
    #[serde(default = "default_key_length")]
    pub key_length: usize,
}

fn default_charset() -> String {
    "utf-8".into()
}
fn default_nonce_size() -> usize {
    12
}
fn default_key_length() -> usize {
    256
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            charset: default_charset(),
            nonce_size: default_nonce_size(),
            key_length: default_key_length(),
        }
    }
}

impl Defaults {
    /// Load and validate defaults from `KRIP_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;
        Self::from_config(cfg)
    }

    /// Deserialize and validate defaults from an already-built configuration.
    pub fn from_config(cfg: config::Config) -> Result<Self, ConfigError> {
        let d: Defaults = cfg.try_deserialize()?;
        d.validate()?;
        Ok(d)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.charset.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "KRIP_CHARSET must not be empty".into(),
            ));
        }
        if self.nonce_size == 0 {
            return Err(ConfigError::Invalid("KRIP_NONCE_SIZE must be > 0".into()));
        }
        if !matches!(self.key_length, 128 | 192 | 256) {
            return Err(ConfigError::Invalid(format!(
                "KRIP_KEY_LENGTH must be 128, 192 or 256 (got {})",
                self.key_length
            )));
        }
        Ok(())
    }
}
