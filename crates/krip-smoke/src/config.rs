//! Configuration for the smoke harness.
//!
//! Everything comes from `KRIP_*` variables: the run's own settings
//! (`KRIP_SECRET`, `KRIP_VALUE`, `KRIP_HASH_ALGORITHM`, `KRIP_HASH_INPUT`,
//! `KRIP_LOG_LEVEL`) and the library defaults (`KRIP_CHARSET`,
//! `KRIP_NONCE_SIZE`, `KRIP_KEY_LENGTH`) are read from one source.

use anyhow::{Context, Result};
use krip::config::ENV_PREFIX;
use krip::{Defaults, DigestAlgorithm};
use serde::Deserialize;
use serde_json::Value;

/// Validated smoke-run configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Library defaults the run's [`krip::Krip`] is built with.
    #[serde(skip)]
    pub defaults: Defaults,

    /// Secret to encrypt with. JSON text is used as a JSON value, anything
    /// else as plain text.
    #[serde(default = "default_secret")]
    pub secret: String,

    /// Value to encrypt, interpreted like `secret`.
    #[serde(default = "default_value")]
    pub value: String,

    /// Digest algorithm for the hash step.
    #[serde(default = "default_hash_algorithm")]
    pub hash_algorithm: String,

    /// Text to hash.
    #[serde(default = "default_hash_input")]
    pub hash_input: String,

    /// Tracing log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_secret() -> String {
    r#"{"some":"key"}"#.into()
}
fn default_value() -> String {
    r#"{"some":"data"}"#.into()
}
fn default_hash_algorithm() -> String {
    "SHA-1".into()
}
fn default_hash_input() -> String {
    "foo".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate the run settings and library defaults from `KRIP_*`
    /// environment variables.
    pub fn from_env() -> Result<Self> {
        let source = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("failed to read KRIP_* environment")?;
        Self::from_source(source)
    }

    fn from_source(source: config::Config) -> Result<Self> {
        let defaults = Defaults::from_config(source.clone())
            .context("invalid krip defaults in KRIP_* environment")?;
        let mut c: Config = source
            .try_deserialize()
            .context("invalid krip-smoke settings in KRIP_* environment")?;
        c.defaults = defaults;

        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        if self.secret.is_empty() {
            anyhow::bail!("KRIP_SECRET must not be empty");
        }
        self.hash_algorithm
            .parse::<DigestAlgorithm>()
            .with_context(|| format!("KRIP_HASH_ALGORITHM {:?} is not supported", self.hash_algorithm))?;
        Ok(())
    }

    /// [`Config::secret`] as a JSON value when it parses, else as text.
    pub fn parsed_secret(&self) -> Value {
        as_json_or_text(&self.secret)
    }

    /// [`Config::value`] as a JSON value when it parses, else as text.
    pub fn parsed_value(&self) -> Value {
        as_json_or_text(&self.value)
    }
}

fn as_json_or_text(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}
