//! One pass over every krip operation, logging each result.

use anyhow::{ensure, Context, Result};
use krip::{Krip, Providers, Secret};
use tracing::{info, instrument};

use crate::config::Config;

/// Run the smoke sequence on the default providers.
///
/// # Errors
///
/// Returns the first failing step, or an error if the decrypted value does
/// not match the input.
#[instrument(name = "smoke_run", skip_all, fields(hash_algorithm = %cfg.hash_algorithm))]
pub async fn run(cfg: &Config) -> Result<()> {
    let krip = Krip::new(Providers::default(), cfg.defaults.clone());
    let defaults = krip.defaults();
    info!(
        charset = %defaults.charset,
        nonce_size = defaults.nonce_size,
        key_length = defaults.key_length,
        "krip-smoke starting"
    );

    let secret = Secret::from(cfg.parsed_secret());
    let value = cfg.parsed_value();

    let encrypted = krip
        .encrypt(&value, &secret, None)
        .await
        .context("encrypt step failed")?;
    info!(%encrypted, "encrypted");

    let decrypted = krip
        .decrypt(&encrypted, &secret, None)
        .await
        .context("decrypt step failed")?;
    info!(%decrypted, "decrypted");
    ensure!(decrypted == value, "decrypted value does not match the input");

    let key = krip
        .generate_secret(None)
        .await
        .context("generate_secret step failed")?;
    info!(
        algorithm = key.algorithm().name,
        length = key.algorithm().length,
        extractable = key.extractable(),
        key_type = key.key_type(),
        usages = ?key.usages().names(),
        "generated key"
    );

    let hashed = krip
        .hash(cfg.hash_input.as_str(), Some(cfg.hash_algorithm.as_str()), None)
        .await
        .context("hash step failed")?;
    info!(algorithm = %cfg.hash_algorithm, %hashed, "hashed");

    info!("krip-smoke finished");
    Ok(())
}
