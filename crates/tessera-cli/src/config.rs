use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tessera_auth::TokenConfig;

use crate::cli::Cli;

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tessera").join("config.toml"))
}

fn load_file(path: &Path) -> Result<TokenConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Cannot read config file {}", path.display()))?;
    TokenConfig::from_toml_str(&content)
        .with_context(|| format!("Invalid config file {}", path.display()))
}

/// Resolves the effective configuration.
///
/// Precedence: flags, then `TESSERA_*` env vars, then the config file, then
/// defaults.
pub fn resolve(cli: &Cli) -> Result<TokenConfig> {
    let config = match &cli.config {
        Some(path) => load_file(path)?,
        None => match default_config_path() {
            Some(path) if path.exists() => load_file(&path)?,
            _ => TokenConfig::default(),
        },
    };

    let mut config = config
        .apply_env()
        .context("Invalid TESSERA_* environment variable")?;

    if let Some(secret) = &cli.secret {
        config.secret = secret.clone();
    }
    if let Some(name) = &cli.service_name {
        config.service_name = name.clone();
    }

    Ok(config)
}

/// Resolves the configuration and checks that it can be used to sign tokens.
pub fn resolve_valid(cli: &Cli) -> Result<TokenConfig> {
    let config = resolve(cli)?;
    config.validate().context(
        "No usable signing secret. Use --secret, set TESSERA_SECRET, or run: tessera keygen",
    )?;
    Ok(config)
}
