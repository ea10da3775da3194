mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config = parse_config(&content)
        .with_context(|| format!("Failed to load config file: {:?}", path))?;

    Ok(config)
}

/// Parse and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse config")?;
    validate_config(&config)?;
    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./ebmlcast.toml", "~/.config/ebmlcast/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    config
        .stream
        .validate()
        .context("Invalid [stream] section")?;

    if config.listen.port == 0 {
        anyhow::bail!("Listen port cannot be 0");
    }

    if config.output.chunk_size == 0 {
        anyhow::bail!("Output chunk size cannot be 0");
    }

    // Every chunk must fit in the ring buffer in one write.
    if config.output.chunk_size > config.stream.buffer_capacity {
        anyhow::bail!(
            "Output chunk size ({}) exceeds stream buffer capacity ({})",
            config.output.chunk_size,
            config.stream.buffer_capacity
        );
    }

    if config.output.dir.is_file() {
        anyhow::bail!("Output path is a file: {:?}", config.output.dir);
    }

    Ok(())
}
