mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    parse_config(&content).with_context(|| format!("Invalid config file: {:?}", path))
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

    // Try default locations
    let default_paths = [
        "./shotsync.toml",
        "~/.config/shotsync/config.toml",
        "/etc/shotsync/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    match config.store.kind {
        StoreKind::Rest => {
            if config.store.url.trim().is_empty() {
                anyhow::bail!("Store kind is 'rest' but no url is configured");
            }
            if config.store.requests_per_second == 0 {
                anyhow::bail!("Store requests_per_second cannot be 0");
            }
            if config.store.timeout_secs == 0 {
                anyhow::bail!("Store timeout_secs cannot be 0");
            }
            if config.store.token.is_none() {
                tracing::warn!("REST store configured without a token");
            }
        }
        StoreKind::Sqlite => {
            if config.store.database.as_os_str().is_empty() {
                anyhow::bail!("Store kind is 'sqlite' but no database path is configured");
            }
        }
    }

    if config.hierarchy.episode_tag_prefix.is_empty() {
        anyhow::bail!("Hierarchy episode_tag_prefix cannot be empty");
    }

    let names = [
        ("project_field", &config.hierarchy.project_field),
        ("episode_entity", &config.hierarchy.episode_entity),
        ("sequence_entity", &config.hierarchy.sequence_entity),
        ("shot_entity", &config.hierarchy.shot_entity),
        ("sequence_episode_field", &config.hierarchy.sequence_episode_field),
        ("shot_sequence_field", &config.hierarchy.shot_sequence_field),
    ];
    for (key, value) in names {
        if value.trim().is_empty() {
            anyhow::bail!("Hierarchy {} cannot be empty", key);
        }
    }

    if config.keywords.episode_keyword.is_empty() {
        anyhow::bail!("Keywords episode_keyword cannot be empty");
    }

    if config.frame_range.fps <= 0.0 {
        anyhow::bail!("Frame range fps must be positive");
    }
    if config.frame_range.format.width == 0 || config.frame_range.format.height == 0 {
        anyhow::bail!("Frame range format must have a non-zero size");
    }

    Ok(())
}
