mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Highest frame rate accepted as a default.
const MAX_FRAME_RATE: u32 = 1000;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./ed5decode.toml", "~/.config/ed5decode/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.decode.default_frame_rate == 0 {
        anyhow::bail!("default_frame_rate cannot be 0");
    }
    if config.decode.default_frame_rate > MAX_FRAME_RATE {
        anyhow::bail!(
            "default_frame_rate {} exceeds {}",
            config.decode.default_frame_rate,
            MAX_FRAME_RATE
        );
    }
    if config.decode.max_resolution_depth == 0 {
        anyhow::bail!("max_resolution_depth cannot be 0");
    }

    Ok(())
}
