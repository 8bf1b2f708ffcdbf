mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

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

    let default_paths = ["./vbrindex.toml", "~/.config/vbrindex/config.toml"];

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
    if config.sizing.bytes_per_entry == 0 {
        anyhow::bail!("sizing.bytes_per_entry cannot be 0");
    }

    if config.sizing.max_delay_frames == 0 {
        anyhow::bail!("sizing.max_delay_frames must allow at least the index frame");
    }

    if config.index.quality > 100 {
        anyhow::bail!(
            "index.quality must be between 0 and 100, got {}",
            config.index.quality
        );
    }

    if config.index.output_suffix.is_empty() {
        anyhow::bail!("index.output_suffix cannot be empty");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_sizing_heuristic() {
        let config = Config::default();
        assert_eq!(config.sizing.params(), vbrindex_mpeg::SizingParams::default());
        assert_eq!(config.index.quality, 75);
        assert_eq!(config.index.output_suffix, "-out");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str("[index]\nquality = 90\n").unwrap();
        assert_eq!(config.index.quality, 90);
        assert_eq!(config.index.output_suffix, "-out");
        assert_eq!(config.sizing.bytes_per_entry, 50_000);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.sizing.bytes_per_entry = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.sizing.max_delay_frames = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.index.quality = 101;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.index.output_suffix.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vbrindex.toml");
        std::fs::write(
            &path,
            "[sizing]\nbytes_per_entry = 25000\nmax_delay_frames = 4\n\n[index]\noutput_suffix = \"-vbri\"\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.sizing.bytes_per_entry, 25_000);
        assert_eq!(config.sizing.max_delay_frames, 4);
        assert_eq!(config.index.output_suffix, "-vbri");
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/vbrindex.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
