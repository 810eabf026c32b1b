//! Host configuration: editor settings file plus command-line overrides

use std::path::{Path, PathBuf};

use anyhow::Context;
use redline_config::EditorConfig;
use tracing::{debug, info};

/// Environment variable naming a default config file
pub const CONFIG_ENV: &str = "REDLINE_CONFIG";

/// Command-line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub format: Option<String>,
    pub quality: Option<u8>,
}

/// Resolve the config file path: explicit flag first, then `REDLINE_CONFIG`
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
}

/// Load the editor config from JSON, falling back to defaults
pub fn load(path: Option<&Path>) -> anyhow::Result<EditorConfig> {
    let Some(path) = path else {
        debug!("No config file, using defaults");
        return Ok(EditorConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("could not read config '{}'", path.display()))?;
    let config: EditorConfig = serde_json::from_str(&text)
        .with_context(|| format!("invalid config '{}'", path.display()))?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Apply command-line overrides
pub fn apply(mut config: EditorConfig, overrides: &Overrides) -> EditorConfig {
    if let Some(width) = overrides.max_width {
        config.max_display_width = width;
    }
    if let Some(height) = overrides.max_height {
        config.max_display_height = height;
    }
    if let Some(format) = &overrides.format {
        config.export.format = Some(format.clone());
    }
    if let Some(quality) = overrides.quality {
        config.export.jpeg_quality = quality;
    }
    config
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use redline_config::ExportStrategy;

    use super::*;

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "history_limit": 5, "export": {{ "strategy": "resample" }} }}"#
        )
        .unwrap();

        let config = load(Some(file.path())).unwrap();
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.export.strategy, ExportStrategy::Resample);
        assert_eq!(config.max_display_width, redline_config::DEFAULT_MAX_DISPLAY_WIDTH);
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(load(Some(file.path())).is_err());
        assert!(load(Some(Path::new("/nonexistent/redline.json"))).is_err());
    }

    #[test]
    fn test_overrides_win() {
        let overrides = Overrides {
            max_width: Some(640),
            max_height: None,
            format: Some("jpeg".to_string()),
            quality: Some(70),
        };
        let config = apply(EditorConfig::default(), &overrides);
        assert_eq!(config.max_display_width, 640);
        assert_eq!(
            config.max_display_height,
            redline_config::DEFAULT_MAX_DISPLAY_HEIGHT
        );
        assert_eq!(config.export.format.as_deref(), Some("jpeg"));
        assert_eq!(config.export.jpeg_quality, 70);
    }

    #[test]
    fn test_explicit_path_first() {
        let explicit = Path::new("/tmp/a.json");
        assert_eq!(config_path(Some(explicit)), Some(explicit.to_path_buf()));
    }
}
