use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("REPOSCOUT_").split("_"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[backend]
base_url = "https://backend.example.com/api"

[feed]
curated_batch_size = 5
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.backend.base_url, "https://backend.example.com/api");
        assert_eq!(config.feed.curated_batch_size, 5);
        // Untouched sections fall back to defaults.
        assert_eq!(config.feed.daily_batch_limit, 10);
        assert_eq!(config.feed.curated_ttl_hours, 24);
        assert_eq!(config.github.base_url, "https://api.github.com");
    }

    #[test]
    fn test_load_config_from_str_missing_backend() {
        let toml = r#"
[feed]
curated_batch_size = 5
"#;
        let result = load_config_from_str(toml);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[backend]
base_url = "https://backend.example.com/api"
timeout_secs = 10

[storage]
path = "/tmp/scout.db"
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.backend.timeout_secs, 10);
        assert_eq!(config.storage.path.to_string_lossy(), "/tmp/scout.db");
    }
}
