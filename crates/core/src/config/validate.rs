use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Backend section exists (enforced by serde)
/// - Backend base URL is non-empty
/// - Batch sizes and TTLs are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.backend.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "backend.base_url cannot be empty".to_string(),
        ));
    }

    if config.feed.curated_batch_size == 0 {
        return Err(ConfigError::ValidationError(
            "feed.curated_batch_size cannot be 0".to_string(),
        ));
    }

    if config.feed.trending_batch_size == 0 {
        return Err(ConfigError::ValidationError(
            "feed.trending_batch_size cannot be 0".to_string(),
        ));
    }

    if config.feed.curated_ttl_hours <= 0 {
        return Err(ConfigError::ValidationError(
            "feed.curated_ttl_hours must be positive".to_string(),
        ));
    }

    if config.feed.trending_ttl_minutes <= 0 {
        return Err(ConfigError::ValidationError(
            "feed.trending_ttl_minutes must be positive".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BackendConfig, GitHubConfig};
    use crate::config::{FeedConfig, StorageConfig};

    fn valid_config() -> Config {
        Config {
            backend: BackendConfig {
                base_url: "https://backend.example.com/api".to_string(),
                timeout_secs: 30,
            },
            github: GitHubConfig::default(),
            storage: StorageConfig::default(),
            feed: FeedConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_empty_base_url_fails() {
        let mut config = valid_config();
        config.backend.base_url = "  ".to_string();
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_zero_batch_size_fails() {
        let mut config = valid_config();
        config.feed.curated_batch_size = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_zero_ttl_fails() {
        let mut config = valid_config();
        config.feed.trending_ttl_minutes = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
