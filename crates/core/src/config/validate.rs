use reqwest::Url;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Upstream base URLs parse
/// - Relay prefix is not empty
/// - Budgets and concurrency are at least 1
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    for (field, url) in [
        ("catalog.base_url", &config.catalog.base_url),
        ("store.base_url", &config.store.base_url),
    ] {
        Url::parse(url).map_err(|e| {
            ConfigError::ValidationError(format!("{} is not a valid URL: {}", field, e))
        })?;
    }

    if let Some(relay) = &config.relay {
        if relay.url_prefix.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "relay.url_prefix cannot be empty".to_string(),
            ));
        }
    }

    let ranking = &config.ranking;
    if ranking.batch_size == 0 {
        return Err(ConfigError::ValidationError(
            "ranking.batch_size must be at least 1".to_string(),
        ));
    }
    if ranking.max_pages_per_batch == 0 {
        return Err(ConfigError::ValidationError(
            "ranking.max_pages_per_batch must be at least 1".to_string(),
        ));
    }
    if ranking.bulk_concurrency == 0 {
        return Err(ConfigError::ValidationError(
            "ranking.bulk_concurrency must be at least 1".to_string(),
        ));
    }

    if config.search.page_budget == 0 || config.search.result_budget == 0 {
        return Err(ConfigError::ValidationError(
            "search budgets must be at least 1".to_string(),
        ));
    }

    Ok(())
}
