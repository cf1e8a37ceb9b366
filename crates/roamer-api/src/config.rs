// API configuration loaded from environment variables.
// Decision: Only DATABASE_URL is required; everything else has a local-development default

use anyhow::{Context, Result};
use roamer_core::{FailurePolicy, FeedConfig, FeedConfigBuilder};

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:9000";

/// Complete API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub database_url: String,
    pub bind_address: String,
    /// Example: API_PREFIX="/api" results in routes like /api/v1/feed
    pub api_prefix: String,
    pub feed: FeedConfig,
}

impl ApiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL environment variable required")?;

        Ok(Self {
            database_url,
            bind_address: std::env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string()),
            api_prefix: std::env::var("API_PREFIX").unwrap_or_default(),
            feed: feed_config_from_vars(
                std::env::var("FEED_FAILURE_POLICY").ok().as_deref(),
                std::env::var("FEED_DEFAULT_PAGE_SIZE").ok().as_deref(),
                std::env::var("FEED_MAX_PAGE_SIZE").ok().as_deref(),
            ),
        })
    }
}

/// Build the feed configuration from raw variable values; unparsable sizes
/// fall back to the defaults
fn feed_config_from_vars(
    failure_policy: Option<&str>,
    default_page_size: Option<&str>,
    max_page_size: Option<&str>,
) -> FeedConfig {
    let defaults = FeedConfig::default();
    let parse_size = |raw: Option<&str>, fallback: u32| {
        raw.and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|size| *size > 0)
            .unwrap_or(fallback)
    };

    FeedConfigBuilder::new()
        .failure_policy(failure_policy.map(FailurePolicy::from_str).unwrap_or_default())
        .max_page_size(parse_size(max_page_size, defaults.max_page_size))
        .default_page_size(parse_size(default_page_size, defaults.default_page_size))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_config_defaults() {
        let config = feed_config_from_vars(None, None, None);
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.max_page_size, 100);
    }

    #[test]
    fn test_feed_config_overrides() {
        let config = feed_config_from_vars(Some("isolate"), Some("10"), Some("50"));
        assert_eq!(config.failure_policy, FailurePolicy::Isolate);
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.max_page_size, 50);
    }

    #[test]
    fn test_feed_config_ignores_garbage() {
        let config = feed_config_from_vars(Some("loud"), Some("many"), Some("0"));
        assert_eq!(config.failure_policy, FailurePolicy::FailFast);
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.max_page_size, 100);
    }
}
