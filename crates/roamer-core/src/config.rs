// Feed assembly configuration
//
// FeedConfig is a plain struct that can be:
// - Created directly with defaults and `with_*` overrides
// - Built through FeedConfigBuilder
// - Loaded from the environment by the API binary

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Width of the grouping window, measured from a group's first member
pub fn grouping_window() -> Duration {
    Duration::hours(12)
}

/// What to do when a single item's strategy fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Any failed item fails the whole page
    #[default]
    FailFast,
    /// A failed item is replaced by a placeholder and the page still renders
    Isolate,
}

impl FailurePolicy {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "isolate" => FailurePolicy::Isolate,
            _ => FailurePolicy::FailFast,
        }
    }
}

/// Configuration for the feed assembler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Page size used when the caller does not specify one
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Largest page size a caller may request
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

fn default_page_size() -> u32 {
    20
}

fn default_max_page_size() -> u32 {
    100
}

impl FeedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    pub fn with_default_page_size(mut self, default_page_size: u32) -> Self {
        self.default_page_size = default_page_size;
        self
    }

    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size;
        self
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::default(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

/// Builder for FeedConfig with fluent API
pub struct FeedConfigBuilder {
    config: FeedConfig,
}

impl FeedConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: FeedConfig::default(),
        }
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }

    pub fn default_page_size(mut self, size: u32) -> Self {
        self.config.default_page_size = size;
        self
    }

    pub fn max_page_size(mut self, size: u32) -> Self {
        self.config.max_page_size = size;
        self
    }

    /// Build the configuration; the default size is clamped to the maximum
    pub fn build(mut self) -> FeedConfig {
        self.config.default_page_size = self
            .config
            .default_page_size
            .clamp(1, self.config.max_page_size.max(1));
        self.config
    }
}

impl Default for FeedConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
