//! Tree service configuration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Settings for the folder tree service.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Deadline applied to every service operation, in seconds.
    #[serde(default = "default_request_timeout")]
    #[validate(range(min = 1, max = 600))]
    pub request_timeout_seconds: u64,
    /// Maximum in-flight membership lookups when filtering folders.
    #[serde(default = "default_membership_concurrency")]
    #[validate(range(min = 1, max = 64))]
    pub membership_concurrency: usize,
    /// Page size used when a caller does not supply one.
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100))]
    pub default_page_size: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: default_request_timeout(),
            membership_concurrency: default_membership_concurrency(),
            default_page_size: default_page_size(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}

fn default_membership_concurrency() -> usize {
    8
}

fn default_page_size() -> u64 {
    25
}
