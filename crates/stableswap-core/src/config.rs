//! Configuration types for the stableswap router

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Endpoints of the external collaborators, supplied at construction time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Pool metadata and hop lookup service (e.g., "http://127.0.0.1:8080/v1")
    pub indexer_url: String,

    /// Pool simulation service
    pub simulator_url: String,

    /// Signed-rate oracle
    pub oracle_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            indexer_url: "http://127.0.0.1:8080/v1".to_string(),
            simulator_url: "http://127.0.0.1:8080/v1".to_string(),
            oracle_url: "http://127.0.0.1:8081".to_string(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}
