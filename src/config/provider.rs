//! External call provider configuration

use serde::{Deserialize, Serialize};

/// Connection settings for the external call provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Provider API base URL.
    pub base_url: String,
    /// Bearer token; required at client construction time.
    pub api_key: String,
    /// Page size requested from the list endpoint.
    pub page_size: u32,
    /// Hard ceiling on pages per listing pass.
    pub max_pages: u32,
    /// Per-call HTTP deadline.
    pub request_timeout_seconds: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.retellai.com".to_string(),
            api_key: String::new(),
            page_size: 100,
            max_pages: 100,
            request_timeout_seconds: 30,
        }
    }
}
