//! Query cache configuration

use serde::{Deserialize, Serialize};

/// TTL for cached listing results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_seconds: 5 }
    }
}
