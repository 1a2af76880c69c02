//! Reconciliation tuning configuration

use serde::{Deserialize, Serialize};

/// Knobs for reconciliation passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Maximum individual fetch-by-id fallbacks per user listing.
    pub fallback_fetch_cap: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            fallback_fetch_cap: 50,
        }
    }
}
