//! External call provider client.
//!
//! Defines the [`CallProvider`] trait consumed by the reconciliation engine,
//! the HTTP implementation against the provider's REST API, and the
//! pagination helper that aggregates the complete call list.

mod error;
pub mod pagination;
mod retell;
mod types;

pub use error::ProviderError;
pub use pagination::fetch_all_calls;
pub use retell::RetellProvider;
pub use types::{ActiveAgent, CallFilters, CallPage, ExternalCall};

use async_trait::async_trait;

/// Operations against the external call provider.
///
/// The provider is the system of record for call content; implementations
/// must map "call does not exist" responses to [`ProviderError::NotFound`]
/// so listings can distinguish deleted calls from transient failures.
#[async_trait]
pub trait CallProvider: Send + Sync {
    /// Fetch a single call by its provider id.
    async fn get_call(&self, external_id: &str) -> Result<ExternalCall, ProviderError>;

    /// Fetch one page of the call listing.
    async fn list_page(
        &self,
        filters: &CallFilters,
        cursor: Option<&str>,
    ) -> Result<CallPage, ProviderError>;

    /// List agents currently active at the provider.
    async fn list_active_agents(&self) -> Result<Vec<ActiveAgent>, ProviderError>;
}
