//! Callsync - call-record reconciliation service
//!
//! This library keeps a local ownership index (call records linked to users)
//! consistent with an external call-center provider's call list, and exposes
//! query operations over the merged view.

pub mod api;
pub mod cli;
pub mod config;
pub mod directory;
pub mod extract;
pub mod logging;
pub mod provider;
pub mod query;
pub mod recon;
pub mod store;
