//! EPP Registry Core Library
//!
//! Provides the backend flow engine of an EPP domain registry, including:
//! - Command validation and authorization
//! - Per-kind resource mutators (domain / contact / host)
//! - Transfer state machine with lazy expiry resolution
//! - Flow orchestration with idempotent replay and contention retry
//! - Append-only history and billing event recording
//!
//! This library is platform-independent: persistence is abstracted through
//! traits so the same flows run against any transactional store.

pub mod config;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use config::RegistryConfig;
pub use error::{CoreResult, FlowError};
pub use services::{FlowContext, FlowRunner};
pub use traits::{CommitSet, RegistrarRepository, ResourceStore};
