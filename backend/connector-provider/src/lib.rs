//! Kafka Connect connector provider.
//!
//! Reconciles declared connector resources against a Kafka Connect cluster,
//! tolerating the cluster's rebalance windows and keeping sensitive
//! configuration out of the publicly stored state.

pub mod config;
pub mod error;
pub mod partition;
pub mod reconciler;
pub mod resource;

pub use config::ProviderConfig;
pub use error::{ProviderError, Result};
pub use reconciler::ConnectorReconciler;
pub use resource::{ResourceData, ResourceTimeouts, SensitiveConfig};
