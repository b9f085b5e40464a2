/// Kafka Connect REST client
///
/// Typed access to the connector endpoints of a Kafka Connect cluster:
/// - Connector listing, lookup, creation, config replacement and deletion
/// - Connector config and status lookups
/// - Up-to-date checks against a desired config
///
/// Callers depend on the [`ConnectApi`] trait; [`ConnectClient`] is the HTTP
/// implementation built from a [`ClientConfig`].

pub mod client;
pub mod config;
pub mod errors;
pub mod models;

pub use client::{matches_desired, ConnectApi, ConnectClient};
pub use config::{BasicAuth, ClientConfig, TlsConfig};
pub use errors::{ConnectError, Result};
pub use models::{
    ConnectorConfig, ConnectorInfo, ConnectorState, ConnectorStatus, TaskId, TaskStatus,
};
