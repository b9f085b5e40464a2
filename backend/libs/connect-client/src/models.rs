use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat connector configuration as Kafka Connect stores it
pub type ConnectorConfig = BTreeMap<String, String>;

/// Connector information returned by GET /connectors/{name}, POST /connectors
/// and PUT /connectors/{name}/config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorInfo {
    pub name: String,
    #[serde(default)]
    pub config: ConnectorConfig,
    #[serde(default)]
    pub tasks: Vec<TaskId>,
    /// `source` or `sink`; absent while the connector is still starting
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub connector_type: Option<String>,
}

/// Task identifier as returned by the Kafka Connect REST API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskId {
    pub connector: String,
    pub task: i32,
}

/// Connector status returned by GET /connectors/{name}/status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorStatus {
    pub name: String,
    pub connector: ConnectorState,
    #[serde(default)]
    pub tasks: Vec<TaskStatus>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub connector_type: Option<String>,
}

/// State of the connector itself (inside ConnectorStatus)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorState {
    pub state: String,
    pub worker_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

/// Per-task status entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub id: i32,
    pub state: String,
    pub worker_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

impl ConnectorStatus {
    pub fn is_running(&self) -> bool {
        self.connector.state == "RUNNING"
    }

    /// Tasks reporting `FAILED`
    pub fn failed_tasks(&self) -> impl Iterator<Item = &TaskStatus> {
        self.tasks.iter().filter(|t| t.state == "FAILED")
    }
}

/// Body for POST /connectors
#[derive(Debug, Serialize)]
pub(crate) struct CreateConnectorRequest<'a> {
    pub name: &'a str,
    pub config: &'a ConnectorConfig,
}

/// Error document Kafka Connect returns with non-2xx responses
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub error_code: u16,
    pub message: String,
}
