// In-memory Kafka Connect cluster for reconciler tests
#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use connect_client::{
    ConnectApi, ConnectError, ConnectorConfig, ConnectorInfo, ConnectorState, ConnectorStatus,
    TaskId,
};
use resilience::RetryConfig;

pub const REBALANCE_MESSAGE: &str =
    "Cannot complete request because of a conflicting operation (e.g. worker rebalance)";

/// Retry settings that keep test wall time in milliseconds
pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(5),
        jitter: false,
        ..Default::default()
    }
}

pub fn config(pairs: &[(&str, &str)]) -> ConnectorConfig {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn jdbc_sink(tasks_max: &str) -> ConnectorConfig {
    config(&[
        ("name", "sqlite-sink"),
        ("connector.class", "io.confluent.connect.jdbc.JdbcSinkConnector"),
        ("tasks.max", tasks_max),
        ("topics", "orders"),
        ("connection.url", "jdbc:sqlite:test.db"),
        ("auto.create", "true"),
    ])
}

pub fn rebalance_error() -> ConnectError {
    ConnectError::Api {
        code: 409,
        message: REBALANCE_MESSAGE.to_string(),
    }
}

#[derive(Default)]
pub struct FakeConnect {
    connectors: Mutex<BTreeMap<String, ConnectorConfig>>,
    queued_failures: Mutex<VecDeque<ConnectError>>,
    persistent_failure: Mutex<Option<(u16, String)>>,
    linger_reads: Mutex<Option<u32>>,
    calls: Mutex<Vec<String>>,
}

impl FakeConnect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_connector(self, name: &str, config: ConnectorConfig) -> Self {
        self.connectors.lock().unwrap().insert(name.to_string(), config);
        self
    }

    /// The next `count` calls fail with `err()`
    pub fn fail_next(&self, count: usize, err: impl Fn() -> ConnectError) {
        let mut queue = self.queued_failures.lock().unwrap();
        for _ in 0..count {
            queue.push_back(err());
        }
    }

    /// Every call fails with the given API error
    pub fn fail_always(&self, code: u16, message: &str) {
        *self.persistent_failure.lock().unwrap() = Some((code, message.to_string()));
    }

    /// Keep reporting a deleted connector for `reads` more lookups.
    /// `u32::MAX` never lets it disappear.
    pub fn linger_after_delete(&self, reads: u32) {
        *self.linger_reads.lock().unwrap() = Some(reads);
    }

    /// Remove a connector behind the reconciler's back
    pub fn remove_out_of_band(&self, name: &str) {
        self.connectors.lock().unwrap().remove(name);
    }

    pub fn stored(&self, name: &str) -> Option<ConnectorConfig> {
        self.connectors.lock().unwrap().get(name).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    fn enter(&self, call: &str) -> connect_client::Result<()> {
        self.calls.lock().unwrap().push(call.to_string());
        if let Some((code, message)) = self.persistent_failure.lock().unwrap().clone() {
            return Err(ConnectError::Api { code, message });
        }
        match self.queued_failures.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn info(name: &str, config: ConnectorConfig) -> ConnectorInfo {
        ConnectorInfo {
            name: name.to_string(),
            config,
            tasks: vec![TaskId {
                connector: name.to_string(),
                task: 0,
            }],
            connector_type: Some("sink".to_string()),
        }
    }
}

#[async_trait]
impl ConnectApi for FakeConnect {
    async fn list_connectors(&self) -> connect_client::Result<Vec<String>> {
        self.enter("list")?;
        Ok(self.connectors.lock().unwrap().keys().cloned().collect())
    }

    async fn get_connector(&self, name: &str) -> connect_client::Result<Option<ConnectorInfo>> {
        self.enter("get")?;
        if let Some(config) = self.stored(name) {
            return Ok(Some(Self::info(name, config)));
        }

        let mut linger = self.linger_reads.lock().unwrap();
        match linger.as_mut() {
            Some(remaining) if *remaining > 0 => {
                if *remaining != u32::MAX {
                    *remaining -= 1;
                }
                Ok(Some(Self::info(name, ConnectorConfig::new())))
            }
            _ => Ok(None),
        }
    }

    async fn create_connector(
        &self,
        name: &str,
        config: &ConnectorConfig,
    ) -> connect_client::Result<ConnectorInfo> {
        self.enter("create")?;
        let mut connectors = self.connectors.lock().unwrap();
        if connectors.contains_key(name) {
            return Err(ConnectError::Api {
                code: 409,
                message: format!("Connector {} already exists", name),
            });
        }
        connectors.insert(name.to_string(), config.clone());
        Ok(Self::info(name, config.clone()))
    }

    async fn update_connector(
        &self,
        name: &str,
        config: &ConnectorConfig,
    ) -> connect_client::Result<ConnectorInfo> {
        self.enter("update")?;
        self.connectors
            .lock()
            .unwrap()
            .insert(name.to_string(), config.clone());
        Ok(Self::info(name, config.clone()))
    }

    async fn delete_connector(&self, name: &str) -> connect_client::Result<()> {
        self.enter("delete")?;
        match self.connectors.lock().unwrap().remove(name) {
            Some(_) => Ok(()),
            None => Err(ConnectError::Api {
                code: 404,
                message: format!("Connector {} not found", name),
            }),
        }
    }

    async fn get_connector_config(
        &self,
        name: &str,
    ) -> connect_client::Result<Option<ConnectorConfig>> {
        self.enter("get_config")?;
        Ok(self.stored(name))
    }

    async fn get_connector_status(
        &self,
        name: &str,
    ) -> connect_client::Result<Option<ConnectorStatus>> {
        self.enter("get_status")?;
        Ok(self.stored(name).map(|_| ConnectorStatus {
            name: name.to_string(),
            connector: ConnectorState {
                state: "RUNNING".to_string(),
                worker_id: "connect:8083".to_string(),
                trace: None,
            },
            tasks: Vec::new(),
            connector_type: Some("sink".to_string()),
        }))
    }

    async fn is_up_to_date(
        &self,
        name: &str,
        config: &ConnectorConfig,
    ) -> connect_client::Result<bool> {
        self.enter("is_up_to_date")?;
        let mut desired = config.clone();
        desired.insert("name".to_string(), name.to_string());
        Ok(self.stored(name) == Some(desired))
    }
}
