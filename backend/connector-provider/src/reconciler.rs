//! Connector lifecycle: drives the remote cluster toward the declared state.
//!
//! Every remote call goes through the rebalance retry loop with the deadline
//! of the operation being performed. Create and update always send the full
//! configuration and confirm the result with a fresh read.

use std::sync::Arc;
use std::time::Duration;

use connect_client::{matches_desired, ConnectApi, ConnectorConfig, ConnectorInfo};
use resilience::{
    is_rebalance_error, with_rebalance_retry, with_retry, Deadline, RetryConfig, REBALANCE,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{ProviderError, Result};
use crate::partition::{self, SensitiveKeys};
use crate::resource::ResourceData;

/// Label for the post-delete absence check
const DELETION: &str = "connector deletion";

pub struct ConnectorReconciler<C: ?Sized> {
    client: Arc<C>,
    retry: RetryConfig,
}

impl<C: ConnectApi + ?Sized> ConnectorReconciler<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    #[instrument(skip(self, data), fields(connector = %data.name))]
    pub async fn create(&self, data: &mut ResourceData) -> Result<()> {
        let (full_config, sensitive_keys) = partition::split(&data.config, &data.config_sensitive);
        validate_name(&data.name, &full_config)?;
        log_public_keys(data);

        info!("Creating connector");
        let name = data.name.as_str();
        let client = &self.client;
        let config = &full_config;
        let created = with_rebalance_retry(&self.retry, data.timeouts.create, move || async move {
            client
                .create_connector(name, config)
                .await
                .map_err(ProviderError::from)
        })
        .await?;

        data.config = partition::filter(created.config, &sensitive_keys);
        data.set_id(data.name.clone());

        let timeout = data.timeouts.create;
        self.confirm(data, &full_config, &sensitive_keys, timeout).await?;
        info!("Connector created");
        Ok(())
    }

    /// Refresh `config` from the cluster. A connector that no longer exists
    /// clears the identifier so the host plans a re-create.
    #[instrument(skip(self, data), fields(connector = %data.name))]
    pub async fn read(&self, data: &mut ResourceData) -> Result<()> {
        let sensitive_keys = data.config_sensitive.key_set();
        let timeout = data.timeouts.read;

        match self.fetch(&data.name, timeout).await? {
            Some(remote) => {
                data.config = partition::filter(remote.config, &sensitive_keys);
                debug!(tasks = remote.tasks.len(), "Connector read");
            }
            None => {
                warn!("Connector not found on the cluster, removing it from state");
                data.clear_id();
            }
        }
        Ok(())
    }

    #[instrument(skip(self, data), fields(connector = %data.name))]
    pub async fn update(&self, data: &mut ResourceData) -> Result<()> {
        let (full_config, sensitive_keys) = partition::split(&data.config, &data.config_sensitive);
        validate_name(&data.name, &full_config)?;
        log_public_keys(data);

        info!("Updating connector");
        let name = data.name.as_str();
        let client = &self.client;
        let config = &full_config;
        let updated = with_rebalance_retry(&self.retry, data.timeouts.update, move || async move {
            client
                .update_connector(name, config)
                .await
                .map_err(ProviderError::from)
        })
        .await?;

        data.config = partition::filter(updated.config, &sensitive_keys);

        let timeout = data.timeouts.update;
        self.confirm(data, &full_config, &sensitive_keys, timeout).await?;
        info!("Connector updated");
        Ok(())
    }

    /// Delete the connector and wait until the cluster stops reporting it.
    /// A connector that is already gone counts as deleted.
    #[instrument(skip(self, data), fields(connector = %data.name))]
    pub async fn delete(&self, data: &mut ResourceData) -> Result<()> {
        let deadline = Deadline::after(data.timeouts.delete);
        let name = data.name.as_str();
        let client = &self.client;

        info!("Deleting connector");
        with_retry(
            &self.retry,
            deadline,
            REBALANCE,
            is_rebalance_error::<ProviderError>,
            move || async move {
                match client.delete_connector(name).await {
                    Ok(()) => Ok(()),
                    Err(e) if e.is_not_found() => {
                        debug!("Connector already absent");
                        Ok(())
                    }
                    Err(e) => Err(ProviderError::from(e)),
                }
            },
        )
        .await?;

        with_retry(
            &self.retry,
            deadline,
            DELETION,
            |e: &ProviderError| matches!(e, ProviderError::StillPresent(_)) || is_rebalance_error(e),
            move || async move {
                match client.get_connector(name).await {
                    Ok(None) => Ok(()),
                    Ok(Some(_)) => Err(ProviderError::StillPresent(name.to_string())),
                    Err(e) => Err(ProviderError::from(e)),
                }
            },
        )
        .await?;

        data.clear_id();
        info!("Connector deleted");
        Ok(())
    }

    /// State for adopting an existing connector; a read fills in the config.
    pub fn import(&self, id: &str) -> Result<ResourceData> {
        if id.trim().is_empty() {
            return Err(ProviderError::Validation(
                "import id must be the connector name".to_string(),
            ));
        }
        let mut data = ResourceData::new(id);
        data.set_id(id);
        Ok(data)
    }

    async fn fetch(&self, name: &str, timeout: Duration) -> Result<Option<ConnectorInfo>> {
        let client = &self.client;
        let remote = with_rebalance_retry(&self.retry, timeout, move || async move {
            client.get_connector(name).await.map_err(ProviderError::from)
        })
        .await?;
        Ok(remote)
    }

    /// Read back a connector that was just written until the cluster reports
    /// exactly `full_config`. The worker that answers may not have seen the
    /// write yet, so absence and stale config are retried until the deadline.
    async fn confirm(
        &self,
        data: &mut ResourceData,
        full_config: &ConnectorConfig,
        sensitive_keys: &SensitiveKeys,
        timeout: Duration,
    ) -> Result<()> {
        let name = data.name.as_str();
        let client = &self.client;
        let remote = with_retry(
            &self.retry,
            Deadline::after(timeout),
            REBALANCE,
            |e: &ProviderError| {
                matches!(e, ProviderError::NotFound(_) | ProviderError::NotConverged(_))
                    || is_rebalance_error(e)
            },
            move || async move {
                match client.get_connector(name).await {
                    Ok(Some(remote)) if matches_desired(name, full_config, &remote.config) => {
                        Ok(remote)
                    }
                    Ok(Some(_)) => Err(ProviderError::NotConverged(name.to_string())),
                    Ok(None) => Err(ProviderError::NotFound(name.to_string())),
                    Err(e) => Err(ProviderError::from(e)),
                }
            },
        )
        .await?;

        data.config = partition::filter(remote.config, sensitive_keys);
        Ok(())
    }
}

fn validate_name(name: &str, full_config: &ConnectorConfig) -> Result<()> {
    if name.is_empty() {
        return Err(ProviderError::Validation("name is required".to_string()));
    }
    match full_config.get("name") {
        Some(configured) if configured == name => Ok(()),
        Some(configured) => Err(ProviderError::Validation(format!(
            "config.name {:?} must be identical to the resource name {:?}",
            configured, name
        ))),
        None => Err(ProviderError::Validation(format!(
            "config.name is mandatory and must be identical to the resource name {:?}",
            name
        ))),
    }
}

fn log_public_keys(data: &ResourceData) {
    debug!(
        config_keys = ?data.config.keys().collect::<Vec<_>>(),
        sensitive_key_count = data.config_sensitive.len(),
        "Declared connector configuration"
    );
}
