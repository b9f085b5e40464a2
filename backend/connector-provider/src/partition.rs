//! Splitting declared configuration into what is sent and what is stored.
//!
//! Both functions are pure. The sensitive key set is always derived from the
//! declared state handed in by the caller, so two resources reconciled at the
//! same time never see each other's keys.

use std::collections::BTreeSet;

use connect_client::ConnectorConfig;

use crate::resource::SensitiveConfig;

/// Keys whose values must never be stored under the public `config` attribute
pub type SensitiveKeys = BTreeSet<String>;

/// Merge public and sensitive configuration into the full configuration sent
/// to Kafka Connect. Sensitive values win on key collision.
pub fn split(
    config: &ConnectorConfig,
    config_sensitive: &SensitiveConfig,
) -> (ConnectorConfig, SensitiveKeys) {
    let mut full_config = config.clone();
    let mut sensitive_keys = SensitiveKeys::new();

    for (key, value) in config_sensitive.expose() {
        full_config.insert(key.clone(), value.clone());
        sensitive_keys.insert(key.clone());
    }

    (full_config, sensitive_keys)
}

/// Drop every sensitive key from a config echoed back by the cluster.
pub fn filter(mut remote_config: ConnectorConfig, sensitive_keys: &SensitiveKeys) -> ConnectorConfig {
    remote_config.retain(|key, _| !sensitive_keys.contains(key));
    remote_config
}
