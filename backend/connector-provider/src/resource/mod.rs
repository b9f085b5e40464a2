//! Host-facing connector resource state.
//!
//! The host hands attributes over as loosely typed JSON. They are converted
//! once, here, into typed maps so that the reconciler only deals with
//! `BTreeMap<String, String>`.

mod schema;
mod timeouts;

use std::collections::BTreeSet;
use std::fmt;

use connect_client::ConnectorConfig;
use serde_json::{json, Map, Value};

use crate::error::{ProviderError, Result};

pub use schema::{connector_schema, AttributeKind, AttributeSchema, ResourceSchema, RESOURCE_TYPE};
pub use timeouts::{parse_timeout, ResourceTimeouts, DEFAULT_TIMEOUT};

const REDACTED: &str = "***";

const ATTRIBUTES: &[&str] = &["id", "name", "config", "config_sensitive", "timeouts"];

/// Connector settings the host must never display unmasked.
///
/// `Debug` prints every value as `***`. Plain values are only reachable
/// through [`SensitiveConfig::expose`].
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SensitiveConfig(ConnectorConfig);

impl SensitiveConfig {
    pub fn expose(&self) -> &ConnectorConfig {
        &self.0
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn key_set(&self) -> BTreeSet<String> {
        self.0.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn redacted(&self) -> Map<String, Value> {
        self.0
            .keys()
            .map(|key| (key.clone(), Value::String(REDACTED.to_string())))
            .collect()
    }
}

impl From<ConnectorConfig> for SensitiveConfig {
    fn from(config: ConnectorConfig) -> Self {
        Self(config)
    }
}

impl fmt::Debug for SensitiveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.keys().map(|key| (key, REDACTED)))
            .finish()
    }
}

/// State of one connector resource as stored by the host
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData {
    /// Persisted identifier. `None` means the host considers the resource gone.
    pub id: Option<String>,
    pub name: String,
    pub config: ConnectorConfig,
    pub config_sensitive: SensitiveConfig,
    pub timeouts: ResourceTimeouts,
}

impl ResourceData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_config(mut self, config: ConnectorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_sensitive_config(mut self, config_sensitive: ConnectorConfig) -> Self {
        self.config_sensitive = SensitiveConfig::from(config_sensitive);
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn clear_id(&mut self) {
        self.id = None;
    }

    /// Parse the host's JSON representation of the resource.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            ProviderError::Validation("resource must be a JSON object".to_string())
        })?;

        if let Some(unknown) = object.keys().find(|key| !ATTRIBUTES.contains(&key.as_str())) {
            return Err(ProviderError::Validation(format!(
                "unknown attribute {:?}",
                unknown
            )));
        }

        let name = match object.get("name") {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            Some(Value::String(_)) | Some(Value::Null) | None => {
                return Err(ProviderError::Validation("name is required".to_string()))
            }
            Some(_) => return Err(ProviderError::Validation("name must be a string".to_string())),
        };

        let id = match object.get("id") {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) => Some(id.clone()),
            Some(_) => return Err(ProviderError::Validation("id must be a string".to_string())),
        };

        Ok(Self {
            id,
            name,
            config: string_map(object.get("config"), "config")?,
            config_sensitive: SensitiveConfig::from(string_map(
                object.get("config_sensitive"),
                "config_sensitive",
            )?),
            timeouts: ResourceTimeouts::from_json(object.get("timeouts"))?,
        })
    }

    /// Host representation with sensitive values intact; the host masks them.
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "config": self.config,
            "config_sensitive": self.config_sensitive.expose(),
            "timeouts": self.timeouts.to_json(),
        })
    }

    /// Like [`ResourceData::to_json`] but every sensitive value is `***`.
    pub fn to_redacted_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "config": self.config,
            "config_sensitive": self.config_sensitive.redacted(),
            "timeouts": self.timeouts.to_json(),
        })
    }
}

fn string_map(value: Option<&Value>, attribute: &str) -> Result<ConnectorConfig> {
    let object = match value {
        None | Some(Value::Null) => return Ok(ConnectorConfig::new()),
        Some(Value::Object(object)) => object,
        Some(_) => {
            return Err(ProviderError::Validation(format!(
                "{} must be a map of strings",
                attribute
            )))
        }
    };

    let mut map = ConnectorConfig::new();
    for (key, value) in object {
        let value = match value {
            Value::Null => continue,
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(ProviderError::Validation(format!(
                    "{}.{} must be a string, number or boolean",
                    attribute, key
                )))
            }
        };
        map.insert(key.clone(), value);
    }
    Ok(map)
}
