use std::time::Duration;

use serde_json::{Map, Value};

use crate::error::{ProviderError, Result};

/// Deadline applied to the retry loop of every lifecycle operation
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const OPERATIONS: &[&str] = &["create", "read", "update", "delete"];

/// Per-operation deadlines for the rebalance retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceTimeouts {
    pub create: Duration,
    pub read: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for ResourceTimeouts {
    fn default() -> Self {
        Self {
            create: DEFAULT_TIMEOUT,
            read: DEFAULT_TIMEOUT,
            update: DEFAULT_TIMEOUT,
            delete: DEFAULT_TIMEOUT,
        }
    }
}

impl ResourceTimeouts {
    /// Build from the host's `timeouts` block, e.g. `{"create": "2m"}`.
    /// Operations left out keep the default.
    pub fn from_json(value: Option<&Value>) -> Result<Self> {
        let mut timeouts = Self::default();
        let block = match value {
            None | Some(Value::Null) => return Ok(timeouts),
            Some(Value::Object(block)) => block,
            Some(_) => {
                return Err(ProviderError::Validation(
                    "timeouts must be an object".to_string(),
                ))
            }
        };

        for (operation, raw) in block {
            let duration = match raw {
                Value::Null => continue,
                Value::String(s) => parse_timeout(s)?,
                _ => {
                    return Err(ProviderError::Validation(format!(
                        "timeouts.{} must be a duration string",
                        operation
                    )))
                }
            };
            match operation.as_str() {
                "create" => timeouts.create = duration,
                "read" => timeouts.read = duration,
                "update" => timeouts.update = duration,
                "delete" => timeouts.delete = duration,
                other => {
                    return Err(ProviderError::Validation(format!(
                        "unknown timeout {:?}, expected one of {}",
                        other,
                        OPERATIONS.join(", ")
                    )))
                }
            }
        }

        Ok(timeouts)
    }

    pub fn to_json(&self) -> Value {
        let mut block = Map::new();
        for (operation, duration) in [
            ("create", self.create),
            ("read", self.read),
            ("update", self.update),
            ("delete", self.delete),
        ] {
            block.insert(
                operation.to_string(),
                Value::String(humantime::format_duration(duration).to_string()),
            );
        }
        Value::Object(block)
    }
}

/// Parse a host duration string such as `90s`, `2m`, `1m30s` or `500ms`.
pub fn parse_timeout(value: &str) -> Result<Duration> {
    humantime::parse_duration(value.trim()).map_err(|e| {
        ProviderError::Validation(format!("invalid timeout {:?}: {}", value, e))
    })
}
