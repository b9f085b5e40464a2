use serde::Serialize;

use super::ResourceData;

pub const RESOURCE_TYPE: &str = "kafka-connect_connector";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    String,
    StringMap,
    /// Nested block of per-operation duration strings
    Timeouts,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttributeSchema {
    pub kind: AttributeKind,
    pub required: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub force_new: bool,
    pub description: &'static str,
}

impl AttributeSchema {
    fn new(kind: AttributeKind, description: &'static str) -> Self {
        Self {
            kind,
            required: false,
            computed: false,
            sensitive: false,
            force_new: false,
            description,
        }
    }

    pub fn required_string(description: &'static str) -> Self {
        Self {
            required: true,
            ..Self::new(AttributeKind::String, description)
        }
    }

    pub fn computed_string(description: &'static str) -> Self {
        Self {
            computed: true,
            ..Self::new(AttributeKind::String, description)
        }
    }

    pub fn optional_map(description: &'static str) -> Self {
        Self::new(AttributeKind::StringMap, description)
    }

    pub fn timeouts(description: &'static str) -> Self {
        Self::new(AttributeKind::Timeouts, description)
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceSchema {
    pub type_name: &'static str,
    pub attributes: Vec<(&'static str, AttributeSchema)>,
}

impl ResourceSchema {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: &'static str, attribute: AttributeSchema) -> Self {
        self.attributes.push((name, attribute));
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes
            .iter()
            .find(|(attr, _)| *attr == name)
            .map(|(_, schema)| schema)
    }

    /// True when moving from `prior` to `planned` changes a `force_new`
    /// attribute, i.e. the host must delete and re-create the connector.
    pub fn requires_replacement(&self, prior: &ResourceData, planned: &ResourceData) -> bool {
        self.attributes
            .iter()
            .filter(|(_, schema)| schema.force_new)
            .any(|(name, _)| match *name {
                "name" => prior.name != planned.name,
                _ => false,
            })
    }
}

/// Attributes of the connector resource as exposed to the host
pub fn connector_schema() -> ResourceSchema {
    ResourceSchema::new(RESOURCE_TYPE)
        .with_attribute(
            "name",
            AttributeSchema::required_string("Connector name; must match config.name").force_new(),
        )
        .with_attribute(
            "id",
            AttributeSchema::computed_string("Equals the connector name once created"),
        )
        .with_attribute(
            "config",
            AttributeSchema::optional_map("Non-secret connector settings"),
        )
        .with_attribute(
            "config_sensitive",
            AttributeSchema::optional_map("Connector settings never displayed unmasked")
                .sensitive(),
        )
        .with_attribute(
            "timeouts",
            AttributeSchema::timeouts("Rebalance retry deadlines for create, read, update and delete"),
        )
}
