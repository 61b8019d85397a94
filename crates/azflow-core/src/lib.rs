pub mod catalog;
pub mod config;
mod error;
pub mod snapshot;
mod store;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use config::{read_settings, read_settings_from, write_settings, write_settings_to, Settings};
pub use error::{ConfigError, GraphError};
pub use snapshot::{Connection, GroupSpec, Infrastructure, ServiceSpec};
pub use store::{GraphStore, NewEdge, NewNode};

/// Free-form property bag. Insertion order is preserved.
pub type Properties = serde_json::Map<String, serde_json::Value>;

// --- Types ---

/// Service category tag. Tags outside the known set are kept verbatim so a
/// diagram can round-trip whatever the translator or palette produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Compute,
    Database,
    Storage,
    Networking,
    Security,
    Ai,
    Integration,
    Analytics,
    Other,
    Unrecognized(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Compute => "compute",
            Category::Database => "database",
            Category::Storage => "storage",
            Category::Networking => "networking",
            Category::Security => "security",
            Category::Ai => "ai",
            Category::Integration => "integration",
            Category::Analytics => "analytics",
            Category::Other => "other",
            Category::Unrecognized(tag) => tag,
        }
    }
}

impl From<String> for Category {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "compute" => Category::Compute,
            "database" => Category::Database,
            "storage" => Category::Storage,
            "networking" => Category::Networking,
            "security" => Category::Security,
            "ai" => Category::Ai,
            "integration" => Category::Integration,
            "analytics" => Category::Analytics,
            "other" => Category::Other,
            _ => Category::Unrecognized(tag),
        }
    }
}

impl From<&str> for Category {
    fn from(tag: &str) -> Self {
        Category::from(tag.to_string())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Unrecognized(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum GroupType {
    ResourceGroup,
    Subnet,
    Tier,
    VirtualNetwork,
    AvailabilitySet,
    AppServicePlan,
}

impl GroupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupType::ResourceGroup => "resource-group",
            GroupType::Subnet => "subnet",
            GroupType::Tier => "tier",
            GroupType::VirtualNetwork => "virtual-network",
            GroupType::AvailabilitySet => "availability-set",
            GroupType::AppServicePlan => "app-service-plan",
        }
    }
}

/// Relationship tag on an edge. Only used for labeling; unknown tags are kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConnectionType {
    #[default]
    Connects,
    Depends,
    Stores,
    Reads,
    Sends,
    Receives,
    Authenticates,
    Deployed,
    Manages,
    Monitors,
    Http,
    Tcp,
    Storage,
    Database,
    Messaging,
    Custom(String),
}

impl ConnectionType {
    pub fn as_str(&self) -> &str {
        match self {
            ConnectionType::Connects => "connects",
            ConnectionType::Depends => "depends",
            ConnectionType::Stores => "stores",
            ConnectionType::Reads => "reads",
            ConnectionType::Sends => "sends",
            ConnectionType::Receives => "receives",
            ConnectionType::Authenticates => "authenticates",
            ConnectionType::Deployed => "deployed",
            ConnectionType::Manages => "manages",
            ConnectionType::Monitors => "monitors",
            ConnectionType::Http => "http",
            ConnectionType::Tcp => "tcp",
            ConnectionType::Storage => "storage",
            ConnectionType::Database => "database",
            ConnectionType::Messaging => "messaging",
            ConnectionType::Custom(tag) => tag,
        }
    }
}

impl From<String> for ConnectionType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "connects" => ConnectionType::Connects,
            "depends" => ConnectionType::Depends,
            "stores" => ConnectionType::Stores,
            "reads" => ConnectionType::Reads,
            "sends" => ConnectionType::Sends,
            "receives" => ConnectionType::Receives,
            "authenticates" => ConnectionType::Authenticates,
            "deployed" => ConnectionType::Deployed,
            "manages" => ConnectionType::Manages,
            "monitors" => ConnectionType::Monitors,
            "http" => ConnectionType::Http,
            "tcp" => ConnectionType::Tcp,
            "storage" => ConnectionType::Storage,
            "database" => ConnectionType::Database,
            "messaging" => ConnectionType::Messaging,
            _ => ConnectionType::Custom(tag),
        }
    }
}

impl From<&str> for ConnectionType {
    fn from(tag: &str) -> Self {
        ConnectionType::from(tag.to_string())
    }
}

impl From<ConnectionType> for String {
    fn from(connection: ConnectionType) -> Self {
        match connection {
            ConnectionType::Custom(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, schemars::JsonSchema)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeKind {
    Service {
        category: Category,
        /// Cloud type string reported by the translator, e.g. "Microsoft.Web/sites".
        #[serde(rename = "resourceType", default, skip_serializing_if = "Option::is_none")]
        resource_type: Option<String>,
    },
    Group {
        #[serde(rename = "groupType")]
        group_type: GroupType,
    },
}

/// A diagram element. Matches the canvas node structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(flatten)]
    pub kind: NodeKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub properties: Properties,
    #[serde(default)]
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl Node {
    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group { .. })
    }

    pub fn category(&self) -> Option<&Category> {
        match &self.kind {
            NodeKind::Service { category, .. } => Some(category),
            NodeKind::Group { .. } => None,
        }
    }

    /// Read a property as text. Numbers are rendered in their JSON form;
    /// other value kinds count as absent.
    pub fn prop_str(&self, key: &str) -> Option<String> {
        match self.properties.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// A directed relationship between two nodes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub connection_type: ConnectionType,
    #[serde(default)]
    pub animated: bool,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub properties: Properties,
}

impl Edge {
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// A consistent point-in-time copy of the diagram. Node order is insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_category_round_trips() {
        let c: Category = serde_json::from_str("\"unknown-category\"").unwrap();
        assert_eq!(c, Category::Unrecognized("unknown-category".into()));
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"unknown-category\"");
        assert_eq!(Category::from("ai"), Category::Ai);
    }

    #[test]
    fn node_serializes_flat_kind() {
        let node = Node {
            id: "node_1".into(),
            kind: NodeKind::Group {
                group_type: GroupType::VirtualNetwork,
            },
            label: "VNet".into(),
            properties: Properties::new(),
            position: Position::default(),
            size: None,
            parent_id: None,
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "group");
        assert_eq!(json["groupType"], "virtual-network");
        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn prop_str_reads_numbers() {
        let mut properties = Properties::new();
        properties.insert("capacity".into(), serde_json::json!(3));
        properties.insert("flag".into(), serde_json::json!(true));
        let node = Node {
            id: "n".into(),
            kind: NodeKind::Service {
                category: Category::Ai,
                resource_type: None,
            },
            label: "x".into(),
            properties,
            position: Position::default(),
            size: None,
            parent_id: None,
        };
        assert_eq!(node.prop_str("capacity").as_deref(), Some("3"));
        assert_eq!(node.prop_str("flag"), None);
        assert_eq!(node.prop_str("missing"), None);
    }
}
