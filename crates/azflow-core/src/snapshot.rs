//! The infrastructure document the external translator produces, and its
//! conversion to and from a [`GraphSnapshot`].

use serde::{Deserialize, Serialize};

use crate::{
    Category, ConnectionType, Edge, GraphSnapshot, GroupType, Node, NodeKind, Position,
    Properties, Size,
};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Infrastructure {
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupSpec>,
    #[serde(default)]
    pub services: Vec<ServiceSpec>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// A container node, e.g. a resource group or virtual network.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupSpec {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    pub group_type: GroupType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default)]
    pub properties: Properties,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSpec {
    pub id: String,
    pub name: String,
    /// Cloud type string, e.g. "Microsoft.Sql/servers"
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    /// compute, database, storage, networking, security, ai, integration or analytics
    #[schemars(with = "String")]
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// "parent" when the service is clamped inside its container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent: Option<String>,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub source: String,
    pub target: String,
    /// http, tcp, storage, database, messaging, ...
    #[serde(default)]
    #[schemars(with = "String")]
    pub connection_type: ConnectionType,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub properties: Properties,
}

impl Infrastructure {
    /// Ids of every group and service, groups first.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .map(|g| g.id.as_str())
            .chain(self.services.iter().map(|s| s.id.as_str()))
    }
}

impl From<Infrastructure> for GraphSnapshot {
    fn from(infra: Infrastructure) -> Self {
        let groups = infra.groups.into_iter().map(|g| Node {
            id: g.id,
            kind: NodeKind::Group {
                group_type: g.group_type,
            },
            label: g.name,
            properties: g.properties,
            position: g.position,
            size: g.size,
            parent_id: g.parent_id,
        });
        let services = infra.services.into_iter().map(|s| Node {
            id: s.id,
            kind: NodeKind::Service {
                category: s.category,
                resource_type: s.service_type,
            },
            label: s.name,
            properties: s.properties,
            position: s.position,
            size: s.size,
            parent_id: s.parent_id,
        });
        let edges = infra
            .connections
            .into_iter()
            .map(|c| Edge {
                id: c.id,
                source: c.source,
                target: c.target,
                connection_type: c.connection_type,
                animated: true,
                properties: c.properties,
            })
            .collect();
        GraphSnapshot {
            nodes: groups.chain(services).collect(),
            edges,
        }
    }
}

impl From<&GraphSnapshot> for Infrastructure {
    fn from(snapshot: &GraphSnapshot) -> Self {
        let mut infra = Infrastructure::default();
        for node in &snapshot.nodes {
            match &node.kind {
                NodeKind::Group { group_type } => infra.groups.push(GroupSpec {
                    id: node.id.clone(),
                    name: node.label.clone(),
                    node_type: Some("azureGroup".to_string()),
                    group_type: *group_type,
                    category: Some("grouping".to_string()),
                    parent_id: node.parent_id.clone(),
                    position: node.position,
                    size: node.size,
                    properties: node.properties.clone(),
                }),
                NodeKind::Service {
                    category,
                    resource_type,
                } => infra.services.push(ServiceSpec {
                    id: node.id.clone(),
                    name: node.label.clone(),
                    service_type: resource_type.clone(),
                    category: category.clone(),
                    parent_id: node.parent_id.clone(),
                    extent: node.parent_id.as_ref().map(|_| "parent".to_string()),
                    properties: node.properties.clone(),
                    position: node.position,
                    size: node.size,
                }),
            }
        }
        infra.connections = snapshot
            .edges
            .iter()
            .map(|e| Connection {
                id: e.id.clone(),
                source: e.source.clone(),
                target: e.target.clone(),
                connection_type: e.connection_type.clone(),
                properties: e.properties.clone(),
            })
            .collect();
        infra
    }
}
