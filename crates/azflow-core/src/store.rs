use std::collections::{HashMap, HashSet};

use crate::catalog;
use crate::{
    Category, ConnectionType, Edge, GraphError, GraphSnapshot, GroupType, Node, NodeKind,
    Position, Properties, Size,
};

/// Request to create a node. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNode {
    pub kind: NodeKind,
    /// Falls back to the catalog label for the category or group type.
    pub label: Option<String>,
    pub properties: Properties,
    pub position: Position,
    pub size: Option<Size>,
    pub parent_id: Option<String>,
}

impl NewNode {
    pub fn service(category: impl Into<Category>) -> Self {
        let category = category.into();
        Self {
            properties: catalog::default_properties(&category),
            kind: NodeKind::Service {
                category,
                resource_type: None,
            },
            label: None,
            position: Position::default(),
            size: None,
            parent_id: None,
        }
    }

    pub fn group(group_type: GroupType) -> Self {
        Self {
            kind: NodeKind::Group { group_type },
            label: None,
            properties: Properties::new(),
            position: Position::default(),
            size: Some(Size {
                width: 400.0,
                height: 300.0,
            }),
            parent_id: None,
        }
    }

    pub fn from_palette(item: &catalog::PaletteItem) -> Self {
        Self {
            label: Some(item.label.to_string()),
            properties: item.properties(),
            ..Self::service(item.category())
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Some(Size { width, height });
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Request to connect two nodes. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEdge {
    pub source: String,
    pub target: String,
    pub connection_type: ConnectionType,
    pub animated: bool,
    pub properties: Properties,
}

impl NewEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            connection_type: ConnectionType::Connects,
            animated: true,
            properties: Properties::new(),
        }
    }

    pub fn with_type(mut self, connection_type: impl Into<ConnectionType>) -> Self {
        self.connection_type = connection_type.into();
        self
    }
}

/// Authoritative owner of the diagram's nodes and edges.
///
/// Nodes live in an insertion-ordered arena with an id index beside it. Ids
/// come from a counter scoped to this store, so independent diagrams never
/// share id state.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    edges: Vec<Edge>,
    next_id: u64,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a snapshot, checking every containment and
    /// endpoint invariant. Nothing is kept if any check fails.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self, GraphError> {
        let mut store = Self::new();
        for node in snapshot.nodes {
            if store.index.contains_key(&node.id) {
                return Err(GraphError::DuplicateId(node.id));
            }
            store.index.insert(node.id.clone(), store.nodes.len());
            store.nodes.push(node);
        }
        for node in &store.nodes {
            if let Some(pid) = &node.parent_id {
                store.check_group(&node.id, pid)?;
            }
            if store.ancestors(&node.id).len() >= store.nodes.len() {
                let parent = node.parent_id.clone().unwrap_or_default();
                return Err(GraphError::invalid_parent(
                    &node.id,
                    parent,
                    "containment cycle",
                ));
            }
        }
        for edge in snapshot.edges {
            store.insert_edge(edge)?;
        }
        tracing::debug!(
            nodes = store.nodes.len(),
            edges = store.edges.len(),
            "loaded snapshot"
        );
        Ok(store)
    }

    /// Replace the whole diagram with a validated snapshot. On failure the
    /// current contents are untouched. The id counter keeps counting.
    pub fn load_snapshot(&mut self, snapshot: GraphSnapshot) -> Result<(), GraphError> {
        let mut loaded = Self::from_snapshot(snapshot)?;
        loaded.next_id = self.next_id;
        *self = loaded;
        Ok(())
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    // --- Ids ---

    /// Allocate an id of the form `<prefix>_<n>`. Never returns the same
    /// value twice and skips ids already present in the store.
    pub fn create_id(&mut self, prefix: &str) -> String {
        loop {
            self.next_id += 1;
            let id = format!("{}_{}", prefix, self.next_id);
            if !self.id_taken(&id) {
                return id;
            }
        }
    }

    fn id_taken(&self, id: &str) -> bool {
        self.index.contains_key(id) || self.edges.iter().any(|e| e.id == id)
    }

    // --- Queries ---

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Edges with `node_id` as source or target, in insertion order.
    pub fn edges_of(&self, node_id: &str) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.touches(node_id)).collect()
    }

    pub fn children(&self, id: &str) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|n| n.parent_id.as_deref() == Some(id))
            .collect()
    }

    /// All nodes contained in `id`, transitively, in insertion order.
    pub fn descendants(&self, id: &str) -> Vec<&Node> {
        let mut inside = HashSet::new();
        inside.insert(id);
        let mut changed = true;
        while changed {
            changed = false;
            for n in &self.nodes {
                if let Some(pid) = &n.parent_id {
                    if inside.contains(pid.as_str()) && !inside.contains(n.id.as_str()) {
                        inside.insert(n.id.as_str());
                        changed = true;
                    }
                }
            }
        }
        self.nodes
            .iter()
            .filter(|n| n.id != id && inside.contains(n.id.as_str()))
            .collect()
    }

    /// Parent chain of `id`, nearest first. Stops early on a cycle.
    pub fn ancestors(&self, id: &str) -> Vec<&Node> {
        let mut chain = Vec::new();
        let mut current = self.node(id).and_then(|n| n.parent_id.as_deref());
        while let Some(pid) = current {
            let Some(parent) = self.node(pid) else { break };
            if chain.len() >= self.nodes.len() {
                break;
            }
            chain.push(parent);
            current = parent.parent_id.as_deref();
        }
        chain
    }

    /// Canvas position of a node, summing relative offsets up the parent chain.
    pub fn absolute_position(&self, id: &str) -> Option<Position> {
        let node = self.node(id)?;
        Some(
            self.ancestors(id)
                .into_iter()
                .fold(node.position, |pos, parent| pos + parent.position),
        )
    }

    fn is_descendant(&self, candidate: &str, ancestor: &str) -> bool {
        self.ancestors(candidate).iter().any(|n| n.id == ancestor)
    }

    fn index_of(&self, id: &str) -> Result<usize, GraphError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))
    }

    fn check_group(&self, node_id: &str, parent_id: &str) -> Result<(), GraphError> {
        match self.node(parent_id) {
            None => Err(GraphError::invalid_parent(
                node_id,
                parent_id,
                "parent does not exist",
            )),
            Some(parent) if !parent.is_group() => Err(GraphError::invalid_parent(
                node_id,
                parent_id,
                "parent is not a group",
            )),
            Some(_) => Ok(()),
        }
    }

    fn reindex(&mut self) {
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
    }

    // --- Editing operations ---

    pub fn add_node(&mut self, spec: NewNode) -> Result<String, GraphError> {
        if let Some(pid) = &spec.parent_id {
            self.check_group("(new node)", pid)?;
        }
        let id = self.create_id("node");
        let label = spec.label.unwrap_or_else(|| match &spec.kind {
            NodeKind::Service { category, .. } => catalog::default_label(category),
            NodeKind::Group { group_type } => catalog::default_group_label(*group_type),
        });
        tracing::debug!(node = %id, label = %label, "add node");
        self.index.insert(id.clone(), self.nodes.len());
        self.nodes.push(Node {
            id: id.clone(),
            kind: spec.kind,
            label,
            properties: spec.properties,
            position: spec.position,
            size: spec.size,
            parent_id: spec.parent_id,
        });
        Ok(id)
    }

    /// Insert a node that already carries an id, e.g. from the translator.
    pub fn insert_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.id_taken(&node.id) {
            return Err(GraphError::DuplicateId(node.id));
        }
        if let Some(pid) = &node.parent_id {
            self.check_group(&node.id, pid)?;
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    pub fn add_edge(&mut self, spec: NewEdge) -> Result<String, GraphError> {
        self.check_endpoints(&spec.source, &spec.target)?;
        let id = self.create_id("edge");
        tracing::debug!(edge = %id, source = %spec.source, target = %spec.target, "add edge");
        self.edges.push(Edge {
            id: id.clone(),
            source: spec.source,
            target: spec.target,
            connection_type: spec.connection_type,
            animated: spec.animated,
            properties: spec.properties,
        });
        Ok(id)
    }

    /// Insert an edge that already carries an id.
    pub fn insert_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        if self.id_taken(&edge.id) {
            return Err(GraphError::DuplicateId(edge.id));
        }
        self.check_endpoints(&edge.source, &edge.target)?;
        self.edges.push(edge);
        Ok(())
    }

    fn check_endpoints(&self, source: &str, target: &str) -> Result<(), GraphError> {
        for end in [source, target] {
            if !self.index.contains_key(end) {
                return Err(GraphError::UnknownEndpoint(end.to_string()));
            }
        }
        Ok(())
    }

    /// Remove a node and its incident edges, bridging every incoming
    /// neighbor to every outgoing neighbor so reachability through the node
    /// survives. Children move up to the removed node's parent. Returns the
    /// ids of the bridging edges; absent ids are a no-op.
    pub fn delete_node(&mut self, id: &str) -> Vec<String> {
        let Some(&idx) = self.index.get(id) else {
            return Vec::new();
        };
        let removed = self.nodes.remove(idx);
        self.reindex();

        let mut incoming: Vec<String> = Vec::new();
        let mut outgoing: Vec<String> = Vec::new();
        for e in &self.edges {
            if e.target == id && e.source != id && !incoming.contains(&e.source) {
                incoming.push(e.source.clone());
            }
            if e.source == id && e.target != id && !outgoing.contains(&e.target) {
                outgoing.push(e.target.clone());
            }
        }
        let before = self.edges.len();
        self.edges.retain(|e| !e.touches(id));
        let dropped = before - self.edges.len();

        for child in self
            .nodes
            .iter_mut()
            .filter(|n| n.parent_id.as_deref() == Some(id))
        {
            child.parent_id = removed.parent_id.clone();
            child.position = child.position + removed.position;
        }

        let mut bridged = Vec::new();
        for source in &incoming {
            for target in &outgoing {
                if source == target {
                    continue;
                }
                let edge_id = self.create_id("edge");
                self.edges.push(Edge {
                    id: edge_id.clone(),
                    source: source.clone(),
                    target: target.clone(),
                    connection_type: ConnectionType::Connects,
                    animated: true,
                    properties: Properties::new(),
                });
                bridged.push(edge_id);
            }
        }
        tracing::debug!(
            node = %id,
            dropped_edges = dropped,
            bridged_edges = bridged.len(),
            "delete node"
        );
        bridged
    }

    /// Remove an edge. Returns false if it was not present.
    pub fn delete_edge(&mut self, id: &str) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != id);
        before != self.edges.len()
    }

    /// Move a node into `new_parent` (or to the top level for `None`).
    /// `relative_position` is taken in the new parent's frame.
    pub fn reparent(
        &mut self,
        node_id: &str,
        new_parent: Option<&str>,
        relative_position: Position,
    ) -> Result<(), GraphError> {
        let idx = self.index_of(node_id)?;
        if let Some(pid) = new_parent {
            if pid == node_id {
                return Err(GraphError::invalid_parent(
                    node_id,
                    pid,
                    "a node cannot contain itself",
                ));
            }
            self.check_group(node_id, pid)?;
            if self.is_descendant(pid, node_id) {
                return Err(GraphError::invalid_parent(
                    node_id,
                    pid,
                    "parent is a descendant of the node",
                ));
            }
        }
        let node = &mut self.nodes[idx];
        node.parent_id = new_parent.map(str::to_string);
        node.position = relative_position;
        tracing::debug!(node = %node_id, parent = ?new_parent, "reparent");
        Ok(())
    }

    pub fn rename(&mut self, node_id: &str, label: impl Into<String>) -> Result<(), GraphError> {
        let idx = self.index_of(node_id)?;
        self.nodes[idx].label = label.into();
        Ok(())
    }

    /// Merge `properties` into the node's bag. Existing keys keep their slot.
    pub fn update_properties(
        &mut self,
        node_id: &str,
        properties: Properties,
    ) -> Result<(), GraphError> {
        let idx = self.index_of(node_id)?;
        let bag = &mut self.nodes[idx].properties;
        for (key, value) in properties {
            bag.insert(key, value);
        }
        Ok(())
    }

    pub fn move_node(&mut self, node_id: &str, position: Position) -> Result<(), GraphError> {
        let idx = self.index_of(node_id)?;
        self.nodes[idx].position = position;
        Ok(())
    }

    pub fn resize(&mut self, node_id: &str, size: Option<Size>) -> Result<(), GraphError> {
        let idx = self.index_of(node_id)?;
        self.nodes[idx].size = size;
        Ok(())
    }

    /// Drop every node and edge. Ids handed out before stay retired.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.index.clear();
    }
}
