use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Basic type aliases for clarity
pub type NodeId = Uuid;
pub type EdgeId = Uuid;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Character,
    Event,
}

/// Categorical relation tag. Controls stroke style only, never geometry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Neutral,
    Family,
    Enemy,
    Love,
}

/// Display payload of a card. The interaction core only ever reads `date`
/// (timeline sort) and the owning node's kind (bounding box).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NodeAttrs {
    pub name: String,
    pub title: String,
    pub date: String,
    pub tags: Vec<String>,
    pub palette: usize,
    pub icon: String,
    pub notes: String,
}

impl NodeAttrs {
    pub fn defaults_for(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Character => Self {
                name: "New character".to_string(),
                palette: 1,
                icon: "wand".to_string(),
                ..Default::default()
            },
            NodeKind::Event => Self {
                name: "New event".to_string(),
                palette: 0,
                icon: "scroll".to_string(),
                ..Default::default()
            },
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    // World-space position of the card's top-left corner
    pub x: f32,
    pub y: f32,
    pub attrs: NodeAttrs,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub kind: RelationKind,
    pub label: String,
}

/// The node/edge store. Vecs keep insertion order, which doubles as the
/// render z-order and keeps the timeline sort stable.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChronicleStore {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl ChronicleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dataset used on first launch and after a world reset.
    pub fn starter() -> Self {
        let mut store = Self::new();
        let hero = store.add_node(NodeKind::Character, 200.0, 300.0);
        if let Some(n) = store.node_mut(hero) {
            n.attrs.name = "Harry Potter".to_string();
            n.attrs.title = "The Boy Who Lived".to_string();
            n.attrs.date = "1980".to_string();
            n.attrs.tags = vec!["protagonist".to_string(), "gryffindor".to_string()];
        }
        let battle = store.add_node(NodeKind::Event, 500.0, 300.0);
        if let Some(n) = store.node_mut(battle) {
            n.attrs.name = "Battle of Hogwarts".to_string();
            n.attrs.title = "The final stand".to_string();
            n.attrs.date = "1998.05.02".to_string();
            n.attrs.palette = 5;
            n.attrs.icon = "flame".to_string();
            n.attrs.tags = vec!["war".to_string(), "finale".to_string()];
        }
        store.add_edge(hero, battle, RelationKind::Enemy, "终结".to_string());
        store
    }

    // Add a node with kind defaults and return its new ID
    pub fn add_node(&mut self, kind: NodeKind, x: f32, y: f32) -> NodeId {
        let id = Uuid::now_v7();
        self.nodes.push(Node {
            id,
            kind,
            x,
            y,
            attrs: NodeAttrs::defaults_for(kind),
        });
        id
    }

    // Add an edge if both ends exist; returns the edge ID
    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        kind: RelationKind,
        label: String,
    ) -> Option<EdgeId> {
        if self.node(source).is_some() && self.node(target).is_some() {
            let id = Uuid::now_v7();
            self.edges.push(Edge {
                id,
                source,
                target,
                kind,
                label,
            });
            Some(id)
        } else {
            None
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Apply a partial update to a node's attributes.
    pub fn update_attrs(&mut self, id: NodeId, apply: impl FnOnce(&mut NodeAttrs)) -> bool {
        if let Some(node) = self.node_mut(id) {
            apply(&mut node.attrs);
            true
        } else {
            false
        }
    }

    // Tag list is a string set: adds are deduplicated, empty strings dropped
    pub fn add_tag(&mut self, id: NodeId, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() {
            return false;
        }
        if let Some(node) = self.node_mut(id) {
            if node.attrs.tags.iter().any(|t| t == tag) {
                false
            } else {
                node.attrs.tags.push(tag.to_string());
                true
            }
        } else {
            false
        }
    }

    pub fn remove_tag(&mut self, id: NodeId, tag: &str) -> bool {
        if let Some(node) = self.node_mut(id) {
            let before = node.attrs.tags.len();
            node.attrs.tags.retain(|t| t != tag);
            node.attrs.tags.len() != before
        } else {
            false
        }
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != id);
        self.edges.len() != before
    }

    // Delete a node and cascade-delete every edge referencing it
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        if self.nodes.len() == before {
            return false;
        }
        self.edges.retain(|e| e.source != id && e.target != id);
        true
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
