use serde::{Deserialize, Serialize};

use crate::topology::SwitchRole;

/// Whether a topology node forwards traffic or terminates it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Switch,
    Host,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyNode {
    pub id: String,
    pub kind: NodeKind,
}

impl TopologyNode {
    pub fn switch(id: impl Into<String>) -> Self {
        Self { id: id.into(), kind: NodeKind::Switch }
    }

    pub fn host(id: impl Into<String>) -> Self {
        Self { id: id.into(), kind: NodeKind::Host }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyLink {
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth_mbps: Option<u32>,
}

impl TopologyLink {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            bandwidth_mbps: None,
        }
    }

    /// Identifier used for counter lookups and the dashboard link routes
    pub fn id(&self) -> String {
        format!("{}_{}", self.source, self.target)
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// Point-in-time view of the network as reported by the controller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologySnapshot {
    pub nodes: Vec<TopologyNode>,
    pub links: Vec<TopologyLink>,
}

impl TopologySnapshot {
    pub fn switches(&self) -> impl Iterator<Item = &TopologyNode> {
        self.nodes.iter().filter(|n| n.kind == NodeKind::Switch)
    }

    pub fn switches_in(&self, role: SwitchRole) -> impl Iterator<Item = &TopologyNode> {
        self.switches().filter(move |n| SwitchRole::classify(&n.id) == role)
    }
}

/// Topology response grouped by layer for the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct LayeredTopology {
    pub nodes: Vec<TopologyNode>,
    pub links: Vec<TopologyLink>,
    pub layers: LayerGroups,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LayerGroups {
    pub core: Vec<TopologyNode>,
    pub distribution: Vec<TopologyNode>,
    pub access: Vec<TopologyNode>,
}

impl From<&TopologySnapshot> for LayeredTopology {
    fn from(snapshot: &TopologySnapshot) -> Self {
        let mut layers = LayerGroups::default();
        for node in snapshot.switches() {
            let bucket = match SwitchRole::classify(&node.id) {
                SwitchRole::Core => &mut layers.core,
                SwitchRole::Distribution => &mut layers.distribution,
                SwitchRole::Access => &mut layers.access,
            };
            bucket.push(node.clone());
        }
        Self {
            nodes: snapshot.nodes.clone(),
            links: snapshot.links.clone(),
            layers,
        }
    }
}
