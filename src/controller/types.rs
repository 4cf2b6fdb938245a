use serde::{Deserialize, Serialize};

use crate::models::{FlowAction, FlowRule, NodeKind, TopologyLink, TopologyNode, TopologySnapshot};

// --- Operational topology (network-topology:network-topology) ---

#[derive(Debug, Deserialize)]
pub struct NetworkTopologyResponse {
    #[serde(rename = "network-topology")]
    pub network_topology: NetworkTopology,
}

#[derive(Debug, Default, Deserialize)]
pub struct NetworkTopology {
    #[serde(default)]
    pub topology: Vec<RcTopology>,
}

#[derive(Debug, Deserialize)]
pub struct RcTopology {
    #[serde(default)]
    pub node: Vec<RcNode>,
    #[serde(default)]
    pub link: Vec<RcLink>,
}

#[derive(Debug, Deserialize)]
pub struct RcNode {
    #[serde(rename = "node-id")]
    pub node_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RcLink {
    pub source: RcLinkSource,
    pub destination: RcLinkDestination,
}

#[derive(Debug, Deserialize)]
pub struct RcLinkSource {
    #[serde(rename = "source-node")]
    pub source_node: String,
}

#[derive(Debug, Deserialize)]
pub struct RcLinkDestination {
    #[serde(rename = "dest-node")]
    pub dest_node: String,
}

const HOST_NODE_PREFIX: &str = "host:";

impl From<NetworkTopologyResponse> for TopologySnapshot {
    fn from(resp: NetworkTopologyResponse) -> Self {
        let mut snapshot = TopologySnapshot::default();
        for topo in resp.network_topology.topology {
            snapshot.nodes.extend(topo.node.into_iter().map(|n| TopologyNode {
                kind: if n.node_id.starts_with(HOST_NODE_PREFIX) {
                    NodeKind::Host
                } else {
                    NodeKind::Switch
                },
                id: n.node_id,
            }));
            snapshot.links.extend(
                topo.link
                    .into_iter()
                    .map(|l| TopologyLink::new(l.source.source_node, l.destination.dest_node)),
            );
        }
        snapshot
    }
}

// --- Flow programming (flow-node-inventory) ---

#[derive(Debug, Serialize)]
pub struct FlowEnvelope {
    pub flow: Vec<RcFlow>,
}

#[derive(Debug, Serialize)]
pub struct RcFlow {
    pub id: String,
    pub table_id: u8,
    pub priority: u16,
    #[serde(rename = "idle-timeout", skip_serializing_if = "Option::is_none")]
    pub idle_timeout: Option<u16>,
    #[serde(rename = "match")]
    pub flow_match: RcMatch,
    pub instructions: RcInstructions,
}

#[derive(Debug, Serialize)]
pub struct RcMatch {
    #[serde(rename = "ethernet-match")]
    pub ethernet_match: RcEthernetMatch,
    #[serde(rename = "ipv4-destination")]
    pub ipv4_destination: String,
}

#[derive(Debug, Serialize)]
pub struct RcEthernetMatch {
    #[serde(rename = "ethernet-type")]
    pub ethernet_type: RcEthernetType,
}

#[derive(Debug, Serialize)]
pub struct RcEthernetType {
    #[serde(rename = "type")]
    pub ether_type: u16,
}

#[derive(Debug, Serialize)]
pub struct RcInstructions {
    pub instruction: Vec<RcInstruction>,
}

#[derive(Debug, Serialize)]
pub struct RcInstruction {
    pub order: u32,
    #[serde(rename = "apply-actions")]
    pub apply_actions: RcApplyActions,
}

#[derive(Debug, Serialize)]
pub struct RcApplyActions {
    pub action: Vec<RcAction>,
}

#[derive(Debug, Serialize)]
pub struct RcAction {
    pub order: u32,
    #[serde(rename = "output-action")]
    pub output_action: RcOutputAction,
}

#[derive(Debug, Serialize)]
pub struct RcOutputAction {
    #[serde(rename = "output-node-connector")]
    pub output_node_connector: String,
}

impl FlowEnvelope {
    pub fn from_rule(rule: &FlowRule, table_id: u8) -> Self {
        let FlowAction::Output { next_hop } = &rule.action;
        Self {
            flow: vec![RcFlow {
                id: rule.id.clone(),
                table_id,
                priority: rule.priority,
                idle_timeout: rule.idle_timeout,
                flow_match: RcMatch {
                    ethernet_match: RcEthernetMatch {
                        ethernet_type: RcEthernetType {
                            ether_type: rule.match_criteria.ether_type,
                        },
                    },
                    ipv4_destination: rule.match_criteria.ipv4_destination.clone(),
                },
                instructions: RcInstructions {
                    instruction: vec![RcInstruction {
                        order: 0,
                        apply_actions: RcApplyActions {
                            action: vec![RcAction {
                                order: 0,
                                output_action: RcOutputAction {
                                    output_node_connector: next_hop.clone(),
                                },
                            }],
                        },
                    }],
                },
            }],
        }
    }
}

// --- Node connector statistics ---

#[derive(Debug, Default, Deserialize)]
pub struct ConnectorStatistics {
    #[serde(rename = "bytes-received", default)]
    pub bytes_received: u64,
    #[serde(rename = "bytes-transmitted", default)]
    pub bytes_transmitted: u64,
    #[serde(rename = "packets-received", default)]
    pub packets_received: u64,
    #[serde(rename = "packets-transmitted", default)]
    pub packets_transmitted: u64,
}
