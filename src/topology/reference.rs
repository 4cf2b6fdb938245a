use crate::models::{TopologyLink, TopologyNode, TopologySnapshot};

const CORE_COUNT: usize = 3;
const DISTRIBUTION_COUNT: usize = 6;
const ACCESS_COUNT: usize = 12;
const HOSTS_PER_ACCESS: usize = 3;

const CORE_MESH_MBPS: u32 = 100;
const CORE_UPLINK_MBPS: u32 = 50;
const DISTRIBUTION_UPLINK_MBPS: u32 = 25;
const HOST_LINK_MBPS: u32 = 10;

fn link(source: &str, target: &str, mbps: u32) -> TopologyLink {
    TopologyLink {
        source: source.to_string(),
        target: target.to_string(),
        bandwidth_mbps: Some(mbps),
    }
}

fn names(prefix: char, count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("{}{}", prefix, i)).collect()
}

/// Build the hierarchical lab fabric: a full core mesh, each distribution and
/// access switch dual-homed to the layer above, three hosts per access switch.
pub fn reference_topology() -> TopologySnapshot {
    let core = names('c', CORE_COUNT);
    let distribution = names('d', DISTRIBUTION_COUNT);
    let access = names('a', ACCESS_COUNT);
    let hosts = names('h', ACCESS_COUNT * HOSTS_PER_ACCESS);

    let mut nodes: Vec<TopologyNode> = core
        .iter()
        .chain(&distribution)
        .chain(&access)
        .map(TopologyNode::switch)
        .collect();
    nodes.extend(hosts.iter().map(TopologyNode::host));

    let mut links = Vec::new();

    for (i, a) in core.iter().enumerate() {
        for b in &core[i + 1..] {
            links.push(link(a, b, CORE_MESH_MBPS));
        }
    }

    for (i, d) in distribution.iter().enumerate() {
        links.push(link(d, &core[i % CORE_COUNT], CORE_UPLINK_MBPS));
        links.push(link(d, &core[(i + 1) % CORE_COUNT], CORE_UPLINK_MBPS));
    }

    for (i, a) in access.iter().enumerate() {
        links.push(link(a, &distribution[i % DISTRIBUTION_COUNT], DISTRIBUTION_UPLINK_MBPS));
        links.push(link(a, &distribution[(i + 1) % DISTRIBUTION_COUNT], DISTRIBUTION_UPLINK_MBPS));
    }

    for (i, h) in hosts.iter().enumerate() {
        links.push(link(h, &access[i / HOSTS_PER_ACCESS], HOST_LINK_MBPS));
    }

    TopologySnapshot { nodes, links }
}
