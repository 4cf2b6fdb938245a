use crate::models::{FlowAction, FlowMatch, FlowRule, FlowRuleSet};
use crate::topology::classify;

const PRIMARY_BASE_PRIORITY: u16 = 1000;
const BACKUP_BASE_PRIORITY: u16 = 500;

pub fn base_priority(is_primary: bool) -> u16 {
    if is_primary {
        PRIMARY_BASE_PRIORITY
    } else {
        BACKUP_BASE_PRIORITY
    }
}

pub fn rule_id(source: &str, destination: &str, hop: usize, is_primary: bool) -> String {
    let kind = if is_primary { "primary" } else { "backup" };
    format!("flow_{}_{}_{}_{}", source, destination, hop, kind)
}

/// Derive one forwarding rule per hop of `path`, each pointing at the next hop.
///
/// The last element only receives traffic, so a path of fewer than two
/// switches yields an empty set. Ids carry no request nonce: two concurrent
/// calls for the same pair produce identical ids.
pub fn generate_rules(source: &str, destination: &str, path: &[String], is_primary: bool) -> FlowRuleSet {
    let base = base_priority(is_primary);
    let mut rules = FlowRuleSet::new();

    for (hop, pair) in path.windows(2).enumerate() {
        let (switch_id, next_hop) = (&pair[0], &pair[1]);
        let role = classify(switch_id);

        let rule = FlowRule {
            id: rule_id(source, destination, hop, is_primary),
            priority: base + role.priority_weight(),
            idle_timeout: None,
            match_criteria: FlowMatch::ipv4_host(destination),
            action: FlowAction::Output { next_hop: next_hop.clone() },
        };

        if let Some(replaced) = rules.insert(switch_id.clone(), rule) {
            tracing::debug!("Switch {} revisited on path, replacing rule {}", switch_id, replaced.id);
        }
    }

    rules
}
