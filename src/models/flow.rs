use serde::{Deserialize, Serialize};

/// Ethernet type for IPv4 payloads
pub const ETHER_TYPE_IPV4: u16 = 0x0800;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowMatch {
    pub ether_type: u16,
    /// Host route in CIDR form, e.g. `h2/32`
    pub ipv4_destination: String,
}

impl FlowMatch {
    pub fn ipv4_host(destination: &str) -> Self {
        Self {
            ether_type: ETHER_TYPE_IPV4,
            ipv4_destination: format!("{}/32", destination),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowAction {
    Output { next_hop: String },
}

/// A forwarding rule bound to one switch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRule {
    pub id: String,
    pub priority: u16,
    /// Unset until the rule is stamped with its switch's layer defaults
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_timeout: Option<u16>,
    #[serde(rename = "match")]
    pub match_criteria: FlowMatch,
    pub action: FlowAction,
}

impl FlowRule {
    pub fn next_hop(&self) -> &str {
        match &self.action {
            FlowAction::Output { next_hop } => next_hop,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HopRule {
    pub switch_id: String,
    pub rule: FlowRule,
}

/// Rules keyed by switch, iterated in order of first appearance.
///
/// Inserting a rule for a switch that already has one replaces the rule but
/// keeps the switch's original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FlowRuleSet {
    entries: Vec<HopRule>,
}

impl FlowRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; returns the replaced rule, if any
    pub fn insert(&mut self, switch_id: String, rule: FlowRule) -> Option<FlowRule> {
        match self.entries.iter_mut().find(|e| e.switch_id == switch_id) {
            Some(entry) => Some(std::mem::replace(&mut entry.rule, rule)),
            None => {
                self.entries.push(HopRule { switch_id, rule });
                None
            }
        }
    }

    pub fn get(&self, switch_id: &str) -> Option<&FlowRule> {
        self.entries
            .iter()
            .find(|e| e.switch_id == switch_id)
            .map(|e| &e.rule)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlowRule)> {
        self.entries.iter().map(|e| (e.switch_id.as_str(), &e.rule))
    }
}

impl IntoIterator for FlowRuleSet {
    type Item = HopRule;
    type IntoIter = std::vec::IntoIter<HopRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Outcome of installing a primary/backup path pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProvisioningResult {
    pub primary: bool,
    pub backup: bool,
}

/// Request to install a single path
#[derive(Debug, Clone, Deserialize)]
pub struct InstallPathRequest {
    pub source: String,
    pub destination: String,
    pub path: Vec<String>,
    #[serde(default = "default_primary")]
    pub primary: bool,
}

fn default_primary() -> bool {
    true
}

/// Request to install a primary and a backup path for the same pair
#[derive(Debug, Clone, Deserialize)]
pub struct RedundantPathRequest {
    pub source: String,
    pub destination: String,
    pub primary_path: Vec<String>,
    pub backup_path: Vec<String>,
}
