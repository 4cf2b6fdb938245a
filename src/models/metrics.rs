use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::topology::SwitchRole;

/// Raw port counters reported by the controller for a link
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCounters {
    pub bytes_received: u64,
    pub bytes_transmitted: u64,
    pub packets_received: u64,
    pub packets_transmitted: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchMetrics {
    #[serde(rename = "type")]
    pub role: SwitchRole,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkMetrics {
    pub source: String,
    pub target: String,
    /// Bytes transmitted, as last reported
    pub bandwidth: u64,
    pub status: String,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LayerStats {
    pub total_switches: usize,
    pub total_links: usize,
    pub active_links: usize,
    pub bytes_transmitted: u64,
}

/// Summary of the last provisioning request for a source/destination pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathRecord {
    pub source: String,
    pub destination: String,
    pub primary_path: Vec<String>,
    pub backup_path: Vec<String>,
    pub primary_installed: bool,
    pub backup_installed: bool,
    pub provisioned_at: DateTime<Utc>,
}

/// Everything the dashboard polls
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    pub switches: BTreeMap<String, SwitchMetrics>,
    pub links: BTreeMap<String, LinkMetrics>,
    pub paths: BTreeMap<String, PathRecord>,
    pub layer_stats: BTreeMap<SwitchRole, LayerStats>,
}

/// Canonical link status values
pub mod link_status {
    pub const ACTIVE: &str = "active";
    pub const UNKNOWN: &str = "unknown";
}
