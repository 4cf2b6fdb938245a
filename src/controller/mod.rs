pub mod client;
pub mod types;

pub use client::ControllerClient;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{FlowRule, LinkCounters, TopologySnapshot};

/// Source of network topology snapshots
#[async_trait]
pub trait TopologySource: Send + Sync {
    async fn fetch_topology(&self) -> Result<TopologySnapshot>;

    /// Whether the source is currently reachable
    async fn test_connection(&self) -> bool {
        self.fetch_topology().await.is_ok()
    }
}

/// Remote write of a single flow rule
#[async_trait]
pub trait RuleInstaller: Send + Sync {
    /// Returns false on any non-success outcome; never errors.
    async fn install_rule_on_switch(&self, switch_id: &str, rule: &FlowRule) -> bool;
}

/// Port counter lookup for a link
#[async_trait]
pub trait LinkStatsSource: Send + Sync {
    async fn link_counters(&self, link_id: &str) -> Option<LinkCounters>;
}

/// Failure talking to the SDN controller
#[derive(Debug)]
pub struct ControllerError {
    pub status: Option<u16>,
    pub message: String,
}

impl ControllerError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ControllerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "controller API error {}: {}", status, self.message),
            None => write!(f, "controller unreachable: {}", self.message),
        }
    }
}

impl std::error::Error for ControllerError {}
