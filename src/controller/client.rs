use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use std::time::Duration;

use super::types::*;
use super::{ControllerError, LinkStatsSource, RuleInstaller, TopologySource};
use crate::config::Config;
use crate::models::{FlowRule, LinkCounters, TopologySnapshot};

/// RESTCONF client for the SDN controller
pub struct ControllerClient {
    base_url: String,
    username: String,
    password: String,
    table_id: u8,
    client: Client,
}

impl ControllerClient {
    pub fn new(base_url: String, username: String, password: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            password,
            table_id: 0,
            client,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        let mut client = Self::new(
            cfg.controller_url(),
            cfg.controller_user.clone(),
            cfg.controller_password.clone(),
            Duration::from_secs(cfg.controller_timeout_secs),
        )?;
        client.table_id = cfg.flow_table_id;
        Ok(client)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Append `segments` to the base URL, percent-encoding each one
    fn segments_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Controller URL cannot take a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn flow_url(&self, switch_id: &str, flow_id: &str) -> Result<Url> {
        let table_id = self.table_id.to_string();
        self.segments_url(&[
            "config",
            "opendaylight-inventory:nodes",
            "node",
            switch_id,
            "flow-node-inventory:table",
            &table_id,
            "flow",
            flow_id,
        ])
    }

    /// Attach credentials and JSON headers
    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.basic_auth(&self.username, Some(&self.password))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
    }

    async fn put_flow(&self, switch_id: &str, rule: &FlowRule) -> Result<StatusCode> {
        let body = FlowEnvelope::from_rule(rule, self.table_id);
        let resp = self
            .authed(self.client.put(self.flow_url(switch_id, &rule.id)?))
            .json(&body)
            .send()
            .await?;
        Ok(resp.status())
    }
}

#[async_trait]
impl TopologySource for ControllerClient {
    async fn fetch_topology(&self) -> Result<TopologySnapshot> {
        let resp = self
            .authed(self.client.get(self.api_url("/operational/network-topology:network-topology")))
            .send()
            .await
            .map_err(|e| ControllerError::new(None, e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ControllerError::new(Some(status.as_u16()), body).into());
        }

        let topology: NetworkTopologyResponse = resp.json().await.map_err(|e| {
            ControllerError::new(Some(status.as_u16()), format!("invalid topology response: {}", e))
        })?;
        Ok(topology.into())
    }

    async fn test_connection(&self) -> bool {
        match self
            .authed(self.client.get(self.api_url("/operational/network-topology:network-topology")))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl RuleInstaller for ControllerClient {
    async fn install_rule_on_switch(&self, switch_id: &str, rule: &FlowRule) -> bool {
        match self.put_flow(switch_id, rule).await {
            Ok(status) if is_install_success(status) => true,
            Ok(status) => {
                tracing::warn!("Controller rejected flow {} on {}: {}", rule.id, switch_id, status);
                false
            }
            Err(e) => {
                tracing::warn!("Failed to push flow {} to {}: {}", rule.id, switch_id, e);
                false
            }
        }
    }
}

#[async_trait]
impl LinkStatsSource for ControllerClient {
    async fn link_counters(&self, link_id: &str) -> Option<LinkCounters> {
        let url = self
            .segments_url(&["operational", "opendaylight-inventory:nodes", "node", link_id, "node-connector-statistics"])
            .ok()?;
        let resp = match self.authed(self.client.get(url)).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::debug!("Counter lookup for {} failed: {}", link_id, e);
                return None;
            }
        };
        if resp.status() != StatusCode::OK {
            return None;
        }

        let stats: ConnectorStatistics = resp.json().await.ok()?;
        Some(LinkCounters {
            bytes_received: stats.bytes_received,
            bytes_transmitted: stats.bytes_transmitted,
            packets_received: stats.packets_received,
            packets_transmitted: stats.packets_transmitted,
            timestamp: chrono::Utc::now(),
        })
    }
}

/// RESTCONF answers a flow PUT with 200 on replace and 201/204 on create
fn is_install_success(status: StatusCode) -> bool {
    matches!(status, StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT)
}
