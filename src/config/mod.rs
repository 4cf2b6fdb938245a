use std::env;
use std::time::Duration;

/// Config holds all application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub controller_host: String,
    pub controller_port: u16,
    pub controller_user: String,
    pub controller_password: String,
    pub controller_timeout_secs: u64,
    pub flow_table_id: u8,
    pub topology_cache_secs: u64,
    pub metrics_poll_secs: u64,
    pub listen_addr: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        Self {
            controller_host: get_env("CONTROLLER_HOST", "localhost"),
            controller_port: get_parsed("CONTROLLER_PORT", 8181),
            controller_user: get_env("CONTROLLER_USER", "admin"),
            controller_password: get_env("CONTROLLER_PASSWORD", "admin"),
            controller_timeout_secs: get_parsed("CONTROLLER_TIMEOUT_SECS", 30),
            flow_table_id: get_parsed("FLOW_TABLE_ID", 0),
            topology_cache_secs: get_parsed("TOPOLOGY_CACHE_SECS", 30),
            metrics_poll_secs: get_parsed("METRICS_POLL_SECS", 5),
            listen_addr: get_env("LISTEN_ADDR", "0.0.0.0:5000"),
        }
    }

    /// RESTCONF root of the SDN controller
    pub fn controller_url(&self) -> String {
        format!("http://{}:{}/restconf", self.controller_host, self.controller_port)
    }

    pub fn topology_cache_window(&self) -> Duration {
        Duration::from_secs(self.topology_cache_secs)
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a numeric variable, falling back to the default when unset or malformed
fn get_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
