use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::controller::TopologySource;
use crate::models::TopologySnapshot;

pub const DEFAULT_STALENESS: Duration = Duration::from_secs(30);

struct CachedTopology {
    snapshot: Arc<TopologySnapshot>,
    fetched_at: Instant,
}

/// Last fetched topology, refreshed lazily once older than the staleness window.
///
/// Concurrent callers that both see a stale entry each fetch; the last writer
/// wins. Snapshots are replaced whole and never mutated in place.
pub struct TopologyCache {
    source: Arc<dyn TopologySource>,
    staleness: Duration,
    entry: RwLock<Option<CachedTopology>>,
}

impl TopologyCache {
    pub fn new(source: Arc<dyn TopologySource>, staleness: Duration) -> Self {
        Self {
            source,
            staleness,
            entry: RwLock::new(None),
        }
    }

    pub async fn get_topology(&self, force_refresh: bool) -> Result<Arc<TopologySnapshot>> {
        if !force_refresh {
            if let Some(cached) = self.entry.read().await.as_ref() {
                if cached.fetched_at.elapsed() <= self.staleness {
                    tracing::debug!("Topology cache hit");
                    return Ok(cached.snapshot.clone());
                }
            }
        }

        // A failed fetch leaves the previous entry in place
        let snapshot = Arc::new(self.source.fetch_topology().await?);
        *self.entry.write().await = Some(CachedTopology {
            snapshot: snapshot.clone(),
            fetched_at: Instant::now(),
        });
        tracing::debug!(
            "Topology refreshed: {} nodes, {} links",
            snapshot.nodes.len(),
            snapshot.links.len()
        );
        Ok(snapshot)
    }

    /// Age of the cached snapshot, if any
    pub async fn age(&self) -> Option<Duration> {
        self.entry.read().await.as_ref().map(|c| c.fetched_at.elapsed())
    }

    pub async fn test_connection(&self) -> bool {
        self.source.test_connection().await
    }
}
