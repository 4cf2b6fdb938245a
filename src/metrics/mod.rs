use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{interval, Duration};

use crate::cache::TopologyCache;
use crate::controller::LinkStatsSource;
use crate::models::*;
use crate::topology::SwitchRole;

const COUNTER_FETCH_CONCURRENCY: usize = 8;

/// Latest dashboard metrics, shared between the poller and handlers
#[derive(Default)]
pub struct MetricsStore {
    inner: RwLock<MetricsSnapshot>,
}

impl MetricsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> MetricsSnapshot {
        self.inner.read().await.clone()
    }

    pub async fn switch(&self, switch_id: &str) -> Option<SwitchMetrics> {
        self.inner.read().await.switches.get(switch_id).cloned()
    }

    pub async fn link(&self, link_id: &str) -> Option<LinkMetrics> {
        self.inner.read().await.links.get(link_id).cloned()
    }

    pub async fn layer(&self, role: SwitchRole) -> Option<LayerStats> {
        self.inner.read().await.layer_stats.get(&role).cloned()
    }

    pub async fn record_path(&self, record: PathRecord) {
        let key = format!("{}_{}", record.source, record.destination);
        self.inner.write().await.paths.insert(key, record);
    }

    /// Replace switch, link and layer data; provisioned paths are kept
    async fn replace_network(
        &self,
        switches: BTreeMap<String, SwitchMetrics>,
        links: BTreeMap<String, LinkMetrics>,
        layer_stats: BTreeMap<SwitchRole, LayerStats>,
    ) {
        let mut inner = self.inner.write().await;
        inner.switches = switches;
        inner.links = links;
        inner.layer_stats = layer_stats;
    }
}

/// Per-layer totals for a topology and the link metrics gathered for it
pub fn layer_statistics(
    topology: &TopologySnapshot,
    links: &BTreeMap<String, LinkMetrics>,
) -> BTreeMap<SwitchRole, LayerStats> {
    let mut stats = BTreeMap::new();

    for role in SwitchRole::ALL {
        let members: Vec<&str> = topology.switches_in(role).map(|n| n.id.as_str()).collect();
        let entry: &mut LayerStats = stats.entry(role).or_default();
        entry.total_switches = members.len();

        for link in topology.links.iter().filter(|l| members.iter().any(|m| l.touches(m))) {
            entry.total_links += 1;
            if let Some(m) = links.get(&link.id()) {
                if m.status == link_status::ACTIVE {
                    entry.active_links += 1;
                }
                entry.bytes_transmitted += m.bandwidth;
            }
        }
    }

    stats
}

/// Refresh the topology and every metric derived from it
pub async fn poll_once(
    cache: &TopologyCache,
    counters: &dyn LinkStatsSource,
    store: &MetricsStore,
) -> anyhow::Result<()> {
    let topology = cache.get_topology(true).await?;
    let now = Utc::now();

    let switches = topology
        .switches()
        .map(|n| {
            let metrics = SwitchMetrics {
                role: SwitchRole::classify(&n.id),
                last_updated: now,
            };
            (n.id.clone(), metrics)
        })
        .collect();

    let links: BTreeMap<String, LinkMetrics> = stream::iter(topology.links.clone())
        .map(|link| async move {
            let link_id = link.id();
            let counters = counters.link_counters(&link_id).await;
            let metrics = LinkMetrics {
                source: link.source,
                target: link.target,
                bandwidth: counters.as_ref().map(|c| c.bytes_transmitted).unwrap_or(0),
                status: (if counters.is_some() { link_status::ACTIVE } else { link_status::UNKNOWN }).to_string(),
                last_updated: now,
            };
            (link_id, metrics)
        })
        .buffer_unordered(COUNTER_FETCH_CONCURRENCY)
        .collect()
        .await;

    let layer_stats = layer_statistics(&topology, &links);
    store.replace_network(switches, links, layer_stats).await;
    Ok(())
}

/// Periodically polls the controller to keep dashboard metrics current
pub struct MetricsPoller {
    cache: Arc<TopologyCache>,
    counters: Arc<dyn LinkStatsSource>,
    store: Arc<MetricsStore>,
    interval_secs: u64,
    stop_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MetricsPoller {
    pub fn new(
        cache: Arc<TopologyCache>,
        counters: Arc<dyn LinkStatsSource>,
        store: Arc<MetricsStore>,
        interval_secs: u64,
    ) -> Self {
        Self {
            cache,
            counters,
            store,
            interval_secs: interval_secs.max(1),
            stop_tx: None,
        }
    }

    /// Start the poller
    pub fn start(&mut self) {
        let (stop_tx, mut stop_rx) = tokio::sync::oneshot::channel();
        self.stop_tx = Some(stop_tx);

        let cache = self.cache.clone();
        let counters = self.counters.clone();
        let store = self.store.clone();
        let interval_secs = self.interval_secs;

        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(interval_secs));

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = poll_once(&cache, counters.as_ref(), &store).await {
                            tracing::warn!("Error updating metrics: {}", e);
                        }
                    }
                    _ = &mut stop_rx => {
                        tracing::info!("Metrics poller stopped");
                        break;
                    }
                }
            }
        });
    }

    /// Stop the poller
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cache::tests::CountingSource;
    use crate::cache::DEFAULT_STALENESS;
    use crate::topology::reference_topology;
    use async_trait::async_trait;

    /// Reports counters only for links whose source is a core switch
    pub(crate) struct CoreOnlyCounters;

    #[async_trait]
    impl LinkStatsSource for CoreOnlyCounters {
        async fn link_counters(&self, link_id: &str) -> Option<LinkCounters> {
            link_id.starts_with('c').then(|| LinkCounters {
                bytes_transmitted: 1000,
                timestamp: Utc::now(),
                ..Default::default()
            })
        }
    }

    fn small_topology() -> TopologySnapshot {
        TopologySnapshot {
            nodes: vec![
                TopologyNode::switch("c1"),
                TopologyNode::switch("d1"),
                TopologyNode::switch("a1"),
                TopologyNode::host("h1"),
            ],
            links: vec![
                TopologyLink::new("c1", "d1"),
                TopologyLink::new("d1", "a1"),
                TopologyLink::new("h1", "a1"),
            ],
        }
    }

    #[test]
    fn test_layer_statistics() {
        let topo = small_topology();
        let mut links = BTreeMap::new();
        links.insert(
            "c1_d1".to_string(),
            LinkMetrics {
                source: "c1".into(),
                target: "d1".into(),
                bandwidth: 500,
                status: link_status::ACTIVE.into(),
                last_updated: Utc::now(),
            },
        );

        let stats = layer_statistics(&topo, &links);
        let core = &stats[&SwitchRole::Core];
        assert_eq!((core.total_switches, core.total_links, core.active_links), (1, 1, 1));
        assert_eq!(core.bytes_transmitted, 500);

        let dist = &stats[&SwitchRole::Distribution];
        assert_eq!((dist.total_switches, dist.total_links, dist.active_links), (1, 2, 1));

        // host link counts toward the access layer
        let access = &stats[&SwitchRole::Access];
        assert_eq!((access.total_switches, access.total_links, access.active_links), (1, 2, 0));
    }

    #[tokio::test]
    async fn test_poll_once_populates_store() {
        let source = Arc::new(CountingSource::with(reference_topology()));
        let cache = TopologyCache::new(source.clone(), DEFAULT_STALENESS);
        let store = MetricsStore::new();

        poll_once(&cache, &CoreOnlyCounters, &store).await.unwrap();

        let snapshot = store.snapshot().await;
        // 21 reference switches plus the counter node added per fetch
        assert_eq!(snapshot.switches.len(), 22);
        assert_eq!(snapshot.switches["d2"].role, SwitchRole::Distribution);
        assert_eq!(snapshot.links.len(), 75);
        assert_eq!(snapshot.links["c1_c2"].status, link_status::ACTIVE);
        assert_eq!(snapshot.links["c1_c2"].bandwidth, 1000);
        assert_eq!(snapshot.links["d1_c1"].status, link_status::UNKNOWN);
        assert_eq!(snapshot.layer_stats[&SwitchRole::Core].total_switches, 3);

        assert_eq!(store.link("a1_d1").await.unwrap().target, "d1");
        assert!(store.switch("zz").await.is_none());
    }

    #[tokio::test]
    async fn test_poll_keeps_path_records() {
        let source = Arc::new(CountingSource::with(small_topology()));
        let cache = TopologyCache::new(source.clone(), DEFAULT_STALENESS);
        let store = MetricsStore::new();
        store
            .record_path(PathRecord {
                source: "h1".into(),
                destination: "h2".into(),
                primary_path: vec!["c1".into(), "d1".into()],
                backup_path: vec![],
                primary_installed: true,
                backup_installed: true,
                provisioned_at: Utc::now(),
            })
            .await;

        poll_once(&cache, &CoreOnlyCounters, &store).await.unwrap();
        poll_once(&cache, &CoreOnlyCounters, &store).await.unwrap();

        let snapshot = store.snapshot().await;
        assert!(snapshot.paths.contains_key("h1_h2"));
        // every poll forces a refresh
        assert_eq!(source.fetches.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_poller_runs_until_stopped() {
        tokio::time::pause();
        let source = Arc::new(CountingSource::with(small_topology()));
        let cache = Arc::new(TopologyCache::new(source.clone(), DEFAULT_STALENESS));
        let store = Arc::new(MetricsStore::new());
        let mut poller = MetricsPoller::new(cache, Arc::new(CoreOnlyCounters), store.clone(), 5);

        poller.start();
        tokio::time::sleep(Duration::from_secs(6)).await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.switches["c1"].role, SwitchRole::Core);
        assert_eq!(snapshot.links["c1_d1"].status, link_status::ACTIVE);
        // first tick fires immediately, the next one at 5s
        assert!(source.fetches.load(std::sync::atomic::Ordering::SeqCst) >= 1);

        poller.stop();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let stopped_at = source.fetches.load(std::sync::atomic::Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(source.fetches.load(std::sync::atomic::Ordering::SeqCst), stopped_at);
    }

    #[tokio::test]
    async fn test_poll_failure_leaves_store_untouched() {
        let source = Arc::new(CountingSource::default());
        source.fail.store(true, std::sync::atomic::Ordering::SeqCst);
        let cache = TopologyCache::new(source.clone(), DEFAULT_STALENESS);
        let store = MetricsStore::new();

        assert!(poll_once(&cache, &CoreOnlyCounters, &store).await.is_err());
        assert!(store.snapshot().await.switches.is_empty());
    }
}
