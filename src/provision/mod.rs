use serde::Serialize;
use std::sync::Arc;

use crate::controller::RuleInstaller;
use crate::flows::generate_rules;
use crate::models::{FlowRule, ProvisioningResult};
use crate::topology::classify;

/// Progress of a single path installation.
///
/// Hop numbers count rules in installation order, which can differ from the
/// path index when a switch appears on the path more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "hop", rename_all = "snake_case")]
pub enum PathState {
    NotStarted,
    Installing(usize),
    Succeeded,
    Failed(usize),
}

impl PathState {
    /// Advance after the rule at the current hop was submitted
    fn advance(self, installed: bool, total: usize) -> Self {
        match self {
            PathState::NotStarted if total == 0 => PathState::Succeeded,
            PathState::NotStarted => PathState::Installing(0),
            PathState::Installing(hop) if !installed => PathState::Failed(hop),
            PathState::Installing(hop) if hop + 1 == total => PathState::Succeeded,
            PathState::Installing(hop) => PathState::Installing(hop + 1),
            done => done,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PathState::Succeeded | PathState::Failed(_))
    }
}

/// What happened while installing one path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathReport {
    pub state: PathState,
    /// Switches whose rule was accepted, in installation order
    pub installed: Vec<String>,
    /// Switches never attempted because an earlier hop failed
    pub skipped: Vec<String>,
}

impl PathReport {
    pub fn succeeded(&self) -> bool {
        self.state == PathState::Succeeded
    }
}

/// Stamp a rule with its switch's layer defaults.
///
/// The layer priority replaces whatever the generator computed.
pub fn apply_layer_defaults(switch_id: &str, rule: &mut FlowRule) {
    let defaults = classify(switch_id).defaults();
    rule.priority = defaults.priority;
    rule.idle_timeout = Some(defaults.idle_timeout);
}

/// Installs generated paths through a [`RuleInstaller`]
#[derive(Clone)]
pub struct Provisioner {
    installer: Arc<dyn RuleInstaller>,
}

impl Provisioner {
    pub fn new(installer: Arc<dyn RuleInstaller>) -> Self {
        Self { installer }
    }

    pub async fn install_rule(&self, switch_id: &str, mut rule: FlowRule) -> bool {
        apply_layer_defaults(switch_id, &mut rule);
        self.installer.install_rule_on_switch(switch_id, &rule).await
    }

    /// Install `path` and report whether every rule was accepted
    pub async fn install_path(&self, source: &str, destination: &str, path: &[String], is_primary: bool) -> bool {
        self.install_path_report(source, destination, path, is_primary)
            .await
            .succeeded()
    }

    /// Install every rule for `path` in order, stopping at the first rejection.
    /// Rules accepted before a failure stay installed.
    pub async fn install_path_report(
        &self,
        source: &str,
        destination: &str,
        path: &[String],
        is_primary: bool,
    ) -> PathReport {
        let rules = generate_rules(source, destination, path, is_primary);
        let total = rules.len();
        let kind = if is_primary { "primary" } else { "backup" };

        let mut report = PathReport {
            state: PathState::NotStarted.advance(true, total),
            installed: Vec::with_capacity(total),
            skipped: Vec::new(),
        };

        for hop in rules {
            if report.state.is_terminal() {
                report.skipped.push(hop.switch_id);
                continue;
            }

            let accepted = self.install_rule(&hop.switch_id, hop.rule).await;
            report.state = report.state.advance(accepted, total);
            if accepted {
                report.installed.push(hop.switch_id);
            } else if let PathState::Failed(failed_hop) = report.state {
                tracing::warn!(
                    "Aborting {} path {} -> {} at hop {}: rule rejected by {}",
                    kind,
                    source,
                    destination,
                    failed_hop,
                    hop.switch_id
                );
            }
        }

        if report.succeeded() {
            tracing::info!("Installed {} path {} -> {} ({} rules)", kind, source, destination, total);
        }
        report
    }

    /// Install the primary then the backup path. The backup is attempted
    /// whatever the primary outcome, and neither is rolled back.
    pub async fn install_redundant_path(
        &self,
        source: &str,
        destination: &str,
        primary_path: &[String],
        backup_path: &[String],
    ) -> ProvisioningResult {
        let primary = self.install_path(source, destination, primary_path, true).await;
        let backup = self.install_path(source, destination, backup_path, false).await;
        ProvisioningResult { primary, backup }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Records every submitted rule; rejects switches in `failing`
    #[derive(Default)]
    pub(crate) struct RecordingInstaller {
        pub calls: Mutex<Vec<(String, FlowRule)>>,
        pub failing: HashSet<String>,
    }

    impl RecordingInstaller {
        pub fn failing(switches: &[&str]) -> Self {
            Self {
                calls: Mutex::default(),
                failing: switches.iter().map(|s| s.to_string()).collect(),
            }
        }

        pub fn submitted(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(s, _)| s.clone()).collect()
        }
    }

    #[async_trait]
    impl RuleInstaller for RecordingInstaller {
        async fn install_rule_on_switch(&self, switch_id: &str, rule: &FlowRule) -> bool {
            self.calls.lock().unwrap().push((switch_id.to_string(), rule.clone()));
            !self.failing.contains(switch_id)
        }
    }

    fn path(hops: &[&str]) -> Vec<String> {
        hops.iter().map(|s| s.to_string()).collect()
    }

    fn provisioner(installer: &Arc<RecordingInstaller>) -> Provisioner {
        Provisioner::new(installer.clone())
    }

    #[tokio::test]
    async fn test_install_rule_overwrites_generated_priority() {
        let installer = Arc::new(RecordingInstaller::default());
        let rules = generate_rules("h1", "h2", &path(&["c1", "d1", "a1"]), true);
        let rule = rules.get("c1").unwrap().clone();
        assert_eq!(rule.priority, 1200);

        assert!(provisioner(&installer).install_rule("c1", rule).await);

        let calls = installer.calls.lock().unwrap();
        assert_eq!(calls[0].1.priority, 100);
        assert_eq!(calls[0].1.idle_timeout, Some(0));
    }

    #[tokio::test]
    async fn test_install_rule_layer_timeouts() {
        let installer = Arc::new(RecordingInstaller::default());
        let p = provisioner(&installer);
        let rules = generate_rules("h1", "h2", &path(&["d1", "a1", "c1"]), false);
        for hop in rules {
            p.install_rule(&hop.switch_id, hop.rule).await;
        }

        let calls = installer.calls.lock().unwrap();
        assert_eq!((calls[0].1.priority, calls[0].1.idle_timeout), (50, Some(300)));
        assert_eq!((calls[1].1.priority, calls[1].1.idle_timeout), (10, Some(60)));
    }

    #[tokio::test]
    async fn test_install_rule_reports_installer_result() {
        let installer = Arc::new(RecordingInstaller::failing(&["c1"]));
        let rule = generate_rules("h1", "h2", &path(&["c1", "d1"]), true).get("c1").unwrap().clone();
        assert!(!provisioner(&installer).install_rule("c1", rule).await);
    }

    #[tokio::test]
    async fn test_install_path_all_hops() {
        let installer = Arc::new(RecordingInstaller::default());
        let report = provisioner(&installer)
            .install_path_report("h1", "h2", &path(&["a1", "d1", "c1", "d2"]), true)
            .await;

        assert_eq!(report.state, PathState::Succeeded);
        assert_eq!(report.installed, vec!["a1", "d1", "c1"]);
        assert!(report.skipped.is_empty());
        assert_eq!(installer.submitted(), vec!["a1", "d1", "c1"]);
    }

    #[tokio::test]
    async fn test_install_path_stops_at_first_failure() {
        let installer = Arc::new(RecordingInstaller::failing(&["a1"]));
        let p = provisioner(&installer);
        let hops = path(&["a1", "d1", "c1", "d2"]);

        assert!(!p.install_path("h1", "h2", &hops, true).await);
        assert_eq!(installer.submitted(), vec!["a1"]);

        let report = p.install_path_report("h1", "h2", &hops, true).await;
        assert_eq!(report.state, PathState::Failed(0));
        assert!(report.installed.is_empty());
        assert_eq!(report.skipped, vec!["d1", "c1"]);
    }

    #[tokio::test]
    async fn test_install_path_partial_install_kept() {
        let installer = Arc::new(RecordingInstaller::failing(&["c1"]));
        let report = provisioner(&installer)
            .install_path_report("h1", "h2", &path(&["a1", "d1", "c1", "d2", "a2"]), true)
            .await;

        assert_eq!(report.state, PathState::Failed(2));
        assert_eq!(report.installed, vec!["a1", "d1"]);
        assert_eq!(report.skipped, vec!["d2"]);
        assert_eq!(installer.submitted(), vec!["a1", "d1", "c1"]);
    }

    #[tokio::test]
    async fn test_install_path_degenerate_is_success() {
        let installer = Arc::new(RecordingInstaller::default());
        let p = provisioner(&installer);

        assert!(p.install_path("h1", "h1", &path(&["a1"]), true).await);
        assert!(p.install_path("h1", "h2", &[], false).await);
        assert!(installer.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_redundant_backup_attempted_after_primary_failure() {
        let installer = Arc::new(RecordingInstaller::failing(&["c1"]));
        let result = provisioner(&installer)
            .install_redundant_path("h1", "h2", &path(&["c1", "d1", "a1"]), &path(&["c2", "d2", "a1"]))
            .await;

        assert_eq!(result, ProvisioningResult { primary: false, backup: true });
        assert_eq!(installer.submitted(), vec!["c1", "c2", "d2"]);

        let calls = installer.calls.lock().unwrap();
        assert_eq!(calls[1].1.id, "flow_h1_h2_0_backup");
    }

    #[tokio::test]
    async fn test_redundant_both_fail_independently() {
        let installer = Arc::new(RecordingInstaller::failing(&["c1", "d2"]));
        let result = provisioner(&installer)
            .install_redundant_path("h1", "h2", &path(&["c1", "d1", "a1"]), &path(&["c2", "d2", "a1"]))
            .await;

        assert_eq!(result, ProvisioningResult { primary: false, backup: false });
        // primary stops at c1, backup gets as far as d2
        assert_eq!(installer.submitted(), vec!["c1", "c2", "d2"]);
    }

    #[test]
    fn test_state_transitions() {
        assert_eq!(PathState::NotStarted.advance(true, 0), PathState::Succeeded);
        assert_eq!(PathState::NotStarted.advance(true, 2), PathState::Installing(0));
        assert_eq!(PathState::Installing(0).advance(true, 2), PathState::Installing(1));
        assert_eq!(PathState::Installing(1).advance(true, 2), PathState::Succeeded);
        assert_eq!(PathState::Installing(1).advance(false, 2), PathState::Failed(1));
        assert_eq!(PathState::Failed(1).advance(true, 2), PathState::Failed(1));
    }
}
