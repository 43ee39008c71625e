//! Terminal self-check: named existence probes over the reconstructed
//! workspace.
//!
//! The driver supplies a probe per expected artifact; the runner executes
//! the whole set as its final phase, which succeeds only if every probe
//! holds. The `status` command reuses the same probes to inspect a target
//! without running anything.

use crate::config::BootstrapConfig;

/// Name under which the self-check appears in logs and the report.
pub const SELF_CHECK_PHASE: &str = "self_test";

/// A boolean existence probe. Supplied by the driver; opaque to the runner.
pub type Probe = Box<dyn Fn(&BootstrapConfig) -> bool>;

/// Ordered set of named probes.
#[derive(Default)]
pub struct SelfCheck {
    probes: Vec<(String, Probe)>,
}

/// Aggregate result of evaluating every probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub all_passed: bool,
    /// Names of the conditions that did not hold, in probe order.
    pub failed: Vec<String>,
    pub total: usize,
}

impl SelfCheck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named probe. Builder-style so the driver can chain the full
    /// condition set.
    pub fn probe(
        mut self,
        name: &str,
        probe: impl Fn(&BootstrapConfig) -> bool + 'static,
    ) -> Self {
        self.probes.push((name.to_string(), Box::new(probe)));
        self
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// Evaluate every probe and report which ones failed.
    pub fn evaluate(&self, config: &BootstrapConfig) -> CheckOutcome {
        let mut failed = Vec::new();
        for (name, probe) in &self.probes {
            let passed = probe(config);
            tracing::debug!(condition = %name, passed, "self-check probe");
            if !passed {
                failed.push(name.clone());
            }
        }
        CheckOutcome {
            all_passed: failed.is_empty(),
            failed,
            total: self.probes.len(),
        }
    }

    /// Per-probe results in probe order, for display.
    pub fn results(&self, config: &BootstrapConfig) -> Vec<(&str, bool)> {
        self.probes
            .iter()
            .map(|(name, probe)| (name.as_str(), probe(config)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config() -> BootstrapConfig {
        BootstrapConfig::new(PathBuf::from("."), false)
    }

    #[test]
    fn test_empty_check_passes() {
        let check = SelfCheck::new();
        let outcome = check.evaluate(&config());
        assert!(outcome.all_passed);
        assert!(outcome.failed.is_empty());
        assert_eq!(outcome.total, 0);
    }

    #[test]
    fn test_all_probes_true_passes() {
        let check = SelfCheck::new()
            .probe("alpha", |_| true)
            .probe("beta", |_| true);
        let outcome = check.evaluate(&config());
        assert!(outcome.all_passed);
        assert_eq!(outcome.total, 2);
    }

    #[test]
    fn test_failing_probes_are_named_in_order() {
        let check = SelfCheck::new()
            .probe("alpha", |_| true)
            .probe("beta", |_| false)
            .probe("gamma", |_| false);
        let outcome = check.evaluate(&config());
        assert!(!outcome.all_passed);
        assert_eq!(outcome.failed, vec!["beta".to_string(), "gamma".to_string()]);
    }

    #[test]
    fn test_probes_receive_config() {
        let check = SelfCheck::new().probe("base path is relative", |cfg| {
            cfg.base_path.is_relative()
        });
        let outcome = check.evaluate(&config());
        assert!(outcome.all_passed);
    }

    #[test]
    fn test_results_lists_every_probe() {
        let check = SelfCheck::new()
            .probe("alpha", |_| true)
            .probe("beta", |_| false);
        let results = check.results(&config());
        assert_eq!(results, vec![("alpha", true), ("beta", false)]);
    }
}
