//! Sequential phase execution with isolated failure handling.
//!
//! The runner walks the registry strictly in ordinal order, times each
//! action, appends one [`ExecutionLog`] per phase to the injected sink as
//! the phase completes, and accumulates the [`ExecutionReport`]. A failing
//! action is recorded and the run continues; phases here are independent
//! scaffold steps, not a dependency chain. After every registered phase has
//! been attempted, the terminal self-check runs and is logged like any
//! other phase.
//!
//! `run` itself never fails: registry construction is the only fatal path,
//! and it happens before a runner exists.

use chrono::Utc;
use std::time::Instant;

use crate::config::BootstrapConfig;
use crate::registry::PhaseRegistry;
use crate::report::{ExecutionLog, ExecutionReport, LogSink, PhaseStatus, PhaseSummary};
use crate::selfcheck::{SELF_CHECK_PHASE, SelfCheck};
use crate::ui::BootstrapUI;

/// Everything a completed run produces.
#[derive(Debug)]
pub struct RunSummary {
    pub report: ExecutionReport,
    /// Aggregate result of the terminal self-check, surfaced distinctly
    /// from the per-phase counters.
    pub self_test_passed: bool,
}

impl RunSummary {
    /// True only when every registered phase succeeded and the self-check
    /// passed.
    pub fn ok(&self) -> bool {
        self.report.all_succeeded() && self.self_test_passed
    }
}

/// Executes a registry of phases against a shared config.
pub struct PhaseRunner<'a> {
    config: &'a BootstrapConfig,
    sink: &'a mut dyn LogSink,
    ui: Option<&'a BootstrapUI>,
}

impl<'a> PhaseRunner<'a> {
    pub fn new(config: &'a BootstrapConfig, sink: &'a mut dyn LogSink) -> Self {
        Self {
            config,
            sink,
            ui: None,
        }
    }

    pub fn with_ui(mut self, ui: &'a BootstrapUI) -> Self {
        self.ui = Some(ui);
        self
    }

    /// Run every registered phase in order, then the self-check.
    ///
    /// Produces exactly `registry.len() + 1` sink records, in registry
    /// order with the self-check last. No phase is retried and no
    /// completed record is revised.
    pub fn run(&mut self, registry: &PhaseRegistry, check: &SelfCheck) -> RunSummary {
        let run_start = Instant::now();
        let mut report = ExecutionReport::new();
        let mut success_count = 0usize;

        for phase in registry.ordered_phases() {
            if let Some(ui) = self.ui {
                ui.start_phase(&phase.label(), &phase.name);
            }

            let started_at = Utc::now();
            let start = Instant::now();
            let result = phase.invoke(self.config);
            let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

            match result {
                Ok(()) => {
                    tracing::info!(phase = %phase.name, duration_ms, "phase completed");
                    self.sink.record(&ExecutionLog::success(
                        &phase.name,
                        "Phase completed",
                        duration_ms,
                    ));
                    report.phases.insert(
                        phase.name.clone(),
                        PhaseSummary {
                            status: PhaseStatus::Success,
                            duration_ms,
                            timestamp: started_at,
                            error: None,
                        },
                    );
                    success_count += 1;
                    if let Some(ui) = self.ui {
                        ui.phase_complete(&phase.label(), &phase.name, duration_ms);
                    }
                }
                Err(e) => {
                    // Every failure is flattened to its full context chain;
                    // the engine does not distinguish error categories.
                    let description = format!("{e:#}");
                    tracing::error!(phase = %phase.name, error = %description, "phase failed");
                    self.sink.record(&ExecutionLog::error(
                        &phase.name,
                        &format!("Failed: {description}"),
                        duration_ms,
                        vec![description.clone()],
                    ));
                    if let Some(ui) = self.ui {
                        ui.phase_failed(&phase.label(), &phase.name, &description);
                    }
                    report.phases.insert(
                        phase.name.clone(),
                        PhaseSummary {
                            status: PhaseStatus::Error,
                            duration_ms,
                            timestamp: started_at,
                            error: Some(description),
                        },
                    );
                }
            }
        }

        let self_test_passed = self.run_self_check(check, &mut report, registry.len());

        report.metrics.insert(
            "total_duration_ms".to_string(),
            serde_json::json!(run_start.elapsed().as_secs_f64() * 1000.0),
        );
        report.metrics.insert(
            "log_entries".to_string(),
            serde_json::json!(registry.len() + 1),
        );
        report.finish(success_count, registry.len());

        RunSummary {
            report,
            self_test_passed,
        }
    }

    /// Evaluate the probes as the terminal phase. Logged like any other
    /// phase; the aggregate boolean is returned for the summary.
    fn run_self_check(
        &mut self,
        check: &SelfCheck,
        report: &mut ExecutionReport,
        registered: usize,
    ) -> bool {
        if let Some(ui) = self.ui {
            ui.start_phase(&format!("{:02}", registered + 1), SELF_CHECK_PHASE);
        }

        let started_at = Utc::now();
        let start = Instant::now();
        let outcome = check.evaluate(self.config);
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        if outcome.all_passed {
            tracing::info!(conditions = outcome.total, "self-check passed");
            self.sink.record(&ExecutionLog::success(
                SELF_CHECK_PHASE,
                &format!("All {} conditions hold", outcome.total),
                duration_ms,
            ));
            report.phases.insert(
                SELF_CHECK_PHASE.to_string(),
                PhaseSummary {
                    status: PhaseStatus::Success,
                    duration_ms,
                    timestamp: started_at,
                    error: None,
                },
            );
            if let Some(ui) = self.ui {
                ui.phase_complete(
                    &format!("{:02}", registered + 1),
                    SELF_CHECK_PHASE,
                    duration_ms,
                );
            }
            true
        } else {
            let description = format!("Failed conditions: {}", outcome.failed.join(", "));
            tracing::error!(
                failed = outcome.failed.len(),
                conditions = outcome.total,
                "self-check failed"
            );
            self.sink.record(&ExecutionLog::error(
                SELF_CHECK_PHASE,
                &description,
                duration_ms,
                outcome.failed.clone(),
            ));
            report.phases.insert(
                SELF_CHECK_PHASE.to_string(),
                PhaseSummary {
                    status: PhaseStatus::Error,
                    duration_ms,
                    timestamp: started_at,
                    error: Some(description.clone()),
                },
            );
            if let Some(ui) = self.ui {
                ui.phase_failed(
                    &format!("{:02}", registered + 1),
                    SELF_CHECK_PHASE,
                    &description,
                );
            }
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PhaseAction;
    use crate::report::MemorySink;
    use std::path::PathBuf;

    fn config() -> BootstrapConfig {
        BootstrapConfig::new(PathBuf::from("."), false)
    }

    fn succeeds() -> PhaseAction {
        Box::new(|_| Ok(()))
    }

    fn fails(message: &'static str) -> PhaseAction {
        Box::new(move |_| anyhow::bail!(message))
    }

    fn passing_check() -> SelfCheck {
        SelfCheck::new().probe("always", |_| true)
    }

    #[test]
    fn test_run_produces_one_log_per_phase_plus_self_check() {
        let mut registry = PhaseRegistry::new();
        registry.register(1, "alpha", succeeds()).unwrap();
        registry.register(2, "beta", succeeds()).unwrap();
        registry.register(3, "gamma", succeeds()).unwrap();

        let config = config();
        let mut sink = MemorySink::default();
        let summary = PhaseRunner::new(&config, &mut sink).run(&registry, &passing_check());

        let phases: Vec<&str> = sink.entries.iter().map(|e| e.phase.as_str()).collect();
        assert_eq!(phases, vec!["alpha", "beta", "gamma", SELF_CHECK_PHASE]);
        assert_eq!(summary.report.success_count, 3);
        assert_eq!(summary.report.total_phases, 3);
        assert!(summary.ok());
    }

    #[test]
    fn test_failure_is_isolated_and_run_continues() {
        let mut registry = PhaseRegistry::new();
        registry.register(1, "alpha", succeeds()).unwrap();
        registry.register(2, "beta", fails("boom")).unwrap();
        registry.register(3, "gamma", succeeds()).unwrap();

        let config = config();
        let mut sink = MemorySink::default();
        let summary = PhaseRunner::new(&config, &mut sink).run(&registry, &passing_check());

        let statuses: Vec<PhaseStatus> = sink.entries.iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![
                PhaseStatus::Success,
                PhaseStatus::Error,
                PhaseStatus::Success,
                PhaseStatus::Success,
            ]
        );
        assert_eq!(summary.report.success_count, 2);
        assert_eq!(summary.report.phases["beta"].error.as_deref(), Some("boom"));
        // gamma was still attempted
        assert!(summary.report.phases.contains_key("gamma"));
        assert!(!summary.ok());
    }

    #[test]
    fn test_error_log_carries_nonempty_description() {
        let mut registry = PhaseRegistry::new();
        registry.register(1, "broken", fails("disk on fire")).unwrap();

        let config = config();
        let mut sink = MemorySink::default();
        PhaseRunner::new(&config, &mut sink).run(&registry, &passing_check());

        let entry = &sink.entries[0];
        assert_eq!(entry.status, PhaseStatus::Error);
        let errors = entry.errors.as_ref().unwrap();
        assert!(!errors.is_empty());
        assert!(errors[0].contains("disk on fire"));
    }

    #[test]
    fn test_empty_registry_still_runs_self_check() {
        let registry = PhaseRegistry::new();
        let config = config();
        let mut sink = MemorySink::default();
        let summary = PhaseRunner::new(&config, &mut sink).run(&registry, &passing_check());

        assert_eq!(sink.entries.len(), 1);
        assert_eq!(sink.entries[0].phase, SELF_CHECK_PHASE);
        assert_eq!(summary.report.total_phases, 0);
        assert_eq!(summary.report.success_count, 0);
        assert!(summary.self_test_passed);
        assert!(summary.ok());
    }

    #[test]
    fn test_self_check_failure_names_conditions() {
        let mut registry = PhaseRegistry::new();
        registry.register(1, "alpha", succeeds()).unwrap();

        let check = SelfCheck::new()
            .probe("workspace exists", |_| true)
            .probe("manifest written", |_| false);

        let config = config();
        let mut sink = MemorySink::default();
        let summary = PhaseRunner::new(&config, &mut sink).run(&registry, &check);

        assert!(!summary.self_test_passed);
        assert!(!summary.ok());
        // Phase counters exclude the self-check.
        assert_eq!(summary.report.success_count, 1);
        assert_eq!(summary.report.total_phases, 1);

        let last = sink.entries.last().unwrap();
        assert_eq!(last.status, PhaseStatus::Error);
        assert_eq!(
            last.errors.as_deref(),
            Some(&["manifest written".to_string()][..])
        );
        let report_entry = &summary.report.phases[SELF_CHECK_PHASE];
        assert!(
            report_entry
                .error
                .as_deref()
                .unwrap()
                .contains("manifest written")
        );
    }

    #[test]
    fn test_success_count_matches_successful_logs() {
        let mut registry = PhaseRegistry::new();
        registry.register(1, "a", succeeds()).unwrap();
        registry.register(2, "b", fails("x")).unwrap();
        registry.register(3, "c", fails("y")).unwrap();
        registry.register(4, "d", succeeds()).unwrap();

        let config = config();
        let mut sink = MemorySink::default();
        let summary = PhaseRunner::new(&config, &mut sink).run(&registry, &passing_check());

        let successes = sink
            .entries
            .iter()
            .filter(|e| e.phase != SELF_CHECK_PHASE && e.status.is_success())
            .count();
        assert_eq!(summary.report.success_count, successes);
        assert!(summary.report.success_count <= summary.report.total_phases);
    }

    #[test]
    fn test_report_has_one_entry_per_attempted_phase() {
        let mut registry = PhaseRegistry::new();
        registry.register(1, "alpha", succeeds()).unwrap();
        registry.register(2, "beta", fails("boom")).unwrap();

        let config = config();
        let mut sink = MemorySink::default();
        let summary = PhaseRunner::new(&config, &mut sink).run(&registry, &passing_check());

        // alpha, beta, and the self-check.
        assert_eq!(summary.report.phases.len(), 3);
        assert!(summary.report.end_time.is_some());
    }

    #[test]
    fn test_actions_observe_completed_predecessors() {
        // Sequential scheduling: a later phase sees state the earlier phase
        // left behind.
        let dir = tempfile::tempdir().unwrap();
        let config = BootstrapConfig::new(dir.path().to_path_buf(), false);

        let mut registry = PhaseRegistry::new();
        registry
            .register(
                1,
                "writer",
                Box::new(|cfg: &BootstrapConfig| {
                    std::fs::write(cfg.base_path.join("marker"), "done")?;
                    Ok(())
                }),
            )
            .unwrap();
        registry
            .register(
                2,
                "reader",
                Box::new(|cfg: &BootstrapConfig| {
                    anyhow::ensure!(
                        cfg.base_path.join("marker").exists(),
                        "marker missing"
                    );
                    Ok(())
                }),
            )
            .unwrap();

        let mut sink = MemorySink::default();
        let summary = PhaseRunner::new(&config, &mut sink).run(&registry, &SelfCheck::new());
        assert_eq!(summary.report.success_count, 2);
    }

    #[test]
    fn test_metrics_are_populated() {
        let registry = PhaseRegistry::new();
        let config = config();
        let mut sink = MemorySink::default();
        let summary = PhaseRunner::new(&config, &mut sink).run(&registry, &passing_check());

        assert!(summary.report.metrics.contains_key("total_duration_ms"));
        assert_eq!(
            summary.report.metrics["log_entries"],
            serde_json::json!(1)
        );
    }
}
