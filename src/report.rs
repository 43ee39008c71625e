//! Execution records and report persistence.
//!
//! Three layers, mirroring what the runner produces:
//! - [`ExecutionLog`]: one immutable record per executed phase
//! - [`ExecutionReport`]: the aggregated, run-level outcome
//! - [`ReportStore`]: persistence of report artifacts keyed by run timestamp
//!
//! The [`LogSink`] trait decouples the runner from where per-phase records
//! go, so tests can inject an in-memory sink.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Outcome of a single phase. The engine distinguishes exactly two states;
/// categorization beyond that is the action's business and is flattened to
/// a string before it reaches a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PhaseStatus {
    Success,
    Error,
}

impl PhaseStatus {
    pub fn is_success(self) -> bool {
        matches!(self, PhaseStatus::Success)
    }
}

/// One immutable record of a single phase's outcome. Created exactly once,
/// immediately after the phase action returns or fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionLog {
    /// Completion time of the phase.
    pub timestamp: DateTime<Utc>,
    pub phase: String,
    pub status: PhaseStatus,
    pub message: String,
    pub duration_ms: f64,
    /// Error descriptions; present and non-empty only when status is Error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ExecutionLog {
    pub fn success(phase: &str, message: &str, duration_ms: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            phase: phase.to_string(),
            status: PhaseStatus::Success,
            message: message.to_string(),
            duration_ms,
            errors: None,
        }
    }

    pub fn error(phase: &str, message: &str, duration_ms: f64, errors: Vec<String>) -> Self {
        debug_assert!(!errors.is_empty(), "error log must carry at least one error");
        Self {
            timestamp: Utc::now(),
            phase: phase.to_string(),
            status: PhaseStatus::Error,
            message: message.to_string(),
            duration_ms,
            errors: Some(errors),
        }
    }
}

/// Per-phase entry in the aggregate report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseSummary {
    pub status: PhaseStatus,
    pub duration_ms: f64,
    /// Start time of the phase.
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate state for a whole run. Owned exclusively by the runner while
/// the run is in flight; read-only once persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub run_id: Uuid,
    pub start_time: DateTime<Utc>,
    /// Set once, after every registered phase and the self-check have been
    /// attempted.
    pub end_time: Option<DateTime<Utc>>,
    /// One entry per attempted phase, keyed by phase name. Includes the
    /// self-check entry; the counters below do not.
    pub phases: BTreeMap<String, PhaseSummary>,
    pub metrics: BTreeMap<String, serde_json::Value>,
    /// Number of registered phases (self-check excluded) that succeeded.
    pub success_count: usize,
    /// Number of registered phases (self-check excluded).
    pub total_phases: usize,
}

impl ExecutionReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            start_time: Utc::now(),
            end_time: None,
            phases: BTreeMap::new(),
            metrics: BTreeMap::new(),
            success_count: 0,
            total_phases: 0,
        }
    }

    /// Seal the report at run completion.
    pub fn finish(&mut self, success_count: usize, total_phases: usize) {
        self.end_time = Some(Utc::now());
        self.success_count = success_count;
        self.total_phases = total_phases;
    }

    /// True when every registered phase succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.success_count == self.total_phases
    }
}

impl Default for ExecutionReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Destination for per-phase records. The runner writes exactly one record
/// per phase, in completion order, as each phase completes.
pub trait LogSink {
    fn record(&mut self, entry: &ExecutionLog);
}

/// Sink that appends one JSON object per line to a file.
///
/// Record failures are logged and swallowed: the sink contract is
/// "eventually durable", and a failing log line must never abort a run.
pub struct JsonlSink {
    file: std::fs::File,
    path: PathBuf,
}

impl JsonlSink {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create log directory: {}", parent.display())
            })?;
        }
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create phase log: {}", path.display()))?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }
}

impl LogSink for JsonlSink {
    fn record(&mut self, entry: &ExecutionLog) {
        let line = match serde_json::to_string(entry) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize phase log record");
                return;
            }
        };
        if let Err(e) = writeln!(self.file, "{line}").and_then(|_| self.file.flush()) {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to write phase log record"
            );
        }
    }
}

/// In-memory sink, for tests and for embedding the runner without a log
/// file.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub entries: Vec<ExecutionLog>,
}

impl LogSink for MemorySink {
    fn record(&mut self, entry: &ExecutionLog) {
        self.entries.push(entry.clone());
    }
}

/// Stores report artifacts at the workspace root as
/// `reconstruction_report_<timestamp>.json`.
pub struct ReportStore {
    base_dir: PathBuf,
}

impl ReportStore {
    pub fn new(base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
        }
    }

    /// Write the final report, pretty-printed, keyed by the run timestamp.
    pub fn persist(&self, report: &ExecutionReport, timestamp: &str) -> Result<PathBuf> {
        let path = self
            .base_dir
            .join(format!("reconstruction_report_{timestamp}.json"));
        let json =
            serde_json::to_string_pretty(report).context("Failed to serialize execution report")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        Ok(path)
    }

    /// All stored report artifacts, most recent first.
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }
        let mut reports: Vec<PathBuf> = std::fs::read_dir(&self.base_dir)
            .with_context(|| format!("Failed to read directory: {}", self.base_dir.display()))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .map(|n| {
                        let name = n.to_string_lossy();
                        name.starts_with("reconstruction_report_") && name.ends_with(".json")
                    })
                    .unwrap_or(false)
            })
            .collect();
        reports.sort();
        reports.reverse();
        Ok(reports)
    }

    pub fn load(&self, path: &Path) -> Result<ExecutionReport> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read report: {}", path.display()))?;
        let report: ExecutionReport = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse report: {}", path.display()))?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_phase_status_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&PhaseStatus::Success).unwrap(),
            "\"SUCCESS\""
        );
        assert_eq!(
            serde_json::to_string(&PhaseStatus::Error).unwrap(),
            "\"ERROR\""
        );
    }

    #[test]
    fn test_success_log_has_no_errors_field() {
        let log = ExecutionLog::success("filesystem", "Phase completed", 12.5);
        assert_eq!(log.status, PhaseStatus::Success);
        assert!(log.errors.is_none());

        let json = serde_json::to_string(&log).unwrap();
        assert!(!json.contains("errors"));
    }

    #[test]
    fn test_error_log_carries_descriptions() {
        let log = ExecutionLog::error("database", "Failed: boom", 3.0, vec!["boom".into()]);
        assert_eq!(log.status, PhaseStatus::Error);
        assert_eq!(log.errors.as_deref(), Some(&["boom".to_string()][..]));
    }

    #[test]
    fn test_report_new_is_open() {
        let report = ExecutionReport::new();
        assert!(report.end_time.is_none());
        assert!(report.phases.is_empty());
        assert_eq!(report.success_count, 0);
    }

    #[test]
    fn test_report_finish_seals_counters() {
        let mut report = ExecutionReport::new();
        report.finish(8, 10);
        assert!(report.end_time.is_some());
        assert_eq!(report.success_count, 8);
        assert_eq!(report.total_phases, 10);
        assert!(!report.all_succeeded());
    }

    #[test]
    fn test_memory_sink_records_in_order() {
        let mut sink = MemorySink::default();
        sink.record(&ExecutionLog::success("alpha", "ok", 1.0));
        sink.record(&ExecutionLog::error("beta", "bad", 2.0, vec!["bad".into()]));
        assert_eq!(sink.entries.len(), 2);
        assert_eq!(sink.entries[0].phase, "alpha");
        assert_eq!(sink.entries[1].phase, "beta");
    }

    #[test]
    fn test_jsonl_sink_writes_one_line_per_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs/bootstrap.jsonl");
        let mut sink = JsonlSink::create(&path).unwrap();
        sink.record(&ExecutionLog::success("alpha", "ok", 1.0));
        sink.record(&ExecutionLog::success("beta", "ok", 2.0));

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let parsed: ExecutionLog = serde_json::from_str(line).unwrap();
            assert_eq!(parsed.status, PhaseStatus::Success);
        }
    }

    #[test]
    fn test_report_store_persist_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let store = ReportStore::new(dir.path());

        let mut report = ExecutionReport::new();
        report.phases.insert(
            "filesystem".to_string(),
            PhaseSummary {
                status: PhaseStatus::Success,
                duration_ms: 4.2,
                timestamp: Utc::now(),
                error: None,
            },
        );
        report.finish(1, 1);

        let path = store.persist(&report, "20260101_120000").unwrap();
        assert!(path.exists());
        assert!(
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .contains("20260101_120000")
        );

        let loaded = store.load(&path).unwrap();
        assert_eq!(loaded.run_id, report.run_id);
        assert_eq!(loaded.success_count, 1);
        assert_eq!(loaded.phases.len(), 1);
        assert_eq!(
            loaded.phases["filesystem"].status,
            PhaseStatus::Success
        );
    }

    #[test]
    fn test_report_store_list_most_recent_first() {
        let dir = tempdir().unwrap();
        let store = ReportStore::new(dir.path());
        let report = ExecutionReport::new();
        store.persist(&report, "20260101_080000").unwrap();
        store.persist(&report, "20260102_080000").unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert!(
            listed[0]
                .file_name()
                .unwrap()
                .to_string_lossy()
                .contains("20260102")
        );
    }

    #[test]
    fn test_report_store_list_empty_directory() {
        let dir = tempdir().unwrap();
        let store = ReportStore::new(&dir.path().join("missing"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_report_store_load_invalid_json() {
        let dir = tempdir().unwrap();
        let bad = dir.path().join("reconstruction_report_x.json");
        std::fs::write(&bad, "{ not json").unwrap();
        let store = ReportStore::new(dir.path());
        let result = store.load(&bad);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse report")
        );
    }
}
