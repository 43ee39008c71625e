use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::report::ExecutionReport;

/// Terminal UI for a bootstrap run, rendered via `indicatif`.
///
/// One bar tracks completed phases; per-phase outcome lines are printed
/// above it. The existence and ordering of structured records is the
/// engine's contract; everything here is presentation only.
pub struct BootstrapUI {
    multi: MultiProgress,
    phase_bar: ProgressBar,
    verbose: bool,
}

impl BootstrapUI {
    /// Create the UI. `total_phases` includes the terminal self-check.
    pub fn new(total_phases: u64, verbose: bool) -> Self {
        let multi = MultiProgress::new();

        let phase_style = ProgressStyle::default_bar()
            .template("{prefix:.bold.dim} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("progress bar template is a valid static string")
            .progress_chars("█▓▒░");

        let phase_bar = multi.add(ProgressBar::new(total_phases));
        phase_bar.set_style(phase_style);
        phase_bar.set_prefix("Phases");

        Self {
            multi,
            phase_bar,
            verbose,
        }
    }

    /// Print a line via `MultiProgress`, falling back to `eprintln!` if the
    /// rich UI fails.
    fn print_line(&self, msg: impl AsRef<str>) {
        if self.multi.println(msg.as_ref()).is_err() {
            eprintln!("{}", msg.as_ref());
        }
    }

    /// Update the bar message to the phase about to execute.
    pub fn start_phase(&self, label: &str, name: &str) {
        self.phase_bar
            .set_message(format!("{}: {}", style(label).yellow(), name));
    }

    /// Advance the bar and print the phase's success line.
    pub fn phase_complete(&self, label: &str, name: &str, duration_ms: f64) {
        self.print_line(format!(
            "  {} Phase {} {} ({:.0}ms)",
            style("✓").green(),
            label,
            name,
            duration_ms
        ));
        self.phase_bar.inc(1);
    }

    /// Advance the bar and print the phase's failure line. The run
    /// continues, so this is a report, not an abort.
    pub fn phase_failed(&self, label: &str, name: &str, error: &str) {
        self.print_line(format!(
            "  {} Phase {} {}: {}",
            style("✗").red(),
            label,
            name,
            style(error).red()
        ));
        self.phase_bar.inc(1);
    }

    pub fn finish(&self) {
        self.phase_bar.finish_and_clear();
    }

    /// Print the final summary block.
    pub fn print_summary(
        &self,
        report: &ExecutionReport,
        self_test_passed: bool,
        report_path: &std::path::Path,
        base_path: &std::path::Path,
    ) {
        let overall_ok = report.all_succeeded() && self_test_passed;

        println!();
        println!("{}", style("Reconstruction Summary").bold());
        println!("{}", style("======================").bold());
        println!(
            "Phases:    {}/{} succeeded",
            report.success_count, report.total_phases
        );
        println!(
            "Self-test: {}",
            if self_test_passed {
                style("passed").green().to_string()
            } else {
                style("failed").red().to_string()
            }
        );
        println!(
            "Overall:   {}",
            if overall_ok {
                style("SUCCESS").green().bold().to_string()
            } else {
                style("FAILED").red().bold().to_string()
            }
        );
        println!();
        println!("Report:    {}", report_path.display());
        println!("Workspace: {}", base_path.display());

        if self.verbose && !overall_ok {
            for (name, summary) in &report.phases {
                if let Some(error) = &summary.error {
                    println!("  {} {}: {}", style("✗").red(), name, error);
                }
            }
        }
        println!();
    }
}
