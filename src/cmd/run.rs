//! The `genesis run` command: execute the full reconstruction plan.

use anyhow::Result;
use std::path::{Path, PathBuf};

pub fn cmd_run(base_path: PathBuf, verbose: bool, assume_yes: bool) -> Result<()> {
    use genesis::config::BootstrapConfig;
    use genesis::logging;
    use genesis::report::{JsonlSink, ReportStore};
    use genesis::runner::PhaseRunner;
    use genesis::scaffold;
    use genesis::ui::BootstrapUI;

    let config = BootstrapConfig::new(base_path, verbose);

    if !assume_yes && target_is_nonempty(&config.base_path) {
        use dialoguer::Confirm;
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Target {} is not empty. Reconstruct into it?",
                config.base_path.display()
            ))
            .default(false)
            .interact()
            .unwrap_or(false);
        if !confirmed {
            println!("Run cancelled");
            return Ok(());
        }
    }

    config.ensure_directories()?;
    let _log_guard =
        logging::init_with_file(config.verbose, &config.log_dir, &config.run_log_file())?;

    // Registry construction is the only fatal path: a bad plan stops the
    // process before any phase executes.
    let registry = scaffold::default_registry()?;
    let check = scaffold::default_self_check();

    let ui = BootstrapUI::new(registry.len() as u64 + 1, config.verbose);
    let mut sink = JsonlSink::create(&config.phase_log_file())?;

    let summary = PhaseRunner::new(&config, &mut sink)
        .with_ui(&ui)
        .run(&registry, &check);
    ui.finish();

    let store = ReportStore::new(&config.base_path);
    let report_path = store.persist(&summary.report, &config.timestamp)?;

    ui.print_summary(
        &summary.report,
        summary.self_test_passed,
        &report_path,
        &config.base_path,
    );

    if !summary.ok() {
        anyhow::bail!(
            "reconstruction incomplete: {}/{} phases succeeded, self-test {}",
            summary.report.success_count,
            summary.report.total_phases,
            if summary.self_test_passed {
                "passed"
            } else {
                "failed"
            }
        );
    }
    Ok(())
}

/// True when the target exists and contains at least one entry.
fn target_is_nonempty(path: &Path) -> bool {
    std::fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}
