//! Inspection of stored execution reports.

use anyhow::{Result, anyhow};
use std::path::PathBuf;

use super::super::ReportsCommands;

pub fn cmd_reports(base_path: PathBuf, command: &ReportsCommands) -> Result<()> {
    use genesis::report::ReportStore;

    let store = ReportStore::new(&base_path);

    match command {
        ReportsCommands::List => {
            let reports = store.list()?;
            if reports.is_empty() {
                println!("No reports found in {}", base_path.display());
                return Ok(());
            }
            println!();
            println!("{:<42} {:<10} Self-test", "Report", "Phases");
            for path in &reports {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                match store.load(path) {
                    Ok(report) => {
                        let self_test = report
                            .phases
                            .get(genesis::selfcheck::SELF_CHECK_PHASE)
                            .map(|s| if s.status.is_success() { "passed" } else { "failed" })
                            .unwrap_or("-");
                        println!(
                            "{:<42} {:<10} {}",
                            name,
                            format!("{}/{}", report.success_count, report.total_phases),
                            self_test
                        );
                    }
                    Err(_) => println!("{name:<42} (unreadable)"),
                }
            }
            println!();
        }
        ReportsCommands::Show { report } => {
            let path = match report {
                Some(path) => path.clone(),
                None => store
                    .list()?
                    .into_iter()
                    .next()
                    .ok_or_else(|| anyhow!("No reports found in {}", base_path.display()))?,
            };
            let report = store.load(&path)?;

            println!();
            println!("Report:  {}", path.display());
            println!("Run id:  {}", report.run_id);
            println!("Started: {}", report.start_time.to_rfc3339());
            if let Some(end) = report.end_time {
                println!("Ended:   {}", end.to_rfc3339());
            }
            println!(
                "Phases:  {}/{} succeeded",
                report.success_count, report.total_phases
            );
            println!();
            println!("{:<20} {:<8} {:>12}  Error", "Phase", "Status", "Duration");
            for (name, summary) in &report.phases {
                println!(
                    "{:<20} {:<8} {:>10.1}ms  {}",
                    name,
                    format!("{:?}", summary.status).to_uppercase(),
                    summary.duration_ms,
                    summary.error.as_deref().unwrap_or("-")
                );
            }
            println!();
        }
    }
    Ok(())
}
