//! Plan listing and workspace status commands.

use anyhow::Result;
use std::path::PathBuf;

pub fn cmd_plan() -> Result<()> {
    use genesis::scaffold;
    use genesis::selfcheck::SELF_CHECK_PHASE;

    let registry = scaffold::default_registry()?;

    println!();
    println!(
        "Reconstruction plan: {} phases plus the terminal self-check",
        registry.len()
    );
    println!();
    println!("{:<8} Name", "Phase");
    println!("{:<8} ----", "-----");
    for phase in registry.ordered_phases() {
        println!("{:<8} {}", phase.label(), phase.name);
    }
    println!(
        "{:<8} {} {}",
        format!("{:02}", registry.len() + 1),
        SELF_CHECK_PHASE,
        console::style("(terminal)").dim()
    );
    println!();
    Ok(())
}

pub fn cmd_status(base_path: PathBuf) -> Result<()> {
    use console::style;
    use genesis::config::BootstrapConfig;
    use genesis::report::ReportStore;
    use genesis::scaffold;

    let config = BootstrapConfig::new(base_path, false);

    println!();
    println!("Genesis Workspace Status");
    println!("========================");
    println!();
    println!("Target: {}", config.base_path.display());

    if !config.base_path.exists() {
        println!("State:  Not reconstructed");
        println!();
        println!("Run 'genesis run' to reconstruct the workspace.");
        println!();
        return Ok(());
    }

    let check = scaffold::default_self_check();
    let results = check.results(&config);
    let present = results.iter().filter(|(_, ok)| *ok).count();
    println!("State:  {}/{} artifacts present", present, results.len());
    println!();
    for (name, ok) in &results {
        let mark = if *ok {
            style("✓").green()
        } else {
            style("✗").red()
        };
        println!("  {mark} {name}");
    }
    println!();

    let store = ReportStore::new(&config.base_path);
    if let Some(latest) = store.list()?.first() {
        println!("Latest report: {}", latest.display());
        println!();
    }
    Ok(())
}
