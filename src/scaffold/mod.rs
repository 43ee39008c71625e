//! The Genesis Core reconstruction plan.
//!
//! This is the driver side of the engine: ten phase actions that lay out
//! the workspace and persist the static payloads from [`templates`], the
//! default registry binding them in execution order, and the self-check
//! probes that confirm the expected artifacts exist afterwards.
//!
//! Every action takes the shared [`BootstrapConfig`] by reference and
//! writes only underneath `config.base_path`.

pub mod templates;

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::BootstrapConfig;
use crate::errors::RegistryError;
use crate::registry::PhaseRegistry;
use crate::selfcheck::SelfCheck;

/// Directory skeleton created by the filesystem phase.
pub const DIRECTORIES: &[&str] = &[
    "core",
    "api",
    "modules",
    "shared/database",
    "shared/logger",
    "shared/utils",
    "expert_tools",
    "data/backups",
    "data/configs",
    "logs/archive_logs",
    "tests/unit",
    "tests/integration",
    "sandbox",
    "docker",
    ".github/workflows",
];

/// Write one opaque payload under the workspace root, creating parent
/// directories as needed.
fn write_artifact(config: &BootstrapConfig, relative: &str, content: &str) -> Result<()> {
    let path = config.base_path.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write artifact: {}", path.display()))?;
    tracing::debug!(artifact = relative, "artifact written");
    Ok(())
}

/// Phase 1: directory skeleton plus the root project manifests.
pub fn create_layout(config: &BootstrapConfig) -> Result<()> {
    for directory in DIRECTORIES {
        let path = config.base_path.join(directory);
        std::fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        tracing::debug!(directory, "directory created");
    }

    write_artifact(config, "requirements.txt", templates::REQUIREMENTS_TXT)?;
    write_artifact(config, "pyproject.toml", templates::PYPROJECT_TOML)?;
    write_artifact(config, ".env.example", templates::ENV_EXAMPLE)?;
    write_artifact(config, ".gitignore", templates::GITIGNORE)?;
    Ok(())
}

/// Phase 2: centralized configuration module.
pub fn write_config_module(config: &BootstrapConfig) -> Result<()> {
    write_artifact(config, "core/config.py", templates::CONFIG_PY)
}

/// Phase 3: structured logging module.
pub fn write_logger_module(config: &BootstrapConfig) -> Result<()> {
    write_artifact(
        config,
        "shared/logger/structured_logger.py",
        templates::STRUCTURED_LOGGER_PY,
    )
}

/// Phase 4: ORM models for the semantic repository.
pub fn write_database_models(config: &BootstrapConfig) -> Result<()> {
    write_artifact(
        config,
        "shared/database/models.py",
        templates::DATABASE_MODELS_PY,
    )
}

/// Phase 5: AST scanner and complexity analysis.
pub fn write_analyzer(config: &BootstrapConfig) -> Result<()> {
    write_artifact(config, "core/analyzer.py", templates::ANALYZER_PY)
}

/// Phase 6: deterministic control instance (validation pipeline).
pub fn write_quality_gates(config: &BootstrapConfig) -> Result<()> {
    write_artifact(config, "core/dci.py", templates::DCI_PY)
}

/// Phase 7: language-model interface.
pub fn write_commander(config: &BootstrapConfig) -> Result<()> {
    write_artifact(config, "core/ai_commander.py", templates::AI_COMMANDER_PY)
}

/// Phase 8: spine-swarm orchestration engine.
pub fn write_orchestrator(config: &BootstrapConfig) -> Result<()> {
    write_artifact(config, "core/orchestrator.py", templates::ORCHESTRATOR_PY)
}

/// Phase 9: transactional injection engine.
pub fn write_injection_engine(config: &BootstrapConfig) -> Result<()> {
    write_artifact(
        config,
        "core/injection_engine.py",
        templates::INJECTION_ENGINE_PY,
    )
}

/// Phase 10: dashboard backend.
pub fn write_dashboard_backend(config: &BootstrapConfig) -> Result<()> {
    write_artifact(config, "api/server.py", templates::DASHBOARD_SERVER_PY)
}

/// Build the fixed reconstruction plan: ten phases, contiguous ordinals
/// starting at 1.
pub fn default_registry() -> Result<PhaseRegistry, RegistryError> {
    let mut registry = PhaseRegistry::new();
    registry.register(1, "filesystem", Box::new(create_layout))?;
    registry.register(2, "config_mgmt", Box::new(write_config_module))?;
    registry.register(3, "logging", Box::new(write_logger_module))?;
    registry.register(4, "database", Box::new(write_database_models))?;
    registry.register(5, "analyzer", Box::new(write_analyzer))?;
    registry.register(6, "quality_gates", Box::new(write_quality_gates))?;
    registry.register(7, "ai_commander", Box::new(write_commander))?;
    registry.register(8, "orchestrator", Box::new(write_orchestrator))?;
    registry.register(9, "injection_engine", Box::new(write_injection_engine))?;
    registry.register(10, "dashboard", Box::new(write_dashboard_backend))?;
    Ok(registry)
}

fn exists(config: &BootstrapConfig, relative: &str) -> bool {
    config.base_path.join(Path::new(relative)).exists()
}

/// Existence probes for every artifact the plan is expected to leave
/// behind. Evaluated by the runner's terminal self-check and by the
/// `status` command.
pub fn default_self_check() -> SelfCheck {
    SelfCheck::new()
        .probe("core directory", |c| exists(c, "core"))
        .probe("configuration module", |c| exists(c, "core/config.py"))
        .probe("structured logger", |c| {
            exists(c, "shared/logger/structured_logger.py")
        })
        .probe("database models", |c| {
            exists(c, "shared/database/models.py")
        })
        .probe("code analyzer", |c| exists(c, "core/analyzer.py"))
        .probe("quality gates", |c| exists(c, "core/dci.py"))
        .probe("ai commander", |c| exists(c, "core/ai_commander.py"))
        .probe("orchestrator", |c| exists(c, "core/orchestrator.py"))
        .probe("injection engine", |c| {
            exists(c, "core/injection_engine.py")
        })
        .probe("dashboard backend", |c| exists(c, "api/server.py"))
}
