use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default reconstruction target when neither the CLI nor genesis.toml
/// names one.
pub const DEFAULT_BASE_PATH: &str = "./genesis_core";

/// Name of the optional configuration file, looked up in the invocation
/// directory.
pub const CONFIG_FILE: &str = "genesis.toml";

/// Runtime configuration for a bootstrap run.
///
/// Constructed exactly once by the driver and passed by reference into the
/// phase runner and into every phase action. There is no global instance:
/// anything that needs a path gets it from here.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// Root of the reconstructed workspace. Everything the phases create
    /// lives underneath this directory.
    pub base_path: PathBuf,
    /// Directory for run logs (`<base_path>/logs`).
    pub log_dir: PathBuf,
    /// Timestamp that keys every artifact of this run (report, log files).
    pub timestamp: String,
    pub verbose: bool,
}

impl BootstrapConfig {
    pub fn new(base_path: PathBuf, verbose: bool) -> Self {
        let log_dir = base_path.join("logs");
        Self {
            base_path,
            log_dir,
            timestamp: Utc::now().format("%Y%m%d_%H%M%S").to_string(),
            verbose,
        }
    }

    /// Create the directories every run needs before any phase executes.
    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.base_path).with_context(|| {
            format!("Failed to create base directory: {}", self.base_path.display())
        })?;
        std::fs::create_dir_all(&self.log_dir)
            .with_context(|| format!("Failed to create log directory: {}", self.log_dir.display()))?;
        Ok(())
    }

    /// Path of the structured per-phase log (one JSON record per line).
    pub fn phase_log_file(&self) -> PathBuf {
        self.log_dir
            .join(format!("bootstrap_{}.jsonl", self.timestamp))
    }

    /// File name of the human-readable run log written by the tracing
    /// layer, relative to `log_dir`.
    pub fn run_log_file(&self) -> String {
        format!("bootstrap_{}.log", self.timestamp)
    }
}

/// Optional `genesis.toml` settings, merged under CLI flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenesisToml {
    #[serde(default)]
    pub bootstrap: BootstrapSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BootstrapSection {
    /// Reconstruction target directory.
    pub base_path: Option<PathBuf>,
}

impl GenesisToml {
    /// Load `genesis.toml` from the given directory, falling back to
    /// defaults when the file does not exist.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: GenesisToml = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }
}

/// Resolve the target directory: CLI flag wins, then genesis.toml, then
/// the built-in default.
pub fn resolve_base_path(cli_path: Option<&Path>, toml: &GenesisToml) -> PathBuf {
    cli_path
        .map(Path::to_path_buf)
        .or_else(|| toml.bootstrap.base_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BASE_PATH))
}
