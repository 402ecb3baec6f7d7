use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable consulted for the rabcdasm path when neither the CLI nor the config
/// file names one.
pub const DISASSEMBLER_ENV: &str = "RABCDASM";

fn default_timeout_secs() -> u64 {
    120
}

/// Tunables for the heuristic detectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    /// Minimum run length for a large encoded string buffer.
    pub big_buffer_min_len: usize,
    /// Anti-decompilation fires when a fragment has more annotations than this.
    pub anti_decompilation_threshold: usize,
    /// Compile times younger than this many hours count as recent.
    pub recent_compile_hours: i64,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self { big_buffer_min_len: 512, anti_decompilation_threshold: 10, recent_compile_hours: 24 }
    }
}

/// Serializable triage configuration (JSON or YAML on disk).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageConfig {
    /// Path to the rabcdasm executable. Unset disables bytecode disassembly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disassembler: Option<String>,
    /// Seconds to wait for one disassembler run before killing it.
    #[serde(default = "default_timeout_secs")]
    pub disassembler_timeout_secs: u64,
    #[serde(default)]
    pub heuristics: HeuristicConfig,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            disassembler: None,
            disassembler_timeout_secs: default_timeout_secs(),
            heuristics: HeuristicConfig::default(),
        }
    }
}

impl TriageConfig {
    /// Resolve the disassembler path: explicit override, then config, then `RABCDASM`.
    ///
    /// Returns `None` when nothing is configured or the resolved path is not a file.
    pub fn resolve_disassembler(&self, cli_override: Option<&Path>) -> Option<PathBuf> {
        let candidate = cli_override
            .map(Path::to_path_buf)
            .or_else(|| self.disassembler.as_ref().map(PathBuf::from))
            .or_else(|| std::env::var_os(DISASSEMBLER_ENV).map(PathBuf::from))?;
        if candidate.is_file() {
            Some(candidate)
        } else {
            log::info!(
                "Disassembler {} not found; bytecode heuristics disabled",
                candidate.display()
            );
            None
        }
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("yaml" | "yml"))
}

/// Load a config file; YAML for `.yaml`/`.yml`, JSON otherwise.
pub fn load_config(path: &Path) -> Result<TriageConfig> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config at {}", path.display()))?;
    let config = if is_yaml(path) {
        serde_yaml::from_str(&body).context("Failed to parse config YAML")?
    } else {
        serde_json::from_str(&body).context("Failed to parse config JSON")?
    };
    Ok(config)
}

/// Serialize a config in the format implied by the file extension.
pub fn render_config(config: &TriageConfig, path: &Path) -> Result<String> {
    if is_yaml(path) {
        Ok(serde_yaml::to_string(config)?)
    } else {
        Ok(serde_json::to_string_pretty(config)?)
    }
}
