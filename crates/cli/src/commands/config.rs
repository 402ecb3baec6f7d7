use std::fs;

use anyhow::{anyhow, Context, Result};
use swftriage_core::config::{render_config, TriageConfig};

use crate::absolute_path;

/// Write the default configuration to `path`.
pub fn init_config_command(path: &str, force: bool) -> Result<()> {
    let path = absolute_path(path)?;
    if path.exists() && !force {
        return Err(anyhow!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        ));
    }

    let body = render_config(&TriageConfig::default(), &path)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote default config to {}", path.display());

    Ok(())
}
