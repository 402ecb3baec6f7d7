use std::path::Path;

use anyhow::{Context, Result};
use swftriage_core::config::{load_config, TriageConfig};
use swftriage_core::services::analysis::TriageService;

use crate::absolute_path;

/// Arguments of the `analyze` subcommand.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeArgs {
    pub file: String,
    pub config: Option<String>,
    pub rabcdasm: Option<String>,
    pub extract_dir: Option<String>,
    pub json: bool,
}

/// Analyze one file and print its report.
pub fn analyze_command(args: &AnalyzeArgs) -> Result<()> {
    let file = absolute_path(&args.file)?;
    let config = match &args.config {
        Some(path) => load_config(Path::new(path))?,
        None => TriageConfig::default(),
    };

    let mut service = TriageService::from_config(config, args.rabcdasm.as_deref().map(Path::new))
        .context("Failed to initialize triage service")?;
    if let Some(dir) = &args.extract_dir {
        service = service.with_extract_dir(absolute_path(dir)?);
    }
    if service.disassembler_name().is_none() {
        log::info!("No disassembler configured; skipping bytecode heuristics");
    }

    let report = service
        .analyze_path(&file)
        .with_context(|| format!("Failed to analyze {}", file.display()))?;

    if args.json {
        let serialized =
            serde_json::to_string_pretty(&report).context("Failed to serialize report to JSON")?;
        println!("{serialized}");
    } else {
        println!("File: {}", file.display());
        println!("Tool: {}", report.tool_version);
        print!("{}", report.render_text());
    }

    Ok(())
}
