use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use swftriage::commands::{
    analyze_command, init_config_command, list_heuristics_command, list_tags_command,
    AnalyzeArgs,
};

/// Static triage of SWF (Flash) files.
///
/// This CLI is a thin wrapper around `swftriage-core` (exposed in code as `swftriage_core`).
/// All substantive logic lives in the library so it can be tested thoroughly
/// and reused from other frontends.
#[derive(Parser, Debug)]
#[command(name = "swftriage", version, about = "Static triage of SWF files", long_about = None)]
struct Cli {
    /// Log verbosity: error, warn, info, debug, or trace.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one SWF file and print the triage report.
    ///
    /// Bytecode heuristics (large string buffers, incomplete disassembly) run only when
    /// rabcdasm is available via `--rabcdasm`, the config file, or `RABCDASM`.
    Analyze {
        /// Path to the SWF file.
        #[arg(long)]
        file: String,

        /// Optional JSON or YAML config file.
        #[arg(long)]
        config: Option<String>,

        /// Path to the rabcdasm executable; overrides config and environment.
        #[arg(long)]
        rabcdasm: Option<String>,

        /// Write extracted artifacts (binary data, string buffers) into this directory.
        #[arg(long)]
        extract_dir: Option<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List the tag records of an SWF file without running heuristics.
    ListTags {
        /// Path to the SWF file.
        #[arg(long)]
        file: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List the heuristics a report can raise.
    ListHeuristics {
        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Write a config file populated with the default settings.
    InitConfig {
        /// Destination; `.yaml`/`.yml` selects YAML, anything else JSON.
        #[arg(long, default_value = "swftriage.json")]
        path: String,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

fn init_logging(level: &str) -> Result<()> {
    let filter: log::LevelFilter =
        level.parse().map_err(|_| anyhow!("Invalid log level '{level}'"))?;
    env_logger::Builder::new().filter_level(filter).format_timestamp(None).init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Command::Analyze { file, config, rabcdasm, extract_dir, json } => {
            analyze_command(&AnalyzeArgs { file, config, rabcdasm, extract_dir, json })?
        }
        Command::ListTags { file, json } => list_tags_command(&file, json)?,
        Command::ListHeuristics { json } => list_heuristics_command(json)?,
        Command::InitConfig { path, force } => init_config_command(&path, force)?,
    }

    Ok(())
}
