use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::analysis::{self, AbcPipeline, Session, TextScanner};
use crate::config::TriageConfig;
use crate::report::{heuristic_ids, ExtractedArtifact, Report, ResultSection};
use crate::services::backends::RabcdasmBackend;
use crate::swf::{parse_swf, SwfError, SwfHeader};

/// Fatal errors: the file could not be analyzed at all.
#[derive(Debug, Error)]
pub enum TriageError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to parse file as SWF: {0}")]
    Parse(#[from] SwfError),
    #[error("Failed to create working directory: {0}")]
    WorkDir(#[source] std::io::Error),
    #[error("Invalid heuristic pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Errors from one disassembler run. Always recoverable: the module is skipped.
#[derive(Debug, Error)]
pub enum DisassemblyError {
    #[error("Failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} did not finish within {}s and was killed", timeout.as_secs())]
    Timeout { tool: String, timeout: Duration },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to walk disassembly output: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Outcome of a disassembler process that ran to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisassemblerRun {
    pub status: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Trait implemented by ABC disassemblers (rabcdasm, test fakes).
///
/// Implementations are invoked with the path of a persisted `.abc` file and are expected to
/// leave their text output in a sibling directory named after the file stem. Success is judged
/// by that directory, not by the returned status.
pub trait Disassembler: Send + Sync {
    fn disassemble(&self, abc_path: &Path) -> Result<DisassemblerRun, DisassemblyError>;
    fn name(&self) -> &'static str;
}

impl<D: Disassembler + ?Sized> Disassembler for Arc<D> {
    fn disassemble(&self, abc_path: &Path) -> Result<DisassemblerRun, DisassemblyError> {
        (**self).disassemble(abc_path)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Entry point tying config, disassembler, and detectors together for whole-file triage.
pub struct TriageService {
    config: TriageConfig,
    scanner: TextScanner,
    disassembler: Option<Box<dyn Disassembler>>,
    extract_dir: Option<PathBuf>,
}

impl TriageService {
    /// Service without a disassembler; bytecode text heuristics are skipped.
    pub fn new(config: TriageConfig) -> Result<Self, TriageError> {
        let scanner = TextScanner::new(&config.heuristics)?;
        Ok(Self { config, scanner, disassembler: None, extract_dir: None })
    }

    /// Service wired to rabcdasm, resolved from the override, the config, or `RABCDASM`.
    pub fn from_config(
        config: TriageConfig,
        disassembler_override: Option<&Path>,
    ) -> Result<Self, TriageError> {
        let resolved = config.resolve_disassembler(disassembler_override);
        let timeout = Duration::from_secs(config.disassembler_timeout_secs);
        let service = Self::new(config)?;
        Ok(match resolved {
            Some(path) => service.with_disassembler(RabcdasmBackend::new(path, timeout)),
            None => service,
        })
    }

    pub fn with_disassembler<D: Disassembler + 'static>(mut self, disassembler: D) -> Self {
        self.disassembler = Some(Box::new(disassembler));
        self
    }

    /// Write extracted artifacts under `dir` in addition to listing them in the report.
    pub fn with_extract_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.extract_dir = Some(dir.into());
        self
    }

    pub fn disassembler_name(&self) -> Option<&'static str> {
        self.disassembler.as_ref().map(|d| d.name())
    }

    pub fn analyze_path(&self, path: &Path) -> Result<Report, TriageError> {
        let bytes = fs::read(path)
            .map_err(|source| TriageError::Read { path: path.to_path_buf(), source })?;
        self.analyze_bytes(&bytes)
    }

    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<Report, TriageError> {
        self.analyze_bytes_at(bytes, Utc::now())
    }

    /// Analyze with an explicit analysis time; compile-time recency is measured against `now`.
    pub fn analyze_bytes_at(&self, bytes: &[u8], now: DateTime<Utc>) -> Result<Report, TriageError> {
        let swf = parse_swf(bytes).inspect_err(|e| log::error!("Unable to parse file: {e}"))?;

        // Persisted modules and disassembler output; removed when this goes out of scope.
        let work_dir = tempfile::Builder::new()
            .prefix("swftriage-")
            .tempdir()
            .map_err(TriageError::WorkDir)?;

        let mut session = Session::new(now, self.config.heuristics.clone());
        let pipeline = AbcPipeline::new(self.disassembler.as_deref(), work_dir.path(), &self.scanner);
        analysis::dispatch_tags(&swf.tags, &mut session, &pipeline);

        let mut report = Report {
            tool_version: self.tool_version(),
            sections: vec![header_section(&swf.header)],
            extracted: Vec::new(),
        };
        let mut tags_section = ResultSection::new("SWF Tags");
        tags_section.add_tag(
            "file.swf.tags_ssdeep",
            analysis::tag_sequence_fingerprint(&session.tag_types),
        );
        report.sections.push(tags_section);

        self.finish(&mut session, &mut report);
        Ok(report)
    }

    fn tool_version(&self) -> String {
        match self.disassembler_name() {
            Some(tool) => format!("swftriage-core: {} - {tool}", crate::version()),
            None => format!("swftriage-core: {}", crate::version()),
        }
    }

    /// Post-pass: build the remaining sections from the final session state.
    fn finish(&self, session: &mut Session, report: &mut Report) {
        if !session.symbols.is_empty() {
            let root = session.take_root_symbol();
            let mut section = ResultSection::new("Symbol Summary");
            section.add_line(format!("Main: {root}"));
            section.add_lines(session.symbols.iter().map(|(id, name)| format!("ID:{id} - {name}")));
            report.sections.push(section);
        }

        if !session.binary_data.is_empty() {
            let mut section =
                ResultSection::new("Attached Binary Data").with_heuristic(heuristic_ids::EMBEDDED_BINARY_DATA);
            for (id, data) in &session.binary_data {
                let name = session.symbol_name(*id);
                section.add_line(format!("ID:{id} - {name}"));
                match self.emit_artifact(
                    data,
                    ".attached_binary",
                    format!("{name}_{id}"),
                    Some(format!("SWF Embedded Binary Data {id}")),
                ) {
                    Ok(artifact) => report.extracted.push(artifact),
                    Err(e) => log::error!("Error submitting embedded binary data {id}: {e}"),
                }
            }
            report.sections.push(section);
        }

        let mut tags_of_interest = ResultSection::new("Tags of Interest");
        for (kind, summaries) in &session.tag_summary {
            if summaries.is_empty() {
                continue;
            }
            let mut sub = ResultSection::new(*kind);
            sub.add_lines(summaries.iter().map(|fields| fields.join("\t")));
            tags_of_interest.add_subsection(sub);
        }
        if !tags_of_interest.subsections.is_empty() {
            report.sections.push(tags_of_interest);
        }

        if !session.big_buffers.is_empty() {
            let mut section =
                ResultSection::new("Large String Buffers").with_heuristic(heuristic_ids::LARGE_STRING_BUFFER);
            for buf in &session.big_buffers {
                section.add_line(format!("Found a {} byte string.", buf.len()));
                match self.emit_artifact(
                    buf.as_bytes(),
                    ".stringbuf",
                    "AVM2 Large String Buffer.".to_string(),
                    None,
                ) {
                    Ok(artifact) => report.extracted.push(artifact),
                    Err(e) => log::error!("Error submitting AVM2 string buffer: {e}"),
                }
            }
            report.sections.push(section);
        }

        if !session.flags.has_product_info() {
            log::debug!("Missing product info.");
            let mut section = ResultSection::new("Missing Product Information")
                .with_heuristic(heuristic_ids::MISSING_PRODUCT_INFO);
            section.add_line("This SWF doesn't specify information about the product that created it.");
            report.sections.push(section);
        }

        if session.flags.anti_decompilation() {
            log::debug!("Anti-disassembly techniques may be present.");
            let mut section = ResultSection::new("Incomplete Disassembly")
                .with_heuristic(heuristic_ids::INCOMPLETE_DISASSEMBLY);
            section.add_line(
                "This SWF may contain intentional corruption or obfuscation to prevent disassembly.",
            );
            report.sections.push(section);
        }

        if session.flags.recent_compile() {
            let mut section =
                ResultSection::new("Recent Compilation").with_heuristic(heuristic_ids::RECENT_COMPILATION);
            section.add_line(format!(
                "This SWF was compiled within the last {} hours.",
                session.heuristics.recent_compile_hours
            ));
            report.sections.push(section);
        }
    }

    /// Describe an artifact and, when an extraction directory is set, write its bytes there.
    ///
    /// The description defaults to the artifact's file name.
    fn emit_artifact(
        &self,
        data: &[u8],
        suffix: &str,
        label: String,
        description: Option<String>,
    ) -> std::io::Result<ExtractedArtifact> {
        let sha256 = crate::sha256_hex(data);
        let file_name = format!("{sha256}{suffix}");
        let description = description.unwrap_or_else(|| file_name.clone());
        let path = match &self.extract_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                let path = dir.join(&file_name);
                fs::write(&path, data)?;
                Some(path)
            }
            None => None,
        };
        Ok(ExtractedArtifact { file_name, label, description, sha256, size: data.len(), path })
    }
}

fn header_section(header: &SwfHeader) -> ResultSection {
    let mut section = ResultSection::new("SWF Header");
    if header.version != 0 {
        section.add_line(format!("Version: {}", header.version));
        section.add_tag("file.swf.header.version", header.version.to_string());
    }
    section.add_line(format!("File length: {}", header.file_length));
    let frame_size = header.frame_size.to_string();
    section.add_line(format!("Frame size: {frame_size}"));
    section.add_tag("file.swf.header.frame.size", frame_size);
    let frame_rate = header.frame_rate as u32;
    if frame_rate != 0 {
        section.add_line(format!("Frame rate: {frame_rate}"));
        section.add_tag("file.swf.header.frame.rate", frame_rate.to_string());
    }
    if header.frame_count != 0 {
        section.add_line(format!("Frame count: {}", header.frame_count));
        section.add_tag("file.swf.header.frame.count", header.frame_count.to_string());
    }
    section
}
