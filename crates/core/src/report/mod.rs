//! Hierarchical triage report: titled sections with body lines, tags, an optional heuristic,
//! and nested subsections, plus the list of extracted artifacts.

use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;

/// Heuristic identifiers raised by the engine.
pub mod heuristic_ids {
    pub const LARGE_STRING_BUFFER: u8 = 1;
    pub const RECENT_COMPILATION: u8 = 2;
    pub const EMBEDDED_BINARY_DATA: u8 = 3;
    pub const INCOMPLETE_DISASSEMBLY: u8 = 4;
    pub const MISSING_PRODUCT_INFO: u8 = 5;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HeuristicInfo {
    pub id: u8,
    pub name: &'static str,
    pub description: &'static str,
}

/// Catalogue of every heuristic a report can reference.
pub const HEURISTICS: &[HeuristicInfo] = &[
    HeuristicInfo {
        id: heuristic_ids::LARGE_STRING_BUFFER,
        name: "Large String Buffer",
        description: "Disassembled bytecode holds a long base64/hex-like string constant, a common \
                      way to smuggle a second-stage payload.",
    },
    HeuristicInfo {
        id: heuristic_ids::RECENT_COMPILATION,
        name: "Recent Compilation",
        description: "The embedded compile timestamp falls inside the configured recency window.",
    },
    HeuristicInfo {
        id: heuristic_ids::EMBEDDED_BINARY_DATA,
        name: "Embedded Binary Data",
        description: "The SWF carries DefineBinaryData payloads.",
    },
    HeuristicInfo {
        id: heuristic_ids::INCOMPLETE_DISASSEMBLY,
        name: "Incomplete Disassembly",
        description: "The disassembler emitted many raw-byte annotations, suggesting bytecode \
                      corrupted or obfuscated to defeat static analysis.",
    },
    HeuristicInfo {
        id: heuristic_ids::MISSING_PRODUCT_INFO,
        name: "Missing Product Information",
        description: "The SWF does not record the product that compiled it.",
    },
];

pub fn heuristic(id: u8) -> Option<&'static HeuristicInfo> {
    HEURISTICS.iter().find(|h| h.id == id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTag {
    pub tag_type: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSection {
    pub title: String,
    pub body: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heuristic: Option<u8>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<ReportTag>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subsections: Vec<ResultSection>,
}

impl ResultSection {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }

    pub fn with_heuristic(mut self, id: u8) -> Self {
        self.heuristic = Some(id);
        self
    }

    pub fn add_line(&mut self, line: impl Into<String>) {
        self.body.push(line.into());
    }

    pub fn add_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.body.extend(lines.into_iter().map(Into::into));
    }

    pub fn add_tag(&mut self, tag_type: impl Into<String>, value: impl Into<String>) {
        self.tags.push(ReportTag { tag_type: tag_type.into(), value: value.into() });
    }

    pub fn add_subsection(&mut self, section: ResultSection) {
        self.subsections.push(section);
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let label = self
            .heuristic
            .and_then(heuristic)
            .map(|h| format!(" [heuristic {}: {}]", h.id, h.name))
            .unwrap_or_default();
        let _ = writeln!(out, "{indent}== {}{label}", self.title);
        for line in &self.body {
            let _ = writeln!(out, "{indent}  {line}");
        }
        for tag in &self.tags {
            let _ = writeln!(out, "{indent}  <{}> {}", tag.tag_type, tag.value);
        }
        for sub in &self.subsections {
            sub.render_into(out, depth + 1);
        }
    }
}

/// A payload carved out of the file for downstream analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedArtifact {
    /// `{sha256}{suffix}`.
    pub file_name: String,
    pub label: String,
    pub description: String,
    pub sha256: String,
    pub size: usize,
    /// Where the bytes were written, when an extraction directory is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub tool_version: String,
    pub sections: Vec<ResultSection>,
    pub extracted: Vec<ExtractedArtifact>,
}

impl Report {
    pub fn section(&self, title: &str) -> Option<&ResultSection> {
        self.sections.iter().find(|s| s.title == title)
    }

    /// Heuristic IDs raised anywhere in the report, in section order.
    pub fn heuristics(&self) -> Vec<u8> {
        fn walk(section: &ResultSection, out: &mut Vec<u8>) {
            out.extend(section.heuristic);
            for sub in &section.subsections {
                walk(sub, out);
            }
        }
        let mut out = Vec::new();
        for section in &self.sections {
            walk(section, &mut out);
        }
        out
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            section.render_into(&mut out, 0);
        }
        if !self.extracted.is_empty() {
            let _ = writeln!(out, "== Extracted");
            for artifact in &self.extracted {
                let _ = writeln!(
                    out,
                    "  {} ({} bytes) {}: {}",
                    artifact.file_name, artifact.size, artifact.label, artifact.description
                );
            }
        }
        out
    }
}
