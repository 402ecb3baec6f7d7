//! Heuristic detectors over disassembly text and `ProductInfo` metadata.

use chrono::{DateTime, Duration, Utc};
use regex::Regex;

use crate::analysis::session::Session;
use crate::config::HeuristicConfig;
use crate::model::ProductInfo;

/// Escaped-byte annotation rabcdasm leaves where it could not decode an instruction.
const ANNOTATION_PATTERN: &str = r"\s+;\s+0x[0-9A-F]{2}";

/// Compiled text detectors. Results accumulate in the session across fragments.
#[derive(Debug, Clone)]
pub struct TextScanner {
    big_buffer: Regex,
    annotation: Regex,
    anti_decompilation_threshold: usize,
}

impl TextScanner {
    pub fn new(config: &HeuristicConfig) -> Result<Self, regex::Error> {
        // The run has to be terminated by a non-member; a run at end of text is not a match.
        let big_buffer =
            Regex::new(&format!(r"([A-Za-z0-9+/=]{{{},}})[^A-Za-z0-9+/=]", config.big_buffer_min_len))?;
        Ok(Self {
            big_buffer,
            annotation: Regex::new(ANNOTATION_PATTERN)?,
            anti_decompilation_threshold: config.anti_decompilation_threshold,
        })
    }

    /// Run both detectors over one fragment of disassembly text.
    pub fn scan(&self, text: &str, session: &mut Session) {
        for caps in self.big_buffer.captures_iter(text) {
            if let Some(run) = caps.get(1) {
                if !session.big_buffers.contains(run.as_str()) {
                    log::debug!("large string buffer of {} bytes", run.len());
                    session.big_buffers.insert(run.as_str().to_string());
                }
            }
        }

        let annotations =
            self.annotation.find_iter(text).take(self.anti_decompilation_threshold + 1).count();
        session.flags.observe_anti_decompilation(annotations > self.anti_decompilation_threshold);
    }
}

/// Textual form of a `ProductInfo` compile time and whether it counts as recent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileTime {
    pub display: String,
    pub recent: bool,
}

/// Interpret a raw compile time (milliseconds since the epoch) relative to `now`.
///
/// Timestamps in the future also count as recent.
pub fn describe_compile_time(raw: Option<u64>, now: DateTime<Utc>, window_hours: i64) -> CompileTime {
    let Some(raw) = raw else {
        return CompileTime { display: "Missing".to_string(), recent: false };
    };
    let parsed = i64::try_from(raw).ok().and_then(DateTime::<Utc>::from_timestamp_millis);
    match parsed {
        Some(compiled) => CompileTime {
            display: compiled.format("%a %b %e %H:%M:%S %Y").to_string(),
            recent: now.signed_duration_since(compiled)
                < Duration::try_hours(window_hours).unwrap_or(Duration::MAX),
        },
        None => CompileTime { display: format!("Invalid Compile Time: {raw}"), recent: false },
    }
}

/// Handle one `ProductInfo` record: flag presence, summarize it, and check compile recency.
pub fn record_product_info(info: &ProductInfo, session: &mut Session) {
    session.flags.observe_product_info();

    let compile = describe_compile_time(
        info.compile_time,
        session.now,
        session.heuristics.recent_compile_hours,
    );
    if compile.recent {
        log::debug!("recent compile time: {}", compile.display);
    }
    session.flags.observe_recent_compile(compile.recent);

    session.add_summary(
        "ProductInfo",
        vec![
            format!("Product: {}", info.product),
            format!("Edition: {}", info.edition),
            format!(
                "Version (Major.Minor.Build): {}.{}.{}",
                info.major_version, info.minor_version, info.build
            ),
            format!("Compile Time: {}", compile.display),
        ],
    );
}
