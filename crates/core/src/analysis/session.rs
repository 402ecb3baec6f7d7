use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Utc};

use crate::config::HeuristicConfig;
use crate::model::CharacterName;

/// Name reported for the root symbol when the file does not declare one.
pub const UNSPECIFIED_SYMBOL: &str = "unspecified";

/// Write-once-true heuristic flags. Setters OR the observation in; nothing clears a flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeuristicFlags {
    has_product_info: bool,
    anti_decompilation: bool,
    recent_compile: bool,
}

impl HeuristicFlags {
    pub fn observe_product_info(&mut self) {
        self.has_product_info = true;
    }

    pub fn observe_anti_decompilation(&mut self, hit: bool) {
        self.anti_decompilation |= hit;
    }

    pub fn observe_recent_compile(&mut self, hit: bool) {
        self.recent_compile |= hit;
    }

    pub fn has_product_info(&self) -> bool {
        self.has_product_info
    }

    pub fn anti_decompilation(&self) -> bool {
        self.anti_decompilation
    }

    pub fn recent_compile(&self) -> bool {
        self.recent_compile
    }
}

/// Mutable analysis state for one file. Created per file and dropped once the report is built.
#[derive(Debug)]
pub struct Session {
    /// Moment of analysis; compile-time recency is measured against it.
    pub now: DateTime<Utc>,
    pub heuristics: HeuristicConfig,
    /// Character ID to class name. ID 0 is the main timeline class.
    pub symbols: BTreeMap<u16, String>,
    pub binary_data: BTreeMap<u16, Vec<u8>>,
    /// Unique exports in first-seen order.
    pub exported_assets: Vec<CharacterName>,
    export_index: HashSet<CharacterName>,
    /// Tag kind name to the field tuples recorded for it, in encounter order.
    pub tag_summary: BTreeMap<&'static str, Vec<Vec<String>>>,
    pub big_buffers: BTreeSet<String>,
    pub flags: HeuristicFlags,
    /// Type code of every record seen, recognized or not.
    pub tag_types: Vec<u16>,
    /// Digests of ABC modules already handed to the disassembler, whatever the outcome.
    pub abc_digests: BTreeSet<String>,
}

impl Session {
    pub fn new(now: DateTime<Utc>, heuristics: HeuristicConfig) -> Self {
        Self {
            now,
            heuristics,
            symbols: BTreeMap::new(),
            binary_data: BTreeMap::new(),
            exported_assets: Vec::new(),
            export_index: HashSet::new(),
            tag_summary: BTreeMap::new(),
            big_buffers: BTreeSet::new(),
            flags: HeuristicFlags::default(),
            tag_types: Vec::new(),
            abc_digests: BTreeSet::new(),
        }
    }

    /// Append `export` unless the same pair was already recorded. Returns whether it was new.
    pub fn add_export(&mut self, export: &CharacterName) -> bool {
        if !self.export_index.insert(export.clone()) {
            return false;
        }
        self.exported_assets.push(export.clone());
        true
    }

    pub fn add_summary(&mut self, kind: &'static str, fields: Vec<String>) {
        self.tag_summary.entry(kind).or_default().push(fields);
    }

    /// Remove the root symbol (ID 0) from the table and return its name.
    pub fn take_root_symbol(&mut self) -> String {
        self.symbols.remove(&0).unwrap_or_else(|| UNSPECIFIED_SYMBOL.to_string())
    }

    pub fn symbol_name(&self, character_id: u16) -> &str {
        self.symbols.get(&character_id).map(String::as_str).unwrap_or(UNSPECIFIED_SYMBOL)
    }
}
