//! Tag dispatch and per-kind extractors.
//!
//! One pass over the tag stream routes each record to its handler, which mutates the
//! [`Session`]. Aggregate findings are computed from the final session state by
//! `crate::services::analysis`.

pub mod abc;
pub mod heuristics;
pub mod session;

use fuzzyhash::FuzzyHash;

use crate::model::{tag_kind_name, CharacterName, SymbolLink, TagRecord};
use crate::swf::{decode_tag, RawTag, TagError};

pub use abc::AbcPipeline;
pub use heuristics::TextScanner;
pub use session::{HeuristicFlags, Session, UNSPECIFIED_SYMBOL};

/// Dispatch every record of the stream in order. A failing record is logged and skipped.
pub fn dispatch_tags(tags: &[RawTag], session: &mut Session, pipeline: &AbcPipeline<'_>) {
    for (index, raw) in tags.iter().enumerate() {
        if let Err(e) = dispatch_tag(raw, session, pipeline) {
            log::warn!("Skipping tag #{index}: {e}");
        }
    }
}

/// Record the type code and, for analyzed kinds, run the matching handler.
pub fn dispatch_tag(
    raw: &RawTag,
    session: &mut Session,
    pipeline: &AbcPipeline<'_>,
) -> Result<(), TagError> {
    session.tag_types.push(raw.code);
    if tag_kind_name(raw.code).is_none() {
        return Ok(());
    }
    match decode_tag(raw)? {
        TagRecord::NameCharacter(named) => record_name_character(&named, session),
        TagRecord::ProductInfo(info) => heuristics::record_product_info(&info, session),
        TagRecord::ExportAssets(exports) => record_exports(&exports, session),
        TagRecord::SymbolClass(symbols) => record_symbols(&symbols, session),
        TagRecord::DoAbc { abc_name, bytes } => pipeline.process(&abc_name, &bytes, session),
        TagRecord::DefineBinaryData { character_id, data } => {
            session.binary_data.insert(character_id, data);
        }
        TagRecord::Other(_) => {}
    }
    Ok(())
}

fn character_fields(entry: &CharacterName) -> Vec<String> {
    vec![
        format!("Character ID: {}", entry.character_id),
        format!("Name: {}", entry.character_name),
    ]
}

pub fn record_symbols(symbols: &[SymbolLink], session: &mut Session) {
    for symbol in symbols {
        session.symbols.insert(symbol.tag_id, symbol.name.clone());
    }
}

pub fn record_name_character(named: &CharacterName, session: &mut Session) {
    session.add_summary("NameCharacter", character_fields(named));
}

/// Append exports not seen before, keeping first-occurrence order.
pub fn record_exports(exports: &[CharacterName], session: &mut Session) {
    for export in exports {
        if session.add_export(export) {
            session.add_summary("ExportAssets", character_fields(export));
        }
    }
}

/// ssdeep fingerprint of the comma-joined decimal tag-type sequence.
pub fn tag_sequence_fingerprint(codes: &[u16]) -> String {
    let joined = codes.iter().map(u16::to_string).collect::<Vec<_>>().join(",");
    FuzzyHash::new(joined.into_bytes()).to_string()
}
