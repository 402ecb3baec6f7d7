use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use swftriage_core::model::tag_kind_name;
use swftriage_core::swf::{parse_swf, SwfHeader};

use crate::{absolute_path, read_input};

#[derive(Debug, Serialize)]
pub struct TagInfo {
    pub index: usize,
    pub code: u16,
    /// Set for the tag kinds the analysis engine inspects.
    pub kind: Option<&'static str>,
    pub length: usize,
}

#[derive(Debug, Serialize)]
pub struct TagListing {
    pub header: SwfHeader,
    pub tags: Vec<TagInfo>,
}

/// Parse the container and describe its header and tag stream.
pub fn collect_tags(path: &Path) -> Result<TagListing> {
    let bytes = read_input(path)?;
    let swf =
        parse_swf(&bytes).with_context(|| format!("Unable to parse {} as SWF", path.display()))?;
    let tags = swf
        .tags
        .iter()
        .enumerate()
        .map(|(index, tag)| TagInfo {
            index,
            code: tag.code,
            kind: tag_kind_name(tag.code),
            length: tag.body.len(),
        })
        .collect();
    Ok(TagListing { header: swf.header, tags })
}

/// List the tag records of one file.
pub fn list_tags_command(file: &str, json: bool) -> Result<()> {
    let path = absolute_path(file)?;
    let listing = collect_tags(&path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    let header = &listing.header;
    println!(
        "{} v{} ({}), {} bytes declared, {} frames",
        header.signature, header.version, header.compression, header.file_length, header.frame_count
    );
    println!("Tags ({}):", listing.tags.len());
    for tag in &listing.tags {
        match tag.kind {
            Some(kind) => println!("  #{} code={} {} ({} bytes)", tag.index, tag.code, kind, tag.length),
            None => println!("  #{} code={} ({} bytes)", tag.index, tag.code, tag.length),
        }
    }

    Ok(())
}
