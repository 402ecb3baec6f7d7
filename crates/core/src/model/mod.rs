//! Core data model for SWF tag records.
//!
//! The container reader (`crate::swf`) produces raw records; this module holds the typed view
//! the analysis engine dispatches on. Only the tag kinds the engine inspects are modeled;
//! everything else stays a type code.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tag type codes the engine knows about.
pub mod codes {
    pub const END: u16 = 0;
    pub const NAME_CHARACTER: u16 = 40;
    pub const PRODUCT_INFO: u16 = 41;
    pub const EXPORT_ASSETS: u16 = 56;
    pub const DO_ABC_DEFINE: u16 = 72;
    pub const SYMBOL_CLASS: u16 = 76;
    pub const DO_ABC: u16 = 82;
    pub const DEFINE_BINARY_DATA: u16 = 87;
}

/// Human-readable name for a tag type code, if it is one the engine analyzes.
pub fn tag_kind_name(code: u16) -> Option<&'static str> {
    match code {
        codes::NAME_CHARACTER => Some("NameCharacter"),
        codes::PRODUCT_INFO => Some("ProductInfo"),
        codes::EXPORT_ASSETS => Some("ExportAssets"),
        codes::SYMBOL_CLASS => Some("SymbolClass"),
        codes::DO_ABC | codes::DO_ABC_DEFINE => Some("DoABC"),
        codes::DEFINE_BINARY_DATA => Some("DefineBinaryData"),
        _ => None,
    }
}

/// One `(characterId, characterName)` pair as found in `ExportAssets` and `NameCharacter`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterName {
    pub character_id: u16,
    pub character_name: String,
}

impl CharacterName {
    pub fn new(character_id: u16, character_name: impl Into<String>) -> Self {
        Self { character_id, character_name: character_name.into() }
    }
}

/// One `SymbolClass` link between a character ID and an ActionScript class name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolLink {
    pub tag_id: u16,
    pub name: String,
}

/// Compiler product recorded in `ProductInfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductKind {
    Unknown,
    FlexForJ2ee,
    FlexForDotNet,
    AdobeFlex,
    Other(u32),
}

impl ProductKind {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => ProductKind::Unknown,
            1 => ProductKind::FlexForJ2ee,
            2 => ProductKind::FlexForDotNet,
            3 => ProductKind::AdobeFlex,
            other => ProductKind::Other(other),
        }
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductKind::Unknown => f.write_str("Unknown"),
            ProductKind::FlexForJ2ee => f.write_str("Macromedia Flex for J2EE"),
            ProductKind::FlexForDotNet => f.write_str("Macromedia Flex for .NET"),
            ProductKind::AdobeFlex => f.write_str("Adobe Flex"),
            ProductKind::Other(n) => write!(f, "Unknown ({n})"),
        }
    }
}

/// Product edition recorded in `ProductInfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductEdition {
    Developer,
    FullCommercial,
    NonCommercial,
    Educational,
    NotForResale,
    Trial,
    NoEdition,
    Other(u32),
}

impl ProductEdition {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => ProductEdition::Developer,
            1 => ProductEdition::FullCommercial,
            2 => ProductEdition::NonCommercial,
            3 => ProductEdition::Educational,
            4 => ProductEdition::NotForResale,
            5 => ProductEdition::Trial,
            6 => ProductEdition::NoEdition,
            other => ProductEdition::Other(other),
        }
    }
}

impl fmt::Display for ProductEdition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductEdition::Developer => f.write_str("Developer"),
            ProductEdition::FullCommercial => f.write_str("Full Commercial"),
            ProductEdition::NonCommercial => f.write_str("Non Commercial"),
            ProductEdition::Educational => f.write_str("Educational"),
            ProductEdition::NotForResale => f.write_str("Not For Resale"),
            ProductEdition::Trial => f.write_str("Trial"),
            ProductEdition::NoEdition => f.write_str("None"),
            ProductEdition::Other(n) => write!(f, "Unknown ({n})"),
        }
    }
}

/// Fields of a `ProductInfo` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub product: ProductKind,
    pub edition: ProductEdition,
    pub major_version: u8,
    pub minor_version: u8,
    pub build: u64,
    /// Milliseconds since the Unix epoch; `None` when the record is too short to carry it.
    pub compile_time: Option<u64>,
}

/// Typed view over one tag record.
///
/// `Other` carries the type code of records the engine does not analyze.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagRecord {
    NameCharacter(CharacterName),
    ProductInfo(ProductInfo),
    ExportAssets(Vec<CharacterName>),
    SymbolClass(Vec<SymbolLink>),
    DoAbc { abc_name: String, bytes: Vec<u8> },
    DefineBinaryData { character_id: u16, data: Vec<u8> },
    Other(u16),
}
