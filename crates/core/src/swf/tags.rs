use thiserror::Error;

use crate::model::{
    codes, CharacterName, ProductEdition, ProductInfo, ProductKind, SymbolLink, TagRecord,
};
use crate::swf::RawTag;

/// Per-record decode failure. Never fatal for the file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagError {
    #[error("tag {code}: body ends at offset {offset} while reading {field}")]
    Truncated { code: u16, offset: usize, field: &'static str },
}

/// Decode a raw record into its typed view. Unanalyzed codes become `TagRecord::Other`.
pub fn decode_tag(raw: &RawTag) -> Result<TagRecord, TagError> {
    let mut r = BodyReader::new(raw.code, &raw.body);
    let record = match raw.code {
        codes::NAME_CHARACTER => {
            let character_id = r.u16("characterId")?;
            let character_name = r.cstr("characterName")?;
            TagRecord::NameCharacter(CharacterName { character_id, character_name })
        }
        codes::PRODUCT_INFO => {
            let product = ProductKind::from_u32(r.u32("product")?);
            let edition = ProductEdition::from_u32(r.u32("edition")?);
            let major_version = r.u8("majorVersion")?;
            let minor_version = r.u8("minorVersion")?;
            let build_low = r.u32("build")? as u64;
            let build_high = r.u32("build")? as u64;
            let compile_time = if r.remaining() >= 8 { Some(r.u64("compileTime")?) } else { None };
            TagRecord::ProductInfo(ProductInfo {
                product,
                edition,
                major_version,
                minor_version,
                build: (build_high << 32) | build_low,
                compile_time,
            })
        }
        codes::EXPORT_ASSETS => {
            let count = r.u16("count")?;
            let mut exports = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let character_id = r.u16("characterId")?;
                let character_name = r.cstr("characterName")?;
                exports.push(CharacterName { character_id, character_name });
            }
            TagRecord::ExportAssets(exports)
        }
        codes::SYMBOL_CLASS => {
            let count = r.u16("count")?;
            let mut symbols = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let tag_id = r.u16("tagId")?;
                let name = r.cstr("name")?;
                symbols.push(SymbolLink { tag_id, name });
            }
            TagRecord::SymbolClass(symbols)
        }
        codes::DO_ABC => {
            let _flags = r.u32("flags")?;
            let abc_name = r.cstr("abcName")?;
            TagRecord::DoAbc { abc_name, bytes: r.rest().to_vec() }
        }
        codes::DO_ABC_DEFINE => TagRecord::DoAbc { abc_name: String::new(), bytes: raw.body.clone() },
        codes::DEFINE_BINARY_DATA => {
            let character_id = r.u16("characterId")?;
            let _reserved = r.u32("reserved")?;
            TagRecord::DefineBinaryData { character_id, data: r.rest().to_vec() }
        }
        other => TagRecord::Other(other),
    };
    Ok(record)
}

/// Little-endian cursor over one tag body.
struct BodyReader<'a> {
    code: u16,
    data: &'a [u8],
    pos: usize,
}

impl<'a> BodyReader<'a> {
    fn new(code: u16, data: &'a [u8]) -> Self {
        Self { code, data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize, field: &'static str) -> Result<&'a [u8], TagError> {
        let slice = self.data.get(self.pos..self.pos + n).ok_or(TagError::Truncated {
            code: self.code,
            offset: self.pos,
            field,
        })?;
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self, field: &'static str) -> Result<u8, TagError> {
        Ok(self.take(1, field)?[0])
    }

    fn u16(&mut self, field: &'static str) -> Result<u16, TagError> {
        let b = self.take(2, field)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self, field: &'static str) -> Result<u32, TagError> {
        let b = self.take(4, field)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self, field: &'static str) -> Result<u64, TagError> {
        let b = self.take(8, field)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(b);
        Ok(u64::from_le_bytes(buf))
    }

    /// Null-terminated string; invalid UTF-8 is replaced rather than rejected.
    fn cstr(&mut self, field: &'static str) -> Result<String, TagError> {
        let rest = &self.data[self.pos..];
        let end = rest.iter().position(|&b| b == 0).ok_or(TagError::Truncated {
            code: self.code,
            offset: self.data.len(),
            field,
        })?;
        let s = String::from_utf8_lossy(&rest[..end]).into_owned();
        self.pos += end + 1;
        Ok(s)
    }

    fn rest(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos..];
        self.pos = self.data.len();
        rest
    }
}
