//! SWF container reader.
//!
//! Splits a `FWS`/`CWS`/`ZWS` file into its header and a flat list of raw tag records. Field
//! decoding for the tag kinds the engine cares about lives in [`tags`]; every other record is
//! kept as an opaque code + body.

pub mod tags;

use std::fmt;
use std::io::{Cursor, Read};

use flate2::read::ZlibDecoder;
use lzma_rust2::LzmaReader;
use serde::Serialize;
use thiserror::Error;

pub use tags::{decode_tag, TagError};

pub const SWF_HEADER_LEN: usize = 8;
/// `ZWS` files carry a 4-byte compressed length and 5 bytes of LZMA properties after the header.
pub const SWF_LZMA_HEADER_EXTRA: usize = 9;
/// Upper bound on the decompressed body; protects against decompression bombs.
pub const SWF_DECOMPRESSED_LIMIT: usize = 256 * 1024 * 1024;

/// Fatal container errors: the file cannot be read as SWF at all.
#[derive(Debug, Error)]
pub enum SwfError {
    #[error("Input too short for an SWF header ({0} bytes)")]
    TooShort(usize),
    #[error("Unknown SWF signature {0:?}")]
    BadSignature(String),
    #[error("Failed to decompress {compression} SWF body: {source}")]
    Decompress {
        compression: SwfCompression,
        #[source]
        source: std::io::Error,
    },
    #[error("SWF body ends inside the movie header")]
    TruncatedHeader,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SwfCompression {
    None,
    Zlib,
    Lzma,
}

impl fmt::Display for SwfCompression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SwfCompression::None => "uncompressed",
            SwfCompression::Zlib => "zlib",
            SwfCompression::Lzma => "lzma",
        })
    }
}

/// Frame size rectangle, in twips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FrameRect {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl fmt::Display for FrameRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{},{},{}]", self.x_min, self.x_max, self.y_min, self.y_max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwfHeader {
    pub signature: String,
    pub compression: SwfCompression,
    pub version: u8,
    /// Declared (uncompressed) length from the header, not the observed one.
    pub file_length: u32,
    pub frame_size: FrameRect,
    pub frame_rate: f32,
    pub frame_count: u16,
}

/// One record of the tag stream, undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTag {
    pub code: u16,
    pub body: Vec<u8>,
}

/// A parsed container: header plus the tag stream in file order.
#[derive(Debug, Clone)]
pub struct SwfFile {
    pub header: SwfHeader,
    pub tags: Vec<RawTag>,
}

/// Parse an SWF file from its raw bytes.
pub fn parse_swf(raw: &[u8]) -> Result<SwfFile, SwfError> {
    if raw.len() < SWF_HEADER_LEN {
        return Err(SwfError::TooShort(raw.len()));
    }
    let compression = match &raw[..3] {
        b"FWS" => SwfCompression::None,
        b"CWS" => SwfCompression::Zlib,
        b"ZWS" => SwfCompression::Lzma,
        other => return Err(SwfError::BadSignature(String::from_utf8_lossy(other).into_owned())),
    };
    let version = raw[3];
    let file_length = u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]);
    let body = expand_body(raw, compression, file_length)?;
    log::debug!(
        "SWF v{version} ({compression}), declared length {file_length}, body {} bytes",
        body.len()
    );

    let (frame_size, rect_len) = read_rect(&body).ok_or(SwfError::TruncatedHeader)?;
    let rest = body.get(rect_len..rect_len + 4).ok_or(SwfError::TruncatedHeader)?;
    let frame_rate = u16::from_le_bytes([rest[0], rest[1]]) as f32 / 256.0;
    let frame_count = u16::from_le_bytes([rest[2], rest[3]]);
    let tags = split_tags(&body[rect_len + 4..]);

    Ok(SwfFile {
        header: SwfHeader {
            signature: String::from_utf8_lossy(&raw[..3]).into_owned(),
            compression,
            version,
            file_length,
            frame_size,
            frame_rate,
            frame_count,
        },
        tags,
    })
}

/// Return the movie body (everything after the 8-byte header), decompressing if needed.
fn expand_body(
    raw: &[u8],
    compression: SwfCompression,
    file_length: u32,
) -> Result<Vec<u8>, SwfError> {
    let expected = (file_length as usize).saturating_sub(SWF_HEADER_LEN).min(SWF_DECOMPRESSED_LIMIT);
    let decompress_err = |source| SwfError::Decompress { compression, source };
    match compression {
        SwfCompression::None => Ok(raw[SWF_HEADER_LEN..].to_vec()),
        SwfCompression::Zlib => {
            let decoder = ZlibDecoder::new(Cursor::new(&raw[SWF_HEADER_LEN..]));
            read_limited(decoder, expected).map_err(decompress_err)
        }
        SwfCompression::Lzma => {
            let body_offset = SWF_HEADER_LEN + SWF_LZMA_HEADER_EXTRA;
            if raw.len() < body_offset {
                return Err(SwfError::TooShort(raw.len()));
            }
            let props = raw[12];
            let dict_size = u32::from_le_bytes([raw[13], raw[14], raw[15], raw[16]]);
            let reader = LzmaReader::new_with_props(
                Cursor::new(&raw[body_offset..]),
                expected as u64,
                props,
                dict_size,
                None,
            )
            .map_err(|e| decompress_err(std::io::Error::other(e.to_string())))?;
            read_limited(reader, expected).map_err(decompress_err)
        }
    }
}

fn read_limited<R: Read>(reader: R, limit: usize) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(limit.min(16 * 1024 * 1024));
    reader.take(limit as u64).read_to_end(&mut out)?;
    Ok(out)
}

/// Decode the bit-packed RECT at the start of `data`; returns the rect and its byte length.
fn read_rect(data: &[u8]) -> Option<(FrameRect, usize)> {
    let nbits = (*data.first()? >> 3) as usize;
    let total_bits = 5 + 4 * nbits;
    let byte_len = total_bits.div_ceil(8);
    let bytes = data.get(..byte_len)?;

    let bit = |pos: usize| -> u32 { ((bytes[pos / 8] >> (7 - pos % 8)) & 1) as u32 };
    let field = |start: usize| -> i32 {
        if nbits == 0 {
            return 0;
        }
        let mut value: u32 = 0;
        for i in 0..nbits {
            value = (value << 1) | bit(start + i);
        }
        // Sign-extend the nbits-wide value.
        let shift = 32 - nbits as u32;
        ((value << shift) as i32) >> shift
    };

    let rect = FrameRect {
        x_min: field(5),
        x_max: field(5 + nbits),
        y_min: field(5 + 2 * nbits),
        y_max: field(5 + 3 * nbits),
    };
    Some((rect, byte_len))
}

/// Split the tag stream into raw records, stopping after `End` or at the first truncated record.
fn split_tags(data: &[u8]) -> Vec<RawTag> {
    let mut tags = Vec::new();
    let mut offset = 0usize;
    while offset + 2 <= data.len() {
        let tag_header = u16::from_le_bytes([data[offset], data[offset + 1]]);
        let code = tag_header >> 6;
        let mut len = (tag_header & 0x3F) as usize;
        offset += 2;
        if len == 0x3F {
            let Some(long) = data.get(offset..offset + 4) else {
                log::warn!("Tag stream truncated in long header of tag {code}");
                break;
            };
            len = u32::from_le_bytes([long[0], long[1], long[2], long[3]]) as usize;
            offset += 4;
        }
        let Some(body) = offset.checked_add(len).and_then(|end| data.get(offset..end)) else {
            log::warn!(
                "Tag {code} declares {len} bytes but only {} remain; stopping",
                data.len() - offset
            );
            break;
        };
        tags.push(RawTag { code, body: body.to_vec() });
        offset += len;
        if code == crate::model::codes::END {
            if offset < data.len() {
                log::debug!("{} bytes trail the End tag", data.len() - offset);
            }
            break;
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_rect_decodes_signed_fields() {
        // nbits = 15: 11000 ... matches a 550x400 stage (11000 x 8000 twips).
        let mut bits = String::from("01111");
        for v in [0i32, 11000, 0, 8000] {
            bits.push_str(&format!("{:015b}", v as u32 & 0x7FFF));
        }
        while bits.len() % 8 != 0 {
            bits.push('0');
        }
        let bytes: Vec<u8> = bits
            .as_bytes()
            .chunks(8)
            .map(|c| u8::from_str_radix(std::str::from_utf8(c).unwrap(), 2).unwrap())
            .collect();
        let (rect, len) = read_rect(&bytes).expect("rect");
        assert_eq!(len, 9);
        assert_eq!(rect, FrameRect { x_min: 0, x_max: 11000, y_min: 0, y_max: 8000 });
    }

    #[test]
    fn split_tags_stops_at_truncated_record() {
        // Tag 9 (SetBackgroundColor) with 3 bytes, then a tag claiming 10 bytes with 1 present.
        let mut data = vec![0x43, 0x02, 1, 2, 3];
        data.extend_from_slice(&[0x0A, 0x02, 0xFF]);
        let tags = split_tags(&data);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].code, 9);
        assert_eq!(tags[0].body, vec![1, 2, 3]);
    }
}
