// Minimal SWF writer for CLI tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// 550x400 stage, nbits = 15.
const STAGE_RECT: [u8; 9] = [0x78, 0x00, 0x05, 0x5F, 0x00, 0x00, 0x0F, 0xA0, 0x00];

fn encode_tag(out: &mut Vec<u8>, code: u16, body: &[u8]) {
    if body.len() < 0x3F {
        out.extend_from_slice(&((code << 6) | body.len() as u16).to_le_bytes());
    } else {
        out.extend_from_slice(&((code << 6) | 0x3F).to_le_bytes());
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    }
    out.extend_from_slice(body);
}

/// Uncompressed SWF v10 holding `tags` followed by End.
pub fn fws(tags: &[(u16, Vec<u8>)]) -> Vec<u8> {
    let mut body = STAGE_RECT.to_vec();
    body.extend_from_slice(&[0x00, 0x18, 0x01, 0x00]);
    for (code, tag) in tags {
        encode_tag(&mut body, *code, tag);
    }
    encode_tag(&mut body, 0, &[]);
    let mut out = b"FWS\x0a".to_vec();
    out.extend_from_slice(&((body.len() + 8) as u32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}

pub fn product_info() -> (u16, Vec<u8>) {
    let mut body = Vec::new();
    for v in [3u32, 6] {
        body.extend_from_slice(&v.to_le_bytes());
    }
    body.extend_from_slice(&[4, 6]);
    body.extend_from_slice(&23201u32.to_le_bytes());
    body.extend_from_slice(&0u32.to_le_bytes());
    (41, body)
}

pub fn symbol_class(entries: &[(u16, &str)]) -> (u16, Vec<u8>) {
    let mut body = (entries.len() as u16).to_le_bytes().to_vec();
    for (id, name) in entries {
        body.extend_from_slice(&id.to_le_bytes());
        body.extend_from_slice(name.as_bytes());
        body.push(0);
    }
    (76, body)
}

pub fn define_binary_data(id: u16, data: &[u8]) -> (u16, Vec<u8>) {
    let mut body = id.to_le_bytes().to_vec();
    body.extend_from_slice(&0u32.to_le_bytes());
    body.extend_from_slice(data);
    (87, body)
}

pub fn do_abc(name: &str, abc: &[u8]) -> (u16, Vec<u8>) {
    let mut body = 1u32.to_le_bytes().to_vec();
    body.extend_from_slice(name.as_bytes());
    body.push(0);
    body.extend_from_slice(abc);
    (82, body)
}

pub fn write_swf(dir: &Path, name: &str, tags: &[(u16, Vec<u8>)]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, fws(tags)).expect("write swf");
    path
}

/// Shell script standing in for rabcdasm: writes `text` into `<stem>/frame1/Main.class.asasm`.
#[cfg(unix)]
pub fn fake_rabcdasm(dir: &Path, text: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let asasm = dir.join("canned.asasm");
    fs::write(&asasm, text).expect("write canned output");
    let script = dir.join("rabcdasm");
    fs::write(
        &script,
        format!(
            "#!/bin/sh\nout=\"${{1%.abc}}\"\nmkdir -p \"$out/frame1\"\ncp '{}' \"$out/frame1/Main.class.asasm\"\n",
            asasm.display()
        ),
    )
    .expect("write script");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).expect("chmod");
    script
}
