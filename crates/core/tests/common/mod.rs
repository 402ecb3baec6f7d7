// Shared builders for synthetic SWF files.
#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use swftriage_core::services::analysis::{Disassembler, DisassemblerRun, DisassemblyError};

/// 550x400 stage (11000x8000 twips), nbits = 15.
pub const STAGE_RECT: [u8; 9] = [0x78, 0x00, 0x05, 0x5F, 0x00, 0x00, 0x0F, 0xA0, 0x00];

#[derive(Default)]
pub struct SwfBuilder {
    tags: Vec<(u16, Vec<u8>)>,
}

impl SwfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(mut self, code: u16, body: Vec<u8>) -> Self {
        self.tags.push((code, body));
        self
    }

    pub fn name_character(self, id: u16, name: &str) -> Self {
        let mut body = id.to_le_bytes().to_vec();
        body.extend_from_slice(&cstr(name));
        self.tag(40, body)
    }

    pub fn product_info(self, compile_time: Option<u64>) -> Self {
        let mut body = Vec::new();
        body.extend_from_slice(&3u32.to_le_bytes());
        body.extend_from_slice(&6u32.to_le_bytes());
        body.extend_from_slice(&[4, 6]);
        body.extend_from_slice(&23201u32.to_le_bytes());
        body.extend_from_slice(&0u32.to_le_bytes());
        if let Some(ms) = compile_time {
            body.extend_from_slice(&ms.to_le_bytes());
        }
        self.tag(41, body)
    }

    pub fn export_assets(self, exports: &[(u16, &str)]) -> Self {
        self.tag(56, id_name_list(exports))
    }

    pub fn symbol_class(self, symbols: &[(u16, &str)]) -> Self {
        self.tag(76, id_name_list(symbols))
    }

    pub fn do_abc(self, name: &str, abc: &[u8]) -> Self {
        let mut body = 1u32.to_le_bytes().to_vec();
        body.extend_from_slice(&cstr(name));
        body.extend_from_slice(abc);
        self.tag(82, body)
    }

    pub fn define_binary_data(self, id: u16, data: &[u8]) -> Self {
        let mut body = id.to_le_bytes().to_vec();
        body.extend_from_slice(&0u32.to_le_bytes());
        body.extend_from_slice(data);
        self.tag(87, body)
    }

    /// Movie body: RECT, frame rate 24.0, one frame, tags, End.
    fn body(&self) -> Vec<u8> {
        let mut out = STAGE_RECT.to_vec();
        out.extend_from_slice(&[0x00, 0x18, 0x01, 0x00]);
        for (code, body) in &self.tags {
            encode_tag(&mut out, *code, body);
        }
        encode_tag(&mut out, 0, &[]);
        out
    }

    pub fn fws(&self) -> Vec<u8> {
        let body = self.body();
        let mut out = b"FWS".to_vec();
        out.push(10);
        out.extend_from_slice(&((body.len() + 8) as u32).to_le_bytes());
        out.extend_from_slice(&body);
        out
    }

    pub fn cws(&self) -> Vec<u8> {
        let body = self.body();
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&body).unwrap();
        let compressed = encoder.finish().unwrap();
        let mut out = b"CWS".to_vec();
        out.push(10);
        out.extend_from_slice(&((body.len() + 8) as u32).to_le_bytes());
        out.extend_from_slice(&compressed);
        out
    }
}

fn cstr(s: &str) -> Vec<u8> {
    let mut v = s.as_bytes().to_vec();
    v.push(0);
    v
}

fn id_name_list(entries: &[(u16, &str)]) -> Vec<u8> {
    let mut body = (entries.len() as u16).to_le_bytes().to_vec();
    for (id, name) in entries {
        body.extend_from_slice(&id.to_le_bytes());
        body.extend_from_slice(&cstr(name));
    }
    body
}

fn encode_tag(out: &mut Vec<u8>, code: u16, body: &[u8]) {
    if body.len() < 0x3F {
        out.extend_from_slice(&((code << 6) | body.len() as u16).to_le_bytes());
    } else {
        out.extend_from_slice(&((code << 6) | 0x3F).to_le_bytes());
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    }
    out.extend_from_slice(body);
}

/// Disassembler stand-in that writes canned `.asasm` files where rabcdasm would.
pub struct FakeDisassembler {
    pub files: Vec<(String, String)>,
    pub exit_code: i32,
    pub calls: Mutex<Vec<PathBuf>>,
}

impl FakeDisassembler {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            files: vec![("frame1/Main.class.asasm".to_string(), text.into())],
            exit_code: 0,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Disassembler for FakeDisassembler {
    fn disassemble(&self, abc_path: &Path) -> Result<DisassemblerRun, DisassemblyError> {
        self.calls.lock().unwrap().push(abc_path.to_path_buf());
        let out_dir = abc_path.with_extension("");
        for (rel, text) in &self.files {
            let path = out_dir.join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, text).unwrap();
        }
        Ok(DisassemblerRun {
            status: Some(self.exit_code),
            success: self.exit_code == 0,
            stdout: String::new(),
            stderr: String::new(),
        })
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Disassembler that fails to launch.
pub struct BrokenDisassembler;

impl Disassembler for BrokenDisassembler {
    fn disassemble(&self, _abc_path: &Path) -> Result<DisassemblerRun, DisassemblyError> {
        Err(DisassemblyError::Spawn {
            tool: "missing-rabcdasm".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        })
    }

    fn name(&self) -> &'static str {
        "broken"
    }
}

/// Disassembler that always times out, counting how often it was asked.
#[derive(Default)]
pub struct HangingDisassembler {
    pub calls: Mutex<usize>,
}

impl HangingDisassembler {
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl Disassembler for HangingDisassembler {
    fn disassemble(&self, _abc_path: &Path) -> Result<DisassemblerRun, DisassemblyError> {
        *self.calls.lock().unwrap() += 1;
        Err(DisassemblyError::Timeout {
            tool: "rabcdasm".into(),
            timeout: std::time::Duration::from_secs(120),
        })
    }

    fn name(&self) -> &'static str {
        "hanging"
    }
}
