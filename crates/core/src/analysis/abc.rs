//! ABC (ActionScript bytecode) module pipeline: persist, disassemble, scan the text.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::analysis::heuristics::TextScanner;
use crate::analysis::session::Session;
use crate::services::analysis::{Disassembler, DisassemblyError};
use crate::sha256_hex;

/// Drives one disassembler over the ABC modules of a single file.
///
/// `work_dir` is owned by the caller and scoped to that file's analysis; persisted modules and
/// disassembler output land there.
pub struct AbcPipeline<'a> {
    disassembler: Option<&'a dyn Disassembler>,
    work_dir: &'a Path,
    scanner: &'a TextScanner,
}

impl<'a> AbcPipeline<'a> {
    pub fn new(
        disassembler: Option<&'a dyn Disassembler>,
        work_dir: &'a Path,
        scanner: &'a TextScanner,
    ) -> Self {
        Self { disassembler, work_dir, scanner }
    }

    /// Handle one `DoABC` record. Disassembly failures are logged and contribute nothing.
    pub fn process(&self, abc_name: &str, bytes: &[u8], session: &mut Session) {
        session.add_summary(
            "DoABC",
            vec![format!("Name: {abc_name}"), format!("Length: {}", bytes.len())],
        );
        let Some(disassembler) = self.disassembler else {
            return;
        };

        let digest = sha256_hex(bytes);
        // Recorded before the run: a module that fails or hangs is not retried.
        if !session.abc_digests.insert(digest.clone()) {
            log::debug!("ABC module {digest} already attempted; skipping");
            return;
        }
        match self.disassemble(disassembler, &digest, bytes) {
            Ok(fragments) => {
                log::debug!("ABC module '{abc_name}' produced {} text files", fragments.len());
                for text in &fragments {
                    self.scanner.scan(text, session);
                }
            }
            Err(e) => log::warn!("Error disassembling ABC module '{abc_name}' ({digest}): {e}"),
        }
    }

    /// Persist the module, run the disassembler, and read back every produced file.
    ///
    /// Output is read in full before any of it is scanned so a failure part-way through leaves
    /// the session untouched.
    fn disassemble(
        &self,
        disassembler: &dyn Disassembler,
        digest: &str,
        bytes: &[u8],
    ) -> Result<Vec<String>, DisassemblyError> {
        let abc_path = self.work_dir.join(format!("{digest}.abc"));
        fs::write(&abc_path, bytes)
            .map_err(|source| DisassemblyError::Io { path: abc_path.clone(), source })?;

        let run = disassembler.disassemble(&abc_path)?;

        // rabcdasm writes its output to a directory named after the input file stem.
        let out_dir = self.work_dir.join(digest);
        if !out_dir.is_dir() {
            log::debug!(
                "{} left no output for {} (status {:?}): {}",
                disassembler.name(),
                abc_path.display(),
                run.status,
                run.stderr.trim()
            );
            return Ok(Vec::new());
        }
        if !run.success {
            log::warn!(
                "{} exited with status {:?} but produced output; scanning partial disassembly",
                disassembler.name(),
                run.status
            );
        }

        let mut fragments = Vec::new();
        for entry in WalkDir::new(&out_dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let raw = fs::read(entry.path())
                .map_err(|source| DisassemblyError::Io { path: entry.path().to_path_buf(), source })?;
            fragments.push(String::from_utf8_lossy(&raw).into_owned());
        }
        Ok(fragments)
    }
}
