use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use crate::services::analysis::{Disassembler, DisassemblerRun, DisassemblyError};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// rabcdasm-backed disassembler that shells out once per ABC module.
///
/// rabcdasm takes the `.abc` path as its only argument and writes `.asasm` files into a
/// directory named after the file stem, next to the input.
pub struct RabcdasmBackend {
    path: PathBuf,
    timeout: Duration,
}

impl RabcdasmBackend {
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self { path: path.into(), timeout }
    }
}

impl Disassembler for RabcdasmBackend {
    fn disassemble(&self, abc_path: &Path) -> Result<DisassemblerRun, DisassemblyError> {
        let deadline = Instant::now() + self.timeout;
        let mut child = Command::new(&self.path)
            .arg(abc_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| DisassemblyError::Spawn {
                tool: self.path.display().to_string(),
                source,
            })?;

        // Drain both pipes concurrently so a chatty child cannot block on a full pipe.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = wait_until(&mut child, deadline, self.timeout).map_err(|source| {
            DisassemblyError::Spawn { tool: self.path.display().to_string(), source }
        })?;
        // Processes the child left behind can hold the pipes open; never wait past the deadline.
        let stdout = collect_output(stdout, deadline);
        let stderr = collect_output(stderr, deadline);

        let Some(status) = status else {
            return Err(DisassemblyError::Timeout {
                tool: self.path.display().to_string(),
                timeout: self.timeout,
            });
        };
        log::debug!("rabcdasm {} exited with {status}", abc_path.display());
        Ok(DisassemblerRun { status: status.code(), success: status.success(), stdout, stderr })
    }

    fn name(&self) -> &'static str {
        "rabcdasm"
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

/// Output of a drain thread, or empty if it has not finished by `deadline`.
fn collect_output(rx: Option<Receiver<String>>, deadline: Instant) -> String {
    rx.and_then(|rx| rx.recv_timeout(deadline.saturating_duration_since(Instant::now())).ok())
        .unwrap_or_default()
}

/// Wait for `child` until `deadline`, killing it after that. `Ok(None)` means it was killed.
fn wait_until(
    child: &mut Child,
    deadline: Instant,
    timeout: Duration,
) -> std::io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            log::warn!("Disassembler exceeded {}s; killing pid {}", timeout.as_secs(), child.id());
            child.kill()?;
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}
