//! swftriage-core
//!
//! Core library for static triage of SWF (Flash) containers.
//!
//! This crate defines the tag model, the container reader, the tag dispatcher and heuristic
//! detectors, the report structure, and the adapter for the external ABC disassembler.
//!
//! The goal is to keep all substantive logic here so it is fully testable and
//! reusable from multiple frontends (CLI, pipeline services, etc.).

pub mod analysis;
pub mod config;
pub mod model;
pub mod report;
pub mod services;
pub mod swf;

use sha2::{Digest, Sha256};

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Hex-encoded SHA-256 of a byte slice; used to name persisted modules and artifacts.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
