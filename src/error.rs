use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the capture file scan. Everything else in the tool is
/// best-effort and only counted, never surfaced as an error.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("capture path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("not a .pcap file: {0}")]
    InvalidExtension(PathBuf),

    #[error("directory walk failed: {0}")]
    Walk(#[from] std::io::Error),
}
