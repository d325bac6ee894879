use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ScanError;

const CAPTURE_EXT: &str = "pcap";

/// List every `.pcap` file under `path`. A single file is accepted as-is when
/// it carries the extension; a directory is visited recursively. Runs fresh on
/// every pass so that capture files can appear or disappear between passes.
pub fn list_capture_files(path: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let metadata = fs::metadata(path).map_err(|_| ScanError::PathNotFound(path.to_path_buf()))?;

    if !metadata.is_dir() {
        if has_capture_ext(path) {
            return Ok(vec![path.to_path_buf()]);
        }
        return Err(ScanError::InvalidExtension(path.to_path_buf()));
    }

    let mut files = Vec::new();
    walk(path, &mut files)?;
    Ok(files)
}

// Any traversal error aborts the whole scan; the caller retries next pass.
fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), ScanError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let path = entry.path();

        if file_type.is_dir() {
            walk(&path, files)?;
        } else if file_type.is_file() && has_capture_ext(&path) {
            files.push(path);
        }
    }
    Ok(())
}

// Exact, case-sensitive match: `.pcapng` and `.PCAP` are not capture files.
fn has_capture_ext(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == CAPTURE_EXT)
}
