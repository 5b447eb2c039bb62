//! File helpers shared by the file-backed stores and config writer.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{FeedError, Result};

/// Largest tag table or post file read into memory (10 MB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Read a file into a string, refusing anything over `MAX_FILE_SIZE`.
pub fn read_to_string_limited(path: &Path) -> Result<String> {
    read_to_string_with_limit(path, MAX_FILE_SIZE)
}

/// Read a file into a string, refusing anything over `max_size` bytes.
pub fn read_to_string_with_limit(path: &Path, max_size: u64) -> Result<String> {
    let size = fs::metadata(path)
        .map_err(|e| FeedError::storage(path, e))?
        .len();
    if size > max_size {
        return Err(FeedError::store(format!(
            "{} is too large ({} bytes, max {} bytes)",
            path.display(),
            size,
            max_size
        )));
    }

    fs::read_to_string(path).map_err(|e| FeedError::storage(path, e))
}

/// Replace `path` with `contents` via a synced temp file and rename.
///
/// Each call writes its own uniquely named `.<name>.*.tmp` file next to the
/// target, so concurrent writers of one path never share a temp file. The
/// last rename wins and readers only ever see a complete file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| FeedError::store(format!("{} has no file name", path.display())))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{}.", name))
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| FeedError::storage(dir, e))?;
    temp.write_all(contents)
        .map_err(|e| FeedError::storage(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| FeedError::storage(temp.path(), e))?;

    temp.persist(path)
        .map_err(|e| FeedError::storage(path, e.error))?;
    Ok(())
}
