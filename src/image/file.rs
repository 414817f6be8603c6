//! Image files
//!
//! Reads and writes whole images on disk.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Read the image file at `path`
pub fn read_image(path: &Path) -> Result<Vec<u8>> {
    let bytes = fs::read(path)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "read image");
    Ok(bytes)
}

/// Write `bytes` to `path`, replacing any previous image
///
/// The data goes to a sibling temp file that is synced and then renamed
/// over `path`, so a crash mid-write never leaves a truncated image.
pub fn write_image(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp_path = temp_path(path);

    {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        tracing::warn!(path = %path.display(), error = %e, "image rename failed");
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote image");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "blockfs.img".into());
    name.push(".tmp");
    path.with_file_name(name)
}
