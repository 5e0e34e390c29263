//! Reading the base raster and writing finished outputs.

use std::io::Write;
use std::path::Path;

use image::RgbaImage;
use tracing::debug;

use crate::error::{RenderError, Result};

/// Decode the base raster as 8-bit RGBA.
pub fn load_base_raster(path: impl AsRef<Path>) -> Result<RgbaImage> {
    let path = path.as_ref();
    let image = image::open(path)?.to_rgba8();
    if image.width() == 0 || image.height() == 0 {
        return Err(RenderError::EmptyRaster);
    }
    debug!(path = %path.display(), width = image.width(), height = image.height(), "Loaded base raster");
    Ok(image)
}

/// Write `bytes` to `path` through a temporary file in the same directory.
///
/// The destination either keeps its previous content or holds all of
/// `bytes`; a partially written file is never visible at `path`.
pub fn write_atomic(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    write_all_atomic(&[(path.as_ref(), bytes)])
}

/// Write several files, renaming them into place only after every one has
/// been fully written and synced.
///
/// Files are renamed in the given order, so the last entry appearing on
/// disk means all earlier ones are in place.
pub fn write_all_atomic(files: &[(&Path, &[u8])]) -> Result<()> {
    let mut staged = Vec::with_capacity(files.len());
    for &(path, bytes) in files {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        staged.push((tmp, path, bytes.len()));
    }

    for (tmp, path, len) in staged {
        tmp.persist(path).map_err(|e| RenderError::Io(e.error.to_string()))?;
        debug!(path = %path.display(), bytes = len, "Wrote output");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_failed_staging_persists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("image.png");
        let second = dir.path().join("missing").join("legend.json");

        let result = write_all_atomic(&[(first.as_path(), b"png"), (second.as_path(), b"{}")]);
        assert!(result.is_err());
        assert!(!first.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_load_missing_raster() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_base_raster(dir.path().join("missing.png")).is_err());
    }
}
