//! Scratch directory for extracted frames, removed when dropped.

use crate::error::MediaResult;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// Owns a temporary directory for the lifetime of one detection run.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create a fresh directory under `root`, or under the system temp
    /// directory when `root` is `None`. `root` is created if missing.
    pub fn create(root: Option<&Path>) -> MediaResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("scenecut-");
        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        debug!(path = %dir.path().display(), "Created scratch directory");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn to_path_buf(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Remove the directory now and report failures.
    pub fn close(self) -> MediaResult<()> {
        let path = self.to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!(path = %path.display(), error = %e, "Failed to remove scratch directory");
            return Err(e.into());
        }
        debug!(path = %path.display(), "Removed scratch directory");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let path = {
            let scratch = ScratchDir::create(Some(root.path())).unwrap();
            std::fs::write(scratch.path().join("frame_00001.jpg"), b"x").unwrap();
            assert!(scratch.path().starts_with(root.path()));
            scratch.to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_close_removes() {
        let scratch = ScratchDir::create(None).unwrap();
        let path = scratch.to_path_buf();
        assert!(path.is_dir());
        scratch.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_root_is_created() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        let scratch = ScratchDir::create(Some(&nested)).unwrap();
        assert!(scratch.path().starts_with(&nested));
    }
}
