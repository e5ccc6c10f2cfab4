//! Temporary working directory holding all per-pair intermediate files of a run.

use std::path::{Path, PathBuf};

use tempfile::{Builder, TempDir};

use crate::errors::LastzPlotError;

/// A temporary directory removed by [WorkDir::finish] unless it was asked to be kept.
/// If dropped without finish (on an error path) it is removed silently, unless kept.
pub struct WorkDir {
    dir: TempDir,
    keep: bool,
} // end of WorkDir

impl WorkDir {
    /// creates parent/prefixXXXX. parent must exist.
    pub fn create(parent: &Path, prefix: &str, keep: bool) -> Result<Self, LastzPlotError> {
        let dir = Builder::new()
            .prefix(prefix)
            .keep(keep)
            .tempdir_in(parent)
            .map_err(|e| LastzPlotError::io(parent, e))?;
        log::warn!("Tempdir: {}", dir.path().display());
        Ok(WorkDir { dir, keep })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join<P: AsRef<Path>>(&self, name: P) -> PathBuf {
        self.dir.path().join(name)
    }

    /// removes the directory, or just logs where it stays if keep was set.
    pub fn finish(self) -> Result<(), LastzPlotError> {
        let path = self.dir.path().to_path_buf();
        if self.keep {
            log::info!("keeping temporary directory: {}", path.display());
            return Ok(());
        }
        log::info!("Removing temporary directory: {}", path.display());
        self.dir.close().map_err(|source| {
            log::error!("Error removing temporary directory: {}", source);
            LastzPlotError::Cleanup { dir: path, source }
        })
    } // end of finish
} // end of impl WorkDir

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_removes_directory() {
        let parent = tempfile::tempdir().unwrap();
        let workdir = WorkDir::create(parent.path(), "lastzPlot_", false).unwrap();
        let path = workdir.path().to_path_buf();
        std::fs::write(workdir.join("lastz.aln"), "data").unwrap();
        assert!(path.is_dir());
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("lastzPlot_"));
        workdir.finish().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn kept_directory_survives() {
        let parent = tempfile::tempdir().unwrap();
        let workdir = WorkDir::create(parent.path(), "compareAndPlot_", true).unwrap();
        let path = workdir.path().to_path_buf();
        workdir.finish().unwrap();
        assert!(path.is_dir());
    }

    #[test]
    fn missing_parent_is_an_error() {
        assert!(WorkDir::create(Path::new("/nonexistent/parent/dir"), "x_", false).is_err());
    }
}
