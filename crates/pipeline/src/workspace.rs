//! The scoped working directory of a run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory holding downloads, partition copies and rasters of one run.
///
/// One workspace serves one run at a time; callers serialise runs.
#[derive(Debug, Clone)]
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    /// Use `path`, creating it if absent.
    pub fn new(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start a run. The contents are removed when the scope is dropped,
    /// whatever the outcome of the run.
    pub fn scope(&self) -> io::Result<WorkspaceScope<'_>> {
        fs::create_dir_all(&self.path)?;
        Ok(WorkspaceScope { workspace: self })
    }

    /// Remove everything inside the directory, keeping the directory.
    pub fn clear(&self) -> io::Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        for entry in fs::read_dir(&self.path)? {
            let path = entry?.path();
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

/// Clears the workspace on drop.
#[derive(Debug)]
pub struct WorkspaceScope<'a> {
    workspace: &'a Workspace,
}

impl Drop for WorkspaceScope<'_> {
    fn drop(&mut self) {
        match self.workspace.clear() {
            Ok(()) => debug!(path = %self.workspace.path.display(), "Cleaned up workspace"),
            Err(e) => warn!(
                path = %self.workspace.path.display(),
                error = %e,
                "Failed to clean up workspace"
            ),
        }
    }
}
