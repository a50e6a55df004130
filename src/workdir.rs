//! Explicit working-directory state for the test lifecycle.
//!
//! The process working directory is never changed. Instead the runner carries a
//! [`WorkingDirectoryContext`] and hands the tool its current directory
//! explicitly. A [`DirScope`] guard puts the context back to the start
//! directory when it goes out of scope, including on early return or panic.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct WorkingDirectoryContext {
    start: PathBuf,
    current: PathBuf,
}

impl WorkingDirectoryContext {
    /// Anchors a context at `start`, which must be an existing directory.
    pub fn new(start: impl AsRef<Path>) -> io::Result<Self> {
        let start = canonical_dir(start.as_ref())?;
        Ok(Self {
            current: start.clone(),
            start,
        })
    }

    pub fn from_process() -> io::Result<Self> {
        Self::new(std::env::current_dir()?)
    }

    pub fn start(&self) -> &Path {
        &self.start
    }

    pub fn current(&self) -> &Path {
        &self.current
    }

    pub fn scope(&mut self) -> DirScope<'_> {
        DirScope { ctx: self }
    }
}

/// Scoped acquisition of a working directory. Dropping it restores the start
/// directory.
#[derive(Debug)]
pub struct DirScope<'a> {
    ctx: &'a mut WorkingDirectoryContext,
}

impl DirScope<'_> {
    pub fn change_to(&mut self, dir: &Path) -> io::Result<()> {
        let dir = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.ctx.start.join(dir)
        };
        self.ctx.current = canonical_dir(&dir)?;
        Ok(())
    }

    pub fn current(&self) -> &Path {
        &self.ctx.current
    }

    pub fn start(&self) -> &Path {
        &self.ctx.start
    }
}

impl Drop for DirScope<'_> {
    fn drop(&mut self) {
        self.ctx.current.clone_from(&self.ctx.start);
    }
}

pub(crate) fn canonical_dir(path: &Path) -> io::Result<PathBuf> {
    let canonical = fs::canonicalize(path)?;
    if canonical.is_dir() {
        Ok(canonical)
    } else {
        Err(io::Error::new(
            io::ErrorKind::NotADirectory,
            format!("{} is not a directory", canonical.display()),
        ))
    }
}
