use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Filesystem operations the lifecycle performs on expected files.
pub trait FileSystem {
    fn is_file(&self, path: &Path) -> bool;
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}

/// Deletes every file in `files` that exists. Errors are ignored: a file that
/// cannot be removed shows up later as a stale file.
pub fn delete_existing<F: FileSystem + ?Sized>(fs: &F, files: &[PathBuf]) {
    for f in files {
        if !fs.is_file(f) {
            continue;
        }
        match fs.remove_file(f) {
            Ok(()) => debug!(file = %f.display(), "deleted"),
            Err(e) => debug!(file = %f.display(), error = %e, "could not delete"),
        }
    }
}

/// Files from `files` that exist, in declared order.
pub fn existing<F: FileSystem + ?Sized>(fs: &F, files: &[PathBuf]) -> Vec<PathBuf> {
    files.iter().filter(|f| fs.is_file(f)).cloned().collect()
}

/// Files from `files` that do not exist, in declared order.
pub fn missing<F: FileSystem + ?Sized>(fs: &F, files: &[PathBuf]) -> Vec<PathBuf> {
    files.iter().filter(|f| !fs.is_file(f)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn delete_existing_ignores_missing_files() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let present = dir.path().join("a.c");
        let absent = dir.path().join("b.c");
        std::fs::write(&present, "int a;")?;

        let files = vec![present.clone(), absent.clone()];
        assert_eq!(existing(&LocalFs, &files), vec![present.clone()]);
        assert_eq!(missing(&LocalFs, &files), vec![absent.clone()]);

        delete_existing(&LocalFs, &files);
        assert!(existing(&LocalFs, &files).is_empty());
        assert_eq!(missing(&LocalFs, &files), files);
        Ok(())
    }
}
