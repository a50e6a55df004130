use crate::failure::Failure;
use crate::types::TestCase;
use crate::workdir::canonical_dir;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Specification files are named `test*.json`.
pub const SPEC_PREFIX: &str = "test";
pub const SPEC_EXTENSION: &str = "json";

#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

// Unknown keys are ignored
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawSpec {
    pub files: Option<OneOrMany>,
    pub path: Option<String>,
    pub options: Option<OneOrMany>,
}

fn is_spec_file(path: &Path) -> bool {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    file_name.starts_with(SPEC_PREFIX)
        && path.extension().is_some_and(|ext| ext == SPEC_EXTENSION)
}

/// Lists the specification files directly inside `dir`, sorted by file name.
pub fn discover_specs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            // Only an unreadable start directory aborts discovery
            Err(e) if e.depth() == 0 => {
                return Err(e).with_context(|| format!("failed to list {}", dir.display()));
            }
            Err(e) => {
                debug!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        if entry.file_type().is_file() && is_spec_file(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }
    debug!(count = files.len(), dir = %dir.display(), "discovered specifications");
    Ok(files)
}

/// Loads one test case. Relative paths in the specification are resolved
/// against `base`. A case that does not validate comes back already failed.
pub fn load_case(spec_path: &Path, base: &Path) -> TestCase {
    let name = spec_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "test".to_string());
    let mut case = TestCase::new(name, spec_path);
    if let Err(failure) = populate(&mut case, base) {
        warn!(case = %case.name, kind = failure.kind(), "invalid specification");
        case.mark_failed(failure);
    }
    case
}

pub fn load_cases(spec_paths: &[PathBuf], base: &Path) -> Vec<TestCase> {
    spec_paths.iter().map(|p| load_case(p, base)).collect()
}

fn read_raw(path: &Path) -> Result<RawSpec, Failure> {
    let malformed = |reason: String| Failure::MalformedSpec {
        path: path.to_path_buf(),
        reason,
    };
    let content = fs::read_to_string(path).map_err(|e| malformed(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| malformed(e.to_string()))
}

fn populate(case: &mut TestCase, base: &Path) -> Result<(), Failure> {
    let raw = read_raw(&case.spec_path)?;

    let files = raw.files.ok_or(Failure::MissingFilesAttr)?.into_vec();
    if files.is_empty() {
        return Err(Failure::EmptyFilesAttr);
    }

    if let Some(path) = &raw.path {
        let expanded = expand_path(path, base);
        let dir = canonical_dir(&expanded).map_err(|_| Failure::InvalidExecPath(expanded))?;
        case.execution_dir = Some(dir);
    }

    if let Some(options) = raw.options {
        case.options = options.into_vec();
    }

    let anchor = case.execution_dir.as_deref().unwrap_or(base);
    case.expected_files = files.iter().map(|f| make_absolute(f, anchor)).collect();
    Ok(())
}

/// Expands `$VAR`, `${VAR}` and a leading `~`, then anchors a relative result
/// at `base`. Unknown variables are left as written.
pub fn expand_path(raw: &str, base: &Path) -> PathBuf {
    expand_path_with(
        raw,
        base,
        || dirs::home_dir().map(|h| h.to_string_lossy().into_owned()),
        |name| std::env::var(name).ok(),
    )
}

/// Like [`expand_path`], with the home directory and variable lookup supplied
/// by the caller.
pub fn expand_path_with<H, C>(raw: &str, base: &Path, home: H, lookup: C) -> PathBuf
where
    H: FnOnce() -> Option<String>,
    C: FnMut(&str) -> Option<String>,
{
    let expanded = shellexpand::full_with_context_no_errors(raw, home, lookup);
    make_absolute(expanded.as_ref(), base)
}

fn make_absolute(path: &str, base: &Path) -> PathBuf {
    let path_buf = Path::new(path);
    if path_buf.is_absolute() {
        path_buf.to_path_buf()
    } else {
        base.join(path_buf)
    }
}
