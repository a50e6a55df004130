use std::fmt::Write as _;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single test case failed. Every variant is scoped to one case; none of
/// them aborts the run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Failure {
    #[error("Could not open json file:\n\t{}\n{reason}", .path.display())]
    MalformedSpec { path: PathBuf, reason: String },

    #[error("no 'files' attribute in json")]
    MissingFilesAttr,

    #[error("empty 'files' attribute in json")]
    EmptyFilesAttr,

    #[error("Specified execution directory does not exist:\n\t{}", .0.display())]
    InvalidExecPath(PathBuf),

    #[error("Failed to set the working directory:\n\t{}", .0.display())]
    WorkdirMismatch(PathBuf),

    #[error("Failed to delete expected files:\n{}", path_list(.0))]
    StaleFiles(Vec<PathBuf>),

    #[error("An error occurred when scc was called:\n\t{0}")]
    LaunchError(String),

    #[error("The logfile is empty, it seems scc was not executed:\n\t{}", .0.display())]
    EmptyLog(PathBuf),

    #[error("Expected file does not exist:\n{}", path_list(.0))]
    MissingOutput(Vec<PathBuf>),
}

impl Failure {
    /// Stable identifier, used as the `type` of a JUnit failure element.
    pub fn kind(&self) -> &'static str {
        match self {
            Failure::MalformedSpec { .. } => "malformed-spec",
            Failure::MissingFilesAttr => "missing-files-attr",
            Failure::EmptyFilesAttr => "empty-files-attr",
            Failure::InvalidExecPath(_) => "invalid-exec-path",
            Failure::WorkdirMismatch(_) => "workdir-mismatch",
            Failure::StaleFiles(_) => "stale-files",
            Failure::LaunchError(_) => "launch-error",
            Failure::EmptyLog(_) => "empty-log",
            Failure::MissingOutput(_) => "missing-output",
        }
    }
}

// One tab-indented path per line.
fn path_list(paths: &[PathBuf]) -> String {
    let mut out = String::new();
    for p in paths {
        let _ = writeln!(out, "\t{}", p.display());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_path_on_its_own_line() {
        let f = Failure::MissingOutput(vec![PathBuf::from("/w/a.c"), PathBuf::from("/w/a.h")]);
        assert_eq!(
            f.to_string(),
            "Expected file does not exist:\n\t/w/a.c\n\t/w/a.h\n"
        );
        assert_eq!(f.kind(), "missing-output");
    }

    #[test]
    fn attribute_failures_name_the_attribute() {
        assert!(Failure::MissingFilesAttr.to_string().contains("'files'"));
        assert!(Failure::EmptyFilesAttr.to_string().contains("empty 'files'"));
    }
}
