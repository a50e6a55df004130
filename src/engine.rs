//! Drives each test case through setup, invocation and teardown.
//!
//! Cases run strictly one after another. Per case:
//!
//! 1. **setup**: enter the execution directory and delete the expected files.
//! 2. **invoke**: check the directory and that no expected file is left, run
//!    the tool with its output going to `<start>/<name>.log`, then require a
//!    non-empty log and every expected file.
//! 3. **teardown**: delete the expected files again, return to the start
//!    directory and mark the case passed if nothing failed.
//!
//! Setup and invoke are skipped for a case that already failed; teardown
//! always runs. Afterwards the log is echoed and left on disk.

use crate::backend::Tool;
use crate::failure::Failure;
use crate::files::{FileSystem, LocalFs, delete_existing, existing, missing};
use crate::spec::{discover_specs, load_cases};
use crate::types::{Summary, TestCase};
use crate::workdir::{DirScope, WorkingDirectoryContext};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct Runner<T: Tool, F: FileSystem = LocalFs> {
    tool: T,
    fs: F,
    workdir: WorkingDirectoryContext,
    echo_logs: bool,
}

impl<T: Tool> Runner<T, LocalFs> {
    pub fn new(tool: T, workdir: WorkingDirectoryContext) -> Self {
        Self {
            tool,
            fs: LocalFs,
            workdir,
            echo_logs: true,
        }
    }
}

impl<T: Tool, F: FileSystem> Runner<T, F> {
    /// Swaps the filesystem used for expected files.
    pub fn with_fs<G: FileSystem>(self, fs: G) -> Runner<T, G> {
        Runner {
            tool: self.tool,
            fs,
            workdir: self.workdir,
            echo_logs: self.echo_logs,
        }
    }

    /// Whether each case's log is copied to the output after the case ends.
    pub fn echo_logs(mut self, echo: bool) -> Self {
        self.echo_logs = echo;
        self
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    pub fn workdir(&self) -> &WorkingDirectoryContext {
        &self.workdir
    }

    pub fn log_path(&self, case: &TestCase) -> PathBuf {
        self.workdir.start().join(format!("{}.log", case.name))
    }

    /// Finds and loads every specification in the start directory.
    pub fn discover(&self) -> Result<Vec<TestCase>> {
        let start = self.workdir.start();
        let specs = discover_specs(start)?;
        info!(count = specs.len(), "loading test cases");
        Ok(load_cases(&specs, start))
    }

    /// Discovers and runs all cases, echoing their logs to `out`.
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<Vec<TestCase>> {
        let mut cases = self.discover()?;
        self.run_cases(&mut cases, out)?;
        Ok(cases)
    }

    pub fn run_cases<W: Write>(&mut self, cases: &mut [TestCase], out: &mut W) -> Result<Summary> {
        for case in cases.iter_mut() {
            self.run_case(case, out)?;
        }
        let summary = Summary::from_cases(cases);
        info!(
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            "all test cases finished"
        );
        Ok(summary)
    }

    /// Runs one case through the full lifecycle. Only errors writing or
    /// reading the case's log are returned; everything else fails the case.
    pub fn run_case<W: Write>(&mut self, case: &mut TestCase, out: &mut W) -> Result<()> {
        info!(case = %case.name, "starting");
        let log_path = self.log_path(case);
        let started = Instant::now();
        {
            let log = File::create(&log_path)
                .with_context(|| format!("failed to create log file {}", log_path.display()))?;
            let mut scope = self.workdir.scope();
            setup(&self.fs, case, &mut scope);
            if !case.failed() {
                if let Err(failure) = invoke(&self.tool, &self.fs, case, &scope, &log, &log_path) {
                    case.mark_failed(failure);
                }
            }
            teardown(&self.fs, case, scope);
        }
        case.duration = Some(started.elapsed());

        match case.failure() {
            Some(f) => warn!(case = %case.name, kind = f.kind(), "failed"),
            None => info!(case = %case.name, "passed"),
        }

        if self.echo_logs {
            let content = fs::read(&log_path)
                .with_context(|| format!("failed to read log file {}", log_path.display()))?;
            out.write_all(&content)?;
            out.flush()?;
        }
        Ok(())
    }
}

fn setup<F: FileSystem>(fs: &F, case: &TestCase, scope: &mut DirScope<'_>) {
    if case.failed() {
        return;
    }
    if let Some(dir) = &case.execution_dir {
        // A failed change is reported by the directory check in `invoke`
        if let Err(e) = scope.change_to(dir) {
            debug!(case = %case.name, dir = %dir.display(), error = %e, "could not enter execution directory");
        }
    }
    delete_existing(fs, &case.expected_files);
}

fn invoke<T: Tool, F: FileSystem>(
    tool: &T,
    fs: &F,
    case: &TestCase,
    scope: &DirScope<'_>,
    log: &File,
    log_path: &Path,
) -> Result<(), Failure> {
    if let Some(dir) = &case.execution_dir {
        if scope.current() != dir.as_path() {
            return Err(Failure::WorkdirMismatch(dir.clone()));
        }
    }

    let stale = existing(fs, &case.expected_files);
    if !stale.is_empty() {
        return Err(Failure::StaleFiles(stale));
    }

    debug!(case = %case.name, dir = %scope.current().display(), options = ?case.options, "invoking tool");
    tool.invoke(scope.current(), &case.options, log)
        .map_err(|e| Failure::LaunchError(e.to_string()))?;

    let log_is_empty = log.metadata().map(|m| m.len() == 0).unwrap_or(true);
    if log_is_empty {
        let resolved = fs::canonicalize(log_path).unwrap_or_else(|_| log_path.to_path_buf());
        return Err(Failure::EmptyLog(resolved));
    }

    let absent = missing(fs, &case.expected_files);
    if !absent.is_empty() {
        return Err(Failure::MissingOutput(absent));
    }
    Ok(())
}

fn teardown<F: FileSystem>(fs: &F, case: &mut TestCase, scope: DirScope<'_>) {
    delete_existing(fs, &case.expected_files);
    drop(scope);
    case.mark_succeeded();
}
