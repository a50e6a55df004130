use std::fs::File;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Tool looked up on PATH when no override is given.
pub const DEFAULT_TOOL: &str = "scc";

/// The external compiler under test.
pub trait Tool {
    /// Runs the tool from `workdir` with `options` as its argument list, sending
    /// stdout and stderr to `log`. Returns once the tool has exited. The exit
    /// status is not a success signal; only a failure to launch is an error.
    fn invoke(&self, workdir: &Path, options: &[String], log: &File) -> io::Result<()>;
}

/// Runs an executable as a subprocess.
#[derive(Debug, Clone)]
pub struct ExternalTool {
    pub program: String,
}

impl Default for ExternalTool {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL)
    }
}

impl ExternalTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Full path of the program as it would be found on PATH, for diagnostics.
    pub fn resolved_path(&self) -> String {
        if self.program.contains(std::path::MAIN_SEPARATOR) {
            return match std::fs::canonicalize(&self.program) {
                Ok(p) => p.to_string_lossy().into_owned(),
                Err(_) => self.program.clone(),
            };
        }
        match which::which(&self.program) {
            Ok(p) => p.to_string_lossy().into_owned(),
            Err(_) => self.program.clone(),
        }
    }
}

impl Tool for ExternalTool {
    fn invoke(&self, workdir: &Path, options: &[String], log: &File) -> io::Result<()> {
        let stdout = log.try_clone()?;
        let stderr = log.try_clone()?;
        let status = Command::new(&self.program)
            .args(options)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .status()?;
        debug!(program = %self.program, %status, "tool exited");
        Ok(())
    }
}
