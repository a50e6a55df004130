use crate::failure::Failure;
use std::path::PathBuf;
use std::time::Duration;

/// Terminal state of a test case. Once `Failed`, the case never changes again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CaseState {
    #[default]
    Pending,
    Succeeded,
    Failed(Failure),
}

#[derive(Debug, Clone)]
pub struct TestCase {
    pub name: String,
    /// The specification file this case was loaded from.
    pub spec_path: PathBuf,
    pub execution_dir: Option<PathBuf>,
    pub expected_files: Vec<PathBuf>,
    pub options: Vec<String>,
    /// Wall-clock time spent in the lifecycle, if the case reached it.
    pub duration: Option<Duration>,
    state: CaseState,
}

impl TestCase {
    pub fn new(name: impl Into<String>, spec_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            spec_path: spec_path.into(),
            execution_dir: None,
            expected_files: Vec::new(),
            options: Vec::new(),
            duration: None,
            state: CaseState::Pending,
        }
    }

    pub fn state(&self) -> &CaseState {
        &self.state
    }

    pub fn failed(&self) -> bool {
        matches!(self.state, CaseState::Failed(_))
    }

    pub fn finished(&self) -> bool {
        !matches!(self.state, CaseState::Pending)
    }

    pub fn failure(&self) -> Option<&Failure> {
        match &self.state {
            CaseState::Failed(f) => Some(f),
            _ => None,
        }
    }

    pub fn failure_reason(&self) -> Option<String> {
        self.failure().map(ToString::to_string)
    }

    /// Records a failure. Only the first one sticks; a later call is ignored.
    pub fn mark_failed(&mut self, failure: Failure) {
        if !self.failed() {
            self.state = CaseState::Failed(failure);
        }
    }

    /// Finishes the case as passed unless it already failed.
    pub fn mark_succeeded(&mut self) {
        if !self.failed() {
            self.state = CaseState::Succeeded;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,  // Total number of test cases
    pub passed: usize, // Number of passed test cases
    pub failed: usize, // Number of failed test cases
}

impl Summary {
    pub fn from_cases(cases: &[TestCase]) -> Self {
        let failed = cases.iter().filter(|c| c.failed()).count();
        Self {
            total: cases.len(),
            passed: cases.len() - failed,
            failed,
        }
    }

    /// Process exit status: zero only when nothing failed, clamped so that it
    /// never wraps around to zero.
    pub fn exit_status(&self) -> u8 {
        u8::try_from(self.failed).unwrap_or(u8::MAX)
    }
}
