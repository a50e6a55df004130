use crate::types::TestCase;
use anyhow::Result;
use colored::{Color, Colorize};

pub const HEADER: &str = "---- TEST RESULTS ----";

/// Collects finished test cases and renders them in one format.
pub trait Reporter<'a> {
    fn add_test(&mut self, case: &'a TestCase);

    /// Appends `cases` in order.
    fn add_tests<I>(&mut self, cases: I)
    where
        I: IntoIterator<Item = &'a TestCase>,
        Self: Sized,
    {
        for case in cases {
            self.add_test(case);
        }
    }

    fn render(&self) -> Result<String>;
}

/// Text report for the terminal. Plain unless coloring is switched on.
#[derive(Debug, Default)]
pub struct ConsoleReporter<'a> {
    tests: Vec<&'a TestCase>,
    color: bool,
}

impl ConsoleReporter<'_> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps the status tags in ANSI colors, subject to `colored`'s own
    /// terminal and `NO_COLOR` detection.
    pub fn colored(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

impl<'a> Reporter<'a> for ConsoleReporter<'a> {
    fn add_test(&mut self, case: &'a TestCase) {
        self.tests.push(case);
    }

    fn render(&self) -> Result<String> {
        Ok(render_human(&self.tests, self.color))
    }
}

pub fn render_human(tests: &[&TestCase], color: bool) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str("\n\n");
    for case in tests {
        match case.failure() {
            None => out.push_str(&format!(
                "{} {}\n",
                tag("[ OK ]", Color::Green, color),
                case.name
            )),
            Some(failure) => out.push_str(&format!(
                "{} {}\n{}\n\n",
                tag("[FAIL]", Color::Red, color),
                case.name,
                failure
            )),
        }
    }
    out.push_str(&summary_line(tests));
    out.push('\n');
    out
}

fn tag(text: &str, fg: Color, color: bool) -> String {
    if color {
        text.color(fg).bold().to_string()
    } else {
        text.to_string()
    }
}

pub fn summary_line(tests: &[&TestCase]) -> String {
    let total = tests.len();
    let failed = tests.iter().filter(|c| c.failed()).count();
    if failed > 0 {
        format!("{failed}/{total} tests failed.")
    } else if total > 0 {
        format!("All {total} tests succeeded.")
    } else {
        "No tests found.".to_string()
    }
}
