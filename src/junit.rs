//! JUnit-style XML report for CI systems.
//!
//! ```xml
//! <testsuite name="SCC tests" tests="2" failures="1" time="0.250">
//!   <testcase name="test1" classname="test1" time="0.125"/>
//!   <testcase name="test2" classname="test2" time="0.125">
//!     <failure type="missing-output" message="...">...</failure>
//!   </testcase>
//! </testsuite>
//! ```

use crate::report::Reporter;
use crate::types::TestCase;
use anyhow::{Context, Result};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_REPORT_FILE: &str = "results.xml";
pub const SUITE_NAME: &str = "SCC tests";

#[derive(Debug)]
pub struct XmlReporter<'a> {
    path: PathBuf,
    tests: Vec<&'a TestCase>,
}

impl XmlReporter<'_> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tests: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Builds the report document without writing it anywhere.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let total_time: Duration = self.tests.iter().filter_map(|c| c.duration).sum();
        let failures = self.tests.iter().filter(|c| c.failed()).count();
        let mut suite = BytesStart::new("testsuite");
        suite.push_attribute(("name", SUITE_NAME));
        suite.push_attribute(("tests", self.tests.len().to_string().as_str()));
        suite.push_attribute(("failures", failures.to_string().as_str()));
        suite.push_attribute(("time", seconds(total_time).as_str()));
        writer.write_event(Event::Start(suite))?;

        for case in &self.tests {
            let time = seconds(case.duration.unwrap_or_default());
            let mut testcase = BytesStart::new("testcase");
            testcase.push_attribute(("name", case.name.as_str()));
            testcase.push_attribute(("classname", case.name.as_str()));
            testcase.push_attribute(("time", time.as_str()));

            let Some(failure) = case.failure() else {
                writer.write_event(Event::Empty(testcase))?;
                continue;
            };
            let reason = failure.to_string();
            let message = reason.lines().next().unwrap_or_default();
            writer.write_event(Event::Start(testcase))?;
            let mut element = BytesStart::new("failure");
            element.push_attribute(("type", failure.kind()));
            element.push_attribute(("message", message));
            writer.write_event(Event::Start(element))?;
            writer.write_event(Event::Text(BytesText::new(&reason)))?;
            writer.write_event(Event::End(BytesEnd::new("failure")))?;
            writer.write_event(Event::End(BytesEnd::new("testcase")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
        let bytes = writer.into_inner();
        String::from_utf8(bytes).context("report is not valid UTF-8")
    }
}

impl<'a> Reporter<'a> for XmlReporter<'a> {
    fn add_test(&mut self, case: &'a TestCase) {
        self.tests.push(case);
    }

    fn render(&self) -> Result<String> {
        let xml = self.to_xml()?;
        fs::write(&self.path, xml)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        debug!(path = %self.path.display(), tests = self.tests.len(), "wrote xml report");
        Ok(format!("XML saved to {}", self.path.display()))
    }
}

fn seconds(d: Duration) -> String {
    format!("{:.3}", d.as_secs_f64())
}
