use anyhow::Result;
use colored::control::set_override as set_color_override;
use pretty_assertions::assert_eq;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use scc_test::failure::Failure;
use scc_test::junit::XmlReporter;
use scc_test::report::{ConsoleReporter, Reporter};
use scc_test::types::TestCase;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn passed(name: &str) -> TestCase {
    let mut case = TestCase::new(name, format!("{name}.json"));
    case.mark_succeeded();
    case
}

fn failed(name: &str, failure: Failure) -> TestCase {
    let mut case = TestCase::new(name, format!("{name}.json"));
    case.mark_failed(failure);
    case
}

fn console(cases: &[TestCase]) -> Result<String> {
    let mut reporter = ConsoleReporter::new();
    reporter.add_tests(cases);
    reporter.render()
}

#[test]
fn console_without_tests() -> Result<()> {
    assert_eq!(console(&[])?, "---- TEST RESULTS ----\n\nNo tests found.\n");
    Ok(())
}

#[test]
fn console_all_passed() -> Result<()> {
    let cases = vec![passed("test1"), passed("test2")];
    assert_eq!(
        console(&cases)?,
        "---- TEST RESULTS ----\n\n[ OK ] test1\n[ OK ] test2\nAll 2 tests succeeded.\n"
    );
    Ok(())
}

#[test]
fn console_lists_failure_reasons_in_order() -> Result<()> {
    let cases = vec![
        failed("test_a", Failure::EmptyFilesAttr),
        passed("test_b"),
        failed(
            "test_c",
            Failure::WorkdirMismatch(PathBuf::from("/ws/machine")),
        ),
    ];
    assert_eq!(
        console(&cases)?,
        "---- TEST RESULTS ----\n\n\
         [FAIL] test_a\nempty 'files' attribute in json\n\n\
         [ OK ] test_b\n\
         [FAIL] test_c\nFailed to set the working directory:\n\t/ws/machine\n\n\
         2/3 tests failed.\n"
    );
    Ok(())
}

#[test]
fn console_text_is_plain_unless_colored() -> Result<()> {
    set_color_override(true);
    let cases = vec![passed("test1"), failed("test2", Failure::EmptyFilesAttr)];

    let mut plain = ConsoleReporter::new();
    plain.add_tests(&cases);
    let text = plain.render()?;
    assert!(!text.contains('\x1b'));
    assert!(text.contains("[ OK ] test1\n"));
    assert!(text.contains("[FAIL] test2\n"));

    let mut tinted = ConsoleReporter::new().colored(true);
    tinted.add_tests(&cases);
    let text = tinted.render()?;
    assert!(text.contains("\x1b["));
    assert!(text.contains("1/2 tests failed."));
    Ok(())
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Result<String> {
    Ok(e
        .try_get_attribute(name)?
        .map(|a| a.unescape_value().map(|v| v.into_owned()))
        .transpose()?
        .unwrap_or_default())
}

/// (name, classname, failure text) per testcase element, in document order.
fn parse_report(xml: &str) -> Result<Vec<(String, String, Option<String>)>> {
    let mut reader = Reader::from_str(xml);
    let mut records = Vec::new();
    let mut in_failure = false;
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"testcase" => {
                records.push((attribute(&e, "name")?, attribute(&e, "classname")?, None));
            }
            Event::Start(e) if e.name().as_ref() == b"failure" => {
                in_failure = true;
                if let Some(last) = records.last_mut() {
                    last.2 = Some(String::new());
                }
            }
            Event::Text(t) if in_failure => {
                if let Some((_, _, Some(text))) = records.last_mut() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::End(e) if e.name().as_ref() == b"failure" => in_failure = false,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(records)
}

#[test]
fn xml_report_round_trips() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("results.xml");
    let stale = Failure::StaleFiles(vec![PathBuf::from("/w/<a>&b.c")]);
    let cases = vec![
        passed("test1"),
        failed("test2", stale.clone()),
        passed("test3"),
        failed("test4", Failure::MissingFilesAttr),
        passed("test5"),
    ];

    let mut reporter = XmlReporter::new(&path);
    reporter.add_tests(&cases);
    let confirmation = reporter.render()?;
    assert_eq!(confirmation, format!("XML saved to {}", path.display()));

    let records = parse_report(&fs::read_to_string(&path)?)?;
    assert_eq!(records.len(), 5);
    let names: Vec<&str> = records.iter().map(|r| r.0.as_str()).collect();
    assert_eq!(names, vec!["test1", "test2", "test3", "test4", "test5"]);
    assert!(records.iter().all(|(name, classname, _)| name == classname));

    let failures: Vec<_> = records.iter().filter_map(|r| r.2.clone()).collect();
    assert_eq!(
        failures,
        vec![stale.to_string(), Failure::MissingFilesAttr.to_string()]
    );
    Ok(())
}

#[test]
fn xml_suite_counts_tests_and_failures() -> Result<()> {
    let cases = vec![passed("test1"), failed("test2", Failure::EmptyFilesAttr)];
    let mut reporter = XmlReporter::new("unused.xml");
    reporter.add_tests(&cases);
    let xml = reporter.to_xml()?;

    let mut reader = Reader::from_str(&xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"testsuite" => {
                assert_eq!(attribute(&e, "name")?, "SCC tests");
                assert_eq!(attribute(&e, "tests")?, "2");
                assert_eq!(attribute(&e, "failures")?, "1");
            }
            Event::Start(e) if e.name().as_ref() == b"failure" => {
                assert_eq!(attribute(&e, "type")?, "empty-files-attr");
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}
