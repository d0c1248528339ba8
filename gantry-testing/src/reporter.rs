// Test-run reporting

use std::env;
use std::io::Write;
use std::sync::OnceLock;

/// Details attached to a failed assertion.
#[derive(Debug, Clone, Default)]
pub struct FailureDetail {
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl FailureDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    pub fn with_comparison(
        mut self,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }
}

/// Receives the event stream of a test run.
///
/// One listener observes one run. Events arrive in document order: suites
/// open and close around the tests they contain, and outcome events for a
/// test arrive between its start and end. A test with no outcome event
/// between start and end passed.
pub trait TestListener {
    fn start_suite(&mut self, name: &str);
    fn end_suite(&mut self, name: &str);
    fn start_test(&mut self, name: &str);
    /// Called after the outcome events of a test, with any output the test
    /// captured.
    fn end_test(&mut self, name: &str, output: &str);
    fn add_error(&mut self, name: &str, message: &str);
    fn add_failure(&mut self, name: &str, detail: &FailureDetail);
    fn add_skipped(&mut self, name: &str, message: &str);
    fn add_incomplete(&mut self, name: &str, message: &str);
}

/// Aggregate counts for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub skipped: usize,
    pub incomplete: usize,
}

/// Human-oriented console printer: one line per test, summary at the end.
pub struct VerboseReporter<W: Write> {
    out: W,
    suite_level: usize,
    summary: RunSummary,
    current_reported: bool,
}

impl<W: Write> VerboseReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            suite_level: 0,
            summary: RunSummary::default(),
            current_reported: false,
        }
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn annotate(message: &str) -> String {
        if message.is_empty() {
            String::new()
        } else {
            format!(" ({})", message)
        }
    }
}

impl<W: Write> TestListener for VerboseReporter<W> {
    fn start_suite(&mut self, _name: &str) {
        self.suite_level += 1;
    }

    fn end_suite(&mut self, _name: &str) {
        self.suite_level = self.suite_level.saturating_sub(1);

        if self.suite_level == 0 {
            let s = self.summary;
            let _ = writeln!(
                self.out,
                "{} tests: {} passed, {} failed, {} errors, {} skipped, {} incomplete",
                s.tests, s.passed, s.failed, s.errors, s.skipped, s.incomplete
            );
        }
    }

    fn start_test(&mut self, _name: &str) {
        self.summary.tests += 1;
        self.current_reported = false;
    }

    fn end_test(&mut self, name: &str, output: &str) {
        if !self.current_reported {
            self.summary.passed += 1;
            let _ = writeln!(self.out, "PASS {}", name);
        }

        let output = output.trim();
        if !output.is_empty() {
            for line in output.lines() {
                let _ = writeln!(self.out, "    {}", line);
            }
        }
    }

    fn add_error(&mut self, name: &str, message: &str) {
        self.summary.errors += 1;
        self.current_reported = true;
        let _ = writeln!(self.out, "ERROR {}: {}", name, message);
    }

    fn add_failure(&mut self, name: &str, detail: &FailureDetail) {
        self.summary.failed += 1;
        self.current_reported = true;
        let first_line = detail.message.lines().next().unwrap_or("");
        let _ = writeln!(self.out, "FAIL {}: {}", name, first_line);
    }

    fn add_skipped(&mut self, name: &str, message: &str) {
        self.summary.skipped += 1;
        self.current_reported = true;
        let _ = writeln!(self.out, "SKIP {}{}", name, Self::annotate(message));
    }

    fn add_incomplete(&mut self, name: &str, message: &str) {
        self.summary.incomplete += 1;
        self.current_reported = true;
        let _ = writeln!(self.out, "INCOMPLETE {}{}", name, Self::annotate(message));
    }
}

/// Once-read debug flag for the test environment.
///
/// `GANTRY_TESTS_DEBUG` unset means debug; otherwise the value is parsed as
/// a boolean, accepting "1", "true", "on" and "yes" (case-insensitive) as
/// true.
pub fn tests_debug() -> bool {
    static DEBUG: OnceLock<bool> = OnceLock::new();
    *DEBUG.get_or_init(|| match env::var("GANTRY_TESTS_DEBUG") {
        Ok(value) => parse_bool(&value),
        Err(_) => true,
    })
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

/// Select the reporter for a run: the verbose printer in debug environments,
/// the TAP printer everywhere else.
pub fn reporter_from_env<W: Write + 'static>(out: W) -> Box<dyn TestListener> {
    if tests_debug() {
        Box::new(VerboseReporter::new(out))
    } else {
        Box::new(crate::tap::TapReporter::new(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output_of(reporter: VerboseReporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_parse_bool_truthy_set() {
        assert!(parse_bool("1"));
        assert!(parse_bool("true"));
        assert!(parse_bool("TRUE"));
        assert!(parse_bool("on"));
        assert!(parse_bool(" yes "));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("off"));
        assert!(!parse_bool(""));
        assert!(!parse_bool("maybe"));
    }

    #[test]
    fn test_verbose_reporter_counts_and_lines() {
        let mut reporter = VerboseReporter::new(Vec::new());

        reporter.start_suite("suite");

        reporter.start_test("adds numbers");
        reporter.end_test("adds numbers", "");

        reporter.start_test("rejects empty input");
        reporter.add_failure(
            "rejects empty input",
            &FailureDetail::new("expected an error\nmore detail"),
        );
        reporter.end_test("rejects empty input", "");

        reporter.start_test("talks to the network");
        reporter.add_skipped("talks to the network", "no network");
        reporter.end_test("talks to the network", "");

        reporter.end_suite("suite");

        assert_eq!(
            reporter.summary(),
            RunSummary {
                tests: 3,
                passed: 1,
                failed: 1,
                errors: 0,
                skipped: 1,
                incomplete: 0,
            }
        );

        let output = output_of(reporter);
        assert!(output.contains("PASS adds numbers\n"));
        assert!(output.contains("FAIL rejects empty input: expected an error\n"));
        assert!(output.contains("SKIP talks to the network (no network)\n"));
        assert!(output.contains("3 tests: 1 passed, 1 failed, 0 errors, 1 skipped, 0 incomplete\n"));
    }

    #[test]
    fn test_verbose_reporter_echoes_captured_output() {
        let mut reporter = VerboseReporter::new(Vec::new());

        reporter.start_suite("suite");
        reporter.start_test("noisy");
        reporter.end_test("noisy", "line one\nline two\n");
        reporter.end_suite("suite");

        let output = output_of(reporter);
        assert!(output.contains("    line one\n    line two\n"));
    }

    #[test]
    fn test_summary_only_after_outermost_suite() {
        let mut reporter = VerboseReporter::new(Vec::new());

        reporter.start_suite("outer");
        reporter.start_suite("inner");
        reporter.start_test("one");
        reporter.end_test("one", "");
        reporter.end_suite("inner");

        let mid = String::from_utf8(reporter.out.clone()).unwrap();
        assert!(!mid.contains("tests:"));

        reporter.end_suite("outer");
        let output = output_of(reporter);
        assert!(output.contains("1 tests: 1 passed"));
    }
}
