// TAP (Test Anything Protocol) output

use crate::reporter::{FailureDetail, TestListener};
use serde::Serialize;
use std::io::Write;

/// Diagnostic block attached to a failed test.
#[derive(Debug, Serialize)]
struct Diagnostic<'a> {
    message: &'a str,
    severity: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<DiagnosticData<'a>>,
}

#[derive(Debug, Serialize)]
struct DiagnosticData<'a> {
    got: &'a str,
    expected: &'a str,
}

/// Test listener printing the run in Test Anything Protocol form.
///
/// Line protocol: a `TAP version 13` header, one `ok N - description` or
/// `not ok N - description` line per test, YAML diagnostic blocks after
/// failures, `#` comment lines for captured output, and a final `1..N` plan
/// when the outermost suite closes.
pub struct TapReporter<W: Write> {
    out: W,
    test_number: usize,
    suite_level: usize,
    test_successful: bool,
}

impl<W: Write> TapReporter<W> {
    pub fn new(mut out: W) -> Self {
        let _ = writeln!(out, "TAP version 13");
        Self {
            out,
            test_number: 0,
            suite_level: 0,
            test_successful: true,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_not_ok(&mut self, prefix: &str, name: &str, directive: &str) {
        let prefix = if prefix.is_empty() {
            String::new()
        } else {
            format!("{}: ", prefix)
        };
        let directive = if directive.is_empty() {
            String::new()
        } else {
            format!(" # {}", directive)
        };

        let _ = writeln!(
            self.out,
            "not ok {} - {}{}{}",
            self.test_number, prefix, name, directive
        );
        self.test_successful = false;
    }

    fn write_diagnostic(&mut self, diagnostic: &Diagnostic) {
        if let Ok(yaml) = serde_yaml::to_string(diagnostic) {
            let _ = writeln!(self.out, "  ---");
            for line in yaml.lines() {
                let _ = writeln!(self.out, "  {}", line);
            }
            let _ = writeln!(self.out, "  ...");
        }
    }
}

impl<W: Write> TestListener for TapReporter<W> {
    fn start_suite(&mut self, _name: &str) {
        self.suite_level += 1;
    }

    fn end_suite(&mut self, _name: &str) {
        self.suite_level = self.suite_level.saturating_sub(1);

        if self.suite_level == 0 {
            let _ = writeln!(self.out, "1..{}", self.test_number);
        }
    }

    fn start_test(&mut self, _name: &str) {
        self.test_number += 1;
        self.test_successful = true;
    }

    fn end_test(&mut self, name: &str, output: &str) {
        if self.test_successful {
            let _ = writeln!(self.out, "ok {} - {}", self.test_number, name);
        }

        let output = output.trim();
        if !output.is_empty() {
            for line in output.lines() {
                let _ = writeln!(self.out, "# {}", line);
            }
        }
    }

    fn add_error(&mut self, name: &str, message: &str) {
        self.write_not_ok("Error", name, "");
        let first_line = message.lines().next().unwrap_or("");
        self.write_diagnostic(&Diagnostic {
            message: first_line,
            severity: "fail",
            data: None,
        });
    }

    fn add_failure(&mut self, name: &str, detail: &FailureDetail) {
        self.write_not_ok("Failure", name, "");

        let first_line = detail.message.lines().next().unwrap_or("");
        let data = match (&detail.actual, &detail.expected) {
            (Some(actual), Some(expected)) => Some(DiagnosticData {
                got: actual,
                expected,
            }),
            _ => None,
        };
        self.write_diagnostic(&Diagnostic {
            message: first_line,
            severity: "fail",
            data,
        });
    }

    fn add_skipped(&mut self, _name: &str, message: &str) {
        let suffix = if message.is_empty() {
            String::new()
        } else {
            format!(" {}", message)
        };
        let _ = writeln!(self.out, "ok {} - # SKIP{}", self.test_number, suffix);
        self.test_successful = false;
    }

    fn add_incomplete(&mut self, name: &str, _message: &str) {
        self.write_not_ok("", name, "TODO Incomplete Test");
    }
}
