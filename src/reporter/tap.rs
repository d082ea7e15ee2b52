//! [Test Anything Protocol](https://testanything.org) reporter.
//!
//! Every suite becomes its own TAP version 13 document:
//!
//! ```text
//! TAP version 13
//! # Minimal Test
//! ok 1 - it should execute this test
//! ok 2 - it should NOT execute this test # SKIP
//! not ok 3 - it should be aware of the correct context
//! # panicked at src/main.rs:12:9:
//! # assertion failed: ctx.contains("x")
//! 1..3
//! ```
//!
//! An errored suite adds a failing test point named after the failed hook.
//! The plan is written at the end of the suite, once the number of test points
//! is known.

use std::io;

use crate::{
    outcome::{Failure, TestStatus},
    reporter::{common::reason_lines, *},
};

#[derive(Debug)]
pub struct TapReporter<W: io::Write> {
    target: W,
    points: usize,
}

impl Default for TapReporter<io::Stdout> {
    fn default() -> Self {
        Self {
            target: io::stdout(),
            points: 0,
        }
    }
}

impl<W: io::Write> TapReporter<W> {
    pub fn with_target<WithTarget: io::Write>(
        self,
        with_target: WithTarget,
    ) -> TapReporter<WithTarget> {
        TapReporter {
            target: with_target,
            points: self.points,
        }
    }

    pub fn into_target(self) -> W {
        self.target
    }

    fn point(&mut self, ok: bool, description: &str) -> io::Result<usize> {
        self.points += 1;
        let description = escape(description);
        match ok {
            true => write!(self.target, "ok {} - {description}", self.points)?,
            false => write!(self.target, "not ok {} - {description}", self.points)?,
        }
        Ok(self.points)
    }

    fn diagnostics(&mut self, failure: &Failure) -> io::Result<()> {
        for line in reason_lines(&failure.to_string()) {
            writeln!(self.target, "# {line}")?;
        }
        Ok(())
    }
}

/// `#` starts a directive in a description, it has to be escaped.
fn escape(description: &str) -> String {
    single_line(description)
        .replace('\\', "\\\\")
        .replace('#', "\\#")
}

/// A line break would end the TAP line early.
fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

impl<W: io::Write> SuiteReporter for TapReporter<W> {
    fn fmt_suite_start(&mut self, data: SuiteStart<'_>) -> ReportResult {
        self.points = 0;
        writeln!(self.target, "TAP version 13")?;
        writeln!(self.target, "# {}", single_line(data.name))?;
        Ok(())
    }

    fn fmt_test_outcome(&mut self, data: TestFinished<'_>) -> ReportResult {
        match &data.outcome.status {
            TestStatus::Failed(failure) => {
                self.point(false, data.name)?;
                writeln!(self.target)?;
                self.diagnostics(failure)?;
            }
            _ => {
                self.point(true, data.name)?;
                writeln!(self.target)?;
            }
        }
        Ok(())
    }

    fn fmt_test_skipped(&mut self, data: TestSkipped<'_>) -> ReportResult {
        self.point(true, data.name)?;
        match data.reason {
            Some(reason) => writeln!(self.target, " # SKIP {}", single_line(reason))?,
            None => writeln!(self.target, " # SKIP")?,
        }
        Ok(())
    }

    fn fmt_suite_errored(&mut self, data: SuiteErrored<'_>) -> ReportResult {
        self.point(false, &data.failure.stage.to_string())?;
        writeln!(self.target)?;
        self.diagnostics(data.failure)?;
        Ok(())
    }

    fn fmt_suite_outcomes(&mut self, _: SuiteOutcomes<'_>) -> ReportResult {
        writeln!(self.target, "1..{}", self.points)?;
        self.target.flush()?;
        Ok(())
    }
}
