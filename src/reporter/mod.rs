//! Reporting of scheduler events.
//!
//! A reporter receives every event of a run as it happens: suites starting,
//! tests starting, passing, failing or being skipped, suites erroring and
//! finishing, and the run itself starting and finishing.
//!
//! All methods of [`SuiteReporter`] have a default implementation that does
//! nothing, so a reporter only implements the events it cares about.
//!
//! Reporters must not influence the run.
//! Errors they return, and panics they raise, are logged and collected in
//! [`RunReport::report_failures`](crate::RunReport::report_failures), the run
//! carries on as if nothing happened.
//!
//! Built in reporters are [`PrettyReporter`](pretty::PrettyReporter),
//! [`TapReporter`](tap::TapReporter) and [`NoReporter`](no::NoReporter).
//! A suite selects one by name through the [`ReporterRegistry`], or brings its
//! own reporter object.

use std::{
    error::Error,
    fmt::Debug,
    panic::{AssertUnwindSafe, catch_unwind},
    time::Duration,
};

use crate::{
    SuiteReport,
    capture::CaptureScope,
    outcome::{Failure, TestOutcome},
    panic::DefaultPanicHandler,
};

pub mod common;
pub mod no;
pub mod pretty;
pub mod tap;

mod registry;
pub use registry::*;

pub type ReportError = Box<dyn Error + Send + Sync + 'static>;
pub type ReportResult = Result<(), ReportError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct RunStart {
    pub suites: usize,
    pub tests: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct SuiteStart<'r> {
    pub name: &'r str,
    pub tests: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct TestStart<'r> {
    pub suite: &'r str,
    pub name: &'r str,
    pub index: usize,
}

/// A test that ran, it either passed or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct TestFinished<'r> {
    pub suite: &'r str,
    pub name: &'r str,
    pub index: usize,
    pub outcome: &'r TestOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct TestSkipped<'r> {
    pub suite: &'r str,
    pub name: &'r str,
    pub index: usize,
    pub reason: Option<&'r str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct SuiteErrored<'r> {
    pub name: &'r str,
    pub failure: &'r Failure,
}

#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct SuiteOutcomes<'r> {
    pub report: &'r SuiteReport,
}

#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct RunOutcomes<'r> {
    pub suites: &'r [SuiteReport],
    pub duration: Duration,
}

pub trait SuiteReporter {
    fn fmt_run_start(&mut self, data: RunStart) -> ReportResult {
        let _ = data;
        Ok(())
    }

    fn fmt_suite_start(&mut self, data: SuiteStart<'_>) -> ReportResult {
        let _ = data;
        Ok(())
    }

    fn fmt_test_start(&mut self, data: TestStart<'_>) -> ReportResult {
        let _ = data;
        Ok(())
    }

    fn fmt_test_outcome(&mut self, data: TestFinished<'_>) -> ReportResult {
        let _ = data;
        Ok(())
    }

    fn fmt_test_skipped(&mut self, data: TestSkipped<'_>) -> ReportResult {
        let _ = data;
        Ok(())
    }

    fn fmt_suite_errored(&mut self, data: SuiteErrored<'_>) -> ReportResult {
        let _ = data;
        Ok(())
    }

    fn fmt_suite_outcomes(&mut self, data: SuiteOutcomes<'_>) -> ReportResult {
        let _ = data;
        Ok(())
    }

    fn fmt_run_outcomes(&mut self, data: RunOutcomes<'_>) -> ReportResult {
        let _ = data;
        Ok(())
    }
}

impl<R: SuiteReporter + ?Sized> SuiteReporter for Box<R> {
    fn fmt_run_start(&mut self, data: RunStart) -> ReportResult {
        (**self).fmt_run_start(data)
    }

    fn fmt_suite_start(&mut self, data: SuiteStart<'_>) -> ReportResult {
        (**self).fmt_suite_start(data)
    }

    fn fmt_test_start(&mut self, data: TestStart<'_>) -> ReportResult {
        (**self).fmt_test_start(data)
    }

    fn fmt_test_outcome(&mut self, data: TestFinished<'_>) -> ReportResult {
        (**self).fmt_test_outcome(data)
    }

    fn fmt_test_skipped(&mut self, data: TestSkipped<'_>) -> ReportResult {
        (**self).fmt_test_skipped(data)
    }

    fn fmt_suite_errored(&mut self, data: SuiteErrored<'_>) -> ReportResult {
        (**self).fmt_suite_errored(data)
    }

    fn fmt_suite_outcomes(&mut self, data: SuiteOutcomes<'_>) -> ReportResult {
        (**self).fmt_suite_outcomes(data)
    }

    fn fmt_run_outcomes(&mut self, data: RunOutcomes<'_>) -> ReportResult {
        (**self).fmt_run_outcomes(data)
    }
}

/// A reporter call that failed, named after the reporter method.
#[derive(Debug)]
#[non_exhaustive]
pub struct ReportFailure {
    pub event: &'static str,
    pub error: ReportError,
}

pub(crate) fn guarded(
    failures: &mut Vec<ReportFailure>,
    event: &'static str,
    f: impl FnOnce() -> ReportResult,
) {
    let result = {
        let _scope = CaptureScope::enter();
        catch_unwind(AssertUnwindSafe(f))
    }
    .unwrap_or_else(|payload| Err(DefaultPanicHandler::payload_as_string(payload).into()));
    if let Err(error) = result {
        tracing::warn!(event, %error, "reporter failed, ignoring");
        failures.push(ReportFailure { event, error });
    }
}

macro_rules! report {
    ($failures:expr, $reporter:ident.$method:ident($data:expr)) => {
        $crate::reporter::guarded($failures, stringify!($method), || {
            $reporter.$method($data)
        })
    };
}

pub(crate) use report;
