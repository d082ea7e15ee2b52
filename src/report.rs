use std::{
    borrow::Cow,
    process::{ExitCode, Termination},
    time::Duration,
};

use crate::{
    outcome::{SuiteStatus, TestOutcome},
    reporter::ReportFailure,
};

pub type TestOutcomes = Vec<(Cow<'static, str>, TestOutcome)>;

/// The aggregated result of one suite run.
///
/// `outcomes` holds one entry per declared test, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct SuiteReport {
    pub name: Cow<'static, str>,
    pub status: SuiteStatus,
    pub outcomes: TestOutcomes,
    pub duration: Duration,
}

impl SuiteReport {
    /// Whether no test failed and the suite did not error.
    pub fn passed(&self) -> bool {
        !self.status.errored() && self.outcomes.iter().all(|(_, outcome)| !outcome.failed())
    }

    pub fn errored(&self) -> bool {
        self.status.errored()
    }

    pub fn passed_count(&self) -> usize {
        self.count(TestOutcome::passed)
    }

    pub fn failed_count(&self) -> usize {
        self.count(TestOutcome::failed)
    }

    pub fn skipped_count(&self) -> usize {
        self.count(TestOutcome::skipped)
    }

    pub fn outcome(&self, name: &str) -> Option<&TestOutcome> {
        self.outcomes
            .iter()
            .find(|(test, _)| test == name)
            .map(|(_, outcome)| outcome)
    }

    fn count(&self, predicate: impl Fn(&TestOutcome) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| predicate(outcome))
            .count()
    }
}

/// The result of a whole harness run.
#[derive(Debug)]
#[non_exhaustive]
pub struct RunReport {
    /// One report per suite, in the order the suites were given.
    pub suites: Vec<SuiteReport>,
    pub duration: Duration,
    /// Reporter errors that were swallowed during the run.
    pub report_failures: Vec<ReportFailure>,
}

impl RunReport {
    /// The overall verdict, `false` if any test failed or any suite errored.
    pub fn passed(&self) -> bool {
        self.suites.iter().all(SuiteReport::passed)
    }

    pub fn suite(&self, name: &str) -> Option<&SuiteReport> {
        self.suites.iter().find(|suite| suite.name == name)
    }

    pub fn exit_code(&self) -> ExitCode {
        match self.passed() {
            true => ExitCode::SUCCESS,
            false => ExitCode::FAILURE,
        }
    }
}

impl Termination for RunReport {
    fn report(self) -> ExitCode {
        self.exit_code()
    }
}
