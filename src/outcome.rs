use std::{borrow::Cow, fmt::Display, time::Duration};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct TestOutcome {
    pub status: TestStatus,
    pub duration: Duration,
}

impl TestOutcome {
    pub fn passed(&self) -> bool {
        self.status.passed()
    }

    pub fn skipped(&self) -> bool {
        self.status.skipped()
    }

    pub fn failed(&self) -> bool {
        self.status.failed()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TestStatus {
    Passed,
    Skipped { reason: Option<Cow<'static, str>> },
    Failed(Failure),
}

impl TestStatus {
    pub fn passed(&self) -> bool {
        matches!(self, TestStatus::Passed)
    }

    pub fn skipped(&self) -> bool {
        matches!(self, TestStatus::Skipped { .. })
    }

    pub fn failed(&self) -> bool {
        matches!(self, TestStatus::Failed(_))
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            TestStatus::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// The lifecycle stage a failure was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Resolving the reporter of a suite.
    Reporter,
    SetUpSuite,
    SetUp,
    Test,
    TearDown,
    TearDownSuite,
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stage::Reporter => "reporter",
            Stage::SetUpSuite => "set_up_suite",
            Stage::SetUp => "set_up",
            Stage::Test => "test",
            Stage::TearDown => "tear_down",
            Stage::TearDownSuite => "tear_down_suite",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum FailureCause {
    #[error("panicked at {}:\n{message}", .location.as_deref().unwrap_or("<unknown>"))]
    Panicked {
        message: String,
        location: Option<String>,
    },

    #[error("Error: {0}")]
    Error(String),

    #[error("completion handle dropped without being signaled")]
    CompletionDropped,

    #[error("no completion signal within {0:?}")]
    TimedOut(Duration),
}

/// A failure signal caught by the scheduler, together with where it was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub stage: Stage,
    pub cause: FailureCause,
}

impl Failure {
    pub fn new(stage: Stage, cause: FailureCause) -> Self {
        Self { stage, cause }
    }

    pub fn timed_out(&self) -> bool {
        matches!(self.cause, FailureCause::TimedOut(_))
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.stage {
            Stage::Test => write!(f, "{}", self.cause),
            stage => write!(f, "{stage}: {}", self.cause),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum SuiteStatus {
    #[default]
    Ok,
    Errored(Failure),
}

impl SuiteStatus {
    pub fn errored(&self) -> bool {
        matches!(self, SuiteStatus::Errored(_))
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            SuiteStatus::Ok => None,
            SuiteStatus::Errored(failure) => Some(failure),
        }
    }
}
