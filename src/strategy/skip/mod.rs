//! Skip handling for suites.
//!
//! Every [`TestMeta`] carries an explicit [`SkipStatus`].
//! A skip strategy decides, right before a test would run, whether it really
//! runs or gets recorded as skipped.
//! Skipped tests never run their body, and neither `set_up` nor `tear_down` is
//! run for them.

use std::borrow::Cow;

use crate::test::TestMeta;

mod default;
pub use default::*;

mod prefix;
pub use prefix::*;

#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub enum SkipStatus {
    #[default]
    Run,
    Skip,
    SkipWithReason(Cow<'static, str>),
}

impl SkipStatus {
    pub fn skipped(&self) -> bool {
        !matches!(self, SkipStatus::Run)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            SkipStatus::SkipWithReason(reason) => Some(reason.as_ref()),
            SkipStatus::Run | SkipStatus::Skip => None,
        }
    }
}

impl From<bool> for SkipStatus {
    fn from(value: bool) -> Self {
        match value {
            true => Self::Skip,
            false => Self::Run,
        }
    }
}

impl From<&'static str> for SkipStatus {
    fn from(value: &'static str) -> Self {
        Self::SkipWithReason(value.into())
    }
}

impl From<String> for SkipStatus {
    fn from(value: String) -> Self {
        Self::SkipWithReason(value.into())
    }
}

/// A strategy deciding whether a test gets skipped.
pub trait TestSkip {
    fn skip(&self, meta: &TestMeta) -> SkipStatus;
}

impl<F> TestSkip for F
where
    F: Fn(&TestMeta) -> SkipStatus,
{
    fn skip(&self, meta: &TestMeta) -> SkipStatus {
        self(meta)
    }
}
