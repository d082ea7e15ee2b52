use std::borrow::Cow;

use crate::{
    skip::{DefaultSkip, SkipStatus, TestSkip},
    test::TestMeta,
};

/// Skips tests whose name starts with a marker, `!` by default.
///
/// Suites written with the marker convention (`"! not ready yet"`) keep working
/// with this strategy.
/// Tests without the marker fall back to [`DefaultSkip`], so an
/// explicit [`SkipStatus`] is still honored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixSkip {
    marker: Cow<'static, str>,
}

impl Default for PrefixSkip {
    fn default() -> Self {
        Self { marker: "!".into() }
    }
}

impl PrefixSkip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_marker(self, marker: impl Into<Cow<'static, str>>) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

impl TestSkip for PrefixSkip {
    fn skip(&self, meta: &TestMeta) -> SkipStatus {
        match meta.name.starts_with(self.marker.as_ref()) {
            true => SkipStatus::Skip,
            false => DefaultSkip.skip(meta),
        }
    }
}
