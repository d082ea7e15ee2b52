use crate::{
    skip::{SkipStatus, TestSkip},
    test::TestMeta,
};

/// Honors the [`SkipStatus`] a test was declared with.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DefaultSkip;

impl TestSkip for DefaultSkip {
    fn skip(&self, meta: &TestMeta) -> SkipStatus {
        meta.skip.clone()
    }
}
