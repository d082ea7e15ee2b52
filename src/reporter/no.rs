use crate::reporter::SuiteReporter;

/// A reporter that produces no output.
///
/// Every event is discarded.
/// Useful when only the returned [`RunReport`](crate::RunReport) matters, for
/// example in tests of code built on top of this crate or when the embedding
/// system does its own reporting.
#[derive(Debug, Default, Clone)]
pub struct NoReporter;

impl SuiteReporter for NoReporter {}
