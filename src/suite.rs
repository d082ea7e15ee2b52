//! Suite definitions.
//!
//! A [`Suite`] is a named, ordered list of tests plus optional lifecycle hooks.
//! Tests run in the order they were added.
//!
//! ```
//! use asynctest::suite::Suite;
//!
//! let suite = Suite::new("counter")
//!     .set_up(|ctx| {
//!         ctx.incr("y");
//!     })
//!     .test("first", |ctx| assert_eq!(ctx.count("y"), 1))
//!     .async_test("second", |ctx, done| {
//!         assert_eq!(ctx.count("y"), 2);
//!         std::thread::spawn(move || done.call());
//!     });
//!
//! assert_eq!(suite.len(), 2);
//! ```

use std::{borrow::Cow, fmt::Debug};

use crate::{
    context::Fixtures,
    reporter::SuiteReporter,
    skip::SkipStatus,
    test::{Done, Step, Test, TestMeta, TestResult},
};

pub struct Suite<Ctx = Fixtures> {
    pub(crate) name: Cow<'static, str>,
    pub(crate) tests: Vec<Test<Ctx>>,
    pub(crate) hooks: Hooks<Ctx>,
    pub(crate) reporter: Option<ReporterChoice>,
    pub(crate) notify: bool,
}

/// The lifecycle hooks of a suite.
///
/// `set_up_suite` and `tear_down_suite` run once per suite, `set_up` and
/// `tear_down` once around every test that is not skipped.
pub struct Hooks<Ctx> {
    pub set_up_suite: Option<Step<Ctx>>,
    pub tear_down_suite: Option<Step<Ctx>>,
    pub set_up: Option<Step<Ctx>>,
    pub tear_down: Option<Step<Ctx>>,
}

impl<Ctx> Default for Hooks<Ctx> {
    fn default() -> Self {
        Self {
            set_up_suite: None,
            tear_down_suite: None,
            set_up: None,
            tear_down: None,
        }
    }
}

impl<Ctx> Debug for Hooks<Ctx> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("set_up_suite", &self.set_up_suite)
            .field("tear_down_suite", &self.tear_down_suite)
            .field("set_up", &self.set_up)
            .field("tear_down", &self.tear_down)
            .finish()
    }
}

/// Which reporter renders the events of a suite.
pub enum ReporterChoice {
    /// Resolved against the harness' [`ReporterRegistry`](crate::reporter::ReporterRegistry).
    Named(Cow<'static, str>),
    Custom(Box<dyn SuiteReporter>),
}

impl Debug for ReporterChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Custom(_) => write!(f, "Custom(...)"),
        }
    }
}

impl Suite<Fixtures> {
    /// Create an empty suite using [`Fixtures`] as context.
    ///
    /// Use [`Suite::named`] for other context types.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self::named(name)
    }
}

impl<Ctx> Suite<Ctx> {
    /// Create an empty suite with any context type.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            tests: Vec::new(),
            hooks: Hooks::default(),
            reporter: None,
            notify: false,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    pub fn tests(&self) -> &[Test<Ctx>] {
        &self.tests
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn notifies(&self) -> bool {
        self.notify
    }

    pub fn with_test(mut self, test: Test<Ctx>) -> Self {
        self.tests.push(test);
        self
    }

    pub fn test<F, T>(self, name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: FnMut(&mut Ctx) -> T + 'static,
        T: Into<TestResult>,
    {
        self.with_test(Test::new(Step::sync(f), TestMeta::new(name)))
    }

    pub fn async_test<F>(self, name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: FnMut(&mut Ctx, Done) + 'static,
    {
        self.with_test(Test::new(Step::asynchronous(f), TestMeta::new(name)))
    }

    /// Add a test that is recorded as skipped and never runs.
    pub fn skip<F, T>(self, name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: FnMut(&mut Ctx) -> T + 'static,
        T: Into<TestResult>,
    {
        self.with_test(Test::new(
            Step::sync(f),
            TestMeta::new(name).with_skip(SkipStatus::Skip),
        ))
    }

    pub fn skip_with_reason<F, T>(
        self,
        name: impl Into<Cow<'static, str>>,
        reason: impl Into<Cow<'static, str>>,
        f: F,
    ) -> Self
    where
        F: FnMut(&mut Ctx) -> T + 'static,
        T: Into<TestResult>,
    {
        self.with_test(Test::new(
            Step::sync(f),
            TestMeta::new(name).with_skip(SkipStatus::SkipWithReason(reason.into())),
        ))
    }

    pub fn set_up_suite<F, T>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Ctx) -> T + 'static,
        T: Into<TestResult>,
    {
        self.hooks.set_up_suite = Some(Step::sync(f));
        self
    }

    pub fn async_set_up_suite<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Ctx, Done) + 'static,
    {
        self.hooks.set_up_suite = Some(Step::asynchronous(f));
        self
    }

    pub fn tear_down_suite<F, T>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Ctx) -> T + 'static,
        T: Into<TestResult>,
    {
        self.hooks.tear_down_suite = Some(Step::sync(f));
        self
    }

    pub fn async_tear_down_suite<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Ctx, Done) + 'static,
    {
        self.hooks.tear_down_suite = Some(Step::asynchronous(f));
        self
    }

    pub fn set_up<F, T>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Ctx) -> T + 'static,
        T: Into<TestResult>,
    {
        self.hooks.set_up = Some(Step::sync(f));
        self
    }

    pub fn async_set_up<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Ctx, Done) + 'static,
    {
        self.hooks.set_up = Some(Step::asynchronous(f));
        self
    }

    pub fn tear_down<F, T>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Ctx) -> T + 'static,
        T: Into<TestResult>,
    {
        self.hooks.tear_down = Some(Step::sync(f));
        self
    }

    pub fn async_tear_down<F>(mut self, f: F) -> Self
    where
        F: FnMut(&mut Ctx, Done) + 'static,
    {
        self.hooks.tear_down = Some(Step::asynchronous(f));
        self
    }

    /// Render this suite with the reporter registered under `name`.
    pub fn reporter_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.reporter = Some(ReporterChoice::Named(name.into()));
        self
    }

    /// Render this suite with the given reporter instead of the harness reporter.
    pub fn reporter(mut self, reporter: impl SuiteReporter + 'static) -> Self {
        self.reporter = Some(ReporterChoice::Custom(Box::new(reporter)));
        self
    }

    /// Emit a [`SuiteFinished`](crate::notify::SuiteFinished) notification once
    /// this suite finished.
    pub fn notify(self, notify: bool) -> Self {
        Self { notify, ..self }
    }
}

impl<Ctx> Debug for Suite<Ctx> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Suite")
            .field("name", &self.name)
            .field("tests", &self.tests)
            .field("hooks", &self.hooks)
            .field("reporter", &self.reporter)
            .field("notify", &self.notify)
            .finish()
    }
}

/// Conversion into the ordered list of suites a harness runs.
pub trait IntoSuites<Ctx> {
    fn into_suites(self) -> Vec<Suite<Ctx>>;
}

impl<Ctx> IntoSuites<Ctx> for Suite<Ctx> {
    fn into_suites(self) -> Vec<Suite<Ctx>> {
        vec![self]
    }
}

impl<Ctx> IntoSuites<Ctx> for Vec<Suite<Ctx>> {
    fn into_suites(self) -> Vec<Suite<Ctx>> {
        self
    }
}

impl<Ctx, const N: usize> IntoSuites<Ctx> for [Suite<Ctx>; N] {
    fn into_suites(self) -> Vec<Suite<Ctx>> {
        Vec::from(self)
    }
}
