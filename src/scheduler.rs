//! Sequencing of a single suite.
//!
//! The scheduler walks a suite step by step on the calling thread:
//!
//! 1. `set_up_suite`
//! 2. for every test, in order: `set_up`, the test body, `tear_down`
//! 3. `tear_down_suite`
//!
//! Nothing runs concurrently.
//! An asynchronous step suspends the scheduler until its [`Done`] handle is
//! signaled, dropped, or the optional timeout elapsed.
//! Other threads keep running in the meantime, the scheduler itself does not
//! advance.

use std::{
    borrow::Cow,
    panic::AssertUnwindSafe,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, RecvTimeoutError};

use crate::{
    SuiteReport,
    outcome::{Failure, FailureCause, Stage, SuiteStatus, TestOutcome, TestStatus},
    panic::TestPanicHandler,
    report::TestOutcomes,
    reporter::{
        ReportFailure, SuiteErrored, SuiteOutcomes, SuiteReporter, SuiteStart, TestFinished,
        TestSkipped, TestStart, report,
    },
    skip::{SkipStatus, TestSkip},
    suite::Hooks,
    test::{Done, Step, Test},
};

const SET_UP_SUITE_FAILED: &str = "set_up_suite failed";
const SUITE_ERRORED: &str = "suite errored";

pub(crate) struct Scheduler<'h, Skip, PanicHandler> {
    skip: &'h Skip,
    panic_handler: &'h PanicHandler,
    timeout: Option<Duration>,
}

impl<'h, Skip, PanicHandler> Scheduler<'h, Skip, PanicHandler>
where
    Skip: TestSkip,
    PanicHandler: TestPanicHandler,
{
    pub(crate) fn new(
        skip: &'h Skip,
        panic_handler: &'h PanicHandler,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            skip,
            panic_handler,
            timeout,
        }
    }

    /// Run a whole suite with a fresh context.
    pub(crate) fn run_suite<Ctx: Default>(
        &self,
        name: Cow<'static, str>,
        tests: Vec<Test<Ctx>>,
        mut hooks: Hooks<Ctx>,
        reporter: &mut dyn SuiteReporter,
        failures: &mut Vec<ReportFailure>,
    ) -> SuiteReport {
        let now = Instant::now();
        let suite = name.as_ref();
        tracing::debug!(suite, tests = tests.len(), "starting suite");
        report!(
            failures,
            reporter.fmt_suite_start(SuiteStart {
                name: suite,
                tests: tests.len(),
            })
        );

        let mut status = SuiteStatus::Ok;
        let mut ctx = match self.fresh_context::<Ctx>() {
            Ok(ctx) => Some(ctx),
            Err(failure) => {
                tracing::debug!(suite, %failure, "building the context failed, skipping all tests");
                errored(&mut status, suite, failure, reporter, failures);
                None
            }
        };

        if let Some(ctx) = ctx.as_mut() {
            if let Err(failure) = self.run_hook(&mut hooks.set_up_suite, ctx, Stage::SetUpSuite) {
                tracing::debug!(suite, %failure, "set_up_suite failed, skipping all tests");
                errored(&mut status, suite, failure, reporter, failures);
            }
        }

        let mut outcomes: TestOutcomes = Vec::with_capacity(tests.len());
        for (index, Test { mut step, meta }) in tests.into_iter().enumerate() {
            let skip = match status.errored() {
                true => SkipStatus::SkipWithReason(SET_UP_SUITE_FAILED.into()),
                false => self.skip.skip(&meta),
            };

            let outcome = match (skip, ctx.as_mut()) {
                (SkipStatus::Run, Some(ctx)) => {
                    tracing::debug!(suite, test = %meta.name, "running test");
                    report!(
                        failures,
                        reporter.fmt_test_start(TestStart {
                            suite,
                            name: &meta.name,
                            index,
                        })
                    );
                    let outcome = self.run_test(&mut step, &mut hooks, ctx);
                    report!(
                        failures,
                        reporter.fmt_test_outcome(TestFinished {
                            suite,
                            name: &meta.name,
                            index,
                            outcome: &outcome,
                        })
                    );
                    outcome
                }
                (skip, _) => {
                    let reason = match skip {
                        SkipStatus::SkipWithReason(reason) => Some(reason),
                        _ => None,
                    };
                    report!(
                        failures,
                        reporter.fmt_test_skipped(TestSkipped {
                            suite,
                            name: &meta.name,
                            index,
                            reason: reason.as_deref(),
                        })
                    );
                    TestOutcome {
                        status: TestStatus::Skipped { reason },
                        duration: Duration::ZERO,
                    }
                }
            };

            outcomes.push((meta.name, outcome));
        }

        if let Some(mut ctx) = ctx {
            if let Err(failure) =
                self.run_hook(&mut hooks.tear_down_suite, &mut ctx, Stage::TearDownSuite)
            {
                errored(&mut status, suite, failure, reporter, failures);
            }
            if let Err(failure) = self.drop_context(ctx) {
                errored(&mut status, suite, failure, reporter, failures);
            }
        }

        let report = SuiteReport {
            name,
            status,
            outcomes,
            duration: now.elapsed(),
        };
        tracing::debug!(suite = %report.name, passed = report.passed(), "finished suite");
        report!(failures, reporter.fmt_suite_outcomes(SuiteOutcomes { report: &report }));
        report
    }

    /// Record a suite that can not run at all, none of its hooks or tests run.
    pub(crate) fn reject_suite<Ctx>(
        &self,
        name: Cow<'static, str>,
        tests: Vec<Test<Ctx>>,
        failure: Failure,
        reporter: &mut dyn SuiteReporter,
        failures: &mut Vec<ReportFailure>,
    ) -> SuiteReport {
        let suite = name.as_ref();
        tracing::warn!(suite, %failure, "suite can not run");
        report!(
            failures,
            reporter.fmt_suite_start(SuiteStart {
                name: suite,
                tests: tests.len(),
            })
        );
        report!(
            failures,
            reporter.fmt_suite_errored(SuiteErrored {
                name: suite,
                failure: &failure,
            })
        );

        let mut outcomes: TestOutcomes = Vec::with_capacity(tests.len());
        for (index, test) in tests.into_iter().enumerate() {
            report!(
                failures,
                reporter.fmt_test_skipped(TestSkipped {
                    suite,
                    name: &test.meta.name,
                    index,
                    reason: Some(SUITE_ERRORED),
                })
            );
            let outcome = TestOutcome {
                status: TestStatus::Skipped {
                    reason: Some(SUITE_ERRORED.into()),
                },
                duration: Duration::ZERO,
            };
            outcomes.push((test.meta.name, outcome));
        }

        let report = SuiteReport {
            name,
            status: SuiteStatus::Errored(failure),
            outcomes,
            duration: Duration::ZERO,
        };
        report!(failures, reporter.fmt_suite_outcomes(SuiteOutcomes { report: &report }));
        report
    }

    /// Build the context of a suite, a panicking `Default` errors the suite.
    fn fresh_context<Ctx: Default>(&self) -> Result<Ctx, Failure> {
        let mut slot = None;
        self.panic_handler
            .handle(AssertUnwindSafe(|| {
                slot = Some(Ctx::default());
                Ok(())
            }))
            .map_err(|cause| Failure::new(Stage::SetUpSuite, cause))?;
        slot.ok_or_else(|| {
            Failure::new(
                Stage::SetUpSuite,
                FailureCause::Error(String::from("context was not built")),
            )
        })
    }

    /// Drop the context of a suite, a panicking `Drop` errors the suite.
    fn drop_context<Ctx>(&self, ctx: Ctx) -> Result<(), Failure> {
        self.panic_handler
            .handle(AssertUnwindSafe(move || {
                drop(ctx);
                Ok(())
            }))
            .map_err(|cause| Failure::new(Stage::TearDownSuite, cause))
    }

    /// Run `set_up`, the body and `tear_down` of a single test.
    ///
    /// `tear_down` runs even if `set_up` or the body failed, the body does not
    /// run if `set_up` failed.
    /// The first failure is the one that gets recorded.
    fn run_test<Ctx>(
        &self,
        step: &mut Step<Ctx>,
        hooks: &mut Hooks<Ctx>,
        ctx: &mut Ctx,
    ) -> TestOutcome {
        let set_up = self.run_hook(&mut hooks.set_up, ctx, Stage::SetUp);

        let now = Instant::now();
        let body = set_up.and_then(|()| self.run_step(step, ctx, Stage::Test));
        let duration = now.elapsed();

        let tear_down = self.run_hook(&mut hooks.tear_down, ctx, Stage::TearDown);

        let status = match (body, tear_down) {
            (Ok(()), Ok(())) => TestStatus::Passed,
            (Err(failure), Ok(())) | (Ok(()), Err(failure)) => TestStatus::Failed(failure),
            (Err(failure), Err(later)) => {
                tracing::warn!(%later, "tear_down failed after the test already failed");
                TestStatus::Failed(failure)
            }
        };

        TestOutcome { status, duration }
    }

    fn run_hook<Ctx>(
        &self,
        hook: &mut Option<Step<Ctx>>,
        ctx: &mut Ctx,
        stage: Stage,
    ) -> Result<(), Failure> {
        match hook {
            Some(step) => self.run_step(step, ctx, stage),
            None => Ok(()),
        }
    }

    fn run_step<Ctx>(&self, step: &mut Step<Ctx>, ctx: &mut Ctx, stage: Stage) -> Result<(), Failure> {
        let result = match step {
            Step::Sync(f) => self
                .panic_handler
                .handle(AssertUnwindSafe(|| f(ctx).into_result())),
            Step::Async(f) => {
                let (done, signal) = Done::channel();
                self.panic_handler
                    .handle(AssertUnwindSafe(|| {
                        f(ctx, done);
                        Ok(())
                    }))
                    .and_then(|()| self.await_signal(signal))
            }
        };

        result.map_err(|cause| Failure::new(stage, cause))
    }

    fn await_signal(&self, signal: Receiver<Result<(), FailureCause>>) -> Result<(), FailureCause> {
        match self.timeout {
            None => signal
                .recv()
                .unwrap_or(Err(FailureCause::CompletionDropped)),
            Some(timeout) => match signal.recv_timeout(timeout) {
                Ok(result) => result,
                Err(RecvTimeoutError::Timeout) => Err(FailureCause::TimedOut(timeout)),
                Err(RecvTimeoutError::Disconnected) => Err(FailureCause::CompletionDropped),
            },
        }
    }
}

/// Mark a suite as errored, only the first failure is kept.
fn errored(
    status: &mut SuiteStatus,
    suite: &str,
    failure: Failure,
    reporter: &mut dyn SuiteReporter,
    failures: &mut Vec<ReportFailure>,
) {
    if status.errored() {
        tracing::warn!(suite, %failure, "suite already errored");
        return;
    }
    report!(
        failures,
        reporter.fmt_suite_errored(SuiteErrored {
            name: suite,
            failure: &failure,
        })
    );
    *status = SuiteStatus::Errored(failure);
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc, thread, time::Duration};

    use super::*;
    use crate::{context::Fixtures, suite::Suite, test_support::*};

    type Trace = Rc<RefCell<Vec<String>>>;

    fn push(trace: &Trace, entry: impl Into<String>) {
        trace.borrow_mut().push(entry.into());
    }

    fn traced_suite(trace: &Trace) -> Suite {
        let t = |trace: &Trace, entry: &'static str| {
            let trace = Rc::clone(trace);
            move |_: &mut Fixtures| push(&trace, entry)
        };

        Suite::new("traced")
            .set_up_suite(t(trace, "set_up_suite"))
            .set_up(t(trace, "set_up"))
            .tear_down(t(trace, "tear_down"))
            .tear_down_suite(t(trace, "tear_down_suite"))
    }

    #[test]
    fn hooks_pair_around_every_test() {
        let trace = Trace::default();
        let suite = traced_suite(&trace)
            .test("a", {
                let trace = Rc::clone(&trace);
                move |_| push(&trace, "a")
            })
            .skip("b", {
                let trace = Rc::clone(&trace);
                move |_| push(&trace, "b")
            })
            .test("c", {
                let trace = Rc::clone(&trace);
                move |_| {
                    push(&trace, "c");
                    Err::<(), _>("c failed")
                }
            });

        let report = harness(suite).run();

        assert_eq!(
            *trace.borrow(),
            [
                "set_up_suite",
                "set_up",
                "a",
                "tear_down",
                "set_up",
                "c",
                "tear_down",
                "tear_down_suite"
            ]
        );
        let suite = &report.suites[0];
        assert!(suite.outcomes[0].1.passed());
        assert!(suite.outcomes[1].1.skipped());
        assert!(suite.outcomes[2].1.failed());
        assert!(!suite.errored());
    }

    #[test]
    fn failing_set_up_still_tears_down() {
        let trace = Trace::default();
        let suite = Suite::new("set_up fails")
            .set_up(|ctx| {
                if ctx.incr("runs") == 1 {
                    panic!("first set_up fails");
                }
            })
            .tear_down({
                let trace = Rc::clone(&trace);
                move |_| push(&trace, "tear_down")
            })
            .test("first", {
                let trace = Rc::clone(&trace);
                move |_| push(&trace, "first")
            })
            .test("second", {
                let trace = Rc::clone(&trace);
                move |_| push(&trace, "second")
            });

        let report = harness(suite).run();

        assert_eq!(*trace.borrow(), ["tear_down", "second", "tear_down"]);
        let outcomes = &report.suites[0].outcomes;
        assert_eq!(outcomes[0].1.status.failure().map(|f| f.stage), Some(Stage::SetUp));
        assert!(outcomes[1].1.passed());
    }

    #[test]
    fn failing_tear_down_fails_the_test() {
        let suite = Suite::new("tear_down fails")
            .tear_down(|_| Err::<(), _>("cleanup"))
            .test("a", |_| ())
            .test("b", |_| if true { panic!("body") });

        let report = harness(suite).run();
        let outcomes = &report.suites[0].outcomes;

        assert_eq!(
            outcomes[0].1.status.failure().map(|f| f.stage),
            Some(Stage::TearDown)
        );
        // the body failure wins over the tear_down failure
        assert_eq!(outcomes[1].1.status.failure().map(|f| f.stage), Some(Stage::Test));
    }

    #[test]
    fn failing_set_up_suite_skips_everything() {
        let trace = Trace::default();
        let suite = traced_suite(&trace)
            .set_up_suite(|_| if true { panic!("no database") })
            .test("a", |_| ())
            .test("b", |_| ());

        let report = harness(suite).run();
        let suite = &report.suites[0];

        assert_eq!(*trace.borrow(), ["tear_down_suite"]);
        assert_eq!(
            suite.status.failure().map(|f| f.stage),
            Some(Stage::SetUpSuite)
        );
        assert_eq!(suite.outcomes.len(), 2);
        assert!(suite.outcomes.iter().all(|(_, outcome)| outcome.skipped()));
        assert!(!report.passed());
    }

    #[test]
    fn failing_tear_down_suite_errors_the_suite() {
        let suite = Suite::new("tear_down_suite fails")
            .tear_down_suite(|_| Err::<(), _>("leak"))
            .test("a", |_| ());

        let report = harness(suite).run();
        let suite = &report.suites[0];

        assert!(suite.outcomes[0].1.passed());
        assert_eq!(
            suite.status.failure().map(|f| f.stage),
            Some(Stage::TearDownSuite)
        );
        assert!(!report.passed());
    }

    #[test]
    fn tear_down_suite_runs_last_when_every_test_fails() {
        let trace = Trace::default();
        let suite = traced_suite(&trace)
            .test("x", {
                let trace = Rc::clone(&trace);
                move |_| {
                    push(&trace, "x");
                    Err::<(), _>("x failed")
                }
            })
            .test("y", {
                let trace = Rc::clone(&trace);
                move |_| {
                    push(&trace, "y");
                    if true {
                        panic!("y failed");
                    }
                }
            });

        let report = harness(suite).run();
        let suite = &report.suites[0];

        assert_eq!(
            *trace.borrow(),
            [
                "set_up_suite",
                "set_up",
                "x",
                "tear_down",
                "set_up",
                "y",
                "tear_down",
                "tear_down_suite"
            ]
        );
        assert!(suite.outcomes.iter().all(|(_, outcome)| outcome.failed()));
        assert!(!suite.errored());
    }

    #[test]
    fn panicking_context_default_errors_the_suite() {
        struct Unbuildable;

        impl Default for Unbuildable {
            fn default() -> Self {
                panic!("no context today")
            }
        }

        let calls = Rc::new(RefCell::new(0));
        let counted = {
            let calls = Rc::clone(&calls);
            move |_: &mut Unbuildable| *calls.borrow_mut() += 1
        };
        let report = harness([
            Suite::<Unbuildable>::named("first")
                .set_up_suite(counted.clone())
                .tear_down_suite(counted.clone())
                .test("a", counted.clone()),
            Suite::<Unbuildable>::named("second").test("b", counted),
        ])
        .run();

        assert_eq!(report.suites.len(), 2);
        for suite in &report.suites {
            let failure = suite.status.failure().expect("suite errored");
            assert_eq!(failure.stage, Stage::SetUpSuite);
            assert!(matches!(
                &failure.cause,
                FailureCause::Panicked { message, .. } if message == "no context today"
            ));
            assert!(suite.outcomes[0].1.skipped());
        }
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn panicking_context_drop_errors_the_suite() {
        #[derive(Default)]
        struct Armed(bool);

        impl Drop for Armed {
            fn drop(&mut self) {
                if self.0 {
                    panic!("dropped while armed");
                }
            }
        }

        let report = harness([
            Suite::<Armed>::named("armed").test("arm", |ctx| ctx.0 = true),
            Suite::<Armed>::named("disarmed").test("idle", |_| ()),
        ])
        .run();

        let armed = &report.suites[0];
        assert!(armed.outcomes[0].1.passed());
        assert_eq!(
            armed.status.failure().map(|f| f.stage),
            Some(Stage::TearDownSuite)
        );
        assert!(report.suites[1].passed());
        assert!(!report.passed());
    }

    #[test]
    fn async_steps_wait_for_their_signal() {
        let trace = Trace::default();
        let suite = traced_suite(&trace).async_test("slow", {
            let trace = Rc::clone(&trace);
            move |_, done| {
                push(&trace, "slow started");
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(50));
                    done.call();
                });
                push(&trace, "slow returned");
            }
        });

        let report = harness(suite).run();

        assert!(report.passed());
        assert_eq!(
            *trace.borrow(),
            [
                "set_up_suite",
                "set_up",
                "slow started",
                "slow returned",
                "tear_down",
                "tear_down_suite"
            ]
        );
        assert!(report.suites[0].outcomes[0].1.duration >= Duration::from_millis(50));
    }

    #[test]
    fn async_hooks_wait_too() {
        let suite = Suite::new("async hooks")
            .async_set_up(|ctx, done| {
                ctx.set("ready", false);
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(10));
                    done.call();
                });
            })
            .test("after set_up", |ctx| {
                assert_eq!(ctx.get::<bool>("ready"), Some(&false));
            })
            .async_tear_down_suite(|_, done| done.fail("tear_down_suite gave up"));

        let report = harness(suite).run();
        let suite = &report.suites[0];

        assert!(suite.outcomes[0].1.passed());
        assert_eq!(
            suite.status.failure().map(|f| &f.cause),
            Some(&FailureCause::Error(String::from("tear_down_suite gave up")))
        );
    }

    #[test]
    fn dropped_done_fails() {
        let suite = Suite::new("dropped")
            .async_test("forgot", |_, done| drop(done))
            .async_test("helper panicked", |_, done| {
                let _ = thread::spawn(move || {
                    let _done = done;
                    panic!("helper gave up");
                })
                .join();
            });

        let report = harness(suite).run();
        let outcomes = &report.suites[0].outcomes;

        assert_eq!(
            outcomes[0].1.status.failure().map(|f| &f.cause),
            Some(&FailureCause::CompletionDropped)
        );
        let Some(FailureCause::Panicked { message, .. }) =
            outcomes[1].1.status.failure().map(|f| &f.cause)
        else {
            panic!("expected a panic, got {:?}", outcomes[1].1.status)
        };
        assert_eq!(message, "helper gave up");
    }

    #[test]
    fn panics_before_signaling_fail() {
        let suite = Suite::new("early panic").async_test("boom", |_, done| {
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                done.call();
            });
            panic!("boom");
        });

        let report = harness(suite).run();
        let failure = report.suites[0].outcomes[0].1.status.failure().cloned();
        assert!(matches!(
            failure,
            Some(Failure {
                stage: Stage::Test,
                cause: FailureCause::Panicked { .. }
            })
        ));
    }

    #[test]
    fn timeouts_fail_stalled_steps() {
        let (keep, _alive) = crossbeam_channel::bounded::<Done>(1);
        let suite = Suite::new("stalled")
            .async_test("never signals", move |_, done| {
                keep.send(done).expect("room for one handle");
            })
            .test("still runs", |_| ());

        let report = harness(suite)
            .with_timeout(Duration::from_millis(20))
            .run();
        let outcomes = &report.suites[0].outcomes;

        assert!(outcomes[0].1.status.failure().is_some_and(Failure::timed_out));
        assert!(outcomes[1].1.passed());
    }
}
