use std::{
    io,
    time::{Duration, Instant},
};

use crate::{
    RunReport,
    capture,
    notify::{NoNotifier, Notifier, SuiteFinished},
    outcome::{Failure, FailureCause, Stage},
    panic::{DefaultPanicHandler, TestPanicHandler},
    reporter::{
        ReporterRegistry, RunOutcomes, RunStart, SuiteReporter, pretty::PrettyReporter, report,
    },
    scheduler::Scheduler,
    skip::{DefaultSkip, TestSkip},
    suite::{IntoSuites, ReporterChoice, Suite},
};

/// Create a harness running the given suites with the default strategies.
///
/// The default harness renders with a [`PrettyReporter`] on stdout, skips
/// tests marked as skipped, catches panics and does not notify anyone.
pub fn harness<Ctx>(
    suites: impl IntoSuites<Ctx>,
) -> SuiteHarness<Ctx, DefaultSkip, DefaultPanicHandler, PrettyReporter<io::Stdout>, NoNotifier> {
    SuiteHarness {
        suites: suites.into_suites(),
        skip: DefaultSkip,
        panic_handler: DefaultPanicHandler,
        reporter: PrettyReporter::default(),
        notifier: NoNotifier,
        registry: ReporterRegistry::default(),
        timeout: None,
    }
}

/// Runs one or many suites, one after another.
///
/// A harness is configured through its `with_*` methods and consumed by
/// [`run`](SuiteHarness::run).
pub struct SuiteHarness<Ctx, Skip, PanicHandler, Reporter, Notify> {
    pub(crate) suites: Vec<Suite<Ctx>>,
    pub(crate) skip: Skip,
    pub(crate) panic_handler: PanicHandler,
    pub(crate) reporter: Reporter,
    pub(crate) notifier: Notify,
    pub(crate) registry: ReporterRegistry,
    pub(crate) timeout: Option<Duration>,
}

impl<Ctx, Skip, PanicHandler, Reporter, Notify> SuiteHarness<Ctx, Skip, PanicHandler, Reporter, Notify>
where
    Ctx: Default,
    Skip: TestSkip,
    PanicHandler: TestPanicHandler,
    Reporter: SuiteReporter,
    Notify: Notifier,
{
    /// Run every suite in order and collect the results.
    ///
    /// Suite `n + 1` starts only after suite `n` finished its
    /// `tear_down_suite`.
    /// Failing tests and errored suites never stop the run.
    pub fn run(self) -> RunReport {
        capture::install_panic_hook();
        let now = Instant::now();

        let Self {
            suites,
            skip,
            panic_handler,
            mut reporter,
            notifier,
            registry,
            timeout,
        } = self;

        let mut failures = Vec::new();
        report!(
            &mut failures,
            reporter.fmt_run_start(RunStart {
                suites: suites.len(),
                tests: suites.iter().map(Suite::len).sum(),
            })
        );

        let scheduler = Scheduler::new(&skip, &panic_handler, timeout);
        let mut reports = Vec::with_capacity(suites.len());
        for suite in suites {
            let Suite {
                name,
                tests,
                hooks,
                reporter: choice,
                notify,
            } = suite;

            let report = match choice {
                None => scheduler.run_suite(name, tests, hooks, &mut reporter, &mut failures),
                Some(ReporterChoice::Custom(mut own)) => {
                    scheduler.run_suite(name, tests, hooks, &mut *own, &mut failures)
                }
                Some(ReporterChoice::Named(reporter_name)) => {
                    match registry.resolve(&reporter_name) {
                        Ok(mut own) => {
                            scheduler.run_suite(name, tests, hooks, &mut *own, &mut failures)
                        }
                        Err(err) => scheduler.reject_suite(
                            name,
                            tests,
                            Failure::new(Stage::Reporter, FailureCause::Error(err.to_string())),
                            &mut reporter,
                            &mut failures,
                        ),
                    }
                }
            };

            if notify {
                notifier.notify(SuiteFinished {
                    report: report.clone(),
                });
            }
            reports.push(report);
        }

        let duration = now.elapsed();
        report!(
            &mut failures,
            reporter.fmt_run_outcomes(RunOutcomes {
                suites: &reports,
                duration,
            })
        );

        RunReport {
            suites: reports,
            duration,
            report_failures: failures,
        }
    }
}

impl<Ctx, Skip, PanicHandler, Reporter, Notify> SuiteHarness<Ctx, Skip, PanicHandler, Reporter, Notify> {
    pub fn with_skip<WithSkip: TestSkip>(
        self,
        skip: WithSkip,
    ) -> SuiteHarness<Ctx, WithSkip, PanicHandler, Reporter, Notify> {
        SuiteHarness {
            suites: self.suites,
            skip,
            panic_handler: self.panic_handler,
            reporter: self.reporter,
            notifier: self.notifier,
            registry: self.registry,
            timeout: self.timeout,
        }
    }

    pub fn with_panic_handler<WithPanicHandler: TestPanicHandler>(
        self,
        panic_handler: WithPanicHandler,
    ) -> SuiteHarness<Ctx, Skip, WithPanicHandler, Reporter, Notify> {
        SuiteHarness {
            suites: self.suites,
            skip: self.skip,
            panic_handler,
            reporter: self.reporter,
            notifier: self.notifier,
            registry: self.registry,
            timeout: self.timeout,
        }
    }

    /// Set the reporter used for the run itself and for every suite that
    /// does not pick its own.
    pub fn with_reporter<WithReporter: SuiteReporter>(
        self,
        reporter: WithReporter,
    ) -> SuiteHarness<Ctx, Skip, PanicHandler, WithReporter, Notify> {
        SuiteHarness {
            suites: self.suites,
            skip: self.skip,
            panic_handler: self.panic_handler,
            reporter,
            notifier: self.notifier,
            registry: self.registry,
            timeout: self.timeout,
        }
    }

    pub fn with_notifier<WithNotify: Notifier>(
        self,
        notifier: WithNotify,
    ) -> SuiteHarness<Ctx, Skip, PanicHandler, Reporter, WithNotify> {
        SuiteHarness {
            suites: self.suites,
            skip: self.skip,
            panic_handler: self.panic_handler,
            reporter: self.reporter,
            notifier,
            registry: self.registry,
            timeout: self.timeout,
        }
    }

    /// Replace the registry suites resolve reporter names against.
    pub fn with_registry(self, registry: ReporterRegistry) -> Self {
        Self { registry, ..self }
    }

    /// Fail asynchronous steps that do not signal within `timeout`.
    ///
    /// Without a timeout the scheduler waits for as long as the completion
    /// handle is alive.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use crate::{
        context::Fixtures,
        reporter::{
            ReportResult, ReporterRegistry, SuiteReporter, SuiteStart, TestFinished,
            tap::TapReporter,
        },
        suite::Suite,
        test_support::*,
    };

    #[test]
    fn suites_run_in_order() {
        let trace = Rc::new(RefCell::new(Vec::new()));
        let suite = |name: &'static str| {
            let (start, end) = (Rc::clone(&trace), Rc::clone(&trace));
            Suite::new(name)
                .set_up_suite(move |_| start.borrow_mut().push(format!("{name} start")))
                .tear_down_suite(move |_| end.borrow_mut().push(format!("{name} end")))
        };

        let report = harness([suite("first"), suite("second")]).run();

        assert!(report.passed());
        assert_eq!(
            *trace.borrow(),
            ["first start", "first end", "second start", "second end"]
        );
    }

    #[test]
    fn every_suite_gets_a_fresh_context() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let suite = |name: &'static str| {
            let seen = Rc::clone(&seen);
            Suite::new(name).test("count", move |ctx: &mut Fixtures| {
                seen.borrow_mut().push(ctx.incr("runs"));
            })
        };

        harness(vec![suite("a"), suite("b")]).run();
        assert_eq!(*seen.borrow(), [1, 1]);
    }

    #[test]
    fn one_failure_fails_the_run() {
        let report = harness([
            Suite::new("good").test("a", |_| ()),
            Suite::new("bad").test("b", |_| Err::<(), _>("nope")),
        ])
        .run();

        assert!(report.suite("good").is_some_and(|suite| suite.passed()));
        assert!(!report.passed());
        assert_eq!(report.exit_code(), std::process::ExitCode::FAILURE);
    }

    #[test]
    fn suites_pick_their_reporter() {
        let shared = Buffer::default();
        let own = Buffer::default();
        harness([
            Suite::new("shared").test("a", |_| ()),
            Suite::new("own")
                .test("b", |_| ())
                .reporter(TapReporter::default().with_target(own.clone())),
        ])
        .with_reporter(TapReporter::default().with_target(shared.clone()))
        .run();

        assert_eq!(shared.to_string(), "TAP version 13\n# shared\nok 1 - a\n1..1\n");
        assert_eq!(own.to_string(), "TAP version 13\n# own\nok 1 - b\n1..1\n");
    }

    #[test]
    fn unknown_reporters_error_the_suite() {
        let ran = Rc::new(RefCell::new(false));
        let report = harness(
            Suite::new("lost")
                .reporter_name("fancy")
                .set_up_suite({
                    let ran = Rc::clone(&ran);
                    move |_| *ran.borrow_mut() = true
                })
                .test("a", |_| ()),
        )
        .run();

        let suite = &report.suites[0];
        assert!(!*ran.borrow());
        assert_eq!(
            suite.status.failure().map(|f| f.to_string()),
            Some(String::from("reporter: Error: unknown reporter `fancy`"))
        );
        assert!(suite.outcomes[0].1.skipped());
        assert!(!report.passed());
    }

    #[test]
    fn registered_reporters_resolve() {
        let buffer = Buffer::default();
        let registry = ReporterRegistry::empty().register("buffer", {
            let buffer = buffer.clone();
            move || TapReporter::default().with_target(buffer.clone())
        });

        let report = harness(Suite::new("named").reporter_name("buffer").test("a", |_| ()))
            .with_registry(registry)
            .run();

        assert!(report.passed());
        assert!(buffer.to_string().starts_with("TAP version 13\n# named\n"));
    }

    struct Broken;

    impl SuiteReporter for Broken {
        fn fmt_suite_start(&mut self, _: SuiteStart<'_>) -> ReportResult {
            Err("disk full".into())
        }

        fn fmt_test_outcome(&mut self, _: TestFinished<'_>) -> ReportResult {
            panic!("reporter bug")
        }
    }

    #[test]
    fn reporter_failures_do_not_change_the_verdict() {
        let report = harness(Suite::new("reported").test("a", |_| ()))
            .with_reporter(Broken)
            .run();

        assert!(report.passed());
        let events: Vec<_> = report.report_failures.iter().map(|f| f.event).collect();
        assert_eq!(events, ["fmt_suite_start", "fmt_test_outcome"]);
        assert_eq!(report.report_failures[1].error.to_string(), "reporter bug");
    }
}
