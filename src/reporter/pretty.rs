//! Human readable reporter, modeled after the output of `cargo test`.

use std::io;

use crate::{
    outcome::TestStatus,
    reporter::{
        common::color::{ColorSetting, SupportsColor, colors::*},
        *,
    },
};

#[derive(Debug)]
pub struct PrettyReporter<W: io::Write> {
    target: W,
    color_setting: ColorSetting,
}

impl Default for PrettyReporter<io::Stdout> {
    fn default() -> Self {
        Self {
            target: io::stdout(),
            color_setting: ColorSetting::default(),
        }
    }
}

impl<W: io::Write> PrettyReporter<W> {
    pub fn with_target<WithTarget: io::Write>(
        self,
        with_target: WithTarget,
    ) -> PrettyReporter<WithTarget> {
        PrettyReporter {
            target: with_target,
            color_setting: self.color_setting,
        }
    }

    pub fn with_color_setting(self, color_setting: impl Into<ColorSetting>) -> Self {
        PrettyReporter {
            color_setting: color_setting.into(),
            ..self
        }
    }

    pub fn into_target(self) -> W {
        self.target
    }
}

impl<W: io::Write + SupportsColor> PrettyReporter<W> {
    /// Return whether this reporter will currently emit colored output.
    pub fn use_color(&self) -> bool {
        self.color_setting.use_color(&self.target)
    }

    fn paint(&mut self, color: &str, text: &str) -> io::Result<()> {
        match self.use_color() {
            true => write!(self.target, "{color}{text}{RESET}"),
            false => write!(self.target, "{text}"),
        }
    }
}

fn plural(count: usize, word: &str) -> String {
    match count {
        1 => format!("1 {word}"),
        count => format!("{count} {word}s"),
    }
}

impl<W: io::Write + SupportsColor> SuiteReporter for PrettyReporter<W> {
    fn fmt_run_start(&mut self, data: RunStart) -> ReportResult {
        writeln!(
            self.target,
            "\nrunning {} ({})",
            plural(data.suites, "suite"),
            plural(data.tests, "test")
        )?;
        Ok(())
    }

    fn fmt_suite_start(&mut self, data: SuiteStart<'_>) -> ReportResult {
        writeln!(
            self.target,
            "\nsuite {}: running {}",
            data.name,
            plural(data.tests, "test")
        )?;
        Ok(())
    }

    fn fmt_test_start(&mut self, data: TestStart<'_>) -> ReportResult {
        write!(self.target, "test {} ... ", data.name)?;
        self.target.flush()?;
        Ok(())
    }

    fn fmt_test_outcome(&mut self, data: TestFinished<'_>) -> ReportResult {
        match data.outcome.status {
            TestStatus::Failed(_) => self.paint(RED, "FAILED")?,
            _ => self.paint(GREEN, "ok")?,
        }
        writeln!(self.target)?;
        Ok(())
    }

    fn fmt_test_skipped(&mut self, data: TestSkipped<'_>) -> ReportResult {
        write!(self.target, "test {} ... ", data.name)?;
        self.paint(YELLOW, "skipped")?;
        match data.reason {
            Some(reason) => writeln!(self.target, ", {reason}")?,
            None => writeln!(self.target)?,
        }
        Ok(())
    }

    fn fmt_suite_errored(&mut self, data: SuiteErrored<'_>) -> ReportResult {
        write!(self.target, "suite {} ", data.name)?;
        self.paint(RED, "ERRORED")?;
        writeln!(self.target, " in {}:", data.failure.stage)?;
        writeln!(self.target, "{}", data.failure.cause)?;
        Ok(())
    }

    fn fmt_suite_outcomes(&mut self, data: SuiteOutcomes<'_>) -> ReportResult {
        let report = data.report;
        let failures: Vec<_> = report
            .outcomes
            .iter()
            .filter_map(|(name, outcome)| Some((name, outcome.status.failure()?)))
            .collect();

        if !failures.is_empty() {
            writeln!(self.target)?;
            writeln!(self.target, "failures:")?;
            writeln!(self.target)?;
            for (name, failure) in failures.iter() {
                writeln!(self.target, "---- {name} ----")?;
                writeln!(self.target, "{failure}")?;
                writeln!(self.target)?;
            }
            writeln!(self.target, "failures:")?;
            for (name, _) in failures.iter() {
                writeln!(self.target, "    {name}")?;
            }
        }

        writeln!(self.target)?;
        write!(self.target, "suite result: ")?;
        match (report.errored(), report.failed_count()) {
            (true, _) => self.paint(RED, "ERRORED")?,
            (false, 0) => self.paint(GREEN, "ok")?,
            (false, _) => self.paint(RED, "FAILED")?,
        }
        writeln!(
            self.target,
            ". {} passed; {} failed; {} skipped; finished in {:.2}s",
            report.passed_count(),
            report.failed_count(),
            report.skipped_count(),
            report.duration.as_secs_f64()
        )?;
        Ok(())
    }

    fn fmt_run_outcomes(&mut self, data: RunOutcomes<'_>) -> ReportResult {
        let (passed, failed, skipped) =
            data.suites
                .iter()
                .fold((0, 0, 0), |(passed, failed, skipped), suite| {
                    (
                        passed + suite.passed_count(),
                        failed + suite.failed_count(),
                        skipped + suite.skipped_count(),
                    )
                });
        let errored = data.suites.iter().filter(|suite| suite.errored()).count();

        writeln!(self.target)?;
        write!(self.target, "test result: ")?;
        match data.suites.iter().all(|suite| suite.passed()) {
            true => self.paint(GREEN, "ok")?,
            false => self.paint(RED, "FAILED")?,
        }
        writeln!(
            self.target,
            ". {passed} passed; {failed} failed; {skipped} skipped; {errored} errored suites; finished in {:.2}s",
            data.duration.as_secs_f64()
        )?;
        writeln!(self.target)?;
        Ok(())
    }
}
