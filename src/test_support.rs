use std::{
    fmt::Display,
    io,
    sync::{Arc, LazyLock, Mutex},
};

use regex::Regex;

use crate::{
    SuiteHarness,
    notify::NoNotifier,
    panic::DefaultPanicHandler,
    reporter::{ReporterRegistry, common::color::SupportsColor, no::NoReporter},
    skip::DefaultSkip,
    suite::IntoSuites,
};

/// A silent harness, tests assert on the returned report.
pub fn harness<Ctx>(
    suites: impl IntoSuites<Ctx>,
) -> SuiteHarness<Ctx, DefaultSkip, DefaultPanicHandler, NoReporter, NoNotifier> {
    SuiteHarness {
        suites: suites.into_suites(),
        skip: DefaultSkip,
        panic_handler: DefaultPanicHandler,
        reporter: NoReporter,
        notifier: NoNotifier,
        registry: ReporterRegistry::default(),
        timeout: None,
    }
}

/// Shared in-memory reporter target.
#[derive(Debug, Default, Clone)]
pub struct Buffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::other("poison error"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SupportsColor for Buffer {
    fn supports_color(&self) -> bool {
        false
    }
}

impl Display for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.0.lock().map_err(|_| std::fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&guard))
    }
}

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\.\d{2}s").unwrap());

pub fn sanitize_durations(input: &str) -> String {
    DURATION_RE.replace_all(input, "<duration>").into_owned()
}
