use std::{borrow::Cow, collections::HashMap, fmt::Debug, io};

use thiserror::Error;

use crate::reporter::{SuiteReporter, no::NoReporter, pretty::PrettyReporter, tap::TapReporter};

pub type ReporterFactory = Box<dyn Fn() -> Box<dyn SuiteReporter>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ResolveError {
    #[error("unknown reporter `{0}`")]
    UnknownReporter(String),
}

/// Reporters selectable by name.
///
/// Every resolution creates a fresh reporter, suites never share one.
///
/// The default registry knows these names:
/// - `"pretty"`, `"default"` and `"console"`: [`PrettyReporter`] on stdout
/// - `"tap"`: [`TapReporter`] on stdout
/// - `"none"`: [`NoReporter`]
pub struct ReporterRegistry {
    factories: HashMap<Cow<'static, str>, ReporterFactory>,
}

impl Default for ReporterRegistry {
    fn default() -> Self {
        Self::empty()
            .register("pretty", PrettyReporter::<io::Stdout>::default)
            .register("default", PrettyReporter::<io::Stdout>::default)
            .register("console", PrettyReporter::<io::Stdout>::default)
            .register("tap", TapReporter::<io::Stdout>::default)
            .register("none", || NoReporter)
    }
}

impl ReporterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry without any reporters.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a reporter factory, replacing a previous one with the same name.
    pub fn register<F, R>(mut self, name: impl Into<Cow<'static, str>>, factory: F) -> Self
    where
        F: Fn() -> R + 'static,
        R: SuiteReporter + 'static,
    {
        self.factories.insert(
            name.into(),
            Box::new(move || Box::new(factory()) as Box<dyn SuiteReporter>),
        );
        self
    }

    pub fn resolve(&self, name: &str) -> Result<Box<dyn SuiteReporter>, ResolveError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| ResolveError::UnknownReporter(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.factories.keys().map(|name| name.as_ref()).collect();
        names.sort_unstable();
        names
    }
}

impl Debug for ReporterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReporterRegistry")
            .field("names", &self.names())
            .finish()
    }
}
