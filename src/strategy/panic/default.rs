use std::{
    any::Any,
    panic::{UnwindSafe, catch_unwind},
};

use crate::{
    capture::{self, CaptureScope},
    outcome::FailureCause,
    panic::TestPanicHandler,
};

/// The default [`TestPanicHandler`] implementation used by the default harness.
///
/// A step fails when it returns an error or panics.
/// The panic message is taken from the payload, the location from the panic
/// hook installed by [`capture::install_panic_hook`] if it is available.
#[derive(Debug, Default, Clone)]
pub struct DefaultPanicHandler;

impl DefaultPanicHandler {
    /// Convert a panic payload into a string.
    ///
    /// This matches the common payload types produced by `panic!` (`&'static str` and `String`).
    /// Other payload types are formatted as a generic placeholder.
    pub fn payload_as_string(err: Box<dyn Any + Send + 'static>) -> String {
        err.downcast::<&'static str>()
            .map(|s| s.to_string())
            .or_else(|err| err.downcast::<String>().map(|s| *s))
            .unwrap_or_else(|_| String::from("Box<dyn Any>"))
    }
}

impl TestPanicHandler for DefaultPanicHandler {
    fn handle<F: FnOnce() -> Result<(), FailureCause> + UnwindSafe>(
        &self,
        f: F,
    ) -> Result<(), FailureCause> {
        capture::clear_last_panic();
        let result = {
            let _scope = CaptureScope::enter();
            catch_unwind(f)
        };

        match result {
            Ok(result) => result,
            Err(payload) => Err(FailureCause::Panicked {
                message: Self::payload_as_string(payload),
                location: capture::take_last_panic().and_then(|record| record.location),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{outcome::Stage, suite::Suite, test_support::*};

    #[test]
    fn handling_panics_works() {
        let suite = Suite::new("panics")
            .test("ok", |_| ())
            .test("panic", |_| if true { panic!("boom") })
            .test("error", |_| Err::<(), _>("bad"))
            .test("assertion", |_| assert_eq!(1 + 1, 3));

        let report = harness(suite)
            .with_panic_handler(DefaultPanicHandler)
            .run();
        let outcomes = &report.suites[0].outcomes;

        assert!(outcomes[0].1.passed());

        let failure = outcomes[1].1.status.failure().expect("panic fails");
        assert_eq!(failure.stage, Stage::Test);
        let FailureCause::Panicked { message, location } = &failure.cause else {
            panic!("expected a panic cause, got {:?}", failure.cause)
        };
        assert_eq!(message, "boom");
        assert!(location.as_ref().is_some_and(|l| l.contains("default.rs")));

        let failure = outcomes[2].1.status.failure().expect("error fails");
        assert_eq!(failure.cause, FailureCause::Error(String::from("\"bad\"")));

        assert!(outcomes[3].1.failed());
    }

    #[test]
    fn payloads_become_strings() {
        assert_eq!(DefaultPanicHandler::payload_as_string(Box::new("static")), "static");
        assert_eq!(
            DefaultPanicHandler::payload_as_string(Box::new(String::from("owned"))),
            "owned"
        );
        assert_eq!(DefaultPanicHandler::payload_as_string(Box::new(7u8)), "Box<dyn Any>");
    }
}
