//! A minimal sequential test-suite runner.
//!
//! Suites are ordered lists of tests with optional lifecycle hooks.
//! Tests and hooks are either synchronous or continuation style: an
//! asynchronous step receives a [`Done`](test::Done) handle and the scheduler
//! waits until it is signaled before moving on.
//!
//! ```
//! use asynctest::{harness, reporter::no::NoReporter, suite::Suite};
//!
//! let report = harness(
//!     Suite::new("counter")
//!         .set_up(|ctx| {
//!             ctx.incr("y");
//!         })
//!         .test("first", |ctx| assert_eq!(ctx.count("y"), 1))
//!         .async_test("second", |ctx, done| {
//!             assert_eq!(ctx.count("y"), 2);
//!             std::thread::spawn(move || done.call());
//!         }),
//! )
//! .with_reporter(NoReporter)
//! .run();
//!
//! assert!(report.passed());
//! ```

pub mod capture;
pub mod context;
pub mod notify;
pub mod outcome;
pub mod reporter;
pub mod suite;

mod strategy;
pub use strategy::*;

mod harness;
pub use harness::*;

mod report;
pub use report::*;

mod scheduler;

#[cfg(test)]
mod test_support;
