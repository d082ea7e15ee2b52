//! Failure signal handling for suites.
//!
//! Assertions signal failure by panicking, bodies may also return an error.
//! A panic handler executes a single step and turns whatever it signals into a
//! `Result`, so a failing step never unwinds past the scheduler.
//!
//! Implement [`TestPanicHandler`] to change how steps are executed and how
//! panics are turned into a [`FailureCause`].

use std::panic::UnwindSafe;

use crate::outcome::FailureCause;

mod default;
pub use default::*;

/// A strategy for executing a step and translating panics into a [`FailureCause`].
///
/// The scheduler calls the panic handler for every test body and every hook.
/// It has to execute `f`, since that is the actual step.
pub trait TestPanicHandler {
    /// Execute the given step and return how it ended.
    fn handle<F: FnOnce() -> Result<(), FailureCause> + UnwindSafe>(
        &self,
        f: F,
    ) -> Result<(), FailureCause>;
}
