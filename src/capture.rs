//! Panic hook capturing for failure reasons.
//!
//! Once [`install_panic_hook`] ran, every panic records its message and
//! location into a thread local of the panicking thread.
//! Panics raised while the scheduler runs a step on the current thread are not
//! printed, they end up in the failure reason instead.
//! All other panics are forwarded to the hook that was installed before.
//!
//! The hook is installed once per process and never removed.
//! Swapping hooks back and forth races as soon as two harnesses run on
//! different threads, for example inside `cargo test`.

use std::{
    cell::{Cell, RefCell},
    panic,
    sync::Once,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicRecord {
    pub message: String,
    pub location: Option<String>,
}

thread_local! {
    static LAST_PANIC: RefCell<Option<PanicRecord>> = const { RefCell::new(None) };
    static CAPTURING: Cell<bool> = const { Cell::new(false) };
}

static INSTALL: Once = Once::new();

/// Install the recording panic hook, wrapping the current one.
///
/// Calling this more than once has no further effect.
pub fn install_panic_hook() {
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let record = PanicRecord {
                message: info.payload_as_str().unwrap_or("Box<dyn Any>").to_string(),
                location: info.location().map(|location| location.to_string()),
            };
            LAST_PANIC.set(Some(record));

            if !CAPTURING.get() {
                previous(info);
            }
        }));
    });
}

/// The last panic recorded on this thread, if any.
pub fn last_panic() -> Option<PanicRecord> {
    LAST_PANIC.with_borrow(|record| record.clone())
}

pub(crate) fn take_last_panic() -> Option<PanicRecord> {
    LAST_PANIC.take()
}

pub(crate) fn clear_last_panic() {
    LAST_PANIC.set(None);
}

/// Marks the current thread as running a step until dropped.
pub(crate) struct CaptureScope(bool);

impl CaptureScope {
    pub(crate) fn enter() -> Self {
        Self(CAPTURING.replace(true))
    }
}

impl Drop for CaptureScope {
    fn drop(&mut self) {
        CAPTURING.set(self.0);
    }
}
