//! Suite completion notifications for the embedding environment.
//!
//! Suites created with [`Suite::notify(true)`](crate::suite::Suite::notify)
//! emit a [`SuiteFinished`] notification right after their `tear_down_suite`
//! completed, independent of the reporter and of the final [`RunReport`](crate::RunReport).

use crossbeam_channel::{SendError, Sender};

use crate::SuiteReport;

/// Notification that a suite finished running.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct SuiteFinished {
    pub report: SuiteReport,
}

/// A listener for [`SuiteFinished`] notifications.
pub trait Notifier {
    fn notify(&self, event: SuiteFinished);
}

impl<F> Notifier for F
where
    F: Fn(SuiteFinished),
{
    fn notify(&self, event: SuiteFinished) {
        self(event)
    }
}

/// Forwards notifications into a channel, for listeners on other threads.
#[derive(Debug, Clone)]
pub struct ChannelNotifier(pub Sender<SuiteFinished>);

impl From<Sender<SuiteFinished>> for ChannelNotifier {
    fn from(value: Sender<SuiteFinished>) -> Self {
        Self(value)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, event: SuiteFinished) {
        if let Err(SendError(event)) = self.0.send(event) {
            tracing::debug!(suite = %event.report.name, "nobody listens for suite notifications");
        }
    }
}

/// A [`Notifier`] that drops every notification.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NoNotifier;

impl Notifier for NoNotifier {
    fn notify(&self, event: SuiteFinished) {
        tracing::debug!(suite = %event.report.name, "suite finished, no notifier installed");
    }
}
