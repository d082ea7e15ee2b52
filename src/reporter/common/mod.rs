//! Common helpers for reporter implementations.

pub mod color;

/// Split a failure reason into lines, for reporters that prefix every line.
pub fn reason_lines(reason: &str) -> impl Iterator<Item = &str> {
    reason.lines().filter(|line| !line.trim().is_empty())
}
