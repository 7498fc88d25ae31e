//! Synchronization utilities.

use std::fmt;

pub mod mpmc;

/// An error that may be emitted when attempting to pop a value without
/// waiting.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TryPopError {
    /// The queue was open and empty when the pop was attempted. A later pop
    /// may succeed.
    Empty,
    /// The queue is closed and no more values will be handed out.
    Closed,
}

impl TryPopError {
    /// Returns true if the caller should stop polling the queue.
    ///
    /// This is the case for a closed queue, whereas an empty queue may still
    /// receive values.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TryPopError::Closed)
    }
}

impl fmt::Display for TryPopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TryPopError::Empty => f.write_str("popping from an empty queue"),
            TryPopError::Closed => f.write_str("popping from a closed queue"),
        }
    }
}

impl std::error::Error for TryPopError {}

/// An error that may be emitted when popping a value with a deadline.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PopTimeoutError {
    /// The deadline expired before a value arrived or the queue was closed.
    Timeout,
}

impl fmt::Display for PopTimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopTimeoutError::Timeout => f.write_str("timed out waiting on an empty queue"),
        }
    }
}

impl std::error::Error for PopTimeoutError {}
