//! An unbounded multi-producer, multi-consumer queue.
//!
//! Producers never block. Consumers can block until a value arrives
//! ([`Queue::pop`]), poll ([`Queue::try_pop`]), wait with a deadline
//! ([`Queue::pop_timeout`]) or await ([`Queue::pop_async`]). The owner can
//! close the queue to signal that no more values will be pushed, and wait for
//! consumers to drain it ([`Queue::wait`]).
//!
//! Consumers parked on the same queue are not woken in any particular order.

pub use self::pop::{Pop, PopStream};
pub use self::unbounded::Queue;

mod pop;
mod unbounded;
mod waiters;

/// What happens to buffered values when a queue is closed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ClosePolicy {
    /// Buffered values are dropped when the queue closes. The length drops to
    /// zero and every pop reports the queue as closed right away.
    #[default]
    Abandon,
    /// Buffered values stay available to consumers. Pops report the queue as
    /// closed only once it is empty.
    ///
    /// Closing does not release [`Queue::wait`]: it keeps blocking until
    /// consumers have taken every remaining value, and never returns if none
    /// are left. Use [`Queue::wait_timeout`] to bound it.
    Drain,
}

/// Configures and creates a [`Queue`].
///
/// # Examples
///
/// ```
/// use drainq::sync::mpmc::{Builder, ClosePolicy};
/// let queue = Builder::new()
///     .capacity(64)
///     .close_policy(ClosePolicy::Drain)
///     .build();
/// queue.push(1);
/// queue.close();
/// assert_eq!(Some(1), queue.pop());
/// assert_eq!(None, queue.pop());
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct Builder {
    capacity: usize,
    close_policy: ClosePolicy,
}

impl Builder {
    /// Returns a builder for a queue that abandons buffered values on close.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many values the queue can hold before reallocating. The queue
    /// remains unbounded.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the policy applied to buffered values on close.
    pub fn close_policy(mut self, close_policy: ClosePolicy) -> Self {
        self.close_policy = close_policy;
        self
    }

    /// Creates an open, empty queue.
    pub fn build<T>(self) -> Queue<T> {
        Queue::from_builder(self.capacity, self.close_policy)
    }
}
