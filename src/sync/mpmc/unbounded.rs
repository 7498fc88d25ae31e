//! The unbounded queue and its synchronous operations.

use std::{
    collections::VecDeque,
    fmt, mem,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Condvar, Mutex, MutexGuard, PoisonError,
    },
    task::{Context, Poll},
    time::Duration,
};

use super::{waiters::Waiters, Builder, ClosePolicy};
use crate::sync::{PopTimeoutError, TryPopError};

/// The state guarded by the queue's lock.
#[derive(Debug)]
struct State<T> {
    buffer: VecDeque<T>,
    closed: bool,
    waiters: Waiters,
}

impl<T> State<T> {
    /// Returns true while a consumer has to wait: nothing to take and the
    /// queue may still receive values.
    fn must_wait(&self) -> bool {
        self.buffer.is_empty() && !self.closed
    }
}

/// An unbounded, multi-producer, multi-consumer FIFO queue.
///
/// The queue is shared by reference, usually behind an [`Arc`]. Values are
/// handed out in the order they were pushed. Once closed, a queue stays
/// closed: further pushes are dropped and consumers are never blocked again.
///
/// [`Arc`]: std::sync::Arc
pub struct Queue<T> {
    state: Mutex<State<T>>,
    /// Signaled when a value is pushed or the queue is closed.
    not_empty: Condvar,
    /// Signaled when the buffer becomes empty or the queue is closed.
    drained: Condvar,
    /// Mirrors `buffer.len()`. Only written while holding the lock.
    count: AtomicUsize,
    /// Mirrors `State::closed`. Only written while holding the lock.
    closed: AtomicBool,
    policy: ClosePolicy,
}

impl<T> Queue<T> {
    /// Creates an open, empty queue that abandons buffered values on close.
    ///
    /// # Examples
    ///
    /// ```
    /// use drainq::sync::mpmc::Queue;
    /// let queue = Queue::<u64>::new();
    /// assert!(queue.is_empty());
    /// assert!(!queue.is_closed());
    /// ```
    pub fn new() -> Self {
        Builder::default().build()
    }

    /// Creates an open, empty queue with room for at least `capacity` values
    /// before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Builder::default().capacity(capacity).build()
    }

    pub(super) fn from_builder(capacity: usize, policy: ClosePolicy) -> Self {
        Self {
            state: Mutex::new(State {
                buffer: VecDeque::with_capacity(capacity),
                closed: false,
                waiters: Waiters::default(),
            }),
            not_empty: Condvar::new(),
            drained: Condvar::new(),
            count: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
            policy,
        }
    }

    /// Returns the number of values in the queue.
    ///
    /// The length is read without taking the lock, so it may lag behind a
    /// concurrent push or pop.
    #[inline]
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Returns true if the queue is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the queue has been closed.
    ///
    /// This is a snapshot read without the lock; a concurrent close may not be
    /// observed yet.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Returns the policy applied to buffered values on close.
    pub fn close_policy(&self) -> ClosePolicy {
        self.policy
    }

    /// Pushes a value onto the queue. Never blocks.
    ///
    /// If the queue is closed the value is dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use drainq::sync::mpmc::Queue;
    /// let queue = Queue::new();
    /// queue.push(10);
    /// assert_eq!(1, queue.len());
    /// queue.close();
    /// queue.push(11);
    /// assert_eq!(0, queue.len());
    /// ```
    pub fn push(&self, val: T) {
        let mut state = self.lock();
        if state.closed {
            drop(state);
            tracing::trace!("dropped value pushed to a closed queue");
            return;
        }
        state.buffer.push_back(val);
        self.count.fetch_add(1, Ordering::Release);
        self.not_empty.notify_one();
        let waker = state.waiters.take_one();
        drop(state);
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// Removes the value at the head of the queue, blocking until one is
    /// pushed. Returns `None` once the queue is closed and has nothing left to
    /// hand out.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::{sync::Arc, thread};
    /// use drainq::sync::mpmc::Queue;
    /// let queue = Arc::new(Queue::new());
    /// let producer = {
    ///     let queue = queue.clone();
    ///     thread::spawn(move || queue.push(10))
    /// };
    /// assert_eq!(Some(10), queue.pop());
    /// producer.join().unwrap();
    /// ```
    pub fn pop(&self) -> Option<T> {
        let state = self.lock();
        let mut state = self
            .not_empty
            .wait_while(state, |state| state.must_wait())
            .unwrap_or_else(PoisonError::into_inner);
        self.take(&mut state)
    }

    /// Attempts to remove the value at the head of the queue without blocking.
    ///
    /// Returns [`TryPopError::Empty`] if the queue is open but empty, and
    /// [`TryPopError::Closed`] if the queue is closed and has nothing left to
    /// hand out.
    ///
    /// # Examples
    ///
    /// ```
    /// use drainq::sync::{mpmc::Queue, TryPopError};
    /// let queue = Queue::new();
    /// assert_eq!(Err(TryPopError::Empty), queue.try_pop());
    /// queue.push(10);
    /// assert_eq!(Ok(10), queue.try_pop());
    /// queue.close();
    /// assert_eq!(Err(TryPopError::Closed), queue.try_pop());
    /// ```
    pub fn try_pop(&self) -> Result<T, TryPopError> {
        let mut state = self.lock();
        match self.take(&mut state) {
            Some(val) => Ok(val),
            None if state.closed => Err(TryPopError::Closed),
            None => Err(TryPopError::Empty),
        }
    }

    /// Removes the value at the head of the queue, blocking for at most
    /// `timeout` until one is pushed.
    ///
    /// Returns `Ok(None)` if the queue is closed and has nothing left to hand
    /// out. A call that times out takes nothing from the queue.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use drainq::sync::{mpmc::Queue, PopTimeoutError};
    /// let queue = Queue::<u64>::new();
    /// assert_eq!(
    ///     Err(PopTimeoutError::Timeout),
    ///     queue.pop_timeout(Duration::from_millis(1))
    /// );
    /// ```
    pub fn pop_timeout(&self, timeout: Duration) -> Result<Option<T>, PopTimeoutError> {
        let state = self.lock();
        let (mut state, _) = self
            .not_empty
            .wait_timeout_while(state, timeout, |state| state.must_wait())
            .unwrap_or_else(PoisonError::into_inner);
        if state.must_wait() {
            drop(state);
            tracing::trace!("timed out after {timeout:?} waiting on an empty queue");
            return Err(PopTimeoutError::Timeout);
        }
        Ok(self.take(&mut state))
    }

    /// Closes the queue. Closing an already closed queue does nothing.
    ///
    /// Every blocked consumer is woken. Under [`ClosePolicy::Abandon`] the
    /// buffered values are dropped and the length becomes zero; under
    /// [`ClosePolicy::Drain`] they remain available to consumers.
    pub fn close(&self) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        self.closed.store(true, Ordering::Release);
        let abandoned = match self.policy {
            ClosePolicy::Abandon => {
                self.count.store(0, Ordering::Release);
                mem::take(&mut state.buffer)
            }
            ClosePolicy::Drain => VecDeque::new(),
        };
        self.not_empty.notify_all();
        self.drained.notify_all();
        let wakers = state.waiters.take_all();
        drop(state);
        tracing::debug!(
            "closed queue, policy={:?}, abandoned={}",
            self.policy,
            abandoned.len()
        );
        wakers.into_iter().for_each(|waker| waker.wake());
    }

    /// Blocks until the queue is empty, without closing it.
    ///
    /// Under [`ClosePolicy::Abandon`] a closed queue is always empty, so this
    /// returns as soon as the queue is closed. Under [`ClosePolicy::Drain`] it
    /// returns once consumers have taken every remaining value.
    pub fn wait(&self) {
        let state = self.lock();
        let _state = self
            .drained
            .wait_while(state, |state| !state.buffer.is_empty())
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Blocks for at most `timeout` until the queue is empty. Returns true if
    /// the queue drained in time.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let state = self.lock();
        let (state, _) = self
            .drained
            .wait_timeout_while(state, timeout, |state| !state.buffer.is_empty())
            .unwrap_or_else(PoisonError::into_inner);
        state.buffer.is_empty()
    }

    /// Polls for the value at the head of the queue on behalf of an async
    /// consumer registered under `key`.
    pub(super) fn poll_pop(&self, key: &mut Option<u64>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        let mut state = self.lock();
        if state.must_wait() {
            *key = Some(state.waiters.register(key.take(), cx.waker()));
            return Poll::Pending;
        }
        if let Some(key) = key.take() {
            state.waiters.remove(key);
        }
        Poll::Ready(self.take(&mut state))
    }

    /// Unregisters an async consumer that is going away. If it was already
    /// woken for a value it will never take, the wakeup goes to someone else.
    pub(super) fn cancel_pop(&self, key: u64) {
        let mut state = self.lock();
        if state.waiters.remove(key) || state.buffer.is_empty() {
            return;
        }
        self.not_empty.notify_one();
        let waker = state.waiters.take_one();
        drop(state);
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// Removes the head of the buffer, keeping `count` in step with it.
    fn take(&self, state: &mut State<T>) -> Option<T> {
        let val = state.buffer.pop_front()?;
        if self.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.drained.notify_all();
        }
        Some(val)
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        // Values are only dropped outside the lock, so a poisoned state is
        // still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("len", &self.len())
            .field("closed", &self.is_closed())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
