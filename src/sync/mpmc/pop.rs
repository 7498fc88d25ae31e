//! Async consumption of a [`Queue`].

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use futures_util::Stream;

use super::Queue;

impl<T> Queue<T> {
    /// Removes the value at the head of the queue, waiting asynchronously
    /// until one is pushed. Resolves to `None` once the queue is closed and
    /// has nothing left to hand out.
    ///
    /// Dropping the future before it resolves takes nothing from the queue.
    pub fn pop_async(&self) -> Pop<'_, T> {
        Pop {
            queue: self,
            key: None,
        }
    }

    /// Returns a stream of the values popped from the queue, which ends once
    /// the queue is closed and has nothing left to hand out.
    pub fn stream(&self) -> PopStream<'_, T> {
        PopStream {
            queue: self,
            key: None,
        }
    }
}

/// Future returned by [`Queue::pop_async`].
#[must_use = "futures do nothing unless you `.await` or poll them"]
#[derive(Debug)]
pub struct Pop<'a, T> {
    queue: &'a Queue<T>,
    key: Option<u64>,
}

impl<T> Future for Pop<'_, T> {
    type Output = Option<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        this.queue.poll_pop(&mut this.key, cx)
    }
}

impl<T> Drop for Pop<'_, T> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.queue.cancel_pop(key);
        }
    }
}

/// Stream returned by [`Queue::stream`].
#[must_use = "streams do nothing unless polled"]
#[derive(Debug)]
pub struct PopStream<'a, T> {
    queue: &'a Queue<T>,
    key: Option<u64>,
}

impl<T> Stream for PopStream<'_, T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        this.queue.poll_pop(&mut this.key, cx)
    }
}

impl<T> Drop for PopStream<'_, T> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.queue.cancel_pop(key);
        }
    }
}
