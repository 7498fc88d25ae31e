use std::{
    collections::{HashMap, VecDeque},
    task::Waker,
};

/// How many unparked keys may linger in the order queue before it is
/// compacted, at minimum.
const MIN_STALE_BEFORE_COMPACT: usize = 32;

/// Async consumers parked on an empty queue, in registration order.
///
/// Each registration is identified by a key held by the parked future, so a
/// future polled again refreshes its waker instead of registering twice, and a
/// dropped future can tell whether it was already woken. Keys are never
/// reused.
///
/// `order` holds exactly one entry per key in `parked`, plus `stale` entries
/// for keys removed out of order, which are skipped lazily.
#[derive(Debug, Default)]
pub(crate) struct Waiters {
    next_key: u64,
    parked: HashMap<u64, Waker>,
    order: VecDeque<u64>,
    stale: usize,
}

impl Waiters {
    /// Parks the waker, returning the key it is registered under. If `key` is
    /// still parked, its waker is updated in place.
    pub(crate) fn register(&mut self, key: Option<u64>, waker: &Waker) -> u64 {
        if let Some(key) = key {
            if let Some(parked) = self.parked.get_mut(&key) {
                if !parked.will_wake(waker) {
                    *parked = waker.clone();
                }
                return key;
            }
        }
        let key = self.next_key;
        self.next_key += 1;
        self.parked.insert(key, waker.clone());
        self.order.push_back(key);
        key
    }

    /// Unparks the given key. Returns false if it was already woken.
    pub(crate) fn remove(&mut self, key: u64) -> bool {
        if self.parked.remove(&key).is_none() {
            return false;
        }
        self.stale += 1;
        if self.stale >= MIN_STALE_BEFORE_COMPACT && self.stale > self.parked.len() {
            let parked = &self.parked;
            self.order.retain(|key| parked.contains_key(key));
            self.stale = 0;
        }
        true
    }

    /// Unparks the oldest waiter. The caller wakes it once the lock is
    /// released.
    pub(crate) fn take_one(&mut self) -> Option<Waker> {
        while let Some(key) = self.order.pop_front() {
            match self.parked.remove(&key) {
                Some(waker) => return Some(waker),
                None => self.stale -= 1,
            }
        }
        None
    }

    /// Unparks every waiter.
    pub(crate) fn take_all(&mut self) -> Vec<Waker> {
        let parked = &mut self.parked;
        let wakers = self
            .order
            .drain(..)
            .filter_map(|key| parked.remove(&key))
            .collect();
        self.stale = 0;
        wakers
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.parked.len()
    }
}
