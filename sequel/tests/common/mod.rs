//! Event sources shared by the integration tests.
//!
//! Both sources hand out resolvers through [`sequel::bridge`] and fire them
//! only when the test says so, which keeps every resumption deterministic.

#![allow(dead_code)]

use parking_lot::Mutex;
use sequel::Resolver;

use std::mem;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A single pending resolver, fired by hand.
pub struct Trigger<T> {
    slot: Arc<Mutex<Option<Resolver<T>>>>,
}

impl<T> Clone for Trigger<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T: Send + 'static> Trigger<T> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Suspension point resolved by the next [`fire`](Self::fire).
    pub fn wait(&self) -> impl Future<Output = sequel::Result<T>> + Send + 'static {
        let slot = self.slot.clone();
        sequel::bridge(move |resolver| *slot.lock() = Some(resolver))
    }

    pub fn is_armed(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Resolves the pending bridge, if any. The lock is released first so
    /// the resumed computation may wait on this trigger again.
    pub fn fire(&self, value: T) -> bool {
        let resolver = self.slot.lock().take();

        match resolver {
            Some(resolver) => {
                resolver.resolve(value);
                true
            }
            None => false,
        }
    }

    /// Drops the pending resolver without delivering.
    pub fn abandon(&self) -> bool {
        let resolver = self.slot.lock().take();
        resolver.is_some()
    }
}

/// Timers running on a simulated clock counted in whole seconds.
#[derive(Clone, Default)]
pub struct SimTimers {
    inner: Arc<Mutex<TimerQueue>>,
}

#[derive(Default)]
struct TimerQueue {
    now: u64,
    nodes: Vec<(u64, Resolver<u64>)>,
}

impl SimTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suspends until `secs` simulated seconds have passed, yielding the
    /// simulated time at which the timer fired.
    pub fn sleep(&self, secs: u64) -> impl Future<Output = sequel::Result<u64>> + Send + 'static {
        let inner = self.inner.clone();

        sequel::bridge(move |resolver| {
            let mut queue = inner.lock();
            let deadline = queue.now + secs;
            queue.nodes.push((deadline, resolver));
        })
    }

    pub fn now(&self) -> u64 {
        self.inner.lock().now
    }

    pub fn pending(&self) -> usize {
        self.inner.lock().nodes.len()
    }

    /// Moves the clock forward and fires every due timer, returning how
    /// many fired.
    pub fn advance(&self, secs: u64) -> usize {
        let due = {
            let mut queue = self.inner.lock();
            queue.now += secs;

            let now = queue.now;
            let (due, rest): (Vec<_>, Vec<_>) = mem::take(&mut queue.nodes)
                .into_iter()
                .partition(|(deadline, _)| *deadline <= now);

            queue.nodes = rest;
            due
        };

        let fired = due.len();

        for (deadline, resolver) in due {
            resolver.resolve(deadline);
        }

        fired
    }
}

/// Counts how many times it has been dropped.
pub struct DropProbe {
    drops: Arc<AtomicUsize>,
}

impl DropProbe {
    pub fn new(drops: &Arc<AtomicUsize>) -> Self {
        Self {
            drops: drops.clone(),
        }
    }
}

impl Drop for DropProbe {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}
