//! Counts of live background threads.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Number of live threads of one kind.
///
/// A thread holds a [`LiveGuard`] for its whole lifetime, so the count
/// drops only once the thread has actually exited.
#[derive(Clone, Debug, Default)]
pub struct LiveCount(Arc<AtomicUsize>);

impl LiveCount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub fn enter(&self) -> LiveGuard {
        self.0.fetch_add(1, Ordering::SeqCst);
        LiveGuard(self.0.clone())
    }
}

pub struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
