//! Counting permit pool bounding the number of frames in flight.
//!
//! The control thread acquires one permit per frame; the permit travels with
//! the submitted work and is released from the GPU completion callback, which
//! may run on any thread.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct Inner {
    available: Mutex<usize>,
    released: Condvar,
    capacity: usize,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, usize> {
        // Counter updates are single writes, so a poisoned value is still consistent.
        self.available.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Thread-safe counting semaphore. Cloning shares the same pool.
#[derive(Debug, Clone)]
pub struct PermitPool {
    inner: Arc<Inner>,
}

/// One unit taken from a [`PermitPool`]; returned to the pool on drop.
#[derive(Debug)]
#[must_use = "dropping a permit releases it immediately"]
pub struct Permit {
    inner: Arc<Inner>,
}

impl PermitPool {
    /// Creates a pool holding `capacity` permits.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                available: Mutex::new(capacity),
                released: Condvar::new(),
                capacity,
            }),
        }
    }

    /// Total permits managed by the pool.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Permits currently available.
    pub fn available(&self) -> usize {
        *self.inner.lock()
    }

    /// Permits currently held by callers (or by pending GPU work).
    pub fn outstanding(&self) -> usize {
        self.inner.capacity - self.available()
    }

    /// Takes a permit, blocking the calling thread until one is released.
    ///
    /// There is no timeout; the caller relies on held permits always being
    /// dropped eventually.
    pub fn acquire(&self) -> Permit {
        let mut available = self.inner.lock();
        while *available == 0 {
            available = self
                .inner
                .released
                .wait(available)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *available -= 1;
        drop(available);

        Permit {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Takes a permit if one is available right now.
    pub fn try_acquire(&self) -> Option<Permit> {
        let mut available = self.inner.lock();
        if *available == 0 {
            return None;
        }
        *available -= 1;
        drop(available);

        Some(Permit {
            inner: Arc::clone(&self.inner),
        })
    }

    /// Takes a permit, calling `pump` between attempts.
    ///
    /// For releasers that only make progress when someone drives them (wgpu
    /// runs completion callbacks from inside `Device::poll`).
    pub fn acquire_with<F>(&self, mut pump: F) -> Permit
    where
        F: FnMut(),
    {
        loop {
            if let Some(permit) = self.try_acquire() {
                return permit;
            }
            pump();
        }
    }
}

impl Drop for Permit {
    fn drop(&mut self) {
        let mut available = self.inner.lock();
        debug_assert!(*available < self.inner.capacity, "permit released twice");
        *available += 1;
        drop(available);
        self.inner.released.notify_one();
    }
}
