//! Debug-only reentrancy guard.
//!
//! Detects a thread entering the same manager while it is already inside
//! one of its operations, e.g. a `do_range` visitor calling back into the
//! manager. Without the guard that nesting deadlocks on the table lock; in
//! debug builds it panics instead. Other threads entering concurrently are
//! fine. In release builds, this compiles to a zero-cost no-op.

use core::marker::PhantomData;
#[cfg(debug_assertions)]
use parking_lot::Mutex;
#[cfg(debug_assertions)]
use std::thread::{self, ThreadId};

/// Per-instance reentrancy tracker. Embed this next to the guarded state and
/// start public entry-points with `let _g = self.reentrancy.enter();`.
#[derive(Debug)]
pub struct DebugReentrancy {
    // threads currently inside a guarded section
    #[cfg(debug_assertions)]
    active: Mutex<Vec<ThreadId>>,
}

impl DebugReentrancy {
    pub fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Mutex::new(Vec::new()),
        }
    }

    /// Enter a guarded section. Panics if the calling thread is already
    /// inside one on this instance.
    #[cfg(debug_assertions)]
    #[inline]
    pub fn enter(&self) -> ReentrancyGuard<'_> {
        let me = thread::current().id();
        let mut active = self.active.lock();
        assert!(
            !active.contains(&me),
            "reentrancy detected: nested entry into IdManager from the same thread"
        );
        active.push(me);
        ReentrancyGuard {
            owner: self,
            thread: me,
            _nosend: PhantomData,
        }
    }

    /// Enter a guarded section. No-op in release builds.
    #[cfg(not(debug_assertions))]
    #[inline]
    pub fn enter(&self) -> ReentrancyGuard<'_> {
        ReentrancyGuard {
            _z: PhantomData,
            _nosend: PhantomData,
        }
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard returned by `DebugReentrancy::enter`. Tied to the thread that
/// created it.
pub struct ReentrancyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(debug_assertions)]
    thread: ThreadId,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
    _nosend: PhantomData<*mut ()>,
}

impl<'a> Drop for ReentrancyGuard<'a> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            let mut active = self.owner.active.lock();
            if let Some(pos) = active.iter().position(|t| *t == self.thread) {
                active.swap_remove(pos);
            }
        }
    }
}
