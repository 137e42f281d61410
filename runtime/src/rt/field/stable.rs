//! A boolean that readers may treat as a constant until it changes.
//!
//! Compiled code that folds the current value in holds on to the
//! [`Assumption`] it was given. Every real change of the value invalidates
//! that assumption, and only a real change does: writing the current value
//! again leaves existing speculation intact.

use crate::debug_log;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug)]
pub struct Assumption {
    name: &'static str,
    valid: AtomicBool,
}

impl Assumption {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            valid: AtomicBool::new(true),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    fn invalidate(&self) {
        self.valid.store(false, Ordering::Release);
    }
}

#[derive(Debug)]
pub struct StableBoolean {
    value: AtomicBool,
    generation: AtomicU64,
    unchanged: Mutex<Arc<Assumption>>,
}

impl StableBoolean {
    pub fn new(name: &'static str, initial: bool) -> Self {
        Self {
            value: AtomicBool::new(initial),
            generation: AtomicU64::new(0),
            unchanged: Mutex::new(Arc::new(Assumption::new(name))),
        }
    }

    #[inline]
    pub fn get(&self) -> bool {
        self.value.load(Ordering::Acquire)
    }

    /// The current value together with the assumption that it has not
    /// changed since.
    pub fn speculate(&self) -> StableSnapshot {
        let unchanged = self
            .unchanged
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        StableSnapshot {
            value: self.get(),
            assumption: unchanged.clone(),
        }
    }

    pub fn set(&self, value: bool) {
        let mut unchanged = self
            .unchanged
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.value.load(Ordering::Relaxed) == value {
            return;
        }
        self.value.store(value, Ordering::Release);
        self.generation.fetch_add(1, Ordering::Release);
        let fresh = Arc::new(Assumption::new(unchanged.name));
        let stale = std::mem::replace(&mut *unchanged, fresh);
        stale.invalidate();
        debug_log!("Stable flag '{}' changed to {}", stale.name, value);
    }

    /// Number of real changes so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

/// A value read from a [`StableBoolean`], usable while its assumption holds.
#[derive(Debug, Clone)]
pub struct StableSnapshot {
    value: bool,
    assumption: Arc<Assumption>,
}

impl StableSnapshot {
    pub fn value(&self) -> bool {
        self.value
    }

    pub fn is_valid(&self) -> bool {
        self.assumption.is_valid()
    }

    /// The speculated value while still valid, otherwise a fresh read.
    pub fn read(&self, flag: &StableBoolean) -> bool {
        if self.is_valid() {
            self.value
        } else {
            flag.get()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewriting_the_same_value_keeps_speculation() {
        let flag = StableBoolean::new("test", false);
        let snapshot = flag.speculate();
        flag.set(false);
        assert!(snapshot.is_valid());
        assert_eq!(flag.generation(), 0);
    }

    #[test]
    fn change_invalidates_exactly_the_previous_assumption() {
        let flag = StableBoolean::new("test", false);
        let before = flag.speculate();
        flag.set(true);
        assert!(!before.is_valid());
        assert!(before.read(&flag));

        let after = flag.speculate();
        assert!(after.is_valid());
        assert!(after.value());
        assert_eq!(flag.generation(), 1);

        flag.set(false);
        assert!(!after.is_valid());
        assert_eq!(flag.generation(), 2);
    }
}
