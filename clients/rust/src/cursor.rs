//! Next-free-index cursor with snapshot reads.
//!
//! The cursor holds the lowest index known to be unused for the current
//! owner. While frozen, reads return the value captured by [`IndexCursor::freeze`]
//! even though writes keep advancing the live slot; [`IndexCursor::thaw`]
//! makes reads follow the live slot again.
//!
//! ```text
//! cursor.set(3);
//! cursor.freeze();   // reads: 3
//! cursor.set(5);     // reads: 3 (live is 5)
//! cursor.thaw();     // reads: 5
//! ```

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use crate::errors::StoreError;

const UNKNOWN: i64 = -1;

#[derive(Debug)]
pub struct IndexCursor {
    live: AtomicI64,
    frozen: AtomicI64,
    is_frozen: AtomicBool,
}

impl Default for IndexCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexCursor {
    /// A cursor in the UNKNOWN state.
    pub const fn new() -> Self {
        Self {
            live: AtomicI64::new(UNKNOWN),
            frozen: AtomicI64::new(UNKNOWN),
            is_frozen: AtomicBool::new(false),
        }
    }

    /// Current value, or `None` while UNKNOWN.
    pub fn value(&self) -> Option<u64> {
        let raw = if self.is_frozen.load(Ordering::Acquire) {
            self.frozen.load(Ordering::Acquire)
        } else {
            self.live.load(Ordering::Acquire)
        };
        u64::try_from(raw).ok()
    }

    /// The current value, or `SequenceNotInitialized` if no scan has run yet.
    pub fn require_known(&self) -> Result<u64, StoreError> {
        self.value().ok_or(StoreError::SequenceNotInitialized)
    }

    /// Live value, ignoring any frozen snapshot.
    pub fn live_value(&self) -> Option<u64> {
        u64::try_from(self.live.load(Ordering::Acquire)).ok()
    }

    pub fn set(&self, value: u64) {
        self.live.store(value.min(i64::MAX as u64) as i64, Ordering::Release);
    }

    /// Put the live slot back to `value`, or UNKNOWN for `None`.
    pub fn restore(&self, value: Option<u64>) {
        match value {
            Some(v) => self.set(v),
            None => self.live.store(UNKNOWN, Ordering::Release),
        }
    }

    /// Advance the live value by one. No-op while UNKNOWN.
    pub fn increment(&self) {
        let _ = self
            .live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| {
                (v != UNKNOWN).then(|| v.saturating_add(1))
            });
    }

    /// Step the live value back by one, stopping at zero. No-op while UNKNOWN.
    pub fn decrement(&self) {
        let _ = self
            .live
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| {
                (v > 0).then(|| v - 1)
            });
    }

    pub fn freeze(&self) {
        self.frozen
            .store(self.live.load(Ordering::Acquire), Ordering::Release);
        self.is_frozen.store(true, Ordering::Release);
    }

    pub fn thaw(&self) {
        self.is_frozen.store(false, Ordering::Release);
    }

    pub fn is_frozen(&self) -> bool {
        self.is_frozen.load(Ordering::Acquire)
    }

    /// Freeze now and thaw when the guard drops.
    pub fn freeze_guard(&self) -> FreezeGuard<'_> {
        self.freeze();
        FreezeGuard { cursor: self }
    }
}

/// Keeps an [`IndexCursor`] frozen for its lifetime.
#[must_use = "the cursor thaws as soon as the guard is dropped"]
pub struct FreezeGuard<'a> {
    cursor: &'a IndexCursor,
}

impl Drop for FreezeGuard<'_> {
    fn drop(&mut self) {
        self.cursor.thaw();
    }
}
