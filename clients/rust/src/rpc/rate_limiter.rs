//! Request throttle for the RPC endpoint.
//!
//! A governor token bucket sized by [`RateLimitConfig`]. When the bucket is
//! empty a request either fails fast with [`StoreError::RateLimited`] or,
//! with `queue_on_limit`, waits for a token as long as fewer than
//! `max_queue_depth` requests are already waiting.

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};

use governor::{
    clock::{Clock, DefaultClock},
    DefaultDirectRateLimiter, Quota, RateLimiter,
};

use crate::config::RateLimitConfig;
use crate::errors::StoreError;

pub struct RpcRateLimiter {
    limiter: DefaultDirectRateLimiter,
    clock: DefaultClock,
    config: RateLimitConfig,
    waiting: AtomicUsize,
}

/// A reserved place in the wait queue, released on drop.
struct QueueSlot<'a>(&'a AtomicUsize);

impl Drop for QueueSlot<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl RpcRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let quota = Quota::per_second(NonZeroU32::new(config.max_rps).unwrap_or(NonZeroU32::MIN))
            .allow_burst(NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN));

        Self {
            limiter: RateLimiter::direct(quota),
            clock: DefaultClock::default(),
            config,
            waiting: AtomicUsize::new(0),
        }
    }

    /// Take one token, waiting for it only if queuing is enabled and the
    /// queue has room.
    pub async fn acquire(&self) -> Result<(), StoreError> {
        let not_until = match self.limiter.check() {
            Ok(()) => return Ok(()),
            Err(not_until) => not_until,
        };
        let retry_after_ms = not_until.wait_time_from(self.clock.now()).as_millis() as u64;

        if !self.config.queue_on_limit {
            return Err(StoreError::RateLimited { retry_after_ms });
        }

        let _slot = self
            .reserve_slot()
            .ok_or(StoreError::RateLimited { retry_after_ms })?;
        tracing::debug!(retry_after_ms, "Waiting for a request slot");
        self.limiter.until_ready().await;
        Ok(())
    }

    fn reserve_slot(&self) -> Option<QueueSlot<'_>> {
        let max = self.config.max_queue_depth;
        self.waiting
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n < max).then_some(n + 1))
            .ok()
            .map(|_| QueueSlot(&self.waiting))
    }

    /// Requests currently waiting for a token.
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::Acquire)
    }
}
