// throttle.rs
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::{DefaultDirectRateLimiter, Jitter, Quota, RateLimiter};

use crate::scraper::{CancelToken, TraversalError};

const WAIT_SLICE: Duration = Duration::from_millis(50);

/// Limits outbound site requests: at most `max_in_flight` at once, and
/// consecutive request starts at least `delay` (plus up to half of it as
/// jitter) apart.
pub struct Throttle {
    max_in_flight: usize,
    in_flight: Mutex<usize>,
    freed: Condvar,
    // `None` when requests need no spacing at all.
    limiter: Option<DefaultDirectRateLimiter>,
    clock: DefaultClock,
    jitter: Jitter,
}

/// Holds one in-flight slot until dropped.
#[must_use]
pub struct Permit<'a> {
    throttle: &'a Throttle,
}

impl Throttle {
    pub fn new(max_in_flight: usize, delay: Duration) -> Self {
        Self {
            max_in_flight: max_in_flight.max(1),
            in_flight: Mutex::new(0),
            freed: Condvar::new(),
            limiter: Quota::with_period(delay).map(RateLimiter::direct),
            clock: DefaultClock::default(),
            jitter: Jitter::up_to(delay / 2),
        }
    }

    pub fn acquire(&self, cancel: &CancelToken) -> Result<Permit<'_>, TraversalError> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);

        while *in_flight >= self.max_in_flight {
            if cancel.is_cancelled() {
                return Err(TraversalError::Cancelled);
            }
            in_flight = self
                .freed
                .wait_timeout(in_flight, WAIT_SLICE)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }

        *in_flight += 1;
        drop(in_flight);

        // From here on the slot is ours; the permit gives it back on every path.
        let permit = Permit { throttle: self };

        if let Some(limiter) = &self.limiter {
            while let Err(not_until) = limiter.check() {
                let wait = self.jitter + not_until.wait_time_from(self.clock.now());
                if !cancel.sleep(wait) {
                    return Err(TraversalError::Cancelled);
                }
            }
        }

        Ok(permit)
    }

    fn release(&self) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        *in_flight = in_flight.saturating_sub(1);
        drop(in_flight);
        self.freed.notify_one();
    }

    #[cfg(test)]
    pub fn in_flight(&self) -> usize {
        *self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.throttle.release();
    }
}
