//! Delivery token
//!
//! 6-digit numeric secret generated at checkout and shown only to the
//! customer; the courier reads it back at the door. Validation is a plain
//! equality check, so attempts are throttled per order; six digits are
//! brute-forceable otherwise.

use dashmap::DashMap;
use rand::Rng;

use crate::utils::time::now_millis;

/// Attempts allowed per order inside one window
const MAX_ATTEMPTS: u32 = 5;
/// Attempt window (15 minutes)
const WINDOW_MS: i64 = 15 * 60 * 1000;

/// Generate a 6-digit numeric token, zero-padded
pub fn generate() -> String {
    let value: u32 = rand::thread_rng().gen_range(0..=999_999);
    format!("{value:06}")
}

/// In-memory attempt counter per order id
#[derive(Debug, Default)]
pub struct TokenThrottle {
    attempts: DashMap<i64, (u32, i64)>,
}

impl TokenThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an attempt; returns false once the order exhausted its
    /// attempts for the current window.
    pub fn allow(&self, order_id: i64) -> bool {
        self.allow_at(order_id, now_millis())
    }

    fn allow_at(&self, order_id: i64, now: i64) -> bool {
        let mut entry = self.attempts.entry(order_id).or_insert((0, now));
        let (count, window_start) = *entry;
        if now - window_start >= WINDOW_MS {
            *entry = (1, now);
            return true;
        }
        if count >= MAX_ATTEMPTS {
            return false;
        }
        *entry = (count + 1, window_start);
        true
    }
}
