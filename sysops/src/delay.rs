//! Busy-wait delay.
//!
//! Callers run where suspending is not allowed, so a "sleep" here spins the
//! CPU for the whole duration.

use crate::platform::Platform;

/// Microseconds per millisecond.
const US_PER_MS: u64 = 1000;

/// Spin for at least `msecs` milliseconds.
#[inline]
pub fn busy_wait_ms<P: Platform + ?Sized>(platform: &P, msecs: u32) {
    platform.stall_microseconds((msecs as u64).saturating_mul(US_PER_MS));
}
