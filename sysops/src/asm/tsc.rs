//! TSC (Time Stamp Counter) access.
//!
//! # Safety
//! TSC reads are always safe. Busy-wait accuracy requires an invariant TSC
//! whose frequency the embedder has already calibrated.

/// Read TSC (non-serializing).
#[cfg(target_arch = "x86_64")]
#[inline]
#[allow(unused_unsafe)]
pub fn read_tsc() -> u64 {
    unsafe { core::arch::x86_64::_rdtsc() }
}

/// Stub for non-x86_64 targets.
#[cfg(not(target_arch = "x86_64"))]
#[inline]
pub fn read_tsc() -> u64 {
    0
}

/// Whether [`read_tsc`] reads real hardware on this target.
#[inline]
pub const fn tsc_available() -> bool {
    cfg!(target_arch = "x86_64")
}

/// Convert microseconds to TSC ticks at `tsc_hz`, saturating.
#[inline]
pub fn us_to_ticks(us: u64, tsc_hz: u64) -> u64 {
    let ticks = (us as u128 * tsc_hz as u128) / 1_000_000;
    u64::try_from(ticks).unwrap_or(u64::MAX)
}
