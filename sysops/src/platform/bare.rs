//! Bare-metal platform.
//!
//! For machines where we are the only thing touching hardware: port I/O via
//! `in`/`out`, MMIO via volatile accesses, physical memory reachable at a
//! fixed offset (0 for identity mapping), and a calibrated TSC for delays.
//!
//! # Usage
//!
//! ```ignore
//! use vioscsi_sysops::{BareMetalConfig, BareMetalPlatform, VioScsiSystemOps};
//!
//! let platform = unsafe {
//!     BareMetalPlatform::new(BareMetalConfig {
//!         phys_offset: hhdm_offset,
//!         tsc_hz: calibrated_tsc_hz,
//!         pool_base: Some(pool_ptr),
//!         pool_size: 64 * 1024,
//!     })?
//! };
//! let ops = VioScsiSystemOps::new(platform);
//! ```

use core::hint::spin_loop;
use core::ptr::NonNull;

use dma_pool::BumpArena;
use log::{debug, trace};
use spin::Mutex;

use super::Platform;
use crate::asm::{mmio, pio, tsc};
use crate::error::Result;
use crate::LOG_TARGET;

/// Rounding unit for non-paged pool blocks.
pub const POOL_GRANULARITY: usize = 16;

/// TSC rate assumed when none was calibrated. No shipping part runs its TSC
/// this fast, so waiting this many ticks per microsecond never returns early.
const UNCALIBRATED_TSC_HZ: u64 = 10_000_000_000;

/// Spin iterations per microsecond on targets without a TSC. Approximate:
/// there is no clock to check against.
const FALLBACK_SPINS_PER_US: u64 = 1_000;

/// Highest address in I/O port space.
const MAX_PORT: u64 = 0xFFFF;

/// Bare-metal platform configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct BareMetalConfig {
    /// Virtual = physical + `phys_offset` (0 for identity mapping).
    pub phys_offset: u64,
    /// Calibrated TSC frequency in Hz. 0 waits as if the TSC ran at
    /// `UNCALIBRATED_TSC_HZ`, overshooting rather than returning early.
    pub tsc_hz: u64,
    /// Start of the non-paged pool region, if one was reserved.
    pub pool_base: Option<NonNull<u8>>,
    /// Size of the non-paged pool region in bytes.
    pub pool_size: usize,
}

/// Platform for identity/offset-mapped bare-metal environments.
pub struct BareMetalPlatform {
    phys_offset: u64,
    tsc_hz: u64,
    pool: Mutex<Option<BumpArena>>,
}

impl BareMetalPlatform {
    /// Build the platform.
    ///
    /// # Safety
    ///
    /// If `pool_base` is set, `pool_base..pool_base + pool_size` must be
    /// valid, writable, unshared memory for the platform's lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`SysOpsError::Dma`](crate::SysOpsError::Dma) if the pool
    /// region is empty or not aligned to [`POOL_GRANULARITY`].
    pub unsafe fn new(config: BareMetalConfig) -> Result<Self> {
        let pool = match config.pool_base {
            Some(base) => Some(BumpArena::with_granularity(
                base,
                config.pool_size,
                POOL_GRANULARITY,
            )?),
            None => None,
        };

        Ok(Self {
            phys_offset: config.phys_offset,
            tsc_hz: config.tsc_hz,
            pool: Mutex::new(pool),
        })
    }

    /// Bytes left in the non-paged pool.
    pub fn pool_free_space(&self) -> usize {
        self.pool.lock().as_ref().map_or(0, BumpArena::free_space)
    }
}

impl Platform for BareMetalPlatform {
    unsafe fn port_read8(&self, port: u16) -> u8 {
        pio::inb(port)
    }

    unsafe fn port_read16(&self, port: u16) -> u16 {
        pio::inw(port)
    }

    unsafe fn port_read32(&self, port: u16) -> u32 {
        pio::inl(port)
    }

    unsafe fn port_write8(&self, port: u16, value: u8) {
        pio::outb(port, value)
    }

    unsafe fn port_write16(&self, port: u16, value: u16) {
        pio::outw(port, value)
    }

    unsafe fn port_write32(&self, port: u16, value: u32) {
        pio::outl(port, value)
    }

    unsafe fn register_read8(&self, addr: usize) -> u8 {
        mmio::read8(addr)
    }

    unsafe fn register_read16(&self, addr: usize) -> u16 {
        mmio::read16(addr)
    }

    unsafe fn register_read32(&self, addr: usize) -> u32 {
        mmio::read32(addr)
    }

    unsafe fn register_write8(&self, addr: usize, value: u8) {
        mmio::write8(addr, value)
    }

    unsafe fn register_write16(&self, addr: usize, value: u16) {
        mmio::write16(addr, value)
    }

    unsafe fn register_write32(&self, addr: usize, value: u32) {
        mmio::write32(addr, value)
    }

    fn pool_alloc(&self, size: usize) -> Option<NonNull<u8>> {
        let mut guard = self.pool.lock();
        let arena = guard.as_mut()?;
        match arena.alloc(size) {
            Ok(block) => Some(block),
            Err(err) => {
                debug!(target: LOG_TARGET, "pool_alloc({}) failed: {}", size, err);
                None
            }
        }
    }

    fn physical_address(&self, virt: *const u8) -> Option<u64> {
        if virt.is_null() {
            return None;
        }
        (virt as usize as u64).checked_sub(self.phys_offset)
    }

    fn map_device_base(
        &self,
        bus: u32,
        base_pa: u64,
        length: usize,
        port_space: bool,
    ) -> Option<NonNull<u8>> {
        trace!(
            target: LOG_TARGET,
            "map bus {} base {:#x} len {:#x} {}",
            bus,
            base_pa,
            length,
            if port_space { "io" } else { "mem" }
        );

        let addr = if port_space {
            if base_pa > MAX_PORT {
                return None;
            }
            base_pa
        } else {
            base_pa.checked_add(self.phys_offset)?
        };

        NonNull::new(usize::try_from(addr).ok()? as *mut u8)
    }

    fn stall_microseconds(&self, us: u64) {
        if us == 0 {
            return;
        }

        if tsc::tsc_available() {
            let hz = if self.tsc_hz != 0 {
                self.tsc_hz
            } else {
                UNCALIBRATED_TSC_HZ
            };
            let ticks = tsc::us_to_ticks(us, hz);
            let start = tsc::read_tsc();
            while tsc::read_tsc().wrapping_sub(start) < ticks {
                spin_loop();
            }
        } else {
            for _ in 0..us.saturating_mul(FALLBACK_SPINS_PER_US) {
                spin_loop();
            }
        }
    }
}
