//! MMIO (Memory-Mapped I/O) primitives.
//!
//! # Safety
//! - Address must be valid MMIO address
//! - Address must be properly aligned
//! - Address must be mapped with appropriate (uncached) attributes

use core::ptr::{read_volatile, write_volatile};

/// Read 8-bit value from MMIO address.
#[inline]
pub unsafe fn read8(addr: usize) -> u8 {
    read_volatile(addr as *const u8)
}

/// Read 16-bit value from MMIO address.
#[inline]
pub unsafe fn read16(addr: usize) -> u16 {
    read_volatile(addr as *const u16)
}

/// Read 32-bit value from MMIO address.
#[inline]
pub unsafe fn read32(addr: usize) -> u32 {
    read_volatile(addr as *const u32)
}

/// Write 8-bit value to MMIO address.
#[inline]
pub unsafe fn write8(addr: usize, value: u8) {
    write_volatile(addr as *mut u8, value)
}

/// Write 16-bit value to MMIO address.
#[inline]
pub unsafe fn write16(addr: usize, value: u16) {
    write_volatile(addr as *mut u16, value)
}

/// Write 32-bit value to MMIO address.
#[inline]
pub unsafe fn write32(addr: usize, value: u32) {
    write_volatile(addr as *mut u32, value)
}
