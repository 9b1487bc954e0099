//! Register access dispatch.
//!
//! The low 64 KiB of the address space is never used for device mappings, so
//! the address alone tells port I/O and MMIO apart: anything that fits in 16
//! bits is a port, anything else is a mapped register. No mode flag is kept.

use crate::platform::Platform;

/// Bits an address may carry and still be a port number.
pub const PORT_MASK: usize = 0xFFFF;

/// Which access primitive an address resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterSpace {
    /// I/O port number.
    Port(u16),
    /// Mapped register address.
    Memory(usize),
}

impl RegisterSpace {
    /// Classify an address.
    #[inline]
    pub const fn classify(addr: usize) -> Self {
        if addr & !PORT_MASK == 0 {
            RegisterSpace::Port(addr as u16)
        } else {
            RegisterSpace::Memory(addr)
        }
    }
}

/// Whether `addr` is routed to port I/O.
#[inline]
pub const fn is_port_space(addr: usize) -> bool {
    addr & !PORT_MASK == 0
}

/// Read 8 bits from a device register.
///
/// # Safety
///
/// `addr` must be a port or mapped register owned by this driver.
#[inline]
pub unsafe fn read8<P: Platform + ?Sized>(platform: &P, addr: usize) -> u8 {
    match RegisterSpace::classify(addr) {
        RegisterSpace::Port(port) => platform.port_read8(port),
        RegisterSpace::Memory(reg) => platform.register_read8(reg),
    }
}

/// Read 16 bits from a device register.
///
/// # Safety
///
/// See [`read8`].
#[inline]
pub unsafe fn read16<P: Platform + ?Sized>(platform: &P, addr: usize) -> u16 {
    match RegisterSpace::classify(addr) {
        RegisterSpace::Port(port) => platform.port_read16(port),
        RegisterSpace::Memory(reg) => platform.register_read16(reg),
    }
}

/// Read 32 bits from a device register.
///
/// # Safety
///
/// See [`read8`].
#[inline]
pub unsafe fn read32<P: Platform + ?Sized>(platform: &P, addr: usize) -> u32 {
    match RegisterSpace::classify(addr) {
        RegisterSpace::Port(port) => platform.port_read32(port),
        RegisterSpace::Memory(reg) => platform.register_read32(reg),
    }
}

/// Write 8 bits to a device register.
///
/// # Safety
///
/// See [`read8`].
#[inline]
pub unsafe fn write8<P: Platform + ?Sized>(platform: &P, addr: usize, value: u8) {
    match RegisterSpace::classify(addr) {
        RegisterSpace::Port(port) => platform.port_write8(port, value),
        RegisterSpace::Memory(reg) => platform.register_write8(reg, value),
    }
}

/// Write 16 bits to a device register.
///
/// # Safety
///
/// See [`read8`].
#[inline]
pub unsafe fn write16<P: Platform + ?Sized>(platform: &P, addr: usize, value: u16) {
    match RegisterSpace::classify(addr) {
        RegisterSpace::Port(port) => platform.port_write16(port, value),
        RegisterSpace::Memory(reg) => platform.register_write16(reg, value),
    }
}

/// Write 32 bits to a device register.
///
/// # Safety
///
/// See [`read8`].
#[inline]
pub unsafe fn write32<P: Platform + ?Sized>(platform: &P, addr: usize, value: u32) {
    match RegisterSpace::classify(addr) {
        RegisterSpace::Port(port) => platform.port_write32(port, value),
        RegisterSpace::Memory(reg) => platform.register_write32(reg, value),
    }
}
