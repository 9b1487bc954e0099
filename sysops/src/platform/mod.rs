//! Platform collaborator.
//!
//! Everything the system-operations layer needs from the machine or from the
//! storage port it runs under. One implementation per target environment:
//!
//! - `BareMetalPlatform` - raw port I/O, volatile MMIO, TSC busy-wait
//!   (feature `bare-metal`)
//! - test fakes that record every call
//!
//! Methods take `&self`; an implementation that keeps mutable state (the pool
//! cursor, say) guards it itself.

use core::ptr::NonNull;

#[cfg(feature = "bare-metal")]
pub mod bare;

/// Machine primitives consumed by the operation table.
pub trait Platform {
    /// Read 8 bits from an I/O port.
    ///
    /// # Safety
    ///
    /// `port` must belong to a device this driver owns.
    unsafe fn port_read8(&self, port: u16) -> u8;

    /// Read 16 bits from an I/O port.
    ///
    /// # Safety
    ///
    /// See [`Platform::port_read8`].
    unsafe fn port_read16(&self, port: u16) -> u16;

    /// Read 32 bits from an I/O port.
    ///
    /// # Safety
    ///
    /// See [`Platform::port_read8`].
    unsafe fn port_read32(&self, port: u16) -> u32;

    /// Write 8 bits to an I/O port.
    ///
    /// # Safety
    ///
    /// See [`Platform::port_read8`].
    unsafe fn port_write8(&self, port: u16, value: u8);

    /// Write 16 bits to an I/O port.
    ///
    /// # Safety
    ///
    /// See [`Platform::port_read8`].
    unsafe fn port_write16(&self, port: u16, value: u16);

    /// Write 32 bits to an I/O port.
    ///
    /// # Safety
    ///
    /// See [`Platform::port_read8`].
    unsafe fn port_write32(&self, port: u16, value: u32);

    /// Read 8 bits from a mapped device register.
    ///
    /// # Safety
    ///
    /// `addr` must lie inside a live device mapping and be suitably aligned.
    unsafe fn register_read8(&self, addr: usize) -> u8;

    /// Read 16 bits from a mapped device register.
    ///
    /// # Safety
    ///
    /// See [`Platform::register_read8`].
    unsafe fn register_read16(&self, addr: usize) -> u16;

    /// Read 32 bits from a mapped device register.
    ///
    /// # Safety
    ///
    /// See [`Platform::register_read8`].
    unsafe fn register_read32(&self, addr: usize) -> u32;

    /// Write 8 bits to a mapped device register.
    ///
    /// # Safety
    ///
    /// See [`Platform::register_read8`].
    unsafe fn register_write8(&self, addr: usize, value: u8);

    /// Write 16 bits to a mapped device register.
    ///
    /// # Safety
    ///
    /// See [`Platform::register_read8`].
    unsafe fn register_write16(&self, addr: usize, value: u16);

    /// Write 32 bits to a mapped device register.
    ///
    /// # Safety
    ///
    /// See [`Platform::register_read8`].
    unsafe fn register_write32(&self, addr: usize, value: u32);

    /// Allocate `size` bytes of non-paged memory.
    fn pool_alloc(&self, size: usize) -> Option<NonNull<u8>>;

    /// Physical address behind a virtual address, if the platform knows it.
    fn physical_address(&self, virt: *const u8) -> Option<u64>;

    /// Map a bus-relative resource and return its usable base.
    ///
    /// For I/O space the returned "pointer" carries the port number.
    fn map_device_base(
        &self,
        bus: u32,
        base_pa: u64,
        length: usize,
        port_space: bool,
    ) -> Option<NonNull<u8>>;

    /// Spin for at least `us` microseconds without yielding.
    fn stall_microseconds(&self, us: u64);
}
