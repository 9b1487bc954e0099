//! The system-operations table.
//!
//! [`SystemOps`] is the one seam the virtio-scsi driver calls through for
//! anything that touches the machine. [`VioScsiSystemOps`] implements it over
//! a [`Platform`]; the driver builds one at adapter initialisation and passes
//! it by reference.
//!
//! Failure is reported the way the virtio core expects it: `None` for
//! allocation, mapping and translation, a zero length for an unknown BAR and
//! [`VIRTIO_MSI_NO_VECTOR`](crate::VIRTIO_MSI_NO_VECTOR) when no vector
//! applies.

use core::ptr::NonNull;

use crate::adapter::AdapterContext;
use crate::msix::{msix_vector, VectorTarget};
use crate::platform::Platform;
use crate::{delay, dispatch, dma, pool};

/// Operations a virtio-scsi driver needs from its environment.
pub trait SystemOps {
    // ═══════════════════════════════════════════════════════════════════════
    // DEVICE REGISTERS
    // ═══════════════════════════════════════════════════════════════════════

    /// # Safety
    ///
    /// `register` must be a port number or an address returned by
    /// [`SystemOps::pci_map_address_range`] for this adapter.
    unsafe fn vdev_read_byte(&self, register: usize) -> u8;

    /// # Safety
    ///
    /// See [`SystemOps::vdev_read_byte`].
    unsafe fn vdev_read_word(&self, register: usize) -> u16;

    /// # Safety
    ///
    /// See [`SystemOps::vdev_read_byte`].
    unsafe fn vdev_read_dword(&self, register: usize) -> u32;

    /// # Safety
    ///
    /// See [`SystemOps::vdev_read_byte`].
    unsafe fn vdev_write_byte(&self, register: usize, value: u8);

    /// # Safety
    ///
    /// See [`SystemOps::vdev_read_byte`].
    unsafe fn vdev_write_word(&self, register: usize, value: u16);

    /// # Safety
    ///
    /// See [`SystemOps::vdev_read_byte`].
    unsafe fn vdev_write_dword(&self, register: usize, value: u32);

    // ═══════════════════════════════════════════════════════════════════════
    // MEMORY
    // ═══════════════════════════════════════════════════════════════════════

    /// Zeroed, page-rounded block from the adapter's DMA region.
    fn mem_alloc_contiguous_pages(
        &self,
        ctx: &mut AdapterContext,
        size: usize,
    ) -> Option<NonNull<u8>>;

    fn mem_free_contiguous_pages(&self, ctx: &mut AdapterContext, block: NonNull<u8>);

    fn mem_get_physical_address(&self, ctx: &AdapterContext, virt: *const u8) -> Option<u64>;

    fn mem_alloc_nonpaged_block(&self, ctx: &AdapterContext, size: usize) -> Option<NonNull<u8>>;

    fn mem_free_nonpaged_block(&self, ctx: &AdapterContext, block: NonNull<u8>);

    // ═══════════════════════════════════════════════════════════════════════
    // PCI
    // ═══════════════════════════════════════════════════════════════════════

    fn pci_read_config_byte(&self, ctx: &AdapterContext, offset: usize) -> u8;

    fn pci_read_config_word(&self, ctx: &AdapterContext, offset: usize) -> u16;

    fn pci_read_config_dword(&self, ctx: &AdapterContext, offset: usize) -> u32;

    /// Length of BAR `bar`, 0 if there is no such BAR.
    fn pci_get_resource_len(&self, ctx: &AdapterContext, bar: usize) -> usize;

    /// Usable address `offset` bytes into BAR `bar`, mapping the BAR on first
    /// use.
    fn pci_map_address_range(
        &self,
        ctx: &mut AdapterContext,
        bar: usize,
        offset: usize,
        max_len: usize,
    ) -> Option<NonNull<u8>>;

    fn pci_unmap_address_range(&self, ctx: &mut AdapterContext, address: NonNull<u8>);

    // ═══════════════════════════════════════════════════════════════════════
    // INTERRUPTS & TIMING
    // ═══════════════════════════════════════════════════════════════════════

    /// MSI-X vector for a queue index, or for configuration change when
    /// `queue` is negative.
    fn vdev_get_msix_vector(&self, ctx: &AdapterContext, queue: i32) -> u16;

    /// Busy-wait for at least `msecs` milliseconds.
    fn vdev_sleep(&self, ctx: &AdapterContext, msecs: u32);
}

/// [`SystemOps`] over a [`Platform`].
#[derive(Debug)]
pub struct VioScsiSystemOps<P: Platform> {
    platform: P,
}

impl<P: Platform> VioScsiSystemOps<P> {
    pub const fn new(platform: P) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }
}

impl<P: Platform> SystemOps for VioScsiSystemOps<P> {
    unsafe fn vdev_read_byte(&self, register: usize) -> u8 {
        dispatch::read8(&self.platform, register)
    }

    unsafe fn vdev_read_word(&self, register: usize) -> u16 {
        dispatch::read16(&self.platform, register)
    }

    unsafe fn vdev_read_dword(&self, register: usize) -> u32 {
        dispatch::read32(&self.platform, register)
    }

    unsafe fn vdev_write_byte(&self, register: usize, value: u8) {
        dispatch::write8(&self.platform, register, value)
    }

    unsafe fn vdev_write_word(&self, register: usize, value: u16) {
        dispatch::write16(&self.platform, register, value)
    }

    unsafe fn vdev_write_dword(&self, register: usize, value: u32) {
        dispatch::write32(&self.platform, register, value)
    }

    fn mem_alloc_contiguous_pages(
        &self,
        ctx: &mut AdapterContext,
        size: usize,
    ) -> Option<NonNull<u8>> {
        dma::alloc_contiguous_pages(ctx.page_arena_mut(), size)
    }

    fn mem_free_contiguous_pages(&self, _ctx: &mut AdapterContext, block: NonNull<u8>) {
        dma::free_contiguous_pages(block)
    }

    fn mem_get_physical_address(&self, _ctx: &AdapterContext, virt: *const u8) -> Option<u64> {
        dma::physical_address(&self.platform, virt)
    }

    fn mem_alloc_nonpaged_block(&self, _ctx: &AdapterContext, size: usize) -> Option<NonNull<u8>> {
        pool::alloc_nonpaged_block(&self.platform, size)
    }

    fn mem_free_nonpaged_block(&self, _ctx: &AdapterContext, block: NonNull<u8>) {
        pool::free_nonpaged_block(block)
    }

    fn pci_read_config_byte(&self, ctx: &AdapterContext, offset: usize) -> u8 {
        ctx.pci_config().read_byte(offset)
    }

    fn pci_read_config_word(&self, ctx: &AdapterContext, offset: usize) -> u16 {
        ctx.pci_config().read_word(offset)
    }

    fn pci_read_config_dword(&self, ctx: &AdapterContext, offset: usize) -> u32 {
        ctx.pci_config().read_dword(offset)
    }

    fn pci_get_resource_len(&self, ctx: &AdapterContext, bar: usize) -> usize {
        ctx.pci_bars().resource_len(bar)
    }

    fn pci_map_address_range(
        &self,
        ctx: &mut AdapterContext,
        bar: usize,
        offset: usize,
        max_len: usize,
    ) -> Option<NonNull<u8>> {
        let bus = ctx.system_io_bus_number();
        ctx.pci_bars_mut()
            .map_address_range(&self.platform, bus, bar, offset, max_len)
    }

    fn pci_unmap_address_range(&self, ctx: &mut AdapterContext, address: NonNull<u8>) {
        ctx.pci_bars().unmap_address_range(address)
    }

    fn vdev_get_msix_vector(&self, ctx: &AdapterContext, queue: i32) -> u16 {
        msix_vector(VectorTarget::from_raw(queue), ctx.msix_enabled())
    }

    fn vdev_sleep(&self, _ctx: &AdapterContext, msecs: u32) {
        delay::busy_wait_ms(&self.platform, msecs)
    }
}
