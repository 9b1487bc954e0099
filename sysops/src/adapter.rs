//! Per-adapter state.
//!
//! The driver builds one [`AdapterContext`] at attach time and owns it for the
//! adapter's lifetime. Operations that change it (page cursor, BAR mapping
//! cache) take it by `&mut`, so concurrent mutation cannot compile.

use core::ptr::NonNull;

use dma_pool::BumpArena;

use crate::error::Result;
use crate::pci::bar::BarTable;
use crate::pci::config::PciConfigSnapshot;

/// Everything the driver hands over when creating an adapter context.
#[derive(Debug, Clone)]
pub struct AdapterConfig<'a> {
    /// Start of the pre-reserved contiguous, uncached DMA region.
    pub dma_base: NonNull<u8>,
    /// Size of that region in bytes.
    pub dma_size: usize,
    /// Configuration space as read at attach time.
    pub config_space: &'a [u8],
    /// BAR descriptors, typically from [`BarTable::from_access_ranges`].
    pub bars: BarTable,
    /// Bus the BARs belong to.
    pub system_io_bus_number: u32,
    /// MSI-X interrupts are active.
    pub msix_enabled: bool,
}

/// State the operation table reads and updates on the driver's behalf.
#[derive(Debug)]
pub struct AdapterContext {
    page_arena: BumpArena,
    pci_config: PciConfigSnapshot,
    pci_bars: BarTable,
    system_io_bus_number: u32,
    msix_enabled: bool,
}

impl AdapterContext {
    /// Build the context.
    ///
    /// # Safety
    ///
    /// `dma_base..dma_base + dma_size` must be physically contiguous memory
    /// reserved for this adapter alone, valid for the context's lifetime.
    ///
    /// # Errors
    ///
    /// - [`SysOpsError::Dma`](crate::SysOpsError::Dma) if the region is empty
    ///   or not page-aligned
    /// - [`SysOpsError::ConfigSpaceTooSmall`](crate::SysOpsError::ConfigSpaceTooSmall)
    ///   if the configuration bytes do not cover the header
    pub unsafe fn new(config: AdapterConfig<'_>) -> Result<Self> {
        let page_arena = BumpArena::new(config.dma_base, config.dma_size)?;
        let pci_config = PciConfigSnapshot::capture(config.config_space)?;

        Ok(Self {
            page_arena,
            pci_config,
            pci_bars: config.bars,
            system_io_bus_number: config.system_io_bus_number,
            msix_enabled: config.msix_enabled,
        })
    }

    pub fn page_arena(&self) -> &BumpArena {
        &self.page_arena
    }

    pub fn page_arena_mut(&mut self) -> &mut BumpArena {
        &mut self.page_arena
    }

    pub fn pci_config(&self) -> &PciConfigSnapshot {
        &self.pci_config
    }

    pub fn pci_bars(&self) -> &BarTable {
        &self.pci_bars
    }

    pub fn pci_bars_mut(&mut self) -> &mut BarTable {
        &mut self.pci_bars
    }

    pub fn system_io_bus_number(&self) -> u32 {
        self.system_io_bus_number
    }

    pub fn msix_enabled(&self) -> bool {
        self.msix_enabled
    }

    /// Record the interrupt mode the driver ended up with.
    pub fn set_msix_enabled(&mut self, enabled: bool) {
        self.msix_enabled = enabled;
    }
}

// SAFETY: BAR mappings and the DMA region are owned by this adapter; the
// context is only ever accessed through one `&mut` at a time.
unsafe impl Send for AdapterContext {}
