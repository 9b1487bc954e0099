//! virtio-scsi System Operations
//!
//! The layer a virtio-scsi miniport calls into for everything that touches
//! the machine: device registers, the cached PCI configuration header, BAR
//! mappings, DMA-safe memory and MSI-X vector numbers.
//!
//! # Architecture
//!
//! ```text
//!   virtio-scsi driver (owns AdapterContext)
//!            │
//!            ▼
//!   ┌─────────────────────────────────────────────┐
//!   │ SystemOps (VioScsiSystemOps<P>)             │
//!   │                                             │
//!   │  dispatch   register access, port vs MMIO   │
//!   │  pci        config snapshot, BAR table      │
//!   │  dma        page arena, phys translation    │
//!   │  pool       non-paged block delegation      │
//!   │  msix       queue → vector policy           │
//!   │  delay      busy-wait                       │
//!   └─────────────────────────────────────────────┘
//!            │
//!            ▼
//!   Platform (port I/O, MMIO, mapping, pool, stall)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use vioscsi_sysops::{AdapterConfig, AdapterContext, SystemOps, VioScsiSystemOps};
//!
//! let mut ctx = unsafe { AdapterContext::new(config)? };
//! let ops = VioScsiSystemOps::new(platform);
//!
//! let common_cfg = ops.pci_map_address_range(&mut ctx, 4, 0x0, 0x38);
//! let ring = ops.mem_alloc_contiguous_pages(&mut ctx, ring_bytes);
//! let vector = ops.vdev_get_msix_vector(&ctx, 0);
//! ```
//!
//! # What This Crate Does NOT Do
//!
//! - SCSI command translation
//! - Virtqueue descriptor management
//! - Interrupt service routines
//! - Adapter attach/detach

#![no_std]

pub mod adapter;
pub mod asm;
pub mod delay;
pub mod dispatch;
pub mod dma;
pub mod error;
pub mod msix;
pub mod ops;
pub mod pci;
pub mod platform;
pub mod pool;

#[cfg(test)]
mod testing;

pub use adapter::{AdapterConfig, AdapterContext};
pub use error::{Result, SysOpsError};
pub use msix::{VectorTarget, VIRTIO_MSI_NO_VECTOR};
pub use ops::{SystemOps, VioScsiSystemOps};
pub use pci::bar::{AccessRange, BarTable, VirtioBar, PCI_TYPE0_ADDRESSES};
pub use pci::config::PciConfigSnapshot;
pub use platform::Platform;

#[cfg(feature = "bare-metal")]
pub use platform::bare::{BareMetalConfig, BareMetalPlatform};

pub use dma_pool::PAGE_SIZE;

/// `log` target for every record this crate emits.
pub const LOG_TARGET: &str = "vioscsi";
