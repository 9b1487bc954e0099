//! DMA-safe page allocation and physical address lookup.
//!
//! Pages come from the adapter's pre-reserved contiguous region; nothing is
//! released until the whole region goes away with the adapter.

use core::ptr::NonNull;

use dma_pool::{BumpArena, DmaError};
use log::{error, trace};

use crate::platform::Platform;
use crate::LOG_TARGET;

/// Carve `size` bytes, rounded up to whole pages, off the adapter region.
///
/// The block is zero-filled. Running out of room is fatal for the driver and
/// is reported at error level; the cursor stays where it was.
pub fn alloc_contiguous_pages(arena: &mut BumpArena, size: usize) -> Option<NonNull<u8>> {
    match arena.alloc(size) {
        Ok(block) => {
            trace!(
                target: LOG_TARGET,
                "pages: {:#x} bytes at {:p}, {:#x} left",
                size,
                block,
                arena.free_space()
            );
            Some(block)
        }
        Err(DmaError::OutOfMemory) => {
            error!(
                target: LOG_TARGET,
                "out of DMA memory: wanted {:#x} bytes, {:#x} of {:#x} in use",
                size,
                arena.offset(),
                arena.size()
            );
            None
        }
        Err(err) => {
            trace!(target: LOG_TARGET, "pages: {:#x} bytes rejected: {}", size, err);
            None
        }
    }
}

/// Release pages from [`alloc_contiguous_pages`]. The region is reclaimed as a
/// whole, so this does nothing.
#[inline]
pub fn free_contiguous_pages(_block: NonNull<u8>) {}

/// Physical address of `virt`, as the platform reports it.
#[inline]
pub fn physical_address<P: Platform + ?Sized>(platform: &P, virt: *const u8) -> Option<u64> {
    platform.physical_address(virt)
}
