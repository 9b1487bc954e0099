//! Non-paged block allocation, delegated to the platform.

use core::ptr::NonNull;

use crate::platform::Platform;

/// Allocate `size` bytes from the platform's non-paged pool.
#[inline]
pub fn alloc_nonpaged_block<P: Platform + ?Sized>(platform: &P, size: usize) -> Option<NonNull<u8>> {
    platform.pool_alloc(size)
}

/// Blocks are never returned to the pool.
#[inline]
pub fn free_nonpaged_block(_block: NonNull<u8>) {}
