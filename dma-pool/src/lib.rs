//! Bump-pointer arena over a caller-supplied DMA region.
//!
//! The owning driver reserves one physically contiguous, uncached region at
//! attach time and hands it to a [`BumpArena`]. Every allocation is carved off
//! the front of what is left; nothing is ever handed back individually. The
//! whole region is reclaimed in one go when the driver tears the adapter down.
//!
//! # Design Philosophy
//!
//! - **No ownership of memory**: the arena only subdivides, never allocates
//!   or releases the backing region.
//! - **No individual free**: the cursor only moves forward.
//! - **No partial advance**: a request that does not fit leaves the cursor
//!   exactly where it was.
//! - **No global state**: one arena per adapter, owned by whoever owns the
//!   adapter.
//!
//! # Usage
//!
//! ```ignore
//! use dma_pool::BumpArena;
//!
//! // Page-granular arena for rings and DMA buffers
//! let mut pages = unsafe { BumpArena::new(region_base, region_size)? };
//! let ring = pages.alloc(3 * 1024)?; // rounds up to one page, zeroed
//!
//! // Block-granular arena for small control structures
//! let mut blocks = unsafe { BumpArena::with_granularity(pool_base, pool_size, 16)? };
//! let hdr = blocks.alloc(24)?;
//! ```

#![no_std]

use core::fmt;
use core::ptr::NonNull;

/// Page size (4KB).
pub const PAGE_SIZE: usize = 4096;

// ============================================================================
// Utility functions
// ============================================================================

/// Align a value up, returning `None` instead of wrapping.
#[inline]
pub const fn checked_align_up(val: usize, align: usize) -> Option<usize> {
    match val.checked_add(align - 1) {
        Some(v) => Some(v & !(align - 1)),
        None => None,
    }
}

// ============================================================================
// Error types
// ============================================================================

/// Arena errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmaError {
    /// Not enough room left in the region.
    OutOfMemory,
    /// Region is empty, misaligned, or the granularity is not a power of two.
    InvalidRegion,
}

impl fmt::Display for DmaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DmaError::OutOfMemory => write!(f, "arena exhausted"),
            DmaError::InvalidRegion => write!(f, "invalid arena region"),
        }
    }
}

/// Result type for arena operations.
pub type Result<T> = core::result::Result<T, DmaError>;

// ============================================================================
// BumpArena
// ============================================================================

/// Forward-only allocator over one contiguous region.
///
/// Invariant: `offset <= size` and `offset` never decreases.
pub struct BumpArena {
    base: NonNull<u8>,
    size: usize,
    offset: usize,
    granularity: usize,
}

impl BumpArena {
    /// Create a page-granular arena.
    ///
    /// # Safety
    ///
    /// - `base..base + size` must be valid, writable memory for as long as the
    ///   arena or anything allocated from it is in use.
    /// - The region must not be used by anything else.
    ///
    /// # Errors
    ///
    /// [`DmaError::InvalidRegion`] if `size` is 0 or `base` is not page-aligned.
    pub unsafe fn new(base: NonNull<u8>, size: usize) -> Result<Self> {
        Self::with_granularity(base, size, PAGE_SIZE)
    }

    /// Create an arena that rounds every request up to `granularity` bytes.
    ///
    /// # Safety
    ///
    /// Same requirements as [`BumpArena::new`].
    ///
    /// # Errors
    ///
    /// [`DmaError::InvalidRegion`] if `size` is 0, `granularity` is not a power
    /// of two, or `base` is not aligned to `granularity`.
    pub unsafe fn with_granularity(
        base: NonNull<u8>,
        size: usize,
        granularity: usize,
    ) -> Result<Self> {
        if size == 0 || !granularity.is_power_of_two() {
            return Err(DmaError::InvalidRegion);
        }
        if base.as_ptr() as usize % granularity != 0 {
            return Err(DmaError::InvalidRegion);
        }
        Ok(Self {
            base,
            size,
            offset: 0,
            granularity,
        })
    }

    /// Carve `size` bytes (rounded up to the granularity) off the region.
    ///
    /// The returned block is zero-filled. On failure the cursor is untouched.
    /// A zero-byte request fits anywhere: it returns the current cursor
    /// position and consumes nothing.
    pub fn alloc(&mut self, size: usize) -> Result<NonNull<u8>> {
        let rounded = checked_align_up(size, self.granularity).ok_or(DmaError::OutOfMemory)?;
        let end = self.offset.checked_add(rounded).ok_or(DmaError::OutOfMemory)?;
        if end > self.size {
            return Err(DmaError::OutOfMemory);
        }

        // SAFETY: offset <= end <= size; at most one past the end of the region.
        let block = unsafe { self.base.as_ptr().add(self.offset) };
        unsafe {
            core::ptr::write_bytes(block, 0, rounded);
        }
        self.offset = end;

        NonNull::new(block).ok_or(DmaError::OutOfMemory)
    }

    /// Base of the region.
    #[inline]
    pub fn base(&self) -> NonNull<u8> {
        self.base
    }

    /// Total region size in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Current cursor (bytes consumed so far).
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes not yet handed out.
    #[inline]
    pub fn free_space(&self) -> usize {
        self.size - self.offset
    }
}

impl fmt::Debug for BumpArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BumpArena")
            .field("base", &self.base)
            .field("size", &format_args!("{:#x}", self.size))
            .field("offset", &format_args!("{:#x}", self.offset))
            .field("granularity", &self.granularity)
            .finish()
    }
}

// SAFETY: The arena is the sole user of its region; moving it between
// threads moves that exclusive ownership along with it.
unsafe impl Send for BumpArena {}

// ============================================================================
// Tests
// ============================================================================
