//! Cached PCI configuration space.
//!
//! Values come back in the host's native byte order, exactly as a pointer
//! cast into the captured buffer would read them. This is an in-memory copy,
//! not a wire format.

use core::fmt;

use crate::error::{Result, SysOpsError};

/// PCI configuration space size for a single function.
pub const PCI_CONFIG_SIZE: usize = 256;

/// Size of the type 0 header every snapshot must cover.
pub const PCI_HEADER_SIZE: usize = 64;

// ═══════════════════════════════════════════════════════════════════════════
// PCI STANDARD OFFSETS
// ═══════════════════════════════════════════════════════════════════════════

/// PCI configuration space standard offsets.
pub mod offset {
    pub const VENDOR_ID: usize = 0x00;
    pub const DEVICE_ID: usize = 0x02;
    pub const BAR0: usize = 0x10;
    pub const INT_LINE: usize = 0x3C;
}

// ═══════════════════════════════════════════════════════════════════════════
// SNAPSHOT
// ═══════════════════════════════════════════════════════════════════════════

/// Read-only copy of a function's configuration space.
#[derive(Clone)]
pub struct PciConfigSnapshot {
    bytes: [u8; PCI_CONFIG_SIZE],
    len: usize,
}

impl PciConfigSnapshot {
    /// Capture up to [`PCI_CONFIG_SIZE`] bytes.
    ///
    /// # Errors
    ///
    /// [`SysOpsError::ConfigSpaceTooSmall`] if fewer than
    /// [`PCI_HEADER_SIZE`] bytes are supplied.
    pub fn capture(raw: &[u8]) -> Result<Self> {
        if raw.len() < PCI_HEADER_SIZE {
            return Err(SysOpsError::ConfigSpaceTooSmall(raw.len()));
        }

        let len = raw.len().min(PCI_CONFIG_SIZE);
        let mut bytes = [0u8; PCI_CONFIG_SIZE];
        bytes[..len].copy_from_slice(&raw[..len]);
        Ok(Self { bytes, len })
    }

    /// Number of captured bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; a snapshot covers at least the header.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The captured bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Read a byte.
    ///
    /// # Panics
    ///
    /// If `offset` is outside the captured range.
    #[inline]
    pub fn read_byte(&self, offset: usize) -> u8 {
        self.as_bytes()[offset]
    }

    /// Read a 16-bit word in native byte order.
    ///
    /// # Panics
    ///
    /// If `offset..offset + 2` is outside the captured range.
    #[inline]
    pub fn read_word(&self, offset: usize) -> u16 {
        u16::from_ne_bytes(self.field(offset))
    }

    /// Read a 32-bit dword in native byte order.
    ///
    /// # Panics
    ///
    /// If `offset..offset + 4` is outside the captured range.
    #[inline]
    pub fn read_dword(&self, offset: usize) -> u32 {
        u32::from_ne_bytes(self.field(offset))
    }

    /// Vendor ID.
    pub fn vendor_id(&self) -> u16 {
        self.read_word(offset::VENDOR_ID)
    }

    /// Device ID.
    pub fn device_id(&self) -> u16 {
        self.read_word(offset::DEVICE_ID)
    }

    /// Raw BAR register `index` (0-5).
    pub fn bar_register(&self, index: usize) -> u32 {
        self.read_dword(offset::BAR0 + index * 4)
    }

    fn field<const N: usize>(&self, offset: usize) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.as_bytes()[offset..offset + N]);
        out
    }
}

impl fmt::Debug for PciConfigSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PciConfigSnapshot")
            .field("vendor_id", &format_args!("{:#06x}", self.vendor_id()))
            .field("device_id", &format_args!("{:#06x}", self.device_id()))
            .field("len", &self.len)
            .finish()
    }
}
