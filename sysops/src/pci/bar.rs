//! BAR table and lazy BAR mapping.
//!
//! Each BAR is mapped through the platform the first time anyone asks for an
//! address inside it, and that mapping is kept for the adapter's lifetime.
//! A failed mapping is not remembered; the next request tries again.
//! Unmapping belongs to the platform's teardown path, so per-range unmap
//! requests do nothing.

use core::ptr::NonNull;

use log::{debug, warn};

use super::config::PciConfigSnapshot;
use crate::platform::Platform;
use crate::LOG_TARGET;

/// Number of BAR slots in a type 0 header.
pub const PCI_TYPE0_ADDRESSES: usize = 6;

/// BAR register bit 0: I/O space.
const BAR_IO_SPACE: u32 = 0x1;
/// Memory BAR type field value for a 64-bit BAR.
const BAR_MEM_TYPE_64: u32 = 0x2;
const BAR_IO_ADDR_MASK: u32 = !0x3;
const BAR_MEM_ADDR_MASK: u32 = !0xF;

/// One BAR slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VirtioBar {
    /// Bus-relative base address.
    pub base_pa: u64,
    /// Length in bytes (0 for an unused slot).
    pub length: usize,
    /// I/O space rather than memory space.
    pub port_space: bool,
    mapped: Option<NonNull<u8>>,
}

impl VirtioBar {
    /// Describe an unmapped BAR.
    pub const fn new(base_pa: u64, length: usize, port_space: bool) -> Self {
        Self {
            base_pa,
            length,
            port_space,
            mapped: None,
        }
    }

    /// Base returned by the platform, once mapped.
    #[inline]
    pub fn mapped_base(&self) -> Option<NonNull<u8>> {
        self.mapped
    }
}

/// A resource range the platform granted to this function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessRange {
    /// Bus-relative start.
    pub start: u64,
    /// Length in bytes.
    pub length: usize,
    /// Memory space (false for I/O space).
    pub in_memory: bool,
}

/// A BAR register decoded from configuration space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedBar {
    pub base: u64,
    pub port_space: bool,
}

/// Decode the six BAR registers of a type 0 header.
///
/// A 64-bit memory BAR consumes the following slot, which decodes to `None`.
/// Unassigned (zero) BARs decode to `None`.
pub fn decode_bars(config: &PciConfigSnapshot) -> [Option<DecodedBar>; PCI_TYPE0_ADDRESSES] {
    let mut out = [None; PCI_TYPE0_ADDRESSES];
    let mut i = 0;

    while i < PCI_TYPE0_ADDRESSES {
        let raw = config.bar_register(i);

        if raw & BAR_IO_SPACE != 0 {
            let base = (raw & BAR_IO_ADDR_MASK) as u64;
            if base != 0 {
                out[i] = Some(DecodedBar { base, port_space: true });
            }
            i += 1;
            continue;
        }

        let mut base = (raw & BAR_MEM_ADDR_MASK) as u64;
        let is_64 = (raw >> 1) & 0x3 == BAR_MEM_TYPE_64;
        let slots = if is_64 && i + 1 < PCI_TYPE0_ADDRESSES {
            base |= (config.bar_register(i + 1) as u64) << 32;
            2
        } else {
            1
        };

        if base != 0 {
            out[i] = Some(DecodedBar { base, port_space: false });
        }
        i += slots;
    }

    out
}

/// The adapter's BAR slots.
#[derive(Debug, Clone, Default)]
pub struct BarTable {
    bars: [VirtioBar; PCI_TYPE0_ADDRESSES],
}

impl BarTable {
    /// Table with every slot unused.
    pub const fn new() -> Self {
        Self {
            bars: [VirtioBar::new(0, 0, false); PCI_TYPE0_ADDRESSES],
        }
    }

    /// Table from explicit descriptors.
    pub const fn from_bars(bars: [VirtioBar; PCI_TYPE0_ADDRESSES]) -> Self {
        Self { bars }
    }

    /// Match granted access ranges to BAR registers.
    ///
    /// A range fills the slot whose decoded base equals its start; ranges
    /// that match no BAR are ignored.
    pub fn from_access_ranges(config: &PciConfigSnapshot, ranges: &[AccessRange]) -> Self {
        let decoded = decode_bars(config);
        let mut table = Self::new();

        for range in ranges {
            let slot = decoded
                .iter()
                .position(|bar| matches!(bar, Some(b) if b.base == range.start));

            match slot {
                Some(index) => {
                    debug!(
                        target: LOG_TARGET,
                        "BAR{}: {:#x} len {:#x} {}",
                        index,
                        range.start,
                        range.length,
                        if range.in_memory { "mem" } else { "io" }
                    );
                    table.bars[index] = VirtioBar::new(range.start, range.length, !range.in_memory);
                }
                None => {
                    debug!(
                        target: LOG_TARGET,
                        "access range {:#x} len {:#x} matches no BAR",
                        range.start,
                        range.length
                    );
                }
            }
        }

        table
    }

    /// Slot `bar`, if it exists.
    #[inline]
    pub fn get(&self, bar: usize) -> Option<&VirtioBar> {
        self.bars.get(bar)
    }

    /// All slots.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &VirtioBar> {
        self.bars.iter()
    }

    /// Length of BAR `bar`, or 0 for an index past the last slot.
    #[inline]
    pub fn resource_len(&self, bar: usize) -> usize {
        self.bars.get(bar).map_or(0, |b| b.length)
    }

    /// Address `offset` bytes into BAR `bar`, mapping the BAR on first use.
    ///
    /// Returns `None` for an invalid index, an offset at or past the BAR's
    /// length, or a failed platform mapping. `max_len` is accepted for the
    /// caller's bookkeeping; the whole BAR is always mapped.
    pub fn map_address_range<P: Platform + ?Sized>(
        &mut self,
        platform: &P,
        bus: u32,
        bar: usize,
        offset: usize,
        max_len: usize,
    ) -> Option<NonNull<u8>> {
        let entry = self.bars.get_mut(bar)?;

        if entry.mapped.is_none() {
            entry.mapped =
                platform.map_device_base(bus, entry.base_pa, entry.length, entry.port_space);
            match entry.mapped {
                Some(base) => debug!(
                    target: LOG_TARGET,
                    "BAR{} mapped {:#x} -> {:p}",
                    bar,
                    entry.base_pa,
                    base
                ),
                None => warn!(
                    target: LOG_TARGET,
                    "BAR{} mapping of {:#x} len {:#x} failed",
                    bar,
                    entry.base_pa,
                    entry.length
                ),
            }
        }

        let base = entry.mapped?;
        if offset >= entry.length {
            debug!(
                target: LOG_TARGET,
                "BAR{} offset {:#x} (max {:#x}) outside len {:#x}",
                bar,
                offset,
                max_len,
                entry.length
            );
            return None;
        }

        // I/O BAR bases are port numbers, not pointers into an allocation.
        NonNull::new(base.as_ptr().wrapping_add(offset))
    }

    /// Release a range returned by [`map_address_range`](Self::map_address_range).
    ///
    /// Mappings live until adapter teardown; nothing to do.
    #[inline]
    pub fn unmap_address_range(&self, _address: NonNull<u8>) {}
}
