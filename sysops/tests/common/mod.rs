//! Common test utilities: a fake platform and host-backed DMA regions.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::ptr::{self, NonNull};

use vioscsi_sysops::{
    AdapterConfig, AdapterContext, BarTable, Platform, PAGE_SIZE,
};

/// Platform event recorded by [`FakePlatform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    PortRead(u16),
    PortWrite(u16, u32),
    RegisterRead(usize),
    RegisterWrite(usize, u32),
    Map { base_pa: u64, length: usize, port_space: bool },
    Pool(usize),
    Stall(u64),
}

/// In-memory stand-in for the machine.
///
/// Memory BARs are backed by heap windows, so register accesses through a
/// mapped address hit real memory. I/O ports are a sparse register file.
pub struct FakePlatform {
    ports: RefCell<BTreeMap<u16, u32>>,
    windows: RefCell<Vec<Box<[u64]>>>,
    events: RefCell<Vec<Event>>,
    failing_maps: Cell<u32>,
    pool_limit: usize,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            ports: RefCell::new(BTreeMap::new()),
            windows: RefCell::new(Vec::new()),
            events: RefCell::new(Vec::new()),
            failing_maps: Cell::new(0),
            pool_limit: usize::MAX,
        }
    }

    /// The next `count` mapping requests fail.
    pub fn fail_next_maps(&self, count: u32) {
        self.failing_maps.set(count);
    }

    /// Pool requests above `limit` bytes fail.
    pub fn with_pool_limit(mut self, limit: usize) -> Self {
        self.pool_limit = limit;
        self
    }

    pub fn set_port(&self, port: u16, value: u32) {
        self.ports.borrow_mut().insert(port, value);
    }

    pub fn port(&self, port: u16) -> u32 {
        self.ports.borrow().get(&port).copied().unwrap_or(0)
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn map_count(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Map { .. }))
            .count()
    }

    pub fn clear_events(&self) {
        self.events.borrow_mut().clear();
    }

    fn record(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }

    fn window(&self, bytes: usize) -> NonNull<u8> {
        let words = bytes.div_ceil(8).max(1);
        let mut window = vec![0u64; words].into_boxed_slice();
        let base = NonNull::new(window.as_mut_ptr() as *mut u8).unwrap();
        self.windows.borrow_mut().push(window);
        base
    }
}

impl Platform for FakePlatform {
    unsafe fn port_read8(&self, port: u16) -> u8 {
        self.record(Event::PortRead(port));
        self.port(port) as u8
    }

    unsafe fn port_read16(&self, port: u16) -> u16 {
        self.record(Event::PortRead(port));
        self.port(port) as u16
    }

    unsafe fn port_read32(&self, port: u16) -> u32 {
        self.record(Event::PortRead(port));
        self.port(port)
    }

    unsafe fn port_write8(&self, port: u16, value: u8) {
        self.record(Event::PortWrite(port, value as u32));
        self.set_port(port, value as u32);
    }

    unsafe fn port_write16(&self, port: u16, value: u16) {
        self.record(Event::PortWrite(port, value as u32));
        self.set_port(port, value as u32);
    }

    unsafe fn port_write32(&self, port: u16, value: u32) {
        self.record(Event::PortWrite(port, value));
        self.set_port(port, value);
    }

    unsafe fn register_read8(&self, addr: usize) -> u8 {
        self.record(Event::RegisterRead(addr));
        ptr::read_volatile(addr as *const u8)
    }

    unsafe fn register_read16(&self, addr: usize) -> u16 {
        self.record(Event::RegisterRead(addr));
        ptr::read_volatile(addr as *const u16)
    }

    unsafe fn register_read32(&self, addr: usize) -> u32 {
        self.record(Event::RegisterRead(addr));
        ptr::read_volatile(addr as *const u32)
    }

    unsafe fn register_write8(&self, addr: usize, value: u8) {
        self.record(Event::RegisterWrite(addr, value as u32));
        ptr::write_volatile(addr as *mut u8, value)
    }

    unsafe fn register_write16(&self, addr: usize, value: u16) {
        self.record(Event::RegisterWrite(addr, value as u32));
        ptr::write_volatile(addr as *mut u16, value)
    }

    unsafe fn register_write32(&self, addr: usize, value: u32) {
        self.record(Event::RegisterWrite(addr, value));
        ptr::write_volatile(addr as *mut u32, value)
    }

    fn pool_alloc(&self, size: usize) -> Option<NonNull<u8>> {
        self.record(Event::Pool(size));
        if size == 0 || size > self.pool_limit {
            return None;
        }
        Some(self.window(size))
    }

    fn physical_address(&self, virt: *const u8) -> Option<u64> {
        if virt.is_null() {
            None
        } else {
            Some(virt as usize as u64)
        }
    }

    fn map_device_base(
        &self,
        _bus: u32,
        base_pa: u64,
        length: usize,
        port_space: bool,
    ) -> Option<NonNull<u8>> {
        self.record(Event::Map { base_pa, length, port_space });
        if self.failing_maps.get() > 0 {
            self.failing_maps.set(self.failing_maps.get() - 1);
            return None;
        }
        if port_space {
            NonNull::new(base_pa as usize as *mut u8)
        } else {
            Some(self.window(length))
        }
    }

    fn stall_microseconds(&self, us: u64) {
        self.record(Event::Stall(us));
    }
}

/// Page-aligned host memory standing in for the adapter's DMA region.
#[repr(C, align(4096))]
#[derive(Clone, Copy)]
pub struct Page(pub [u8; PAGE_SIZE]);

pub struct DmaRegion {
    pages: Vec<Page>,
}

impl DmaRegion {
    /// `count` pages filled with a non-zero pattern.
    pub fn new(count: usize) -> Self {
        Self {
            pages: vec![Page([0xA5; PAGE_SIZE]); count],
        }
    }

    pub fn base(&mut self) -> NonNull<u8> {
        NonNull::new(self.pages.as_mut_ptr() as *mut u8).unwrap()
    }

    pub fn size(&self) -> usize {
        self.pages.len() * PAGE_SIZE
    }
}

/// A 64-byte type 0 header with virtio-scsi IDs and the given BAR registers.
pub fn config_header(bars: [u32; 6]) -> Vec<u8> {
    let mut raw = vec![0u8; 64];
    raw[0x00..0x02].copy_from_slice(&0x1AF4u16.to_ne_bytes());
    raw[0x02..0x04].copy_from_slice(&0x1048u16.to_ne_bytes());
    raw[0x06..0x08].copy_from_slice(&0x0010u16.to_ne_bytes());
    raw[0x34] = 0x98;
    raw[0x3C] = 10;
    raw[0x3D] = 1;
    for (i, bar) in bars.iter().enumerate() {
        let at = 0x10 + i * 4;
        raw[at..at + 4].copy_from_slice(&bar.to_ne_bytes());
    }
    raw
}

/// Build a context over `region`.
pub fn context(region: &mut DmaRegion, config: &[u8], bars: BarTable, msix: bool) -> AdapterContext {
    let size = region.size();
    let config = AdapterConfig {
        dma_base: region.base(),
        dma_size: size,
        config_space: config,
        bars,
        system_io_bus_number: 0,
        msix_enabled: msix,
    };
    unsafe { AdapterContext::new(config).unwrap() }
}
