//! Recording platform and log capture for unit tests.

extern crate std;

use core::cell::{Cell, RefCell};
use core::ptr::NonNull;
use std::string::String;
use std::sync::{Mutex, Once};
use std::thread::{self, ThreadId};
use std::vec::Vec;

use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::platform::Platform;

/// One primitive call seen by [`RecordingPlatform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    PortRead { port: u16, width: u8 },
    PortWrite { port: u16, width: u8, value: u32 },
    RegisterRead { addr: usize, width: u8 },
    RegisterWrite { addr: usize, width: u8, value: u32 },
    PoolAlloc { size: usize },
    Map { bus: u32, base_pa: u64, length: usize, port_space: bool },
    Stall { us: u64 },
}

/// Platform that logs every call and never touches hardware.
///
/// Mapped memory BARs appear at `MAP_OFFSET + base_pa`; I/O BARs at their
/// port number. The first `fail_maps` mapping requests fail.
pub struct RecordingPlatform {
    accesses: RefCell<Vec<Access>>,
    fail_maps: Cell<u32>,
}

impl RecordingPlatform {
    pub const MAP_OFFSET: usize = 0x7F00_0000_0000;
    pub const POOL_BASE: usize = 0x5000_0000;
    pub const REGISTER_VALUE: u32 = 0xA5A5_5A5A;

    pub fn new() -> Self {
        Self {
            accesses: RefCell::new(Vec::new()),
            fail_maps: Cell::new(0),
        }
    }

    pub fn failing_maps(count: u32) -> Self {
        let p = Self::new();
        p.fail_maps.set(count);
        p
    }

    pub fn port_value(port: u16) -> u32 {
        0x0001_0000 | port as u32
    }

    pub fn accesses(&self) -> Vec<Access> {
        self.accesses.borrow().clone()
    }

    pub fn map_calls(&self) -> usize {
        self.accesses
            .borrow()
            .iter()
            .filter(|a| matches!(a, Access::Map { .. }))
            .count()
    }

    fn record(&self, access: Access) {
        self.accesses.borrow_mut().push(access);
    }
}

impl Platform for RecordingPlatform {
    unsafe fn port_read8(&self, port: u16) -> u8 {
        self.record(Access::PortRead { port, width: 8 });
        Self::port_value(port) as u8
    }

    unsafe fn port_read16(&self, port: u16) -> u16 {
        self.record(Access::PortRead { port, width: 16 });
        Self::port_value(port) as u16
    }

    unsafe fn port_read32(&self, port: u16) -> u32 {
        self.record(Access::PortRead { port, width: 32 });
        Self::port_value(port)
    }

    unsafe fn port_write8(&self, port: u16, value: u8) {
        self.record(Access::PortWrite { port, width: 8, value: value as u32 });
    }

    unsafe fn port_write16(&self, port: u16, value: u16) {
        self.record(Access::PortWrite { port, width: 16, value: value as u32 });
    }

    unsafe fn port_write32(&self, port: u16, value: u32) {
        self.record(Access::PortWrite { port, width: 32, value });
    }

    unsafe fn register_read8(&self, addr: usize) -> u8 {
        self.record(Access::RegisterRead { addr, width: 8 });
        Self::REGISTER_VALUE as u8
    }

    unsafe fn register_read16(&self, addr: usize) -> u16 {
        self.record(Access::RegisterRead { addr, width: 16 });
        Self::REGISTER_VALUE as u16
    }

    unsafe fn register_read32(&self, addr: usize) -> u32 {
        self.record(Access::RegisterRead { addr, width: 32 });
        Self::REGISTER_VALUE
    }

    unsafe fn register_write8(&self, addr: usize, value: u8) {
        self.record(Access::RegisterWrite { addr, width: 8, value: value as u32 });
    }

    unsafe fn register_write16(&self, addr: usize, value: u16) {
        self.record(Access::RegisterWrite { addr, width: 16, value: value as u32 });
    }

    unsafe fn register_write32(&self, addr: usize, value: u32) {
        self.record(Access::RegisterWrite { addr, width: 32, value });
    }

    fn pool_alloc(&self, size: usize) -> Option<NonNull<u8>> {
        self.record(Access::PoolAlloc { size });
        if size == 0 {
            return None;
        }
        NonNull::new(Self::POOL_BASE as *mut u8)
    }

    fn physical_address(&self, virt: *const u8) -> Option<u64> {
        (virt as usize).checked_sub(Self::MAP_OFFSET).map(|pa| pa as u64)
    }

    fn map_device_base(
        &self,
        bus: u32,
        base_pa: u64,
        length: usize,
        port_space: bool,
    ) -> Option<NonNull<u8>> {
        self.record(Access::Map { bus, base_pa, length, port_space });
        if self.fail_maps.get() > 0 {
            self.fail_maps.set(self.fail_maps.get() - 1);
            return None;
        }
        let addr = if port_space {
            base_pa as usize
        } else {
            Self::MAP_OFFSET + base_pa as usize
        };
        NonNull::new(addr as *mut u8)
    }

    fn stall_microseconds(&self, us: u64) {
        self.record(Access::Stall { us });
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// LOG CAPTURE
// ═══════════════════════════════════════════════════════════════════════════

/// One log record as seen by [`capture_logs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub level: Level,
    pub target: String,
}

struct CaptureLogger;

static LOGGER: CaptureLogger = CaptureLogger;
static INSTALL: Once = Once::new();
static RECORDS: Mutex<Vec<(ThreadId, Captured)>> = Mutex::new(Vec::new());

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        let captured = Captured {
            level: record.level(),
            target: String::from(record.target()),
        };
        if let Ok(mut records) = RECORDS.lock() {
            records.push((thread::current().id(), captured));
        }
    }

    fn flush(&self) {}
}

/// Install the capturing logger (once per test binary).
///
/// Tests run on separate threads, so [`logs_from_this_thread`] only sees the
/// calling test's records.
pub fn capture_logs() {
    INSTALL.call_once(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Trace);
    });
}

/// Records emitted on the current thread since the logger was installed.
pub fn logs_from_this_thread() -> Vec<Captured> {
    let me = thread::current().id();
    RECORDS
        .lock()
        .unwrap()
        .iter()
        .filter(|(id, _)| *id == me)
        .map(|(_, c)| c.clone())
        .collect()
}
