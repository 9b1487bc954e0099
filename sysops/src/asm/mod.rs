//! Raw hardware primitives.
//!
//! Thin wrappers over the instructions the bare-metal platform is built on.
//! Nothing above `platform::bare` should call these directly.
//!
//! # Module Organization
//! - `pio` - x86 `in`/`out` port I/O
//! - `mmio` - volatile register loads/stores
//! - `tsc` - time stamp counter

pub mod mmio;
pub mod pio;
pub mod tsc;
