//! PCI configuration and resource access.
//!
//! Nothing here talks to the bus: the configuration header is a snapshot the
//! driver captured at attach time, and BAR mappings come from the platform.

pub mod bar;
pub mod config;
