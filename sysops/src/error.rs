//! Error types for adapter and platform construction.
//!
//! The operation table itself never returns these: it reports failure through
//! `None`, a zero length or `VIRTIO_MSI_NO_VECTOR`.

use core::fmt;

use dma_pool::DmaError;

pub type Result<T> = core::result::Result<T, SysOpsError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysOpsError {
    /// DMA region or pool region rejected by the arena.
    Dma(DmaError),
    /// Captured configuration space is shorter than the type 0 header.
    ConfigSpaceTooSmall(usize),
}

impl fmt::Display for SysOpsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SysOpsError::Dma(err) => write!(f, "DMA region: {}", err),
            SysOpsError::ConfigSpaceTooSmall(len) => {
                write!(f, "PCI config snapshot too small: {} bytes", len)
            }
        }
    }
}

impl From<DmaError> for SysOpsError {
    fn from(err: DmaError) -> Self {
        SysOpsError::Dma(err)
    }
}
