//! MSI-X vector assignment.
//!
//! Vector 0 is left for the configuration-change path; queue `n` uses vector
//! `n + 1`. Without MSI-X every source gets [`VIRTIO_MSI_NO_VECTOR`] and the
//! driver falls back to the shared line interrupt.

/// Written to a virtio vector register to mean "no vector assigned".
pub const VIRTIO_MSI_NO_VECTOR: u16 = 0xFFFF;

/// Interrupt source a vector is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorTarget {
    /// Virtqueue with this index.
    Queue(u32),
    /// Device configuration change.
    ConfigChange,
}

impl VectorTarget {
    /// Decode the raw queue argument of the operation table.
    ///
    /// Any negative value is the configuration-change sentinel.
    #[inline]
    pub fn from_raw(queue: i32) -> Self {
        match u32::try_from(queue) {
            Ok(index) => VectorTarget::Queue(index),
            Err(_) => VectorTarget::ConfigChange,
        }
    }
}

/// Vector for `target` given the adapter's interrupt mode.
///
/// A queue whose vector would not fit below the sentinel gets no vector.
pub fn msix_vector(target: VectorTarget, msix_enabled: bool) -> u16 {
    match target {
        VectorTarget::Queue(index) if msix_enabled => index
            .checked_add(1)
            .and_then(|v| u16::try_from(v).ok())
            .unwrap_or(VIRTIO_MSI_NO_VECTOR),
        _ => VIRTIO_MSI_NO_VECTOR,
    }
}
