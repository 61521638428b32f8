//! Error type for buffer allocation.

/// Errors surfaced by buffer construction and geometric transforms.
///
/// Drawing operations never fail; only acquiring backing storage can.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    #[error("Cannot allocate a {width}x{height} pixel buffer")]
    AllocationFailed { width: u32, height: u32 },
}
