//! Zeroed backing-store allocation for instruction and data memory.

use std::fmt;

use crate::api::LoadError;

/// Memory regions owned by a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryRegion {
    /// Program bytes fetched by the execution engine.
    Instruction,
    /// Data memory. No current opcode addresses it.
    Data,
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instruction => f.write_str("instruction memory"),
            Self::Data => f.write_str("data memory"),
        }
    }
}

/// Allocates a zero-filled region of exactly `len` bytes.
///
/// # Errors
///
/// Returns [`LoadError::AllocationFailed`] when the allocator cannot
/// satisfy the request.
pub fn allocate_zeroed(len: usize, region: MemoryRegion) -> Result<Box<[u8]>, LoadError> {
    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(len)
        .map_err(|_| LoadError::AllocationFailed { region, len })?;
    bytes.resize(len, 0);
    Ok(bytes.into_boxed_slice())
}

/// Allocates a region holding a copy of `source`.
///
/// # Errors
///
/// Returns [`LoadError::AllocationFailed`] when the allocator cannot
/// satisfy the request.
pub fn allocate_copy(source: &[u8], region: MemoryRegion) -> Result<Box<[u8]>, LoadError> {
    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(source.len())
        .map_err(|_| LoadError::AllocationFailed {
            region,
            len: source.len(),
        })?;
    bytes.extend_from_slice(source);
    Ok(bytes.into_boxed_slice())
}
