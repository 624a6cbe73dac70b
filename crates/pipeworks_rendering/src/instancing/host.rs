//! Host-visible memory contract.
//!
//! The rendering backend owns the device; this crate only needs four things from
//! it: allocate a block, write bytes at an offset, flush a written range, and
//! release the block (on `Drop`). [`HeapAllocator`] implements the contract in
//! process memory for headless runs and tests.

use std::ops::Range;

use crate::error::InstanceError;

/// Flushed ranges a [`HeapBuffer`] keeps before coalescing its log.
pub const FLUSH_LOG_LIMIT: usize = 256;

/// A block of host-visible memory, addressed by byte offset.
pub trait HostBuffer {
    /// Size in bytes.
    fn len(&self) -> usize;

    /// Returns true for a zero-sized block.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads a byte range.
    ///
    /// # Panics
    ///
    /// Implementations panic on an out-of-range read, like slice indexing.
    fn bytes(&self, range: Range<usize>) -> &[u8];

    /// Writes `bytes` starting at `offset`.
    ///
    /// # Panics
    ///
    /// Implementations panic on an out-of-range write, like slice indexing.
    fn write(&mut self, offset: usize, bytes: &[u8]);

    /// Makes a written range visible to the device.
    fn flush(&mut self, range: Range<usize>);
}

/// Source of host-visible blocks. Typically a cheap handle to the device.
pub trait BufferAllocator {
    /// Block type handed out by this allocator.
    type Buffer: HostBuffer;

    /// Allocates a zeroed block of `len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`InstanceError::AllocationFailed`] when the memory is unavailable.
    fn allocate(&mut self, len: usize) -> Result<Self::Buffer, InstanceError>;
}

/// Allocator backed by process memory.
#[derive(Clone, Debug, Default)]
pub struct HeapAllocator {
    /// Largest single allocation allowed, if limited.
    max_bytes: Option<usize>,
    /// Blocks handed out so far.
    allocations: u64,
}

impl HeapAllocator {
    /// Creates an unlimited allocator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_bytes: None,
            allocations: 0,
        }
    }

    /// Creates an allocator that refuses blocks larger than `max_bytes`.
    #[must_use]
    pub const fn with_limit(max_bytes: usize) -> Self {
        Self {
            max_bytes: Some(max_bytes),
            allocations: 0,
        }
    }

    /// Blocks handed out by this allocator (clones count separately).
    #[must_use]
    pub const fn allocations(&self) -> u64 {
        self.allocations
    }
}

impl BufferAllocator for HeapAllocator {
    type Buffer = HeapBuffer;

    fn allocate(&mut self, len: usize) -> Result<HeapBuffer, InstanceError> {
        if self.max_bytes.is_some_and(|max| len > max) {
            return Err(InstanceError::AllocationFailed { bytes: len });
        }
        self.allocations += 1;
        Ok(HeapBuffer {
            bytes: vec![0; len],
            flushed: Vec::new(),
            generation: self.allocations,
        })
    }
}

/// Block of process memory that logs flushed ranges.
///
/// The log holds at most [`FLUSH_LOG_LIMIT`] entries. A full log collapses into
/// the single range covering all of them, so it never shrinks what was flushed.
#[derive(Clone, Debug)]
pub struct HeapBuffer {
    bytes: Vec<u8>,
    flushed: Vec<Range<usize>>,
    generation: u64,
}

impl HeapBuffer {
    /// Allocation number from the allocator that created this block.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Ranges flushed since the last [`take_flushed`](Self::take_flushed).
    #[must_use]
    pub fn flushed(&self) -> &[Range<usize>] {
        &self.flushed
    }

    /// Drains the flushed-range log.
    pub fn take_flushed(&mut self) -> Vec<Range<usize>> {
        std::mem::take(&mut self.flushed)
    }

    /// Whole block as bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl HostBuffer for HeapBuffer {
    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn bytes(&self, range: Range<usize>) -> &[u8] {
        &self.bytes[range]
    }

    fn write(&mut self, offset: usize, bytes: &[u8]) {
        self.bytes[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    fn flush(&mut self, range: Range<usize>) {
        debug_assert!(range.end <= self.bytes.len(), "flush past end of block");
        if self.flushed.len() >= FLUSH_LOG_LIMIT {
            let start = self.flushed.iter().map(|r| r.start).fold(range.start, usize::min);
            let end = self.flushed.iter().map(|r| r.end).fold(range.end, usize::max);
            self.flushed.clear();
            self.flushed.push(start..end);
        } else {
            self.flushed.push(range);
        }
    }
}
