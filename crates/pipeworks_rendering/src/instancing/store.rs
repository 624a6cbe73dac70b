//! # Double-Ended Instance Store
//!
//! One host-visible block holding two independent record ranges:
//!
//! ```text
//! offset 0                                              capacity
//! ├── left (segments) ──►          free          ◄── right (balls) ──┤
//! [ L0 | L1 | L2 | .......................... | R2 | R1 | R0 ]
//! ```
//!
//! When a push finds no free slot the block is replaced by one twice as large. The
//! left range is copied to the new block's start and the right range to its end, so
//! each record keeps its distance from its own end. Callers hold offsets, never
//! addresses: the block moves on every growth.

use std::marker::PhantomData;
use std::ops::Range;

use bytemuck::Pod;

use super::host::{BufferAllocator, HostBuffer};
use crate::error::InstanceError;

/// A run of records, in record units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InstanceRange {
    /// First record.
    pub offset: usize,
    /// Number of records.
    pub count: usize,
}

impl InstanceRange {
    /// One past the last record.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> usize {
        self.offset + self.count
    }

    /// Returns true if the range holds no records.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Byte range for records of `record_size` bytes.
    #[inline]
    #[must_use]
    pub const fn byte_range(&self, record_size: usize) -> Range<usize> {
        self.offset * record_size..self.end() * record_size
    }

    /// Returns true if the two ranges share a record.
    #[inline]
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        !self.is_empty() && !other.is_empty() && self.offset < other.end() && other.offset < self.end()
    }
}

/// Growable store of `T` records addressed from both ends of one block.
pub struct InstanceStore<T, A: BufferAllocator> {
    allocator: A,
    buffer: A::Buffer,
    capacity: usize,
    left_count: usize,
    right_count: usize,
    grow_count: u32,
    _record: PhantomData<T>,
}

impl<T: Pod, A: BufferAllocator> InstanceStore<T, A> {
    /// Size of one record in bytes.
    pub const RECORD_SIZE: usize = std::mem::size_of::<T>();

    /// Creates an empty store with room for `capacity` records.
    ///
    /// # Errors
    ///
    /// [`InstanceError::ZeroCapacity`], [`InstanceError::CapacityOverflow`], or the
    /// allocator's failure.
    pub fn new(mut allocator: A, capacity: usize) -> Result<Self, InstanceError> {
        if capacity == 0 {
            return Err(InstanceError::ZeroCapacity);
        }
        let buffer = allocator.allocate(Self::bytes_for(capacity)?)?;
        Ok(Self {
            allocator,
            buffer,
            capacity,
            left_count: 0,
            right_count: 0,
            grow_count: 0,
            _record: PhantomData,
        })
    }

    fn bytes_for(records: usize) -> Result<usize, InstanceError> {
        records
            .checked_mul(Self::RECORD_SIZE)
            .ok_or(InstanceError::CapacityOverflow { records })
    }

    /// Capacity in records.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records stored on the left.
    #[inline]
    #[must_use]
    pub const fn left_count(&self) -> usize {
        self.left_count
    }

    /// Records stored on the right.
    #[inline]
    #[must_use]
    pub const fn right_count(&self) -> usize {
        self.right_count
    }

    /// Records stored at both ends.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.left_count + self.right_count
    }

    /// Returns true if nothing has been pushed.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of times the block has been replaced.
    #[inline]
    #[must_use]
    pub const fn grow_count(&self) -> u32 {
        self.grow_count
    }

    /// Left range: `offset = 0`, `count = left_count`.
    #[inline]
    #[must_use]
    pub const fn left_range(&self) -> InstanceRange {
        InstanceRange {
            offset: 0,
            count: self.left_count,
        }
    }

    /// Right range: `offset = capacity - right_count`, `count = right_count`.
    #[inline]
    #[must_use]
    pub const fn right_range(&self) -> InstanceRange {
        InstanceRange {
            offset: self.capacity - self.right_count,
            count: self.right_count,
        }
    }

    /// The current backing block. Do not keep addresses into it across pushes.
    #[must_use]
    pub fn buffer(&self) -> &A::Buffer {
        &self.buffer
    }

    /// Mutable access to the backing block (e.g. to drain a flush log).
    pub fn buffer_mut(&mut self) -> &mut A::Buffer {
        &mut self.buffer
    }

    /// Appends a record to the left range, growing first if the store is full.
    ///
    /// Returns the record offset.
    ///
    /// # Errors
    ///
    /// Only growth failures: overflow or allocation.
    pub fn push_left(&mut self, value: T) -> Result<usize, InstanceError> {
        self.reserve_one()?;
        let offset = self.left_count;
        self.write_record(offset, &value);
        self.left_count += 1;
        Ok(offset)
    }

    /// Overwrites the most recently pushed left record.
    ///
    /// # Errors
    ///
    /// [`InstanceError::EmptyRange`] if the left range is empty.
    pub fn update_left(&mut self, value: T) -> Result<usize, InstanceError> {
        let offset = self
            .left_count
            .checked_sub(1)
            .ok_or(InstanceError::EmptyRange)?;
        self.write_record(offset, &value);
        Ok(offset)
    }

    /// Appends a record to the right range, growing first if the store is full.
    ///
    /// Returns the record offset.
    ///
    /// # Errors
    ///
    /// Only growth failures: overflow or allocation.
    pub fn push_right(&mut self, value: T) -> Result<usize, InstanceError> {
        self.reserve_one()?;
        let offset = self.capacity - self.right_count - 1;
        self.write_record(offset, &value);
        self.right_count += 1;
        Ok(offset)
    }

    /// Replaces the block with one of `new_capacity` records, keeping both ranges
    /// anchored to their ends.
    ///
    /// # Errors
    ///
    /// [`InstanceError::CapacityBelowLive`] if the live records would not fit,
    /// [`InstanceError::ZeroCapacity`], overflow, or the allocator's failure. On
    /// error the store is unchanged.
    pub fn grow(&mut self, new_capacity: usize) -> Result<(), InstanceError> {
        if new_capacity == 0 {
            return Err(InstanceError::ZeroCapacity);
        }
        if new_capacity < self.len() {
            return Err(InstanceError::CapacityBelowLive {
                requested: new_capacity,
                live: self.len(),
            });
        }

        let mut next = self.allocator.allocate(Self::bytes_for(new_capacity)?)?;

        let left = self.left_range().byte_range(Self::RECORD_SIZE);
        if !left.is_empty() {
            next.write(0, self.buffer.bytes(left.clone()));
            next.flush(left);
        }

        let old_right = self.right_range().byte_range(Self::RECORD_SIZE);
        if !old_right.is_empty() {
            let new_right = InstanceRange {
                offset: new_capacity - self.right_count,
                count: self.right_count,
            }
            .byte_range(Self::RECORD_SIZE);
            next.write(new_right.start, self.buffer.bytes(old_right));
            next.flush(new_right);
        }

        tracing::debug!(
            from = self.capacity,
            to = new_capacity,
            left = self.left_count,
            right = self.right_count,
            "instance store grown"
        );

        // The old block is released here.
        self.buffer = next;
        self.capacity = new_capacity;
        self.grow_count += 1;
        Ok(())
    }

    /// Reads the record at `offset`.
    ///
    /// Returns `None` for an offset outside both live ranges.
    #[must_use]
    pub fn record(&self, offset: usize) -> Option<T> {
        let live = offset < self.left_count
            || (offset >= self.capacity - self.right_count && offset < self.capacity);
        live.then(|| self.read_record(offset))
    }

    /// Left records in offset order.
    #[must_use]
    pub fn left_records(&self) -> Vec<T> {
        self.read_range(self.left_range())
    }

    /// Right records in offset order (most recently pushed first).
    #[must_use]
    pub fn right_records(&self) -> Vec<T> {
        self.read_range(self.right_range())
    }

    fn reserve_one(&mut self) -> Result<(), InstanceError> {
        if self.len() == self.capacity {
            let doubled = self
                .capacity
                .checked_mul(2)
                .ok_or(InstanceError::CapacityOverflow {
                    records: self.capacity,
                })?;
            self.grow(doubled)?;
        }
        debug_assert!(self.len() < self.capacity);
        Ok(())
    }

    fn write_record(&mut self, offset: usize, value: &T) {
        let bytes = InstanceRange { offset, count: 1 }.byte_range(Self::RECORD_SIZE);
        self.buffer.write(bytes.start, bytemuck::bytes_of(value));
        self.buffer.flush(bytes);
    }

    fn read_record(&self, offset: usize) -> T {
        let bytes = InstanceRange { offset, count: 1 }.byte_range(Self::RECORD_SIZE);
        bytemuck::pod_read_unaligned(self.buffer.bytes(bytes))
    }

    fn read_range(&self, range: InstanceRange) -> Vec<T> {
        (range.offset..range.end())
            .map(|offset| self.read_record(offset))
            .collect()
    }
}

impl<T, A: BufferAllocator> std::fmt::Debug for InstanceStore<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceStore")
            .field("capacity", &self.capacity)
            .field("left_count", &self.left_count)
            .field("right_count", &self.right_count)
            .field("grow_count", &self.grow_count)
            .finish_non_exhaustive()
    }
}
