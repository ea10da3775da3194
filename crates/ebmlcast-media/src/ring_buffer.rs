//! Fixed-capacity ring buffer addressed by absolute stream offsets.
//!
//! The buffer models an ever-growing byte stream of which only the most
//! recent `capacity` bytes are retained. Writers append sequentially; readers
//! ask for `[start, end)` in absolute stream offsets and get a freshly
//! allocated copy, never a view into storage, so a later wrap cannot corrupt
//! a buffer a consumer is still holding.
//!
//! # Invariants
//! - `write_head == total_written % capacity`.
//! - The retained window is `[oldest_retained(), total_written())`, where
//!   `oldest_retained() == total_written().saturating_sub(capacity)`.
//! - No single append or read spans more than `capacity` bytes.

use crate::error::{Error, Result};

/// Circular byte store retaining the tail of a stream.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    storage: Box<[u8]>,
    write_head: usize,
    total_written: u64,
}

impl RingBuffer {
    /// Create a buffer holding at most `capacity` bytes.
    ///
    /// A zero capacity is a configuration error.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::invalid_config(
                "buffer capacity must be a positive integer",
            ));
        }
        Ok(Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            write_head: 0,
            total_written: 0,
        })
    }

    /// Maximum number of bytes retained.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Count of all bytes ever appended since creation or the last reset.
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Absolute offset of the oldest byte still retained.
    pub fn oldest_retained(&self) -> u64 {
        self.total_written.saturating_sub(self.capacity() as u64)
    }

    /// Whether `[start, end)` is fully retained.
    pub fn contains(&self, start: u64, end: u64) -> bool {
        start <= end && start >= self.oldest_retained() && end <= self.total_written
    }

    /// Append `bytes` at the write head, wrapping around the end of storage.
    ///
    /// Fails without writing anything if `bytes` is larger than the buffer.
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        let capacity = self.capacity();
        if bytes.len() > capacity {
            return Err(Error::WriteTooLarge {
                len: bytes.len(),
                capacity,
            });
        }

        tracing::debug!(len = bytes.len(), head = self.write_head, "append");

        let room = capacity - self.write_head;
        if bytes.len() > room {
            tracing::trace!(first = room, second = bytes.len() - room, "split write");
            let (head, tail) = bytes.split_at(room);
            self.storage[self.write_head..].copy_from_slice(head);
            self.storage[..tail.len()].copy_from_slice(tail);
            self.write_head = tail.len();
        } else {
            self.storage[self.write_head..self.write_head + bytes.len()].copy_from_slice(bytes);
            self.write_head = (self.write_head + bytes.len()) % capacity;
        }

        self.total_written += bytes.len() as u64;
        Ok(())
    }

    /// Copy out the retained bytes `[start, end)`.
    ///
    /// Fails if the range is larger than the buffer, or if any part of it
    /// has been overwritten or not written yet.
    pub fn read(&self, start: u64, end: u64) -> Result<Vec<u8>> {
        self.check_size(start, end)?;
        if !self.contains(start, end) {
            return Err(self.out_of_range(start, end));
        }
        self.read_wrapped(start, end)
    }

    /// Copy out `[start, end)` using modulo addressing only.
    ///
    /// Offsets map onto storage as `offset % capacity` regardless of how
    /// many bytes have been written, so the result is only meaningful for
    /// retained ranges. [`RingBuffer::read`] adds that check.
    pub fn read_wrapped(&self, start: u64, end: u64) -> Result<Vec<u8>> {
        let len = self.check_size(start, end)? as usize;
        let capacity = self.capacity();
        let read_head = (start % capacity as u64) as usize;
        let room = capacity - read_head;

        tracing::debug!(start, end, read_head, "read");

        let mut out = Vec::with_capacity(len);
        if len > room {
            tracing::trace!(first = room, second = len - room, "split read");
            out.extend_from_slice(&self.storage[read_head..]);
            out.extend_from_slice(&self.storage[..len - room]);
        } else {
            out.extend_from_slice(&self.storage[read_head..read_head + len]);
        }
        Ok(out)
    }

    /// Rewind counters for a new logical stream, keeping the allocation.
    pub fn reset(&mut self) {
        self.write_head = 0;
        self.total_written = 0;
    }

    fn check_size(&self, start: u64, end: u64) -> Result<u64> {
        if end < start {
            return Err(self.out_of_range(start, end));
        }
        let len = end - start;
        if len > self.capacity() as u64 {
            return Err(Error::ReadTooLarge {
                len,
                capacity: self.capacity(),
            });
        }
        Ok(len)
    }

    fn out_of_range(&self, start: u64, end: u64) -> Error {
        Error::OutOfRange {
            start,
            end,
            oldest: self.oldest_retained(),
            total: self.total_written,
        }
    }
}
