//! Fixed-capacity ring buffer for audio streaming.
//!
//! A decode thread writes samples and an audio callback reads them. When a
//! write would overflow, the oldest unread samples are overwritten so the
//! producer never waits on the consumer.

#![allow(clippy::unwrap_used)] // Tests use unwrap for brevity

use std::sync::Arc;

use parking_lot::Mutex;

/// Cursor state guarded by the buffer's lock.
struct Inner {
    /// The underlying sample storage.
    storage: Box<[f32]>,
    /// Next slot to write.
    write_pos: usize,
    /// Next slot to read.
    read_pos: usize,
    /// Occupied slots, always `<= capacity`.
    count: usize,
    /// Samples discarded by overflow since creation.
    overwritten: u64,
}

/// Overwrite-on-full circular sample buffer.
///
/// All operations take one short lock around the cursor update and copy, and
/// never block on the other side's progress.
pub struct RingBuffer {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl RingBuffer {
    /// Create a new ring buffer holding `capacity` samples (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);

        Self {
            inner: Mutex::new(Inner {
                storage: vec![0.0f32; capacity].into_boxed_slice(),
                write_pos: 0,
                read_pos: 0,
                count: 0,
                overwritten: 0,
            }),
            capacity,
        }
    }

    /// Get the buffer capacity.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the number of samples available for reading.
    pub fn size(&self) -> usize {
        self.inner.lock().count
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Total samples lost to overflow.
    pub fn overwritten(&self) -> u64 {
        self.inner.lock().overwritten
    }

    /// Append samples, overwriting the oldest unread ones on overflow.
    pub fn put(&self, samples: &[f32]) {
        if samples.is_empty() {
            return;
        }

        let capacity = self.capacity;
        let mut inner = self.inner.lock();

        let total = inner.count + samples.len();
        let lost = total.saturating_sub(capacity);

        // Only the newest `capacity` samples can survive this write.
        let skip = samples.len().saturating_sub(capacity);
        let samples = &samples[skip..];
        let start = (inner.write_pos + skip) % capacity;

        let first_chunk = samples.len().min(capacity - start);
        inner.storage[start..start + first_chunk].copy_from_slice(&samples[..first_chunk]);
        let rest = samples.len() - first_chunk;
        if rest > 0 {
            inner.storage[..rest].copy_from_slice(&samples[first_chunk..]);
        }

        inner.write_pos = (start + samples.len()) % capacity;
        inner.count = total.min(capacity);

        if lost > 0 {
            inner.read_pos = (inner.write_pos + capacity - inner.count) % capacity;
            inner.overwritten += lost as u64;
        }
    }

    /// Remove and return the oldest sample, or silence if the buffer is empty.
    pub fn get(&self) -> f32 {
        let mut inner = self.inner.lock();
        if inner.count == 0 {
            return 0.0;
        }

        let sample = inner.storage[inner.read_pos];
        inner.read_pos = (inner.read_pos + 1) % self.capacity;
        inner.count -= 1;
        sample
    }

    /// Move up to `output.len()` of the oldest samples into `output`.
    ///
    /// Returns the number of samples read; the rest of `output` is untouched.
    pub fn read(&self, output: &mut [f32]) -> usize {
        let capacity = self.capacity;
        let mut inner = self.inner.lock();

        let to_read = output.len().min(inner.count);
        if to_read == 0 {
            return 0;
        }

        let start = inner.read_pos;
        let first_chunk = to_read.min(capacity - start);
        output[..first_chunk].copy_from_slice(&inner.storage[start..start + first_chunk]);
        let rest = to_read - first_chunk;
        if rest > 0 {
            output[first_chunk..to_read].copy_from_slice(&inner.storage[..rest]);
        }

        inner.read_pos = (start + to_read) % capacity;
        inner.count -= to_read;
        to_read
    }

    /// Discard all unread samples.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.read_pos = inner.write_pos;
        inner.count = 0;
    }
}

/// Thread-safe reference to a ring buffer.
pub type SharedRingBuffer = Arc<RingBuffer>;

/// Create a new shared ring buffer.
pub fn shared_ring_buffer(capacity: usize) -> SharedRingBuffer {
    Arc::new(RingBuffer::new(capacity))
}
