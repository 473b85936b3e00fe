//! Buffer pool for per-record scratch.
//!
//! Formatted and structured records are assembled on the producer thread
//! into a pooled buffer, handed to the writer, and returned to the pool once
//! the bytes have been copied into the batch. The pool is a process-wide
//! service shared by every logger; buckets use `crossbeam-queue` free lists
//! so producers and the writer never contend on a lock.

use crossbeam_queue::SegQueue;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, OnceLock};

const SMALL_BUFFER_SIZE: usize = 512;
const STANDARD_BUFFER_SIZE: usize = 2048;
const JUMBO_BUFFER_SIZE: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferSize {
    Small,
    Standard,
    Jumbo,
}

impl BufferSize {
    pub const fn size(self) -> usize {
        match self {
            BufferSize::Small => SMALL_BUFFER_SIZE,
            BufferSize::Standard => STANDARD_BUFFER_SIZE,
            BufferSize::Jumbo => JUMBO_BUFFER_SIZE,
        }
    }

    /// Bucket for a payload of `payload_len` bytes; None means too large to pool.
    pub fn for_payload(payload_len: usize) -> Option<Self> {
        if payload_len <= SMALL_BUFFER_SIZE {
            Some(Self::Small)
        } else if payload_len <= STANDARD_BUFFER_SIZE {
            Some(Self::Standard)
        } else if payload_len <= JUMBO_BUFFER_SIZE {
            Some(Self::Jumbo)
        } else {
            None
        }
    }
}

/// A scratch buffer that returns itself to its pool when dropped.
pub struct PooledBuf {
    buf: Vec<u8>,
    pooled: bool,
    pool: Arc<BufferPool>,
}

impl Deref for PooledBuf {
    type Target = Vec<u8>;
    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}

impl DerefMut for PooledBuf {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buf
    }
}

impl Drop for PooledBuf {
    fn drop(&mut self) {
        if self.pooled {
            self.pool.release(std::mem::take(&mut self.buf));
        }
    }
}

/// The lock-free pool manager, one free list per bucket.
pub struct BufferPool {
    free_small: SegQueue<Vec<u8>>,
    free_standard: SegQueue<Vec<u8>>,
    free_jumbo: SegQueue<Vec<u8>>,
}

impl BufferPool {
    pub fn new() -> BufferPool {
        BufferPool {
            free_small: SegQueue::new(),
            free_standard: SegQueue::new(),
            free_jumbo: SegQueue::new(),
        }
    }

    /// The process-wide pool, created on first use.
    pub fn shared() -> Arc<BufferPool> {
        static SHARED: OnceLock<Arc<BufferPool>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(BufferPool::new())))
    }

    /// Acquire an empty buffer sized for `payload_len` bytes.
    ///
    /// Requests above the largest bucket get a fresh unpooled allocation
    /// that is simply freed on drop.
    pub fn acquire(self: &Arc<Self>, payload_len: usize) -> PooledBuf {
        match BufferSize::for_payload(payload_len) {
            Some(size) => {
                let buf = self
                    .queue(size)
                    .pop()
                    .unwrap_or_else(|| Vec::with_capacity(size.size()));
                PooledBuf {
                    buf,
                    pooled: true,
                    pool: Arc::clone(self),
                }
            }
            None => PooledBuf {
                buf: Vec::with_capacity(payload_len),
                pooled: false,
                pool: Arc::clone(self),
            },
        }
    }

    /// Number of free buffers in a bucket.
    pub fn available(&self, size: BufferSize) -> usize {
        self.queue(size).len()
    }

    fn queue(&self, size: BufferSize) -> &SegQueue<Vec<u8>> {
        match size {
            BufferSize::Small => &self.free_small,
            BufferSize::Standard => &self.free_standard,
            BufferSize::Jumbo => &self.free_jumbo,
        }
    }

    /// Return a buffer to the bucket matching its capacity.
    ///
    /// A buffer that grew past its bucket while a record was rendered no
    /// longer matches any bucket exactly and is dropped instead of pooled.
    fn release(&self, mut buf: Vec<u8>) {
        let size = match buf.capacity() {
            SMALL_BUFFER_SIZE => BufferSize::Small,
            STANDARD_BUFFER_SIZE => BufferSize::Standard,
            JUMBO_BUFFER_SIZE => BufferSize::Jumbo,
            _ => return,
        };
        buf.clear();
        self.queue(size).push(buf);
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_selection() {
        assert_eq!(BufferSize::for_payload(0), Some(BufferSize::Small));
        assert_eq!(BufferSize::for_payload(512), Some(BufferSize::Small));
        assert_eq!(BufferSize::for_payload(513), Some(BufferSize::Standard));
        assert_eq!(BufferSize::for_payload(2048), Some(BufferSize::Standard));
        assert_eq!(BufferSize::for_payload(4096), Some(BufferSize::Jumbo));
        assert_eq!(BufferSize::for_payload(4097), None);
    }

    #[test]
    fn test_acquire_and_reuse() {
        let pool = Arc::new(BufferPool::new());
        {
            let mut buf = pool.acquire(100);
            buf.extend_from_slice(b"hello");
        }
        assert_eq!(pool.available(BufferSize::Small), 1);

        let buf = pool.acquire(100);
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), BufferSize::Small.size());
        assert_eq!(pool.available(BufferSize::Small), 0);
    }

    #[test]
    fn test_oversized_is_unpooled() {
        let pool = Arc::new(BufferPool::new());
        {
            let buf = pool.acquire(10_000);
            assert!(buf.capacity() >= 10_000);
        }
        assert_eq!(pool.available(BufferSize::Small), 0);
        assert_eq!(pool.available(BufferSize::Standard), 0);
        assert_eq!(pool.available(BufferSize::Jumbo), 0);
    }

    #[test]
    fn test_grown_buffer_not_repooled() {
        let pool = Arc::new(BufferPool::new());
        {
            let mut buf = pool.acquire(100);
            // force a reallocation past the bucket capacity
            buf.extend_from_slice(&[0u8; 2 * SMALL_BUFFER_SIZE]);
        }
        assert_eq!(pool.available(BufferSize::Small), 0);
    }

    #[test]
    fn test_shared_pool_is_singleton() {
        let a = BufferPool::shared();
        let b = BufferPool::shared();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
