use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crossbeam_utils::CachePadded;
use parking_lot::{Condvar, Mutex};

use super::ring::RingBuffer;
use crate::error::Error;

/// One broadcast channel: a ring buffer, a monotonic byte counter, and the
/// wait queue for blocked readers.
///
/// ### Concurrency design
/// - The mutex guards the buffer, its write index, and the counter as one
///   unit; every mutation happens under it. Channels never share a lock, so
///   traffic on one channel cannot contend with another.
/// - `written` is additionally kept in an atomic so readiness probes can
///   load it without taking the lock. It is only ever stored while the lock
///   is held, which makes the lock-free load a benign hint that the blocking
///   paths re-check.
/// - Readers wait on the condvar with the predicate `offset != written`,
///   re-evaluated after every wake. Appends wake with `notify_all` since any
///   number of readers may be parked on one append.
pub(crate) struct Channel {
    id: usize,
    capacity: usize,
    /// Total bytes ever appended, the coordinate system reader offsets live
    /// in. Stored only under the `ring` lock; padded so neighboring channels
    /// in the table do not false-share the hot counter.
    written: CachePadded<AtomicU64>,
    /// `None` until the first attach commits the storage. Never freed after
    /// that for the table's lifetime.
    ring: Mutex<Option<RingBuffer>>,
    readers: Condvar,
}

impl Channel {
    pub(crate) fn new(id: usize, capacity: usize) -> Self {
        Self {
            id,
            capacity,
            written: CachePadded::new(AtomicU64::new(0)),
            ring: Mutex::new(None),
            readers: Condvar::new(),
        }
    }

    pub(crate) fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current stream position. Safe to call from any thread without the
    /// lock; the blocking paths re-validate under it.
    pub(crate) fn total_written(&self) -> u64 {
        self.written.load(Ordering::Acquire)
    }

    /// Commits the channel's storage if none exists yet and returns the
    /// stream position observed under the lock, which is the attach offset
    /// for a new cursor. First attach pays the allocation; later attaches
    /// only take the lock.
    pub(crate) fn ensure_buffer(&self) -> Result<u64, Error> {
        let mut ring = self.ring.lock();
        if ring.is_none() {
            *ring = Some(RingBuffer::with_capacity(self.capacity)?);
        }
        Ok(self.written.load(Ordering::Acquire))
    }

    /// Appends up to a quarter of the buffer capacity and wakes every
    /// waiting reader. Never blocks on readers or data.
    ///
    /// The quarter cap bounds how long one call holds the lock and feeds
    /// waiting readers in small chunks; callers loop for the remainder.
    /// Returns the number of bytes accepted.
    pub(crate) fn append(&self, data: &[u8]) -> usize {
        let n = data.len().min(self.capacity / 4);
        if n == 0 {
            return 0;
        }

        {
            let mut ring = self.ring.lock();
            let ring = ring
                .as_mut()
                .expect("storage is committed when the writer handle is created");
            ring.write(&data[..n]);
            self.written.fetch_add(n as u64, Ordering::Release);
        }

        // Wake after dropping the lock so woken readers can take it at once.
        self.readers.notify_all();
        n
    }

    /// Blocking read of the next window after `offset`. Parks the caller
    /// until the writer moves past `offset` or an interrupt is delivered.
    pub(crate) fn read_blocking(
        &self,
        offset: u64,
        max_len: usize,
        interrupted: &AtomicBool,
    ) -> Result<Vec<u8>, Error> {
        if max_len == 0 {
            return Err(Error::InvalidArgument);
        }

        let mut ring = self.ring.lock();
        // Wakeups are broadcast and not 1:1 with appends, so the predicate
        // must be re-checked after every wake.
        while self.written.load(Ordering::Acquire) == offset {
            if interrupted.swap(false, Ordering::AcqRel) {
                return Err(Error::Interrupted);
            }
            self.readers.wait(&mut ring);
        }
        self.copy_window(&ring, offset, max_len)
    }

    /// Like `read_blocking` but gives up at the deadline. `Ok(None)` is the
    /// timeout case and only that.
    pub(crate) fn read_deadline(
        &self,
        offset: u64,
        max_len: usize,
        interrupted: &AtomicBool,
        timeout: Duration,
    ) -> Result<Option<Vec<u8>>, Error> {
        if max_len == 0 {
            return Err(Error::InvalidArgument);
        }
        let deadline = Instant::now() + timeout;

        let mut ring = self.ring.lock();
        while self.written.load(Ordering::Acquire) == offset {
            if interrupted.swap(false, Ordering::AcqRel) {
                return Err(Error::Interrupted);
            }
            if self.readers.wait_until(&mut ring, deadline).timed_out() {
                return Ok(None);
            }
        }
        self.copy_window(&ring, offset, max_len).map(Some)
    }

    /// Non-blocking variant: `Ok(None)` when nothing past `offset` exists.
    pub(crate) fn try_read_at(
        &self,
        offset: u64,
        max_len: usize,
    ) -> Result<Option<Vec<u8>>, Error> {
        if max_len == 0 {
            return Err(Error::InvalidArgument);
        }
        let ring = self.ring.lock();
        if self.written.load(Ordering::Acquire) == offset {
            return Ok(None);
        }
        self.copy_window(&ring, offset, max_len).map(Some)
    }

    /// Copies the next `min(max_len, available)` bytes after `offset` out of
    /// the ring. Caller holds the lock and has established that data exists.
    fn copy_window(
        &self,
        ring: &Option<RingBuffer>,
        offset: u64,
        max_len: usize,
    ) -> Result<Vec<u8>, Error> {
        let written = self.written.load(Ordering::Acquire);
        debug_assert!(offset <= written);

        let available = written - offset;
        if available > self.capacity as u64 {
            // The window starting at `offset` has been partly overwritten.
            // Leave the cursor alone so the caller can pick a recovery.
            return Err(Error::Overrun);
        }

        let n = (max_len as u64).min(available) as usize;
        let ring = ring
            .as_ref()
            .expect("storage is committed when a cursor attaches");
        let mut out = vec![0u8; n];
        ring.read_window(available as usize, &mut out)?;
        Ok(out)
    }

    /// Delivers an interrupt to one reader's flag and wakes the wait queue.
    ///
    /// The store happens under the channel lock so it cannot slip between a
    /// reader's flag check and its sleep; the wake itself is broadcast and
    /// uninvolved readers simply re-check their predicates and park again.
    pub(crate) fn interrupt(&self, flag: &AtomicBool) {
        let guard = self.ring.lock();
        flag.store(true, Ordering::Release);
        drop(guard);
        self.readers.notify_all();
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("id", &self.id)
            .field("capacity", &self.capacity)
            .field("total_written", &self.total_written())
            .field("allocated", &self.ring.lock().is_some())
            .finish_non_exhaustive()
    }
}
