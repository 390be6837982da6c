use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::channel::Channel;
use crate::error::Error;

/// A reader's private cursor into one channel's stream.
///
/// The cursor starts at the stream position current when it attached, so a
/// reader sees only data appended afterwards. It advances exclusively
/// through this handle's own read calls; neither the writer nor other
/// readers ever move it. Dropping the reader detaches it and has no effect
/// on the channel or on other cursors.
pub struct Reader {
    channel: Arc<Channel>,
    /// Stream position of the next unread byte, in total-written space.
    offset: u64,
    interrupted: Arc<AtomicBool>,
}

impl Reader {
    pub(crate) fn new(channel: Arc<Channel>, offset: u64) -> Self {
        Self {
            channel,
            offset,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Reads the next bytes of the stream, blocking while none exist.
    ///
    /// Returns the next `min(max_len, available)` bytes in stream order,
    /// never re-delivering and never skipping: two successive calls return
    /// adjacent windows. A successful call always carries at least one byte.
    ///
    /// # Returns
    /// * `Ok(bytes)` and the cursor advances by `bytes.len()`
    /// * `Err(Error::Interrupted)` if cancelled via the interrupt handle
    ///   while blocked; the cursor did not move and a retry resumes exactly
    ///   where this call left off
    /// * `Err(Error::Overrun)` if the cursor fell more than one capacity
    ///   behind; the cursor did not move, see [`Reader::resync`]
    /// * `Err(Error::InvalidArgument)` if `max_len` is zero, which could
    ///   never satisfy the at-least-one-byte guarantee
    pub fn read(&mut self, max_len: usize) -> Result<Vec<u8>, Error> {
        let bytes = self
            .channel
            .read_blocking(self.offset, max_len, &self.interrupted)?;
        self.offset += bytes.len() as u64;
        Ok(bytes)
    }

    /// Non-blocking read: `Ok(None)` when the cursor is at the head of the
    /// stream, otherwise exactly what [`Reader::read`] would have returned.
    pub fn try_read(&mut self, max_len: usize) -> Result<Option<Vec<u8>>, Error> {
        match self.channel.try_read_at(self.offset, max_len)? {
            Some(bytes) => {
                self.offset += bytes.len() as u64;
                Ok(Some(bytes))
            }
            None => Ok(None),
        }
    }

    /// Blocking read that gives up after `timeout`, returning `Ok(None)` if
    /// no data arrived in time.
    pub fn read_timeout(
        &mut self,
        max_len: usize,
        timeout: Duration,
    ) -> Result<Option<Vec<u8>>, Error> {
        match self
            .channel
            .read_deadline(self.offset, max_len, &self.interrupted, timeout)?
        {
            Some(bytes) => {
                self.offset += bytes.len() as u64;
                Ok(Some(bytes))
            }
            None => Ok(None),
        }
    }

    /// Whether a read would return without blocking. A lock-free hint; the
    /// read path re-checks under the channel lock.
    pub fn poll_readable(&self) -> bool {
        self.channel.total_written() != self.offset
    }

    /// How many unread bytes lie between this cursor and the writer. Above
    /// the buffer capacity the next read reports an overrun.
    pub fn lag(&self) -> u64 {
        self.channel.total_written() - self.offset
    }

    /// Current cursor position in total-written space.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn channel_id(&self) -> usize {
        self.channel.id()
    }

    /// Recovers from an overrun by jumping to the oldest byte still held in
    /// the buffer. Returns how many bytes were skipped for good; zero when
    /// the cursor was still inside the retention window.
    pub fn resync(&mut self) -> u64 {
        let floor = self
            .channel
            .total_written()
            .saturating_sub(self.channel.capacity() as u64);
        let skipped = floor.saturating_sub(self.offset);
        self.offset += skipped;
        skipped
    }

    /// A handle other threads can use to cancel this reader's blocked read.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        InterruptHandle {
            channel: Arc::clone(&self.channel),
            interrupted: Arc::clone(&self.interrupted),
        }
    }
}

impl fmt::Debug for Reader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("channel_id", &self.channel.id())
            .field("offset", &self.offset)
            .field("lag", &self.lag())
            .finish_non_exhaustive()
    }
}

/// Cancels a blocked [`Reader::read`] from another thread.
///
/// An interrupt is consumed by the read that observes it: the interrupted
/// call returns [`Error::Interrupted`] and the next read blocks normally.
/// Delivered while the reader is not blocked, it stays pending and cancels
/// the next read that would otherwise sleep.
#[derive(Clone)]
pub struct InterruptHandle {
    channel: Arc<Channel>,
    interrupted: Arc<AtomicBool>,
}

impl InterruptHandle {
    pub fn interrupt(&self) {
        self.channel.interrupt(&self.interrupted);
    }
}

impl fmt::Debug for InterruptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterruptHandle")
            .field("channel_id", &self.channel.id())
            .field("pending", &self.interrupted.load(Ordering::Acquire))
            .finish()
    }
}
