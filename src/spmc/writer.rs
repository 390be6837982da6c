use std::fmt;
use std::sync::Arc;

use super::channel::Channel;

/// The writer role for one channel.
///
/// Appends never block, never wait on readers, and never fail: when the
/// buffer is exhausted the oldest data is overwritten instead. Slow readers
/// detect that as an overrun on their side; the writer is unaffected by how
/// many readers exist or how far behind they are.
pub struct Writer {
    channel: Arc<Channel>,
}

impl Writer {
    pub(crate) fn new(channel: Arc<Channel>) -> Self {
        Self { channel }
    }

    /// Appends `data` to the channel and wakes every waiting reader.
    ///
    /// At most a quarter of the buffer capacity is accepted per call, so
    /// readers get to drain between chunks of a large write. This is a
    /// latency trade, not a throughput limit.
    ///
    /// # Returns
    /// The number of bytes accepted, possibly less than `data.len()`;
    /// callers wanting the whole slice delivered loop, or use
    /// [`Writer::append_all`].
    pub fn append(&self, data: &[u8]) -> usize {
        self.channel.append(data)
    }

    /// Appends all of `data`, looping over the per-call cap.
    pub fn append_all(&self, data: &[u8]) {
        let mut rest = data;
        while !rest.is_empty() {
            let n = self.channel.append(rest);
            rest = &rest[n..];
        }
    }

    /// The channel is always ready for writing; capacity exhaustion
    /// overwrites the oldest bytes rather than failing the write.
    pub fn poll_writable(&self) -> bool {
        true
    }

    /// Total bytes ever appended to this channel.
    pub fn total_written(&self) -> u64 {
        self.channel.total_written()
    }

    pub fn channel_id(&self) -> usize {
        self.channel.id()
    }
}

impl fmt::Debug for Writer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writer")
            .field("channel_id", &self.channel.id())
            .field("total_written", &self.channel.total_written())
            .finish()
    }
}
