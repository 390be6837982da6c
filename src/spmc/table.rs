use std::fmt;
use std::sync::Arc;

use super::channel::Channel;
use super::reader::Reader;
use super::writer::Writer;
use crate::error::Error;

/// Fixed-size collection of broadcast channels, indexed by channel id.
///
/// Channel count and buffer capacity are set once at construction and fixed
/// for the table's lifetime. Channels start empty; a channel's buffer is
/// allocated the first time a reader or writer attaches to it and persists
/// until the table is dropped.
pub struct ChannelTable {
    channels: Box<[Arc<Channel>]>,
    buffer_capacity: usize,
}

impl ChannelTable {
    /// One-time setup of `channel_count` channels sharing one configured
    /// `buffer_capacity`.
    ///
    /// A zero channel count is rejected. So is a capacity below 4, because
    /// appends are capped to a quarter capacity per call and a quantum of
    /// zero could never accept a byte, and a capacity that does not fit in
    /// `u32`, which keeps stream arithmetic far away from counter wraparound.
    pub fn new(channel_count: usize, buffer_capacity: usize) -> Result<Self, Error> {
        if channel_count == 0 {
            return Err(Error::InvalidArgument);
        }
        if buffer_capacity < 4 || buffer_capacity > u32::MAX as usize {
            return Err(Error::InvalidArgument);
        }

        let channels = (0..channel_count)
            .map(|id| Arc::new(Channel::new(id, buffer_capacity)))
            .collect();
        Ok(Self {
            channels,
            buffer_capacity,
        })
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }

    fn channel(&self, channel_id: usize) -> Result<&Arc<Channel>, Error> {
        self.channels.get(channel_id).ok_or(Error::InvalidArgument)
    }

    /// Attaches a new reader to `channel_id`.
    ///
    /// The first attach on a channel commits its buffer memory; later ones
    /// only take the channel lock. The returned cursor starts at the current
    /// stream position, so it sees only data appended after this call.
    ///
    /// # Returns
    /// * `Ok(Reader)` on success
    /// * `Err(Error::InvalidArgument)` if the id is outside the table
    /// * `Err(Error::OutOfMemory)` if the buffer allocation failed; the
    ///   channel stays unusable until a later attach succeeds
    pub fn attach(&self, channel_id: usize) -> Result<Reader, Error> {
        let channel = self.channel(channel_id)?;
        let offset = channel.ensure_buffer()?;
        Ok(Reader::new(Arc::clone(channel), offset))
    }

    /// Hands out the writer-role handle for `channel_id`.
    ///
    /// Obtaining the handle performs the same lazy allocation as `attach`,
    /// which is what makes `Writer::append` itself infallible.
    pub fn writer(&self, channel_id: usize) -> Result<Writer, Error> {
        let channel = self.channel(channel_id)?;
        channel.ensure_buffer()?;
        Ok(Writer::new(Arc::clone(channel)))
    }
}

impl fmt::Debug for ChannelTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelTable")
            .field("channel_count", &self.channels.len())
            .field("buffer_capacity", &self.buffer_capacity)
            .finish()
    }
}
