use super::ChannelTable;
use crate::error::Error;

pub struct TableBuilder {
    channel_count: usize,
    buffer_capacity: usize,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self {
            channel_count: 255,
            buffer_capacity: 0x4000, // 16K per channel
        }
    }
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel_count(mut self, count: usize) -> Self {
        self.channel_count = count;
        self
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    pub fn build(self) -> Result<ChannelTable, Error> {
        ChannelTable::new(self.channel_count, self.buffer_capacity)
    }
}
