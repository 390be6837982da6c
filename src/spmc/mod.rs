mod builder;
mod channel;
mod reader;
mod ring;
mod table;
mod writer;

pub use builder::TableBuilder;
pub use reader::{InterruptHandle, Reader};
pub use ring::RingBuffer;
pub use table::ChannelTable;
pub use writer::Writer;
