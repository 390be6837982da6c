//! A one-to-many broadcast byte buffer.
//!
//! One writer appends bytes to a channel; any number of independent readers
//! each consume the same stream from the moment they attach, at their own
//! pace. The writer never blocks and never waits on readers; readers block
//! until new data arrives and detect when they have fallen behind the
//! buffer's retention window. Write once, fan out to every open reader.

pub mod error;
pub mod spmc;

pub use error::Error;
pub use spmc::{ChannelTable, InterruptHandle, Reader, TableBuilder, Writer};
