use std::fmt;
use std::io;

/// Result codes for broadcast buffer operations.
///
/// Every failure is reported to the immediate caller; a reader's error never
/// affects the channel or any other reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Allocating a channel's buffer failed on first attach. The channel
    /// stays unusable until a later attach succeeds.
    OutOfMemory,
    /// The cursor fell more than one buffer capacity behind the writer, so
    /// part of the stream is no longer retrievable. The cursor is left where
    /// it was; see `Reader::resync` for the canonical recovery.
    Overrun,
    /// A blocking read was cancelled before data arrived. Nothing was
    /// consumed and the cursor did not move, so retrying is safe.
    Interrupted,
    /// A channel id outside the configured range, a zero-length read request,
    /// or an inconsistent window copy. Fatal to the call, not to the channel.
    InvalidArgument,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfMemory => write!(f, "buffer allocation failed"),
            Error::Overrun => write!(f, "reader fell behind the buffer's retention window"),
            Error::Interrupted => write!(f, "blocking read was interrupted"),
            Error::InvalidArgument => write!(f, "invalid argument"),
        }
    }
}

impl std::error::Error for Error {}

/// Mapping for io-centric callers, lined up with the errno conventions for
/// pipes: a lost window is a broken pipe, a cancelled wait is EINTR.
impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        let kind = match err {
            Error::OutOfMemory => io::ErrorKind::OutOfMemory,
            Error::Overrun => io::ErrorKind::BrokenPipe,
            Error::Interrupted => io::ErrorKind::Interrupted,
            Error::InvalidArgument => io::ErrorKind::InvalidInput,
        };
        io::Error::new(kind, err)
    }
}
