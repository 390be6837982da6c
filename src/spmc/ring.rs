use crate::error::Error;

/// Fixed-capacity byte storage with wrap-around addressing.
///
/// The ring knows nothing about stream positions or readers. It keeps one
/// write index, appends bytes at it, and can copy back any window that is
/// still inside the last `capacity` bytes written. All index arithmetic
/// lives here; callers only ever speak in window lengths and lags.
pub struct RingBuffer {
    storage: Box<[u8]>,
    /// Next write position, always in `[0, capacity)`.
    write_index: usize,
}

impl RingBuffer {
    /// Allocates a ring of `capacity` bytes.
    ///
    /// The buffer is committed lazily on first attach, so a failed
    /// allocation is surfaced to the caller, who may retry a later attach
    /// rather than abort.
    pub fn with_capacity(capacity: usize) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::InvalidArgument);
        }
        let mut storage = Vec::new();
        storage
            .try_reserve_exact(capacity)
            .map_err(|_| Error::OutOfMemory)?;
        storage.resize(capacity, 0);
        Ok(Self {
            storage: storage.into_boxed_slice(),
            write_index: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Appends `data` at the write index, wrapping past the end of storage.
    ///
    /// The copy is split in two when the write runs past the physical end of
    /// the buffer. Writes cannot fail; chunking requests down to at most one
    /// capacity is the caller's job.
    ///
    /// # Panics
    /// Panics if `data.len()` exceeds the capacity.
    pub fn write(&mut self, data: &[u8]) {
        assert!(
            data.len() <= self.capacity(),
            "write of {} bytes exceeds ring capacity {}",
            data.len(),
            self.capacity()
        );

        let mut rest = data;
        while !rest.is_empty() {
            let run = (self.capacity() - self.write_index).min(rest.len());
            self.storage[self.write_index..self.write_index + run].copy_from_slice(&rest[..run]);
            self.write_index += run;
            if self.write_index == self.capacity() {
                self.write_index = 0;
            }
            rest = &rest[run..];
        }
    }

    /// Copies `out.len()` bytes from the window starting `lag` bytes behind
    /// the write index, splitting the copy in two when the window wraps.
    ///
    /// `lag` is how far the window start trails the newest byte, so it must
    /// not exceed the capacity (older bytes have been overwritten) and must
    /// cover the requested length. Violating either is an argument error;
    /// within the preconditions exactly `out.len()` bytes are produced.
    pub fn read_window(&self, lag: usize, out: &mut [u8]) -> Result<(), Error> {
        if lag > self.capacity() || out.len() > lag {
            return Err(Error::InvalidArgument);
        }

        let capacity = self.capacity();
        let start = (self.write_index + capacity - lag) % capacity;

        let first = (capacity - start).min(out.len());
        out[..first].copy_from_slice(&self.storage[start..start + first]);
        if first < out.len() {
            let wrapped = out.len() - first;
            out[first..].copy_from_slice(&self.storage[..wrapped]);
        }
        Ok(())
    }
}

impl std::fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("write_index", &self.write_index)
            .finish_non_exhaustive()
    }
}
