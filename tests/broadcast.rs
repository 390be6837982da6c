use fanout::{ChannelTable, Error, TableBuilder};

fn small_table(capacity: usize) -> ChannelTable {
    ChannelTable::new(4, capacity).unwrap()
}

#[test]
fn ordering_across_chunked_appends() {
    let table = small_table(64);
    let mut reader = table.attach(0).unwrap();
    let writer = table.writer(0).unwrap();

    writer.append_all(b"the quick brown fox ");
    writer.append_all(b"jumps over ");
    writer.append_all(b"the lazy dog");

    let mut collected = Vec::new();
    while collected.len() < 43 {
        collected.extend(reader.read(7).unwrap());
    }
    assert_eq!(&collected, b"the quick brown fox jumps over the lazy dog");
}

#[test]
fn read_returns_at_most_max_len() {
    let table = small_table(64);
    let mut reader = table.attach(0).unwrap();
    let writer = table.writer(0).unwrap();

    writer.append_all(b"hello");
    assert_eq!(reader.read(2).unwrap(), b"he");
    assert_eq!(reader.read(100).unwrap(), b"llo");
}

#[test]
fn append_accepts_at_most_quarter_capacity() {
    let table = small_table(16);
    let writer = table.writer(0).unwrap();
    let mut reader = table.attach(0).unwrap();

    let accepted = writer.append(&[7u8; 10]);
    assert_eq!(accepted, 4);

    // The loop variant eventually takes everything.
    writer.append_all(&[8u8; 10]);
    assert_eq!(writer.total_written(), 14);

    let mut collected = Vec::new();
    while collected.len() < 14 {
        collected.extend(reader.read(16).unwrap());
    }
    assert_eq!(&collected[..4], &[7u8; 4]);
    assert_eq!(&collected[4..], &[8u8; 10]);
}

#[test]
fn readers_attached_at_different_times_are_independent() {
    let table = small_table(64);
    let writer = table.writer(0).unwrap();

    let mut early = table.attach(0).unwrap();
    writer.append_all(b"abc");
    let mut late = table.attach(0).unwrap();
    writer.append_all(b"def");

    // The early reader sees everything, the late one only what came after
    // its attach, and draining one does not move the other.
    assert_eq!(early.read(16).unwrap(), b"abcdef");
    assert_eq!(late.read(16).unwrap(), b"def");
    assert!(!early.poll_readable());
    assert!(!late.poll_readable());
}

#[test]
fn attach_snapshots_the_stream_position() {
    let table = small_table(64);
    let writer = table.writer(0).unwrap();
    writer.append_all(b"before");

    let mut reader = table.attach(0).unwrap();
    assert_eq!(reader.lag(), 0);
    assert_eq!(reader.try_read(16).unwrap(), None);

    writer.append_all(b"after");
    assert_eq!(reader.read(16).unwrap(), b"after");
}

#[test]
fn wrap_copy_preserves_the_tail() {
    // Worked example: 16-byte buffer, 10 bytes ahead of the cursor's attach,
    // then 20 more in small chunks. The cursor overruns and recovers the
    // newest 16 bytes of the stream, still in total order.
    let table = small_table(16);
    let writer = table.writer(0).unwrap();

    writer.append_all(b"0123456789");
    let mut reader = table.attach(0).unwrap();
    assert_eq!(reader.offset(), 10);

    for chunk in b"ABCDEFGHIJKLMNOPQRST".chunks(4) {
        writer.append_all(chunk);
    }

    assert_eq!(reader.lag(), 20);
    assert_eq!(reader.read(32), Err(Error::Overrun));
    // The failed read must not have moved the cursor.
    assert_eq!(reader.offset(), 10);

    assert_eq!(reader.resync(), 4);
    let mut collected = Vec::new();
    while collected.len() < 16 {
        collected.extend(reader.read(5).unwrap());
    }
    assert_eq!(&collected, b"EFGHIJKLMNOPQRST");
}

#[test]
fn overrun_is_reported_until_the_caller_recovers() {
    let table = small_table(16);
    let writer = table.writer(0).unwrap();
    let mut reader = table.attach(0).unwrap();

    writer.append_all(&[1u8; 20]);

    assert_eq!(reader.read(8), Err(Error::Overrun));
    assert_eq!(reader.read(8), Err(Error::Overrun));
    assert_eq!(reader.offset(), 0);

    assert_eq!(reader.resync(), 4);
    assert_eq!(reader.lag(), 16);
    assert_eq!(reader.read(16).unwrap(), [1u8; 16]);
}

#[test]
fn resync_is_a_no_op_inside_the_retention_window() {
    let table = small_table(16);
    let writer = table.writer(0).unwrap();
    let mut reader = table.attach(0).unwrap();

    writer.append_all(b"abcd");
    assert_eq!(reader.resync(), 0);
    assert_eq!(reader.read(16).unwrap(), b"abcd");
}

#[test]
fn channels_do_not_share_data_or_cursors() {
    let table = small_table(64);
    let w0 = table.writer(0).unwrap();
    let w1 = table.writer(1).unwrap();
    let mut r0 = table.attach(0).unwrap();
    let mut r1 = table.attach(1).unwrap();

    w0.append_all(b"zero");
    w1.append_all(b"one");

    assert_eq!(r0.read(16).unwrap(), b"zero");
    assert_eq!(r1.read(16).unwrap(), b"one");
}

#[test]
fn poll_readiness() {
    let table = small_table(64);
    let writer = table.writer(0).unwrap();
    let mut reader = table.attach(0).unwrap();

    assert!(writer.poll_writable());
    assert!(!reader.poll_readable());

    writer.append_all(b"x");
    assert!(reader.poll_readable());
    assert!(writer.poll_writable());

    reader.read(1).unwrap();
    assert!(!reader.poll_readable());
}

#[test]
fn try_read_never_blocks() {
    let table = small_table(64);
    let writer = table.writer(0).unwrap();
    let mut reader = table.attach(0).unwrap();

    assert_eq!(reader.try_read(8).unwrap(), None);
    writer.append_all(b"data");
    assert_eq!(reader.try_read(8).unwrap().unwrap(), b"data");
    assert_eq!(reader.try_read(8).unwrap(), None);
}

#[test]
fn writes_before_any_reader_are_retained() {
    let table = small_table(64);
    let writer = table.writer(0).unwrap();
    writer.append_all(b"early");
    assert_eq!(writer.total_written(), 5);

    // A later attach skips the history by construction.
    let mut reader = table.attach(0).unwrap();
    assert_eq!(reader.offset(), 5);
    writer.append_all(b"late");
    assert_eq!(reader.read(16).unwrap(), b"late");
}

#[test]
fn detaching_a_reader_leaves_the_rest_alone() {
    let table = small_table(64);
    let writer = table.writer(0).unwrap();
    let mut kept = table.attach(0).unwrap();
    let dropped = table.attach(0).unwrap();

    writer.append_all(b"payload");
    drop(dropped);

    assert_eq!(kept.read(16).unwrap(), b"payload");
}

#[test]
fn out_of_range_channel_ids_are_rejected() {
    let table = small_table(64);
    assert_eq!(table.attach(4).err(), Some(Error::InvalidArgument));
    assert_eq!(table.writer(99).err(), Some(Error::InvalidArgument));
}

#[test]
fn degenerate_table_parameters_are_rejected() {
    assert!(ChannelTable::new(0, 64).is_err());
    assert!(ChannelTable::new(4, 0).is_err());
    // Below 4 the per-append quantum would be zero.
    assert!(ChannelTable::new(4, 3).is_err());
    assert!(ChannelTable::new(4, 4).is_ok());
}

#[test]
fn zero_length_reads_are_rejected() {
    let table = small_table(64);
    let writer = table.writer(0).unwrap();
    let mut reader = table.attach(0).unwrap();
    writer.append_all(b"x");

    assert_eq!(reader.read(0), Err(Error::InvalidArgument));
    assert_eq!(reader.try_read(0), Err(Error::InvalidArgument));
}

#[test]
fn builder_defaults_and_overrides() {
    let table = TableBuilder::new().build().unwrap();
    assert_eq!(table.channel_count(), 255);
    assert_eq!(table.buffer_capacity(), 0x4000);

    let table = TableBuilder::new()
        .with_channel_count(2)
        .with_buffer_capacity(128)
        .build()
        .unwrap();
    assert_eq!(table.channel_count(), 2);
    assert_eq!(table.buffer_capacity(), 128);
}

#[test]
fn errors_map_to_io_kinds() {
    use std::io;

    let err: io::Error = Error::Overrun.into();
    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    let err: io::Error = Error::Interrupted.into();
    assert_eq!(err.kind(), io::ErrorKind::Interrupted);
    let err: io::Error = Error::InvalidArgument.into();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
}
