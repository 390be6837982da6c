// In demos/lagging_reader.rs
//
// A reader that is deliberately slower than the writer falls out of the
// buffer's retention window, observes the overrun, resynchronizes to the
// oldest retained byte, and keeps tailing the stream.

use fanout::{Error, TableBuilder};
use std::thread;
use std::time::Duration;

fn main() -> std::io::Result<()> {
    let table = TableBuilder::new()
        .with_channel_count(1)
        .with_buffer_capacity(4096)
        .build()
        .map_err(std::io::Error::from)?;

    let mut reader = table.attach(0).map_err(std::io::Error::from)?;
    let writer = table.writer(0).map_err(std::io::Error::from)?;

    let producer = thread::spawn(move || {
        for i in 0..200u64 {
            let chunk = vec![(i % 251) as u8; 512];
            writer.append_all(&chunk);
            thread::sleep(Duration::from_millis(1));
        }
        println!("Writer: done, {} bytes total", 200 * 512);
    });

    let mut received = 0u64;
    let mut skipped = 0u64;
    loop {
        // Deliberately slower than the writer.
        thread::sleep(Duration::from_millis(20));

        match reader.read_timeout(256, Duration::from_millis(200)) {
            Ok(Some(bytes)) => received += bytes.len() as u64,
            Ok(None) => break, // stream idle, writer is done
            Err(Error::Overrun) => {
                let lost = reader.resync();
                skipped += lost;
                println!(
                    "Overrun at lag {}: resynced, {} bytes gone for good",
                    lost + table.buffer_capacity() as u64,
                    lost
                );
            }
            Err(e) => return Err(e.into()),
        }
    }
    producer.join().expect("writer thread panicked");

    println!(
        "Reader: received {} bytes, skipped {} ({} accounted of {})",
        received,
        skipped,
        received + skipped,
        200 * 512
    );
    Ok(())
}
