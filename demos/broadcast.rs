// In demos/broadcast.rs
//
// One writer thread fans a byte stream out to several reader threads over a
// single channel. Writer and readers each keep a running SHA-256 of the
// stream; since every reader attaches before the first append, all digests
// must agree at the end. Ctrl+C interrupts the blocked readers for a clean
// early exit.

use fanout::{Error, TableBuilder};
use sha2::{Digest, Sha256};
use std::env;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

const CAPACITY: usize = 1 << 16;

fn stream_byte(pos: u64) -> u8 {
    (pos % 251) as u8
}

fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();
    let num_readers: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(3);
    let total_bytes: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(16 << 20);

    let table = Arc::new(
        TableBuilder::new()
            .with_channel_count(1)
            .with_buffer_capacity(CAPACITY)
            .build()
            .map_err(std::io::Error::from)?,
    );

    println!(
        "Broadcast: streaming {} bytes to {} readers (buffer {} bytes)",
        total_bytes, num_readers, CAPACITY
    );

    // Attach every reader before the first append so each one expects the
    // complete stream.
    let readers: Vec<_> = (0..num_readers)
        .map(|_| table.attach(0))
        .collect::<Result<_, _>>()
        .map_err(std::io::Error::from)?;

    let stop = Arc::new(AtomicBool::new(false));
    let interrupts: Vec<_> = readers.iter().map(|r| r.interrupt_handle()).collect();
    let stop_for_handler = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        stop_for_handler.store(true, Ordering::SeqCst);
        for handle in &interrupts {
            handle.interrupt();
        }
    })
    .expect("Error setting Ctrl+C handler");

    let progress: Arc<Vec<AtomicU64>> =
        Arc::new((0..num_readers).map(|_| AtomicU64::new(0)).collect());

    let mut reader_threads = Vec::new();
    for (i, mut reader) in readers.into_iter().enumerate() {
        let progress = Arc::clone(&progress);
        let stop = Arc::clone(&stop);
        reader_threads.push(thread::spawn(move || {
            let mut hasher = Sha256::new();
            let mut done = 0u64;
            while done < total_bytes && !stop.load(Ordering::SeqCst) {
                match reader.read(64 * 1024) {
                    Ok(bytes) => {
                        hasher.update(&bytes);
                        done += bytes.len() as u64;
                        progress[i].store(done, Ordering::Release);
                    }
                    Err(Error::Interrupted) => continue,
                    Err(e) => {
                        eprintln!("Reader {}: {}", i, e);
                        break;
                    }
                }
            }
            (done, format!("{:x}", hasher.finalize()))
        }));
    }

    // The writer paces itself against the slowest reader so nobody is pushed
    // out of the retention window; the library itself never throttles it.
    let writer = table.writer(0).map_err(std::io::Error::from)?;
    let mut writer_hasher = Sha256::new();
    let start = std::time::Instant::now();
    let mut pos = 0u64;
    while pos < total_bytes && !stop.load(Ordering::SeqCst) {
        let n = (CAPACITY / 4).min((total_bytes - pos) as usize);
        let chunk: Vec<u8> = (pos..pos + n as u64).map(stream_byte).collect();

        while !stop.load(Ordering::SeqCst) {
            let slowest = progress
                .iter()
                .map(|p| p.load(Ordering::Acquire))
                .min()
                .unwrap_or(pos);
            if pos + n as u64 - slowest <= CAPACITY as u64 {
                break;
            }
            thread::yield_now();
        }

        writer_hasher.update(&chunk);
        writer.append_all(&chunk);
        pos += n as u64;
    }
    let elapsed = start.elapsed();
    let writer_digest = format!("{:x}", writer_hasher.finalize());

    println!(
        "Writer: sent {} bytes in {:.2?} ({:.2} MiB/s)",
        pos,
        elapsed,
        pos as f64 / elapsed.as_secs_f64() / (1024.0 * 1024.0)
    );
    println!("Writer digest: {}", writer_digest);

    let mut all_match = true;
    for (i, handle) in reader_threads.into_iter().enumerate() {
        let (done, digest) = handle.join().expect("reader thread panicked");
        let verdict = if digest == writer_digest { "ok" } else { "MISMATCH" };
        println!("Reader {}: {} bytes, digest {} [{}]", i, done, digest, verdict);
        all_match &= digest == writer_digest;
    }

    if stop.load(Ordering::SeqCst) {
        println!("Interrupted early; digests are not expected to match.");
    } else if all_match {
        println!("All readers saw the identical stream.");
    } else {
        std::process::exit(1);
    }

    Ok(())
}
