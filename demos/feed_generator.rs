/// Synthetic TotalView-ITCH feed generator
///
/// Creates realistic order flow for one symbol and writes the framed binary
/// stream to a file or stdout. Useful for testing and benchmarking.

use std::env;
use std::fs::File;
use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};
use rand::Rng;

const STOCK: [u8; 8] = *b"STOCK1  ";

fn push_header(buf: &mut Vec<u8>, tag: u8, timestamp: u64) {
    buf.push(tag);
    buf.write_u16::<BigEndian>(1).unwrap(); // stock locate
    buf.write_u16::<BigEndian>(0).unwrap(); // tracking number
    buf.write_u16::<BigEndian>((timestamp >> 32) as u16).unwrap();
    buf.write_u32::<BigEndian>(timestamp as u32).unwrap();
}

fn frame(payload: &[u8], out: &mut Vec<u8>) {
    out.write_u16::<BigEndian>(payload.len() as u16).unwrap();
    out.extend_from_slice(payload);
}

fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();

    let output_path = args.get(1).cloned().unwrap_or_else(|| "/tmp/itch_feed.bin".to_string());
    let message_count: usize = args
        .get(2)
        .and_then(|count| count.parse().ok())
        .unwrap_or(10_000);

    let mut output: Box<dyn Write> = if output_path == "stdout" {
        Box::new(std::io::stdout())
    } else {
        Box::new(File::create(&output_path)?)
    };

    let mut rng = rand::thread_rng();
    let mut next_reference = 1_000u64;
    let mut live_orders: Vec<u64> = Vec::new();
    let mut timestamp = 34_200_000_000_000u64; // 09:30, nanoseconds past midnight
    let mut stream = Vec::new();

    eprintln!("Generating {message_count} messages to {output_path}");

    // Start-of-messages system event.
    let mut payload = Vec::new();
    push_header(&mut payload, b'S', timestamp);
    payload.push(b'O');
    frame(&payload, &mut stream);

    for _ in 0..message_count {
        timestamp += rng.gen_range(1_000..2_000_000);
        let mut payload = Vec::new();

        // Add-heavy mix, mutations against random live orders.
        let roll = if live_orders.is_empty() { 0 } else { rng.gen_range(0u8..10) };
        match roll {
            0..=4 => {
                let reference = next_reference;
                next_reference += 1;
                let price = 1_500_000u32.saturating_add_signed(rng.gen_range(-50_000..50_000));
                push_header(&mut payload, b'A', timestamp);
                payload.write_u64::<BigEndian>(reference).unwrap();
                payload.push(if rng.gen_bool(0.5) { b'B' } else { b'S' });
                payload.write_u32::<BigEndian>(rng.gen_range(1..1_000) * 100).unwrap();
                payload.extend_from_slice(&STOCK);
                payload.write_u32::<BigEndian>(price).unwrap();
                live_orders.push(reference);
            }
            5 | 6 => {
                let reference = live_orders[rng.gen_range(0..live_orders.len())];
                push_header(&mut payload, b'E', timestamp);
                payload.write_u64::<BigEndian>(reference).unwrap();
                payload.write_u32::<BigEndian>(rng.gen_range(1..200)).unwrap();
                payload.write_u64::<BigEndian>(timestamp).unwrap(); // match number
            }
            7 => {
                let reference = live_orders[rng.gen_range(0..live_orders.len())];
                push_header(&mut payload, b'X', timestamp);
                payload.write_u64::<BigEndian>(reference).unwrap();
                payload.write_u32::<BigEndian>(rng.gen_range(1..200)).unwrap();
            }
            8 => {
                let slot = rng.gen_range(0..live_orders.len());
                let reference = live_orders.swap_remove(slot);
                push_header(&mut payload, b'D', timestamp);
                payload.write_u64::<BigEndian>(reference).unwrap();
            }
            _ => {
                let slot = rng.gen_range(0..live_orders.len());
                let original = live_orders[slot];
                let reference = next_reference;
                next_reference += 1;
                let price = 1_500_000u32.saturating_add_signed(rng.gen_range(-50_000..50_000));
                push_header(&mut payload, b'U', timestamp);
                payload.write_u64::<BigEndian>(original).unwrap();
                payload.write_u64::<BigEndian>(reference).unwrap();
                payload.write_u32::<BigEndian>(rng.gen_range(1..1_000) * 100).unwrap();
                payload.write_u32::<BigEndian>(price).unwrap();
                live_orders[slot] = reference;
            }
        }
        frame(&payload, &mut stream);
    }

    // End-of-messages system event.
    let mut payload = Vec::new();
    push_header(&mut payload, b'S', timestamp + 1);
    payload.push(b'C');
    frame(&payload, &mut stream);

    output.write_all(&stream)?;
    eprintln!(
        "Feed generation complete: {} messages, {} bytes",
        message_count + 2,
        stream.len()
    );

    Ok(())
}
