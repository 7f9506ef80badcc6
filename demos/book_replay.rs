/// Replay a captured ITCH stream into a limit order book
///
/// Usage: book_replay <itch_file> [symbol]
///
/// Decodes the whole file, routes every event into a book for the given
/// symbol (default STOCK1), then prints message counts and the final ladder.

use std::env;
use std::fs::File;
use std::io::BufReader;
use std::process::ExitCode;
use std::time::Instant;

use itch_feed::{OrderBook, Parser};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let Some(path) = args.get(1) else {
        eprintln!("Usage: {} <itch_file> [symbol]", args[0]);
        return ExitCode::FAILURE;
    };
    let symbol = args.get(2).map(String::as_str).unwrap_or("STOCK1");

    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Error opening {path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut book = OrderBook::new(symbol);
    let mut total = 0u64;
    let start = Instant::now();

    let result = Parser::decode_from(BufReader::new(file), |event| {
        total += 1;
        book.process(&event);
    });
    if let Err(err) = result {
        eprintln!("Decode failed: {err}");
        return ExitCode::FAILURE;
    }

    let elapsed = start.elapsed();
    println!("Processed {total} messages in {elapsed:?}");
    println!(
        "Book for {}: {} resting orders, {} bid levels, {} ask levels",
        book.symbol(),
        book.order_count(),
        book.bid_level_count(),
        book.ask_level_count()
    );

    let stdout = std::io::stdout();
    if let Err(err) = book.snapshot(&mut stdout.lock()) {
        eprintln!("Failed to render book: {err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
