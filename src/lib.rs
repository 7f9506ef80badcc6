/// itch-feed - NASDAQ TotalView-ITCH 5.0 feed processor
///
/// High-performance decoder and order book reconstructor for the TotalView-ITCH
/// 5.0 market data feed. Features include:
/// - Length-prefixed binary framing with big-endian field decoding
/// - All 23 ITCH 5.0 message types as a single typed event union
/// - Callback, bulk-collect, and type-filtered decode entry points
/// - Per-instrument limit order book with price-time priority
/// - Human-readable rendering of events and book snapshots

pub mod format;
pub mod messages;
pub mod order_book;
pub mod parser;
pub mod reader;

pub use messages::{Event, MessageHeader, MWCB_PRICE_SCALE, PRICE_SCALE};
pub use order_book::{BookOrder, LevelView, OrderBook, Side};
pub use parser::{DecodeError, Parser, StreamError, TagFilter};
pub use reader::ByteReader;
