/// Framing and message dispatch
///
/// Walks a buffer of length-prefixed ITCH messages: 16-bit big-endian length,
/// then a payload whose first byte is the type tag. Dispatch goes through a
/// dense 256-entry table indexed by the tag byte, so classification is a
/// single load. Decoding allocates nothing on the callback path.

use std::io::Read;

use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

use crate::messages::*;
use crate::reader::ByteReader;

/// Capacity heuristic for bulk collection: messages average about 20 bytes
/// on a real TotalView feed (frame prefix included).
const AVERAGE_MESSAGE_SIZE: usize = 20;

const LENGTH_PREFIX_SIZE: usize = 2;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer ends mid-prefix: at least one byte remains but not the two
    /// needed for a length field.
    #[error("truncated frame header at offset {offset}")]
    TruncatedHeader { offset: usize },

    /// A length prefix declares more payload bytes than remain.
    #[error("truncated message at offset {offset}: declared {declared} bytes, {remaining} remain")]
    TruncatedMessage {
        offset: usize,
        declared: u16,
        remaining: usize,
    },

    /// A field read ran past the end of the region.
    #[error("truncated buffer at offset {offset}: need {need} bytes, have {have}")]
    TruncatedBuffer {
        offset: usize,
        need: usize,
        have: usize,
    },
}

impl DecodeError {
    /// Shift a payload-relative offset to an absolute buffer offset.
    fn rebase(self, base: usize) -> Self {
        match self {
            DecodeError::TruncatedBuffer { offset, need, have } => DecodeError::TruncatedBuffer {
                offset: offset + base,
                need,
                have,
            },
            other => other,
        }
    }
}

/// Errors from the stream-materializing entry points.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("failed to read source into memory: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Membership set over ASCII type tags, kept as a 256-bit bitset so the
/// filtered decode path tests membership without touching a container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagFilter {
    bits: [u64; 4],
}

impl TagFilter {
    pub const fn empty() -> Self {
        TagFilter { bits: [0; 4] }
    }

    pub fn from_tags(tags: &[u8]) -> Self {
        let mut filter = Self::empty();
        for &tag in tags {
            filter.insert(tag);
        }
        filter
    }

    pub fn insert(&mut self, tag: u8) {
        self.bits[(tag >> 6) as usize] |= 1 << (tag & 63);
    }

    pub const fn contains(&self, tag: u8) -> bool {
        self.bits[(tag >> 6) as usize] & (1 << (tag & 63)) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == [0u64; 4]
    }
}

type DecodeFn = fn(&mut ByteReader) -> Result<Event, DecodeError>;

/// Dense dispatch table over the tag byte. Unknown tags stay `None`.
static DISPATCH: [Option<DecodeFn>; 256] = build_dispatch();

const fn build_dispatch() -> [Option<DecodeFn>; 256] {
    let mut table: [Option<DecodeFn>; 256] = [None; 256];
    table[b'S' as usize] = Some(decode_system_event);
    table[b'R' as usize] = Some(decode_stock_directory);
    table[b'H' as usize] = Some(decode_stock_trading_action);
    table[b'Y' as usize] = Some(decode_reg_sho);
    table[b'L' as usize] = Some(decode_market_participant_position);
    table[b'V' as usize] = Some(decode_mwcb_decline_level);
    table[b'W' as usize] = Some(decode_mwcb_status);
    table[b'K' as usize] = Some(decode_ipo_quoting_period_update);
    table[b'J' as usize] = Some(decode_luld_auction_collar);
    table[b'h' as usize] = Some(decode_operational_halt);
    table[b'A' as usize] = Some(decode_add_order);
    table[b'F' as usize] = Some(decode_add_order_mpid);
    table[b'E' as usize] = Some(decode_order_executed);
    table[b'C' as usize] = Some(decode_order_executed_with_price);
    table[b'X' as usize] = Some(decode_order_cancel);
    table[b'D' as usize] = Some(decode_order_delete);
    table[b'U' as usize] = Some(decode_order_replace);
    table[b'P' as usize] = Some(decode_non_cross_trade);
    table[b'Q' as usize] = Some(decode_cross_trade);
    table[b'B' as usize] = Some(decode_broken_trade);
    table[b'I' as usize] = Some(decode_noii);
    table[b'N' as usize] = Some(decode_retail_price_improvement);
    table[b'O' as usize] = Some(decode_direct_listing_capital_raise);
    table
}

fn read_header(r: &mut ByteReader) -> Result<MessageHeader, DecodeError> {
    Ok(MessageHeader {
        stock_locate: r.read_u16()?,
        tracking_number: r.read_u16()?,
        timestamp: r.read_timestamp()?,
    })
}

fn decode_system_event(r: &mut ByteReader) -> Result<Event, DecodeError> {
    Ok(Event::SystemEvent(SystemEvent {
        header: read_header(r)?,
        event_code: r.read_u8()?,
    }))
}

fn decode_stock_directory(r: &mut ByteReader) -> Result<Event, DecodeError> {
    Ok(Event::StockDirectory(StockDirectory {
        header: read_header(r)?,
        stock: r.read_fixed()?,
        market_category: r.read_u8()?,
        financial_status_indicator: r.read_u8()?,
        round_lot_size: r.read_u32()?,
        round_lots_only: r.read_u8()?,
        issue_classification: r.read_u8()?,
        issue_sub_type: r.read_fixed()?,
        authenticity: r.read_u8()?,
        short_sale_threshold_indicator: r.read_u8()?,
        ipo_flag: r.read_u8()?,
        luld_reference_price_tier: r.read_u8()?,
        etp_flag: r.read_u8()?,
        etp_leverage_factor: r.read_u32()?,
        inverse_indicator: r.read_u8()?,
    }))
}

fn decode_stock_trading_action(r: &mut ByteReader) -> Result<Event, DecodeError> {
    Ok(Event::StockTradingAction(StockTradingAction {
        header: read_header(r)?,
        stock: r.read_fixed()?,
        trading_state: r.read_u8()?,
        reserved: r.read_u8()?,
        reason: r.read_fixed()?,
    }))
}

fn decode_reg_sho(r: &mut ByteReader) -> Result<Event, DecodeError> {
    Ok(Event::RegSho(RegSho {
        header: read_header(r)?,
        stock: r.read_fixed()?,
        reg_sho_action: r.read_u8()?,
    }))
}

fn decode_market_participant_position(r: &mut ByteReader) -> Result<Event, DecodeError> {
    Ok(Event::MarketParticipantPosition(MarketParticipantPosition {
        header: read_header(r)?,
        mpid: r.read_fixed()?,
        stock: r.read_fixed()?,
        primary_market_maker: r.read_u8()?,
        market_maker_mode: r.read_u8()?,
        market_participant_state: r.read_u8()?,
    }))
}

fn decode_mwcb_decline_level(r: &mut ByteReader) -> Result<Event, DecodeError> {
    Ok(Event::MwcbDeclineLevel(MwcbDeclineLevel {
        header: read_header(r)?,
        level1: r.read_u64()?,
        level2: r.read_u64()?,
        level3: r.read_u64()?,
    }))
}

fn decode_mwcb_status(r: &mut ByteReader) -> Result<Event, DecodeError> {
    Ok(Event::MwcbStatus(MwcbStatus {
        header: read_header(r)?,
        breached_level: r.read_u8()?,
    }))
}

fn decode_ipo_quoting_period_update(r: &mut ByteReader) -> Result<Event, DecodeError> {
    Ok(Event::IpoQuotingPeriodUpdate(IpoQuotingPeriodUpdate {
        header: read_header(r)?,
        stock: r.read_fixed()?,
        ipo_quotation_release_time: r.read_u32()?,
        ipo_quotation_release_qualifier: r.read_u8()?,
        ipo_price: r.read_u32()?,
    }))
}

fn decode_luld_auction_collar(r: &mut ByteReader) -> Result<Event, DecodeError> {
    Ok(Event::LuldAuctionCollar(LuldAuctionCollar {
        header: read_header(r)?,
        stock: r.read_fixed()?,
        auction_collar_reference_price: r.read_u32()?,
        upper_auction_collar_price: r.read_u32()?,
        lower_auction_collar_price: r.read_u32()?,
        auction_collar_extension: r.read_u32()?,
    }))
}

fn decode_operational_halt(r: &mut ByteReader) -> Result<Event, DecodeError> {
    Ok(Event::OperationalHalt(OperationalHalt {
        header: read_header(r)?,
        stock: r.read_fixed()?,
        market_code: r.read_u8()?,
        operational_halt_action: r.read_u8()?,
    }))
}

fn decode_add_order(r: &mut ByteReader) -> Result<Event, DecodeError> {
    Ok(Event::AddOrder(AddOrder {
        header: read_header(r)?,
        order_reference_number: r.read_u64()?,
        buy_sell_indicator: r.read_u8()?,
        shares: r.read_u32()?,
        stock: r.read_fixed()?,
        price: r.read_u32()?,
    }))
}

fn decode_add_order_mpid(r: &mut ByteReader) -> Result<Event, DecodeError> {
    Ok(Event::AddOrderMpid(AddOrderMpid {
        header: read_header(r)?,
        order_reference_number: r.read_u64()?,
        buy_sell_indicator: r.read_u8()?,
        shares: r.read_u32()?,
        stock: r.read_fixed()?,
        price: r.read_u32()?,
        attribution: r.read_fixed()?,
    }))
}

fn decode_order_executed(r: &mut ByteReader) -> Result<Event, DecodeError> {
    Ok(Event::OrderExecuted(OrderExecuted {
        header: read_header(r)?,
        order_reference_number: r.read_u64()?,
        executed_shares: r.read_u32()?,
        match_number: r.read_u64()?,
    }))
}

fn decode_order_executed_with_price(r: &mut ByteReader) -> Result<Event, DecodeError> {
    Ok(Event::OrderExecutedWithPrice(OrderExecutedWithPrice {
        header: read_header(r)?,
        order_reference_number: r.read_u64()?,
        executed_shares: r.read_u32()?,
        match_number: r.read_u64()?,
        printable: r.read_u8()?,
        execution_price: r.read_u32()?,
    }))
}

fn decode_order_cancel(r: &mut ByteReader) -> Result<Event, DecodeError> {
    Ok(Event::OrderCancel(OrderCancel {
        header: read_header(r)?,
        order_reference_number: r.read_u64()?,
        cancelled_shares: r.read_u32()?,
    }))
}

fn decode_order_delete(r: &mut ByteReader) -> Result<Event, DecodeError> {
    Ok(Event::OrderDelete(OrderDelete {
        header: read_header(r)?,
        order_reference_number: r.read_u64()?,
    }))
}

fn decode_order_replace(r: &mut ByteReader) -> Result<Event, DecodeError> {
    Ok(Event::OrderReplace(OrderReplace {
        header: read_header(r)?,
        original_order_reference_number: r.read_u64()?,
        new_order_reference_number: r.read_u64()?,
        shares: r.read_u32()?,
        price: r.read_u32()?,
    }))
}

fn decode_non_cross_trade(r: &mut ByteReader) -> Result<Event, DecodeError> {
    Ok(Event::NonCrossTrade(NonCrossTrade {
        header: read_header(r)?,
        order_reference_number: r.read_u64()?,
        buy_sell_indicator: r.read_u8()?,
        shares: r.read_u32()?,
        stock: r.read_fixed()?,
        price: r.read_u32()?,
        match_number: r.read_u64()?,
    }))
}

fn decode_cross_trade(r: &mut ByteReader) -> Result<Event, DecodeError> {
    Ok(Event::CrossTrade(CrossTrade {
        header: read_header(r)?,
        shares: r.read_u64()?,
        stock: r.read_fixed()?,
        cross_price: r.read_u32()?,
        match_number: r.read_u64()?,
        cross_type: r.read_u8()?,
    }))
}

fn decode_broken_trade(r: &mut ByteReader) -> Result<Event, DecodeError> {
    Ok(Event::BrokenTrade(BrokenTrade {
        header: read_header(r)?,
        match_number: r.read_u64()?,
    }))
}

fn decode_noii(r: &mut ByteReader) -> Result<Event, DecodeError> {
    Ok(Event::Noii(Noii {
        header: read_header(r)?,
        paired_shares: r.read_u64()?,
        imbalance_shares: r.read_u64()?,
        imbalance_direction: r.read_u8()?,
        stock: r.read_fixed()?,
        far_price: r.read_u32()?,
        near_price: r.read_u32()?,
        current_reference_price: r.read_u32()?,
        cross_type: r.read_u8()?,
        price_variation_indicator: r.read_u8()?,
    }))
}

fn decode_retail_price_improvement(r: &mut ByteReader) -> Result<Event, DecodeError> {
    Ok(Event::RetailPriceImprovement(RetailPriceImprovement {
        header: read_header(r)?,
        stock: r.read_fixed()?,
        interest_flag: r.read_u8()?,
    }))
}

fn decode_direct_listing_capital_raise(r: &mut ByteReader) -> Result<Event, DecodeError> {
    Ok(Event::DirectListingCapitalRaise(DirectListingCapitalRaise {
        header: read_header(r)?,
        stock: r.read_fixed()?,
        open_eligibility_status: r.read_u8()?,
        minimum_allowable_price: r.read_u32()?,
        maximum_allowable_price: r.read_u32()?,
        near_execution_price: r.read_u32()?,
        near_execution_time: r.read_u64()?,
        lower_price_range_collar: r.read_u32()?,
        upper_price_range_collar: r.read_u32()?,
    }))
}

/// Stateless ITCH stream decoder.
///
/// Holds no state across calls; the dispatch table is immutable, so the
/// decoder is safe to use from any number of threads.
pub struct Parser;

impl Parser {
    /// Decode every framed message in `buf`, invoking `callback` once per
    /// successfully decoded event, in buffer order.
    ///
    /// Unknown type tags are skipped with a warning; the length prefix is
    /// authoritative, so the stream stays in sync. A malformed tail aborts
    /// with an error carrying the buffer offset. Events already delivered
    /// are not retracted.
    pub fn decode<F>(buf: &[u8], mut callback: F) -> Result<(), DecodeError>
    where
        F: FnMut(Event),
    {
        let mut offset = 0;
        while offset < buf.len() {
            if buf.len() - offset < LENGTH_PREFIX_SIZE {
                return Err(DecodeError::TruncatedHeader { offset });
            }
            let length = BigEndian::read_u16(&buf[offset..offset + 2]) as usize;
            offset += LENGTH_PREFIX_SIZE;

            // Never expected on a real feed, but tolerated.
            if length == 0 {
                continue;
            }
            if buf.len() - offset < length {
                return Err(DecodeError::TruncatedMessage {
                    offset,
                    declared: length as u16,
                    remaining: buf.len() - offset,
                });
            }

            let payload = &buf[offset..offset + length];
            let tag = payload[0];
            match DISPATCH[tag as usize] {
                Some(decode_fn) => {
                    let mut reader = ByteReader::new(payload);
                    reader.skip(1).map_err(|e| e.rebase(offset))?; // type tag
                    let event = decode_fn(&mut reader).map_err(|e| e.rebase(offset))?;
                    callback(event);
                }
                None => {
                    log::warn!(
                        "unknown message type {:?} (0x{tag:02X}) at offset {offset}, skipping",
                        tag as char
                    );
                }
            }
            offset += length;
        }
        Ok(())
    }

    /// Decode the whole buffer into a vector of events.
    pub fn decode_all(buf: &[u8]) -> Result<Vec<Event>, DecodeError> {
        let mut events = Vec::with_capacity(buf.len() / AVERAGE_MESSAGE_SIZE);
        Self::decode(buf, |event| events.push(event))?;
        Ok(events)
    }

    /// Decode the buffer, keeping only events whose type tag is in `keep`.
    /// An empty filter yields an empty vector without walking the buffer.
    pub fn decode_filtered(buf: &[u8], keep: TagFilter) -> Result<Vec<Event>, DecodeError> {
        let mut events = Vec::new();
        if keep.is_empty() {
            return Ok(events);
        }
        events.reserve(buf.len() / AVERAGE_MESSAGE_SIZE);
        Self::decode(buf, |event| {
            if keep.contains(event.tag()) {
                events.push(event);
            }
        })?;
        Ok(events)
    }

    /// Materialize `source` into memory, then decode it via the buffer path.
    /// Convenience only; not part of the hot path.
    pub fn decode_from<R, F>(mut source: R, callback: F) -> Result<(), StreamError>
    where
        R: Read,
        F: FnMut(Event),
    {
        let mut buf = Vec::new();
        source.read_to_end(&mut buf)?;
        Self::decode(&buf, callback)?;
        Ok(())
    }

    /// Materialize `source` into memory, then collect every event.
    pub fn decode_all_from<R: Read>(mut source: R) -> Result<Vec<Event>, StreamError> {
        let mut buf = Vec::new();
        source.read_to_end(&mut buf)?;
        Ok(Self::decode_all(&buf)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Framed system event: locate=1, tracking=2, timestamp=3, code='O'.
    const SYSTEM_EVENT_FRAME: [u8; 14] = [
        0x00, 0x0C, b'S', 0x00, 0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, b'O',
    ];

    #[test]
    fn test_decode_system_event_frame() {
        let events = Parser::decode_all(&SYSTEM_EVENT_FRAME).unwrap();
        assert_eq!(events.len(), 1);
        match events[0] {
            Event::SystemEvent(msg) => {
                assert_eq!(msg.header.stock_locate, 1);
                assert_eq!(msg.header.tracking_number, 2);
                assert_eq!(msg.header.timestamp, 3);
                assert_eq!(msg.event_code, b'O');
            }
            ref other => panic!("expected SystemEvent, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_tag_is_skipped() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&[0x00, 0x05, b'Z', 1, 2, 3, 4]); // length 5, tag 'Z'
        buf.extend_from_slice(&SYSTEM_EVENT_FRAME);
        let events = Parser::decode_all(&buf).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].tag(), b'S');
    }

    #[test]
    fn test_tag_filter_membership() {
        let mut filter = TagFilter::empty();
        assert!(filter.is_empty());
        filter.insert(b'A');
        filter.insert(b'h');
        assert!(filter.contains(b'A'));
        assert!(filter.contains(b'h'));
        assert!(!filter.contains(b'H'));
        assert!(!filter.is_empty());

        let filter = TagFilter::from_tags(b"ED");
        assert!(filter.contains(b'E'));
        assert!(filter.contains(b'D'));
        assert!(!filter.contains(b'A'));
    }

    #[test]
    fn test_dispatch_covers_all_known_tags() {
        let mut known = 0;
        for tag in 0u8..=255 {
            let dispatched = DISPATCH[tag as usize].is_some();
            assert_eq!(dispatched, wire_len(tag).is_some(), "tag {:?}", tag as char);
            if dispatched {
                known += 1;
            }
        }
        assert_eq!(known, 23);
    }

    #[test]
    fn test_truncated_buffer_error_offset_is_absolute() {
        // Frame declares a 12-byte system event but the payload holds only
        // the tag plus 4 header bytes, so the timestamp read runs out.
        let buf = [0x00, 0x05, b'S', 0x00, 0x01, 0x00, 0x02];
        let err = Parser::decode_all(&buf).unwrap_err();
        match err {
            DecodeError::TruncatedBuffer { offset, need, have } => {
                assert_eq!(offset, 7); // timestamp high half, absolute
                assert_eq!(need, 2);
                assert_eq!(have, 0);
            }
            other => panic!("expected TruncatedBuffer, got {other:?}"),
        }
    }
}
