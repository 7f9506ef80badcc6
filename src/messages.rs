/// TotalView-ITCH 5.0 message definitions
///
/// One plain record per message type, fields in decoded host order. Character
/// fields stay as raw ASCII bytes exactly as they appear on the wire (space
/// padded); trimming is a formatting concern. The `Event` union covers all 23
/// types and is what the parser hands to consumers.
///
/// Prices are unsigned integers with an implied fixed-point scale: 4 decimal
/// places everywhere except the three fields of `MwcbDeclineLevel`, which
/// carry 8. Timestamps are nanoseconds since midnight in a 48-bit field.

/// Divisor for Price(4) fields.
pub const PRICE_SCALE: f64 = 10_000.0;
/// Divisor for the Price(8) fields of the MWCB decline level message.
pub const MWCB_PRICE_SCALE: f64 = 100_000_000.0;

/// Fields common to every ITCH message, following the one-byte type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageHeader {
    /// Locate code identifying the security.
    pub stock_locate: u16,
    /// Nasdaq internal tracking number.
    pub tracking_number: u16,
    /// Nanoseconds past midnight, decoded from the 48-bit wire field.
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemEvent {
    pub header: MessageHeader,
    pub event_code: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDirectory {
    pub header: MessageHeader,
    pub stock: [u8; 8],
    pub market_category: u8,
    pub financial_status_indicator: u8,
    pub round_lot_size: u32,
    pub round_lots_only: u8,
    pub issue_classification: u8,
    pub issue_sub_type: [u8; 2],
    pub authenticity: u8,
    pub short_sale_threshold_indicator: u8,
    pub ipo_flag: u8,
    pub luld_reference_price_tier: u8,
    pub etp_flag: u8,
    pub etp_leverage_factor: u32,
    pub inverse_indicator: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockTradingAction {
    pub header: MessageHeader,
    pub stock: [u8; 8],
    pub trading_state: u8,
    pub reserved: u8,
    pub reason: [u8; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegSho {
    pub header: MessageHeader,
    pub stock: [u8; 8],
    pub reg_sho_action: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketParticipantPosition {
    pub header: MessageHeader,
    pub mpid: [u8; 4],
    pub stock: [u8; 8],
    pub primary_market_maker: u8,
    pub market_maker_mode: u8,
    pub market_participant_state: u8,
}

/// Market-wide circuit breaker decline levels. The only message whose price
/// fields carry 8 implied decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MwcbDeclineLevel {
    pub header: MessageHeader,
    pub level1: u64,
    pub level2: u64,
    pub level3: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MwcbStatus {
    pub header: MessageHeader,
    pub breached_level: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpoQuotingPeriodUpdate {
    pub header: MessageHeader,
    pub stock: [u8; 8],
    pub ipo_quotation_release_time: u32,
    pub ipo_quotation_release_qualifier: u8,
    pub ipo_price: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LuldAuctionCollar {
    pub header: MessageHeader,
    pub stock: [u8; 8],
    pub auction_collar_reference_price: u32,
    pub upper_auction_collar_price: u32,
    pub lower_auction_collar_price: u32,
    pub auction_collar_extension: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationalHalt {
    pub header: MessageHeader,
    pub stock: [u8; 8],
    pub market_code: u8,
    pub operational_halt_action: u8,
}

/// Add order without MPID attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOrder {
    pub header: MessageHeader,
    pub order_reference_number: u64,
    /// 'B' for buy, 'S' for sell.
    pub buy_sell_indicator: u8,
    pub shares: u32,
    pub stock: [u8; 8],
    pub price: u32,
}

/// Add order with MPID attribution. Identical book effect to `AddOrder`;
/// the attribution is carried for downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOrderMpid {
    pub header: MessageHeader,
    pub order_reference_number: u64,
    pub buy_sell_indicator: u8,
    pub shares: u32,
    pub stock: [u8; 8],
    pub price: u32,
    pub attribution: [u8; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderExecuted {
    pub header: MessageHeader,
    pub order_reference_number: u64,
    pub executed_shares: u32,
    pub match_number: u64,
}

/// Execution at a price different from the displayed price. The execution
/// price never changes the resting order's price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderExecutedWithPrice {
    pub header: MessageHeader,
    pub order_reference_number: u64,
    pub executed_shares: u32,
    pub match_number: u64,
    pub printable: u8,
    pub execution_price: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderCancel {
    pub header: MessageHeader,
    pub order_reference_number: u64,
    pub cancelled_shares: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderDelete {
    pub header: MessageHeader,
    pub order_reference_number: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderReplace {
    pub header: MessageHeader,
    pub original_order_reference_number: u64,
    pub new_order_reference_number: u64,
    pub shares: u32,
    pub price: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonCrossTrade {
    pub header: MessageHeader,
    pub order_reference_number: u64,
    pub buy_sell_indicator: u8,
    pub shares: u32,
    pub stock: [u8; 8],
    pub price: u32,
    pub match_number: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossTrade {
    pub header: MessageHeader,
    pub shares: u64,
    pub stock: [u8; 8],
    pub cross_price: u32,
    pub match_number: u64,
    pub cross_type: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokenTrade {
    pub header: MessageHeader,
    pub match_number: u64,
}

/// Net order imbalance indicator, disseminated ahead of auction crosses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Noii {
    pub header: MessageHeader,
    pub paired_shares: u64,
    pub imbalance_shares: u64,
    pub imbalance_direction: u8,
    pub stock: [u8; 8],
    pub far_price: u32,
    pub near_price: u32,
    pub current_reference_price: u32,
    pub cross_type: u8,
    pub price_variation_indicator: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetailPriceImprovement {
    pub header: MessageHeader,
    pub stock: [u8; 8],
    pub interest_flag: u8,
}

/// Direct Listing with Capital Raise eligibility and collar data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectListingCapitalRaise {
    pub header: MessageHeader,
    pub stock: [u8; 8],
    pub open_eligibility_status: u8,
    pub minimum_allowable_price: u32,
    pub maximum_allowable_price: u32,
    pub near_execution_price: u32,
    pub near_execution_time: u64,
    pub lower_price_range_collar: u32,
    pub upper_price_range_collar: u32,
}

/// Typed union over all 23 ITCH 5.0 message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    SystemEvent(SystemEvent),
    StockDirectory(StockDirectory),
    StockTradingAction(StockTradingAction),
    RegSho(RegSho),
    MarketParticipantPosition(MarketParticipantPosition),
    MwcbDeclineLevel(MwcbDeclineLevel),
    MwcbStatus(MwcbStatus),
    IpoQuotingPeriodUpdate(IpoQuotingPeriodUpdate),
    LuldAuctionCollar(LuldAuctionCollar),
    OperationalHalt(OperationalHalt),
    AddOrder(AddOrder),
    AddOrderMpid(AddOrderMpid),
    OrderExecuted(OrderExecuted),
    OrderExecutedWithPrice(OrderExecutedWithPrice),
    OrderCancel(OrderCancel),
    OrderDelete(OrderDelete),
    OrderReplace(OrderReplace),
    NonCrossTrade(NonCrossTrade),
    CrossTrade(CrossTrade),
    BrokenTrade(BrokenTrade),
    Noii(Noii),
    RetailPriceImprovement(RetailPriceImprovement),
    DirectListingCapitalRaise(DirectListingCapitalRaise),
}

impl Event {
    /// The one-byte ASCII type tag this event was decoded from.
    pub fn tag(&self) -> u8 {
        match self {
            Event::SystemEvent(_) => b'S',
            Event::StockDirectory(_) => b'R',
            Event::StockTradingAction(_) => b'H',
            Event::RegSho(_) => b'Y',
            Event::MarketParticipantPosition(_) => b'L',
            Event::MwcbDeclineLevel(_) => b'V',
            Event::MwcbStatus(_) => b'W',
            Event::IpoQuotingPeriodUpdate(_) => b'K',
            Event::LuldAuctionCollar(_) => b'J',
            Event::OperationalHalt(_) => b'h',
            Event::AddOrder(_) => b'A',
            Event::AddOrderMpid(_) => b'F',
            Event::OrderExecuted(_) => b'E',
            Event::OrderExecutedWithPrice(_) => b'C',
            Event::OrderCancel(_) => b'X',
            Event::OrderDelete(_) => b'D',
            Event::OrderReplace(_) => b'U',
            Event::NonCrossTrade(_) => b'P',
            Event::CrossTrade(_) => b'Q',
            Event::BrokenTrade(_) => b'B',
            Event::Noii(_) => b'I',
            Event::RetailPriceImprovement(_) => b'N',
            Event::DirectListingCapitalRaise(_) => b'O',
        }
    }

    /// Common header carried by every message.
    pub fn header(&self) -> &MessageHeader {
        match self {
            Event::SystemEvent(m) => &m.header,
            Event::StockDirectory(m) => &m.header,
            Event::StockTradingAction(m) => &m.header,
            Event::RegSho(m) => &m.header,
            Event::MarketParticipantPosition(m) => &m.header,
            Event::MwcbDeclineLevel(m) => &m.header,
            Event::MwcbStatus(m) => &m.header,
            Event::IpoQuotingPeriodUpdate(m) => &m.header,
            Event::LuldAuctionCollar(m) => &m.header,
            Event::OperationalHalt(m) => &m.header,
            Event::AddOrder(m) => &m.header,
            Event::AddOrderMpid(m) => &m.header,
            Event::OrderExecuted(m) => &m.header,
            Event::OrderExecutedWithPrice(m) => &m.header,
            Event::OrderCancel(m) => &m.header,
            Event::OrderDelete(m) => &m.header,
            Event::OrderReplace(m) => &m.header,
            Event::NonCrossTrade(m) => &m.header,
            Event::CrossTrade(m) => &m.header,
            Event::BrokenTrade(m) => &m.header,
            Event::Noii(m) => &m.header,
            Event::RetailPriceImprovement(m) => &m.header,
            Event::DirectListingCapitalRaise(m) => &m.header,
        }
    }
}

/// Fixed payload length (type tag included) of each known message type.
/// Lengths on the wire come from the frame prefix; this table exists for
/// composing streams in tests and generators.
pub const fn wire_len(tag: u8) -> Option<u16> {
    match tag {
        b'S' => Some(12),
        b'R' => Some(39),
        b'H' => Some(25),
        b'Y' => Some(20),
        b'L' => Some(26),
        b'V' => Some(35),
        b'W' => Some(12),
        b'K' => Some(28),
        b'J' => Some(35),
        b'h' => Some(21),
        b'A' => Some(36),
        b'F' => Some(40),
        b'E' => Some(31),
        b'C' => Some(36),
        b'X' => Some(23),
        b'D' => Some(19),
        b'U' => Some(35),
        b'P' => Some(44),
        b'Q' => Some(40),
        b'B' => Some(19),
        b'I' => Some(50),
        b'N' => Some(20),
        b'O' => Some(48),
        _ => None,
    }
}
