/// Human-readable event rendering
///
/// Display implementations for every message type plus the `Event` union.
/// Prices are shown at their implied scale (4 decimals, or 8 for the MWCB
/// decline levels) and ASCII fields are trimmed of trailing padding. Purely
/// cosmetic; nothing here touches decoder or book state.

use std::borrow::Cow;
use std::fmt;

use crate::messages::*;

/// Strip trailing space padding and NUL bytes from a wire ASCII field.
pub fn trim_padding(bytes: &[u8]) -> &[u8] {
    let mut len = bytes.len();
    while len > 0 && (bytes[len - 1] == b' ' || bytes[len - 1] == 0) {
        len -= 1;
    }
    &bytes[..len]
}

/// Trimmed, lossy-UTF-8 view of a stock or MPID field.
pub fn symbol_str(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(trim_padding(bytes))
}

fn price4(raw: u32) -> f64 {
    raw as f64 / PRICE_SCALE
}

impl fmt::Display for SystemEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "System Event:\n  Timestamp: {}\n  Event Code: {}",
            self.header.timestamp, self.event_code as char
        )
    }
}

impl fmt::Display for StockDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stock Directory:\n  Timestamp: {}\n  Stock: {}\n  Round Lot Size: {}",
            self.header.timestamp,
            symbol_str(&self.stock),
            self.round_lot_size
        )
    }
}

impl fmt::Display for StockTradingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stock Trading Action:\n  Timestamp: {}\n  Stock: {}\n  State: {}",
            self.header.timestamp,
            symbol_str(&self.stock),
            self.trading_state as char
        )
    }
}

impl fmt::Display for RegSho {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Reg SHO Restriction:\n  Timestamp: {}\n  Stock: {}\n  Action: {}",
            self.header.timestamp,
            symbol_str(&self.stock),
            self.reg_sho_action as char
        )
    }
}

impl fmt::Display for MarketParticipantPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Market Participant Position:\n  Timestamp: {}\n  MPID: {}\n  Stock: {}",
            self.header.timestamp,
            symbol_str(&self.mpid),
            symbol_str(&self.stock)
        )
    }
}

impl fmt::Display for MwcbDeclineLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MWCB Decline Levels:\n  Timestamp: {}\n  Level 1: {:.8}\n  Level 2: {:.8}\n  Level 3: {:.8}",
            self.header.timestamp,
            self.level1 as f64 / MWCB_PRICE_SCALE,
            self.level2 as f64 / MWCB_PRICE_SCALE,
            self.level3 as f64 / MWCB_PRICE_SCALE
        )
    }
}

impl fmt::Display for MwcbStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MWCB Status:\n  Timestamp: {}\n  Breached Level: {}",
            self.header.timestamp, self.breached_level as char
        )
    }
}

impl fmt::Display for IpoQuotingPeriodUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IPO Quoting Period Update:\n  Timestamp: {}\n  Stock: {}\n  IPO Price: {:.4}",
            self.header.timestamp,
            symbol_str(&self.stock),
            price4(self.ipo_price)
        )
    }
}

impl fmt::Display for LuldAuctionCollar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LULD Auction Collar:\n  Timestamp: {}\n  Stock: {}\n  Reference: {:.4}\n  Upper: {:.4}\n  Lower: {:.4}",
            self.header.timestamp,
            symbol_str(&self.stock),
            price4(self.auction_collar_reference_price),
            price4(self.upper_auction_collar_price),
            price4(self.lower_auction_collar_price)
        )
    }
}

impl fmt::Display for OperationalHalt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Operational Halt:\n  Timestamp: {}\n  Stock: {}\n  Action: {}",
            self.header.timestamp,
            symbol_str(&self.stock),
            self.operational_halt_action as char
        )
    }
}

impl fmt::Display for AddOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Add Order:\n  Timestamp: {}\n  Ref#: {}\n  Stock: {}\n  Side: {}\n  Shares: {}\n  Price: {:.4}",
            self.header.timestamp,
            self.order_reference_number,
            symbol_str(&self.stock),
            self.buy_sell_indicator as char,
            self.shares,
            price4(self.price)
        )
    }
}

impl fmt::Display for AddOrderMpid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Add Order (MPID):\n  Timestamp: {}\n  Ref#: {}\n  Stock: {}\n  MPID: {}\n  Side: {}\n  Shares: {}\n  Price: {:.4}",
            self.header.timestamp,
            self.order_reference_number,
            symbol_str(&self.stock),
            symbol_str(&self.attribution),
            self.buy_sell_indicator as char,
            self.shares,
            price4(self.price)
        )
    }
}

impl fmt::Display for OrderExecuted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order Executed:\n  Timestamp: {}\n  Ref#: {}\n  Shares: {}\n  Match#: {}",
            self.header.timestamp,
            self.order_reference_number,
            self.executed_shares,
            self.match_number
        )
    }
}

impl fmt::Display for OrderExecutedWithPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order Executed w/ Price:\n  Timestamp: {}\n  Ref#: {}\n  Shares: {}\n  Price: {:.4}",
            self.header.timestamp,
            self.order_reference_number,
            self.executed_shares,
            price4(self.execution_price)
        )
    }
}

impl fmt::Display for OrderCancel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order Cancel:\n  Timestamp: {}\n  Ref#: {}\n  Cancelled Shares: {}",
            self.header.timestamp, self.order_reference_number, self.cancelled_shares
        )
    }
}

impl fmt::Display for OrderDelete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order Delete:\n  Timestamp: {}\n  Ref#: {}",
            self.header.timestamp, self.order_reference_number
        )
    }
}

impl fmt::Display for OrderReplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order Replace:\n  Timestamp: {}\n  Original Ref#: {}\n  New Ref#: {}\n  Shares: {}\n  Price: {:.4}",
            self.header.timestamp,
            self.original_order_reference_number,
            self.new_order_reference_number,
            self.shares,
            price4(self.price)
        )
    }
}

impl fmt::Display for NonCrossTrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Non-Cross Trade:\n  Timestamp: {}\n  Stock: {}\n  Side: {}\n  Shares: {}\n  Price: {:.4}\n  Match#: {}",
            self.header.timestamp,
            symbol_str(&self.stock),
            self.buy_sell_indicator as char,
            self.shares,
            price4(self.price),
            self.match_number
        )
    }
}

impl fmt::Display for CrossTrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cross Trade:\n  Timestamp: {}\n  Stock: {}\n  Shares: {}\n  Cross Price: {:.4}\n  Match#: {}\n  Cross Type: {}",
            self.header.timestamp,
            symbol_str(&self.stock),
            self.shares,
            price4(self.cross_price),
            self.match_number,
            self.cross_type as char
        )
    }
}

impl fmt::Display for BrokenTrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Broken Trade:\n  Timestamp: {}\n  Match#: {}",
            self.header.timestamp, self.match_number
        )
    }
}

impl fmt::Display for Noii {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NOII:\n  Timestamp: {}\n  Stock: {}\n  Paired Shares: {}\n  Imbalance: {} ({})\n  Far Price: {:.4}\n  Near Price: {:.4}\n  Reference Price: {:.4}\n  Cross Type: {}",
            self.header.timestamp,
            symbol_str(&self.stock),
            self.paired_shares,
            self.imbalance_shares,
            self.imbalance_direction as char,
            price4(self.far_price),
            price4(self.near_price),
            price4(self.current_reference_price),
            self.cross_type as char
        )
    }
}

impl fmt::Display for RetailPriceImprovement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Retail Price Improvement:\n  Timestamp: {}\n  Stock: {}\n  Interest: {}",
            self.header.timestamp,
            symbol_str(&self.stock),
            self.interest_flag as char
        )
    }
}

impl fmt::Display for DirectListingCapitalRaise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Direct Listing w/ Capital Raise:\n  Timestamp: {}\n  Stock: {}\n  Eligibility: {}\n  Min Price: {:.4}\n  Max Price: {:.4}",
            self.header.timestamp,
            symbol_str(&self.stock),
            self.open_eligibility_status as char,
            price4(self.minimum_allowable_price),
            price4(self.maximum_allowable_price)
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::SystemEvent(m) => m.fmt(f),
            Event::StockDirectory(m) => m.fmt(f),
            Event::StockTradingAction(m) => m.fmt(f),
            Event::RegSho(m) => m.fmt(f),
            Event::MarketParticipantPosition(m) => m.fmt(f),
            Event::MwcbDeclineLevel(m) => m.fmt(f),
            Event::MwcbStatus(m) => m.fmt(f),
            Event::IpoQuotingPeriodUpdate(m) => m.fmt(f),
            Event::LuldAuctionCollar(m) => m.fmt(f),
            Event::OperationalHalt(m) => m.fmt(f),
            Event::AddOrder(m) => m.fmt(f),
            Event::AddOrderMpid(m) => m.fmt(f),
            Event::OrderExecuted(m) => m.fmt(f),
            Event::OrderExecutedWithPrice(m) => m.fmt(f),
            Event::OrderCancel(m) => m.fmt(f),
            Event::OrderDelete(m) => m.fmt(f),
            Event::OrderReplace(m) => m.fmt(f),
            Event::NonCrossTrade(m) => m.fmt(f),
            Event::CrossTrade(m) => m.fmt(f),
            Event::BrokenTrade(m) => m.fmt(f),
            Event::Noii(m) => m.fmt(f),
            Event::RetailPriceImprovement(m) => m.fmt(f),
            Event::DirectListingCapitalRaise(m) => m.fmt(f),
        }
    }
}
