/// Limit order book reconstruction
///
/// Maintains full depth for a single instrument from the order-level event
/// stream. Price levels live in BTreeMaps keyed by raw price; each level is
/// an intrusive FIFO of order nodes held in a slab arena, so removing an
/// arbitrary order is O(1) once its handle is known. A hash index maps order
/// reference numbers to handles.
///
/// The book never fails: events for other instruments, unknown reference
/// numbers, or malformed sides degrade to no-ops, because a real feed carries
/// plenty of traffic that is irrelevant to any one book.

use std::collections::BTreeMap;
use std::io;

use hashbrown::HashMap;
use slab::Slab;

use crate::format::trim_padding;
use crate::messages::{Event, PRICE_SCALE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Decode the wire buy/sell indicator. Anything but 'B' or 'S' is None.
    pub fn from_indicator(byte: u8) -> Option<Side> {
        match byte {
            b'B' => Some(Side::Buy),
            b'S' => Some(Side::Sell),
            _ => None,
        }
    }
}

type Handle = usize;

#[derive(Debug)]
struct OrderNode {
    reference: u64,
    side: Side,
    shares: u32,
    price: u32,
    prev: Option<Handle>,
    next: Option<Handle>,
}

#[derive(Debug, Default)]
struct PriceLevel {
    total_shares: u32,
    head: Option<Handle>,
    tail: Option<Handle>,
    len: usize,
}

/// A resting order as seen through the read-only views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookOrder {
    pub reference: u64,
    pub side: Side,
    pub shares: u32,
    pub price: u32,
}

/// Read-only view of one price level.
#[derive(Clone, Copy)]
pub struct LevelView<'a> {
    price: u32,
    level: &'a PriceLevel,
    arena: &'a Slab<OrderNode>,
}

impl<'a> LevelView<'a> {
    pub fn price(&self) -> u32 {
        self.price
    }

    /// Sum of shares across the level's queue.
    pub fn total_shares(&self) -> u32 {
        self.level.total_shares
    }

    pub fn order_count(&self) -> usize {
        self.level.len
    }

    /// Orders in time priority, earliest arrival first.
    pub fn orders(&self) -> LevelOrders<'a> {
        LevelOrders {
            arena: self.arena,
            cursor: self.level.head,
        }
    }
}

/// FIFO iterator over the orders of one level.
pub struct LevelOrders<'a> {
    arena: &'a Slab<OrderNode>,
    cursor: Option<Handle>,
}

impl<'a> Iterator for LevelOrders<'a> {
    type Item = BookOrder;

    fn next(&mut self) -> Option<BookOrder> {
        let handle = self.cursor?;
        let node = &self.arena[handle];
        self.cursor = node.next;
        Some(BookOrder {
            reference: node.reference,
            side: node.side,
            shares: node.shares,
            price: node.price,
        })
    }
}

/// Limit order book for one instrument.
pub struct OrderBook {
    symbol: [u8; 8],
    bids: BTreeMap<u32, PriceLevel>,
    asks: BTreeMap<u32, PriceLevel>,
    index: HashMap<u64, Handle>,
    arena: Slab<OrderNode>,
}

impl OrderBook {
    /// Create a book bound to `symbol` (at most 8 ASCII characters; shorter
    /// symbols are space padded the way the feed pads them).
    pub fn new(symbol: &str) -> Self {
        let mut padded = [b' '; 8];
        let bytes = symbol.as_bytes();
        let n = bytes.len().min(8);
        padded[..n].copy_from_slice(&bytes[..n]);
        OrderBook {
            symbol: padded,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            index: HashMap::new(),
            arena: Slab::new(),
        }
    }

    pub fn symbol(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(trim_padding(&self.symbol))
    }

    /// Apply one event to the book. Events that do not affect book state
    /// (non-order types, other instruments, unknown refs) are ignored.
    pub fn process(&mut self, event: &Event) {
        match event {
            Event::AddOrder(msg) => self.handle_add(
                msg.order_reference_number,
                msg.buy_sell_indicator,
                msg.shares,
                &msg.stock,
                msg.price,
            ),
            // MPID attribution has no book effect.
            Event::AddOrderMpid(msg) => self.handle_add(
                msg.order_reference_number,
                msg.buy_sell_indicator,
                msg.shares,
                &msg.stock,
                msg.price,
            ),
            Event::OrderExecuted(msg) => {
                self.reduce(msg.order_reference_number, msg.executed_shares)
            }
            // The execution price does not move the resting order.
            Event::OrderExecutedWithPrice(msg) => {
                self.reduce(msg.order_reference_number, msg.executed_shares)
            }
            Event::OrderCancel(msg) => {
                self.reduce(msg.order_reference_number, msg.cancelled_shares)
            }
            Event::OrderDelete(msg) => self.delete(msg.order_reference_number),
            Event::OrderReplace(msg) => self.replace(
                msg.original_order_reference_number,
                msg.new_order_reference_number,
                msg.shares,
                msg.price,
            ),
            _ => {}
        }
    }

    fn handle_add(&mut self, reference: u64, indicator: u8, shares: u32, stock: &[u8; 8], price: u32) {
        if trim_padding(stock) != trim_padding(&self.symbol) {
            return;
        }
        let Some(side) = Side::from_indicator(indicator) else {
            return;
        };
        self.insert_order(reference, side, shares, price);
    }

    fn insert_order(&mut self, reference: u64, side: Side, shares: u32, price: u32) {
        // Reference numbers are unique per book; a colliding add would orphan
        // the existing node, so it is dropped instead.
        if self.index.contains_key(&reference) {
            log::warn!("duplicate order reference {reference}, ignoring add");
            return;
        }
        let handle = self.arena.insert(OrderNode {
            reference,
            side,
            shares,
            price,
            prev: None,
            next: None,
        });
        let ladder = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let level = ladder.entry(price).or_default();
        match level.tail {
            Some(tail) => {
                self.arena[tail].next = Some(handle);
                self.arena[handle].prev = Some(tail);
            }
            None => level.head = Some(handle),
        }
        level.tail = Some(handle);
        level.len += 1;
        level.total_shares += shares;
        self.index.insert(reference, handle);
    }

    /// Take `amount` shares off an order, removing it (and its level, if
    /// emptied) once no shares remain. The feed occasionally reports a
    /// decrement larger than the remaining quantity; that is clamped so the
    /// level aggregate stays consistent.
    fn reduce(&mut self, reference: u64, amount: u32) {
        let Some(&handle) = self.index.get(&reference) else {
            return;
        };
        let (price, side, removed, depleted) = {
            let node = &mut self.arena[handle];
            let removed = amount.min(node.shares);
            if removed < amount {
                log::warn!(
                    "order {reference}: decrement {amount} exceeds remaining {}, clamping",
                    node.shares
                );
            }
            node.shares -= removed;
            (node.price, node.side, removed, node.shares == 0)
        };

        let ladder = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let mut drop_level = false;
        if let Some(level) = ladder.get_mut(&price) {
            level.total_shares = level.total_shares.saturating_sub(removed);
            if depleted {
                let (prev, next) = {
                    let node = &self.arena[handle];
                    (node.prev, node.next)
                };
                match prev {
                    Some(p) => self.arena[p].next = next,
                    None => level.head = next,
                }
                match next {
                    Some(n) => self.arena[n].prev = prev,
                    None => level.tail = prev,
                }
                level.len -= 1;
                drop_level = level.len == 0;
            }
        }
        if drop_level {
            ladder.remove(&price);
        }
        if depleted {
            self.arena.remove(handle);
            self.index.remove(&reference);
        }
    }

    fn delete(&mut self, reference: u64) {
        let Some(&handle) = self.index.get(&reference) else {
            return;
        };
        let remaining = self.arena[handle].shares;
        self.reduce(reference, remaining);
    }

    /// Atomic cancel-all of the original followed by an add of the new
    /// reference at the new price, keeping the original's side. The new
    /// reference may equal the original (a shares/price amendment).
    fn replace(&mut self, original: u64, new_reference: u64, shares: u32, price: u32) {
        let Some(&handle) = self.index.get(&original) else {
            return;
        };
        let side = self.arena[handle].side;
        let remaining = self.arena[handle].shares;
        self.reduce(original, remaining);
        self.insert_order(new_reference, side, shares, price);
    }

    /// Bid levels, best (highest price) first.
    pub fn bids(&self) -> impl Iterator<Item = LevelView<'_>> {
        self.bids
            .iter()
            .rev()
            .map(move |(&price, level)| LevelView {
                price,
                level,
                arena: &self.arena,
            })
    }

    /// Ask levels, best (lowest price) first.
    pub fn asks(&self) -> impl Iterator<Item = LevelView<'_>> {
        self.asks.iter().map(move |(&price, level)| LevelView {
            price,
            level,
            arena: &self.arena,
        })
    }

    pub fn best_bid(&self) -> Option<LevelView<'_>> {
        self.bids().next()
    }

    pub fn best_ask(&self) -> Option<LevelView<'_>> {
        self.asks().next()
    }

    /// Look up a resting order by reference number.
    pub fn order(&self, reference: u64) -> Option<BookOrder> {
        self.index.get(&reference).map(|&handle| {
            let node = &self.arena[handle];
            BookOrder {
                reference: node.reference,
                side: node.side,
                shares: node.shares,
                price: node.price,
            }
        })
    }

    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    pub fn bid_level_count(&self) -> usize {
        self.bids.len()
    }

    pub fn ask_level_count(&self) -> usize {
        self.asks.len()
    }

    /// Render the ladder as a table: asks from worst to best, then bids from
    /// best to worst. Informational only.
    pub fn snapshot<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "==========================================")?;
        writeln!(out, "    SHARES |        PRICE | SIDE")?;
        writeln!(out, "==========================================")?;
        for (&price, level) in self.asks.iter().rev() {
            writeln!(
                out,
                "{:>10} | {:>12.4} | Ask",
                level.total_shares,
                price as f64 / PRICE_SCALE
            )?;
        }
        writeln!(out, "-----------+--------------+------------")?;
        for (&price, level) in self.bids.iter().rev() {
            writeln!(
                out,
                "{:>10} | {:>12.4} | Bid",
                level.total_shares,
                price as f64 / PRICE_SCALE
            )?;
        }
        writeln!(out, "==========================================")?;
        Ok(())
    }
}
