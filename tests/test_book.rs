/// Order book correctness tests

use itch_feed::messages::{
    AddOrder, AddOrderMpid, CrossTrade, MessageHeader, OrderCancel, OrderDelete, OrderExecuted,
    OrderExecutedWithPrice, OrderReplace, SystemEvent,
};
use itch_feed::{Event, OrderBook, Side};

const STOCK: [u8; 8] = *b"STOCK1  ";

fn add(reference: u64, side: u8, shares: u32, price: u32) -> Event {
    Event::AddOrder(AddOrder {
        header: MessageHeader::default(),
        order_reference_number: reference,
        buy_sell_indicator: side,
        shares,
        stock: STOCK,
        price,
    })
}

fn execute(reference: u64, shares: u32) -> Event {
    Event::OrderExecuted(OrderExecuted {
        header: MessageHeader::default(),
        order_reference_number: reference,
        executed_shares: shares,
        match_number: 0,
    })
}

fn cancel(reference: u64, shares: u32) -> Event {
    Event::OrderCancel(OrderCancel {
        header: MessageHeader::default(),
        order_reference_number: reference,
        cancelled_shares: shares,
    })
}

fn delete(reference: u64) -> Event {
    Event::OrderDelete(OrderDelete {
        header: MessageHeader::default(),
        order_reference_number: reference,
    })
}

fn replace(original: u64, new_reference: u64, shares: u32, price: u32) -> Event {
    Event::OrderReplace(OrderReplace {
        header: MessageHeader::default(),
        original_order_reference_number: original,
        new_order_reference_number: new_reference,
        shares,
        price,
    })
}

fn book() -> OrderBook {
    OrderBook::new("STOCK1")
}

/// Level aggregates must always equal the sum over their queues.
fn assert_consistent(book: &OrderBook) {
    for level in book.bids().chain(book.asks()) {
        let queue_sum: u32 = level.orders().map(|o| o.shares).sum();
        assert_eq!(
            level.total_shares(),
            queue_sum,
            "level {} aggregate out of sync",
            level.price()
        );
        assert!(level.order_count() > 0, "empty level left in ladder");
    }
}

#[test]
fn test_add_single_bid() {
    let mut book = book();
    book.process(&add(1, b'B', 100, 5000));

    let best = book.best_bid().unwrap();
    assert_eq!(best.price(), 5000);
    assert_eq!(best.total_shares(), 100);
    assert!(book.best_ask().is_none());
    assert_eq!(book.order_count(), 1);
    assert_consistent(&book);
}

#[test]
fn test_add_then_partial_execute() {
    let mut book = book();
    book.process(&add(100, b'B', 1000, 5000));
    book.process(&execute(100, 300));

    let levels: Vec<_> = book.bids().collect();
    assert_eq!(levels.len(), 1);
    assert_eq!(levels[0].price(), 5000);
    assert_eq!(levels[0].total_shares(), 700);
    assert_eq!(book.order(100).unwrap().shares, 700);
    assert_consistent(&book);
}

#[test]
fn test_execute_to_zero_removes_order_and_level() {
    let mut book = book();
    book.process(&add(100, b'S', 500, 5100));
    book.process(&execute(100, 500));

    assert_eq!(book.ask_level_count(), 0);
    assert_eq!(book.order_count(), 0);
    assert!(book.order(100).is_none());
}

#[test]
fn test_add_then_full_delete() {
    let mut book = book();
    book.process(&add(100, b'B', 1000, 5000));
    book.process(&delete(100));

    assert_eq!(book.bid_level_count(), 0);
    assert_eq!(book.ask_level_count(), 0);
    assert_eq!(book.order_count(), 0);
}

#[test]
fn test_delete_is_idempotent() {
    let mut book = book();
    book.process(&add(100, b'B', 1000, 5000));
    book.process(&delete(100));
    book.process(&delete(100)); // second delete is a no-op

    assert_eq!(book.bid_level_count(), 0);
    assert_eq!(book.order_count(), 0);
}

#[test]
fn test_cancel_partial_then_remainder() {
    let mut book = book();
    book.process(&add(1, b'S', 400, 7000));
    book.process(&cancel(1, 150));
    assert_eq!(book.best_ask().unwrap().total_shares(), 250);

    book.process(&cancel(1, 250));
    assert_eq!(book.ask_level_count(), 0);
    assert_eq!(book.order_count(), 0);
}

#[test]
fn test_replace_moves_to_new_price() {
    let mut book = book();
    book.process(&add(10, b'B', 100, 5000));
    book.process(&replace(10, 11, 100, 5100));

    let levels: Vec<_> = book.bids().collect();
    assert_eq!(levels.len(), 1);
    assert_eq!(levels[0].price(), 5100);
    assert_eq!(levels[0].total_shares(), 100);
    assert!(book.order(10).is_none());
    let moved = book.order(11).unwrap();
    assert_eq!(moved.shares, 100);
    assert_eq!(moved.side, Side::Buy);
    assert_consistent(&book);
}

#[test]
fn test_replace_keeps_side() {
    let mut book = book();
    book.process(&add(10, b'S', 100, 5100));
    book.process(&replace(10, 11, 50, 5200));

    assert_eq!(book.bid_level_count(), 0);
    assert_eq!(book.order(11).unwrap().side, Side::Sell);
    assert_eq!(book.best_ask().unwrap().price(), 5200);
}

#[test]
fn test_replace_with_same_reference_amends() {
    let mut book = book();
    book.process(&add(10, b'B', 100, 5000));
    book.process(&replace(10, 10, 250, 5050));

    let amended = book.order(10).unwrap();
    assert_eq!(amended.shares, 250);
    assert_eq!(amended.price, 5050);
    assert_eq!(book.bid_level_count(), 1);
    assert_consistent(&book);
}

#[test]
fn test_replace_unknown_reference_is_noop() {
    let mut book = book();
    book.process(&replace(12345, 54321, 100, 5000));
    assert_eq!(book.bid_level_count(), 0);
    assert_eq!(book.ask_level_count(), 0);
    assert_eq!(book.order_count(), 0);
}

#[test]
fn test_unknown_reference_mutations_are_noops() {
    let mut book = book();
    book.process(&execute(777, 10));
    book.process(&cancel(777, 10));
    book.process(&delete(777));
    assert_eq!(book.order_count(), 0);
}

#[test]
fn test_middle_deletion_preserves_time_priority() {
    let mut book = book();
    book.process(&add(1, b'B', 100, 5000));
    book.process(&add(2, b'B', 100, 5000));
    book.process(&add(3, b'B', 100, 5000));
    book.process(&delete(2));

    let level = book.best_bid().unwrap();
    assert_eq!(level.total_shares(), 200);
    let refs: Vec<u64> = level.orders().map(|o| o.reference).collect();
    assert_eq!(refs, vec![1, 3]);
    assert_consistent(&book);
}

#[test]
fn test_fifo_order_within_level() {
    let mut book = book();
    for reference in 1..=5 {
        book.process(&add(reference, b'S', 10 * reference as u32, 6000));
    }
    let refs: Vec<u64> = book.best_ask().unwrap().orders().map(|o| o.reference).collect();
    assert_eq!(refs, vec![1, 2, 3, 4, 5]);
    assert_eq!(book.best_ask().unwrap().total_shares(), 10 + 20 + 30 + 40 + 50);
}

#[test]
fn test_over_execute_clamps_and_removes() {
    let mut book = book();
    book.process(&add(1, b'B', 100, 5000));
    book.process(&add(2, b'B', 50, 5000));
    // Decrement larger than remaining: clamp, never wrap.
    book.process(&execute(1, 150));

    let level = book.best_bid().unwrap();
    assert_eq!(level.total_shares(), 50);
    let refs: Vec<u64> = level.orders().map(|o| o.reference).collect();
    assert_eq!(refs, vec![2]);
    assert!(book.order(1).is_none());
    assert_consistent(&book);
}

#[test]
fn test_zero_share_add_is_accepted() {
    let mut book = book();
    book.process(&add(1, b'B', 0, 5000));

    let level = book.best_bid().unwrap();
    assert_eq!(level.total_shares(), 0);
    assert_eq!(level.order_count(), 1);

    book.process(&delete(1));
    assert_eq!(book.bid_level_count(), 0);
    assert_eq!(book.order_count(), 0);
}

#[test]
fn test_other_symbol_is_ignored() {
    let mut book = book();
    book.process(&Event::AddOrder(AddOrder {
        header: MessageHeader::default(),
        order_reference_number: 1,
        buy_sell_indicator: b'B',
        shares: 100,
        stock: *b"OTHER   ",
        price: 5000,
    }));
    assert_eq!(book.order_count(), 0);
    assert_eq!(book.bid_level_count(), 0);
}

#[test]
fn test_invalid_side_is_ignored() {
    let mut book = book();
    book.process(&Event::AddOrder(AddOrder {
        header: MessageHeader::default(),
        order_reference_number: 1,
        buy_sell_indicator: b'X',
        shares: 100,
        stock: STOCK,
        price: 5000,
    }));
    assert_eq!(book.order_count(), 0);
}

#[test]
fn test_mpid_add_behaves_like_plain_add() {
    let mut book = book();
    book.process(&Event::AddOrderMpid(AddOrderMpid {
        header: MessageHeader::default(),
        order_reference_number: 9,
        buy_sell_indicator: b'B',
        shares: 300,
        stock: STOCK,
        price: 4900,
        attribution: *b"VIRT",
    }));

    let best = book.best_bid().unwrap();
    assert_eq!(best.price(), 4900);
    assert_eq!(best.total_shares(), 300);
    assert_eq!(book.order(9).unwrap().side, Side::Buy);
}

#[test]
fn test_execution_price_does_not_move_order() {
    let mut book = book();
    book.process(&add(5, b'S', 200, 5100));
    book.process(&Event::OrderExecutedWithPrice(OrderExecutedWithPrice {
        header: MessageHeader::default(),
        order_reference_number: 5,
        executed_shares: 50,
        match_number: 1,
        printable: b'Y',
        execution_price: 5_250, // better than displayed; book ignores it
    }));

    let level = book.best_ask().unwrap();
    assert_eq!(level.price(), 5100);
    assert_eq!(level.total_shares(), 150);
    assert_eq!(book.order(5).unwrap().price, 5100);
}

#[test]
fn test_non_book_events_have_no_effect() {
    let mut book = book();
    book.process(&add(1, b'B', 100, 5000));
    book.process(&Event::SystemEvent(SystemEvent {
        header: MessageHeader::default(),
        event_code: b'O',
    }));
    book.process(&Event::CrossTrade(CrossTrade {
        header: MessageHeader::default(),
        shares: 5_000,
        stock: STOCK,
        cross_price: 5000,
        match_number: 3,
        cross_type: b'O',
    }));

    assert_eq!(book.order_count(), 1);
    assert_eq!(book.best_bid().unwrap().total_shares(), 100);
}

#[test]
fn test_levels_across_prices_and_sides() {
    let mut book = book();
    book.process(&add(1, b'B', 100, 5000));
    book.process(&add(2, b'B', 200, 4990));
    book.process(&add(3, b'B', 300, 5000));
    book.process(&add(4, b'S', 400, 5010));
    book.process(&add(5, b'S', 500, 5020));

    assert_eq!(book.bid_level_count(), 2);
    assert_eq!(book.ask_level_count(), 2);
    assert_eq!(book.best_bid().unwrap().price(), 5000);
    assert_eq!(book.best_bid().unwrap().total_shares(), 400);
    assert_eq!(book.best_ask().unwrap().price(), 5010);
    assert_consistent(&book);
}

#[test]
fn test_scripted_sequence_stays_consistent() {
    let mut book = book();
    book.process(&add(1, b'B', 500, 5000));
    book.process(&add(2, b'B', 300, 5000));
    book.process(&add(3, b'S', 400, 5010));
    book.process(&add(4, b'S', 250, 5020));
    book.process(&execute(1, 200));
    book.process(&cancel(3, 100));
    book.process(&replace(4, 40, 600, 5015));
    book.process(&execute(2, 300)); // full fill
    book.process(&delete(40));

    assert_consistent(&book);
    assert_eq!(book.order_count(), 2); // refs 1 and 3 remain
    assert_eq!(book.order(1).unwrap().shares, 300);
    assert_eq!(book.order(3).unwrap().shares, 300);
    assert_eq!(book.bid_level_count(), 1);
    assert_eq!(book.ask_level_count(), 1);
}
