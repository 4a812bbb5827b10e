use car_auction_engine::domain::{Auction, AuctionStatus, CarAuctionStatus};
use car_auction_engine::events::AuctionEvent;
use car_auction_engine::persistence::AuctionStore;
use chrono::Duration;
use uuid::Uuid;

#[path = "utils/mod.rs"]
mod utils;
use utils::*;

fn count_events(
    rx: &mut tokio::sync::broadcast::Receiver<AuctionEvent>,
    mut pred: impl FnMut(&AuctionEvent) -> bool,
) -> usize {
    let mut count = 0;
    while let Ok(event) = rx.try_recv() {
        if pred(&event) {
            count += 1;
        }
    }
    count
}

#[test]
fn sweep_before_start_leaves_auction_scheduled() {
    let fx = fixture();
    let auction = scheduled_auction(&fx, 200);

    let report = fx.engine.sweep(sample_start_time() - Duration::minutes(1));

    assert!(report.is_quiet());
    let auction = fx.engine.auction(auction.auction_id).unwrap().unwrap();
    assert_eq!(auction.status, AuctionStatus::Scheduled);
}

#[test]
fn sweep_activates_due_auction_and_announces_it() {
    let fx = fixture();
    let auction = scheduled_auction(&fx, 200);
    let mut rx = fx.events.subscribe();

    let report = fx.engine.sweep(just_after_start());

    assert_eq!(report.activated, 1);
    assert_eq!(report.settled, 0);
    let stored = fx.engine.auction(auction.auction_id).unwrap().unwrap();
    assert_eq!(stored.status, AuctionStatus::Active);
    assert_eq!(
        rx.try_recv().unwrap(),
        AuctionEvent::AuctionStarted {
            auction_id: auction.auction_id
        }
    );
}

#[test]
fn settlement_sells_car_when_reserve_met() {
    let fx = fixture();
    let auction = active_auction(&fx, 200);
    let buyer = seed_buyer(&fx, 5);
    fx.engine
        .place_bid(auction.auction_id, buyer, amount(250), just_after_start())
        .unwrap();
    let mut rx = fx.events.subscribe();

    let report = fx.engine.sweep(just_after_end());

    assert_eq!(report.settled, 1);
    let stored = fx.engine.auction(auction.auction_id).unwrap().unwrap();
    assert_eq!(stored.status, AuctionStatus::Ended);
    let car = lookup_car(&fx, auction.car);
    assert_eq!(car.auction_status, CarAuctionStatus::Sold);
    assert_eq!(car.current_auction, None);
    assert_eq!(
        rx.try_recv().unwrap(),
        AuctionEvent::AuctionEnded {
            auction_id: auction.auction_id
        }
    );
}

#[test]
fn settlement_releases_car_when_no_bids() {
    let fx = fixture();
    let auction = active_auction(&fx, 200);

    let report = fx.engine.sweep(just_after_end());

    assert_eq!(report.settled, 1);
    let stored = fx.engine.auction(auction.auction_id).unwrap().unwrap();
    assert_eq!(stored.status, AuctionStatus::Ended);
    let car = lookup_car(&fx, auction.car);
    assert_eq!(car.auction_status, CarAuctionStatus::None);
    assert_eq!(car.current_auction, None);
}

#[test]
fn settlement_reserve_met_exactly_sells() {
    // Reserve-met is non-strict: a stored high bid equal to the reserve
    // price still sells the car.
    let fx = fixture();
    let auction = active_auction(&fx, 200);
    let bidder = Uuid::new_v4();
    let mut stored = fx.engine.auction(auction.auction_id).unwrap().unwrap();
    stored.bids.push(bid(bidder, 200, just_after_start()));
    stored.current_bid = Some(amount(200));
    inject_auction(&fx, stored);

    fx.engine.sweep(just_after_end());

    let car = lookup_car(&fx, auction.car);
    assert_eq!(car.auction_status, CarAuctionStatus::Sold);
}

#[test]
fn settlement_recomputes_max_from_bid_sequence() {
    // The bid sequence is authoritative even when out of order and the
    // cached current_bid has drifted.
    let fx = fixture();
    let auction = active_auction(&fx, 200);
    let mut stored = fx.engine.auction(auction.auction_id).unwrap().unwrap();
    stored.bids = vec![
        bid(Uuid::new_v4(), 100, just_after_start()),
        bid(Uuid::new_v4(), 250, just_after_start() + Duration::minutes(1)),
        bid(Uuid::new_v4(), 180, just_after_start() + Duration::minutes(2)),
    ];
    stored.current_bid = Some(amount(180));
    inject_auction(&fx, stored);

    fx.engine.sweep(just_after_end());

    let settled = fx.engine.auction(auction.auction_id).unwrap().unwrap();
    assert_eq!(settled.status, AuctionStatus::Ended);
    assert_eq!(settled.max_bid(), amount(250));
    assert_eq!(settled.winning_bid().unwrap().amount, amount(250));
    let car = lookup_car(&fx, auction.car);
    assert_eq!(car.auction_status, CarAuctionStatus::Sold);
}

#[test]
fn lapsed_scheduled_auction_is_settled_in_one_sweep() {
    // A sweep that missed the whole window activates and settles the
    // auction in the same pass.
    let fx = fixture();
    let auction = scheduled_auction(&fx, 200);

    let report = fx.engine.sweep(just_after_end());

    assert_eq!(report.activated, 1);
    assert_eq!(report.settled, 1);
    let stored = fx.engine.auction(auction.auction_id).unwrap().unwrap();
    assert_eq!(stored.status, AuctionStatus::Ended);
    let car = lookup_car(&fx, auction.car);
    assert_eq!(car.auction_status, CarAuctionStatus::None);
}

#[test]
fn store_settles_scheduled_auction_directly() {
    // The settlement guard covers scheduled as well as active, so a
    // never-activated auction can still be ended.
    let fx = fixture();
    let auction = scheduled_auction(&fx, 200);

    let transition = fx
        .store
        .transition_status(
            auction.auction_id,
            &AuctionStatus::SETTLEABLE,
            AuctionStatus::Ended,
        )
        .unwrap()
        .unwrap();

    assert_eq!(transition.prior, AuctionStatus::Scheduled);
    assert_eq!(transition.auction.status, AuctionStatus::Ended);
}

#[test]
fn sweep_is_idempotent_and_notifies_once_per_transition() {
    let fx = fixture();
    let auction = active_auction(&fx, 200);
    let buyer = seed_buyer(&fx, 5);
    fx.engine
        .place_bid(auction.auction_id, buyer, amount(300), just_after_start())
        .unwrap();
    let mut rx = fx.events.subscribe();

    let first = fx.engine.sweep(just_after_end());
    let state_after_first = fx.engine.auction(auction.auction_id).unwrap().unwrap();
    let second = fx.engine.sweep(just_after_end());
    let state_after_second = fx.engine.auction(auction.auction_id).unwrap().unwrap();

    assert_eq!(first.settled, 1);
    assert!(second.is_quiet());
    assert_eq!(state_after_first, state_after_second);
    let ended_events = count_events(&mut rx, |event| {
        matches!(event, AuctionEvent::AuctionEnded { .. })
    });
    assert_eq!(ended_events, 1);
    // The car was written exactly once: sold and unlinked.
    let car = lookup_car(&fx, auction.car);
    assert_eq!(car.auction_status, CarAuctionStatus::Sold);
}

#[test]
fn double_activation_sweep_announces_once() {
    let fx = fixture();
    scheduled_auction(&fx, 200);
    let mut rx = fx.events.subscribe();

    let first = fx.engine.sweep(just_after_start());
    let second = fx.engine.sweep(just_after_start());

    assert_eq!(first.activated, 1);
    assert_eq!(second.activated, 0);
    let started_events = count_events(&mut rx, |event| {
        matches!(event, AuctionEvent::AuctionStarted { .. })
    });
    assert_eq!(started_events, 1);
}

#[test]
fn relisted_auction_is_ignored_by_the_sweep() {
    let fx = fixture();
    let auction = scheduled_auction(&fx, 200);
    let mut relisted = fx.engine.auction(auction.auction_id).unwrap().unwrap();
    relisted.status = AuctionStatus::Relisted;
    inject_auction(&fx, relisted);

    let report = fx.engine.sweep(just_after_end());

    assert!(report.is_quiet());
    let stored = fx.engine.auction(auction.auction_id).unwrap().unwrap();
    assert_eq!(stored.status, AuctionStatus::Relisted);
}

#[test]
fn failed_settlement_is_retried_by_the_next_sweep() {
    // A settlement whose car write fails reverts the status so the
    // auction stays eligible, and notifies nothing.
    let fx = fixture();
    let auction = active_auction(&fx, 200);
    let orphan = Auction {
        auction_id: Uuid::new_v4(),
        car: Uuid::new_v4(), // no such car in the catalog
        ..auction.clone()
    };
    inject_auction(&fx, orphan.clone());
    let mut rx = fx.events.subscribe();

    let report = fx.engine.sweep(just_after_end());

    // The healthy auction settles; the orphan fails and stays eligible.
    assert_eq!(report.settled, 1);
    assert_eq!(report.failed, 1);
    let stuck = fx.engine.auction(orphan.auction_id).unwrap().unwrap();
    assert_eq!(stuck.status, AuctionStatus::Active);
    let ended = count_events(&mut rx, |event| {
        matches!(event, AuctionEvent::AuctionEnded { auction_id } if *auction_id == orphan.auction_id)
    });
    assert_eq!(ended, 0);

    let retry = fx.engine.sweep(just_after_end() + Duration::minutes(1));
    assert_eq!(retry.failed, 1);
}
