use car_auction_engine::domain::{
    Auction, AuctionStatus, Bid, CarApproval, CarAuctionStatus, CarCatalog, CarId, CarRecord,
    UserId,
};
use car_auction_engine::engine::{AuctionEngine, CreateAuction, CreateOrigin};
use car_auction_engine::events::EventBus;
use car_auction_engine::money::Amount;
use car_auction_engine::persistence::{
    AuctionStore, InMemoryAuctionStore, InMemoryCarCatalog, InMemoryQuotaStore,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use uuid::Uuid;
// See https://users.rust-lang.org/t/sharing-code-and-macros-in-tests-directory/3098/7

/// An engine wired to in-memory stores, with handles kept so tests can
/// seed cars and subscriptions and inspect persisted state directly.
pub struct Fixture {
    pub engine: AuctionEngine,
    pub store: Arc<InMemoryAuctionStore>,
    pub cars: Arc<InMemoryCarCatalog>,
    pub quotas: Arc<InMemoryQuotaStore>,
    pub events: EventBus,
}

pub fn fixture() -> Fixture {
    let store = Arc::new(InMemoryAuctionStore::new());
    let cars = Arc::new(InMemoryCarCatalog::new());
    let quotas = Arc::new(InMemoryQuotaStore::new());
    let events = EventBus::default();
    let engine = AuctionEngine::new(store.clone(), cars.clone(), quotas.clone(), events.clone());
    Fixture {
        engine,
        store,
        cars,
        quotas,
        events,
    }
}

// Sample data for tests

pub fn amount(value: i64) -> Amount {
    Amount::new(value).unwrap()
}

pub fn sample_start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
}

pub fn sample_end_time() -> DateTime<Utc> {
    sample_start_time() + Duration::hours(24)
}

pub fn just_after_start() -> DateTime<Utc> {
    sample_start_time() + Duration::seconds(1)
}

pub fn just_after_end() -> DateTime<Utc> {
    sample_end_time() + Duration::seconds(1)
}

pub fn sample_seller() -> UserId {
    Uuid::new_v4()
}

pub fn seed_approved_car(fx: &Fixture, seller: UserId) -> CarId {
    let car_id = Uuid::new_v4();
    fx.cars
        .add_car(CarRecord {
            car_id,
            seller,
            approval: CarApproval::Approved,
            auction_status: CarAuctionStatus::None,
            current_auction: None,
            auction_count: 0,
        })
        .unwrap();
    car_id
}

pub fn seed_pending_car(fx: &Fixture, seller: UserId) -> CarId {
    let car_id = Uuid::new_v4();
    fx.cars
        .add_car(CarRecord {
            car_id,
            seller,
            approval: CarApproval::Pending,
            auction_status: CarAuctionStatus::None,
            current_auction: None,
            auction_count: 0,
        })
        .unwrap();
    car_id
}

pub fn seed_buyer(fx: &Fixture, car_bidding_limit: u32) -> UserId {
    let user_id = Uuid::new_v4();
    fx.quotas.set_subscription(user_id, car_bidding_limit).unwrap();
    user_id
}

pub fn create_params(car_id: CarId, reserve: i64) -> CreateAuction {
    CreateAuction {
        car_id,
        start_time: sample_start_time(),
        end_time: sample_end_time(),
        reserve_price: amount(reserve),
    }
}

/// Creates a scheduled auction for a fresh approved car.
pub fn scheduled_auction(fx: &Fixture, reserve: i64) -> Auction {
    let seller = sample_seller();
    let car_id = seed_approved_car(fx, seller);
    fx.engine
        .create_auction(CreateOrigin::Seller(seller), create_params(car_id, reserve))
        .unwrap()
}

/// Creates an auction and sweeps it into `active`.
pub fn active_auction(fx: &Fixture, reserve: i64) -> Auction {
    let auction = scheduled_auction(fx, reserve);
    fx.engine.sweep(just_after_start());
    let auction = fx.engine.auction(auction.auction_id).unwrap().unwrap();
    assert_eq!(auction.status, AuctionStatus::Active);
    auction
}

/// Injects an auction record directly into the store, bypassing the
/// engine, for settlement scenarios that need a hand-built bid history.
pub fn inject_auction(fx: &Fixture, auction: Auction) {
    fx.store.insert(auction).unwrap();
}

pub fn bid(bidder: UserId, value: i64, at: DateTime<Utc>) -> Bid {
    Bid {
        bidder,
        amount: amount(value),
        at,
    }
}

pub fn lookup_car(fx: &Fixture, car_id: CarId) -> CarRecord {
    fx.cars.car(car_id).unwrap().unwrap()
}
