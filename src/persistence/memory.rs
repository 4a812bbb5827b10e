// src/persistence/memory.rs
//
// In-memory implementations of the store and the external collaborators,
// used by the HTTP app and the tests. Each store holds one mutex, so the
// conditional primitives are trivially atomic per auction.
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::store::{AuctionStore, StatusTransition, StoreError};
use crate::domain::auctions::Auction;
use crate::domain::bids::Bid;
use crate::domain::cars::{CarAuctionState, CarCatalog, CarRecord};
use crate::domain::core::{AuctionId, AuctionStatus, CarId, DomainError, UserId};
use crate::domain::quotas::{BiddingQuota, QuotaProvider};
use crate::money::Amount;

fn locked<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Unavailable(format!("{} lock poisoned", what)))
}

#[derive(Default)]
pub struct InMemoryAuctionStore {
    auctions: Mutex<HashMap<AuctionId, Auction>>,
}

impl InMemoryAuctionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuctionStore for InMemoryAuctionStore {
    fn insert(&self, auction: Auction) -> Result<(), StoreError> {
        let mut auctions = locked(&self.auctions, "auction store")?;
        auctions.insert(auction.auction_id, auction);
        Ok(())
    }

    fn get(&self, auction_id: AuctionId) -> Result<Option<Auction>, StoreError> {
        let auctions = locked(&self.auctions, "auction store")?;
        Ok(auctions.get(&auction_id).cloned())
    }

    fn all(&self) -> Result<Vec<Auction>, StoreError> {
        let auctions = locked(&self.auctions, "auction store")?;
        Ok(auctions.values().cloned().collect())
    }

    fn live_auction_for_car(&self, car_id: CarId) -> Result<Option<AuctionId>, StoreError> {
        let auctions = locked(&self.auctions, "auction store")?;
        Ok(auctions
            .values()
            .find(|auction| auction.car == car_id && auction.status.is_live())
            .map(|auction| auction.auction_id))
    }

    fn due_for_activation(&self, now: DateTime<Utc>) -> Result<Vec<AuctionId>, StoreError> {
        let auctions = locked(&self.auctions, "auction store")?;
        Ok(auctions
            .values()
            .filter(|a| a.status == AuctionStatus::Scheduled && a.start_time <= now)
            .map(|a| a.auction_id)
            .collect())
    }

    fn due_for_settlement(&self, now: DateTime<Utc>) -> Result<Vec<AuctionId>, StoreError> {
        let auctions = locked(&self.auctions, "auction store")?;
        Ok(auctions
            .values()
            .filter(|a| a.status.is_live() && a.end_time <= now)
            .map(|a| a.auction_id)
            .collect())
    }

    fn transition_status(
        &self,
        auction_id: AuctionId,
        from: &[AuctionStatus],
        to: AuctionStatus,
    ) -> Result<Option<StatusTransition>, StoreError> {
        let mut auctions = locked(&self.auctions, "auction store")?;
        match auctions.get_mut(&auction_id) {
            Some(auction) if from.contains(&auction.status) => {
                let prior = auction.status;
                auction.status = to;
                Ok(Some(StatusTransition {
                    prior,
                    auction: auction.clone(),
                }))
            }
            _ => Ok(None),
        }
    }

    fn append_bid(
        &self,
        auction_id: AuctionId,
        bid: Bid,
        expected_floor: Amount,
    ) -> Result<bool, StoreError> {
        let mut auctions = locked(&self.auctions, "auction store")?;
        match auctions.get_mut(&auction_id) {
            Some(auction)
                if auction.status == AuctionStatus::Active
                    && auction.floor() == expected_floor =>
            {
                auction.current_bid = Some(bid.amount);
                auction.bids.push(bid);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn remove(&self, auction_id: AuctionId) -> Result<(), StoreError> {
        let mut auctions = locked(&self.auctions, "auction store")?;
        auctions.remove(&auction_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCarCatalog {
    cars: Mutex<HashMap<CarId, CarRecord>>,
}

impl InMemoryCarCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_car(&self, record: CarRecord) -> Result<(), DomainError> {
        let mut cars = locked(&self.cars, "car catalog").map_err(DomainError::Store)?;
        cars.insert(record.car_id, record);
        Ok(())
    }
}

impl CarCatalog for InMemoryCarCatalog {
    fn car(&self, car_id: CarId) -> Result<Option<CarRecord>, DomainError> {
        let cars = locked(&self.cars, "car catalog").map_err(DomainError::Store)?;
        Ok(cars.get(&car_id).cloned())
    }

    fn set_auction_state(&self, car_id: CarId, state: CarAuctionState) -> Result<(), DomainError> {
        let mut cars = locked(&self.cars, "car catalog").map_err(DomainError::Store)?;
        let car = cars.get_mut(&car_id).ok_or(DomainError::UnknownCar(car_id))?;
        car.auction_status = state.auction_status;
        car.current_auction = state.current_auction;
        Ok(())
    }

    fn increment_auction_count(&self, car_id: CarId) -> Result<(), DomainError> {
        let mut cars = locked(&self.cars, "car catalog").map_err(DomainError::Store)?;
        let car = cars.get_mut(&car_id).ok_or(DomainError::UnknownCar(car_id))?;
        car.auction_count += 1;
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryQuotaStore {
    quotas: Mutex<HashMap<UserId, BiddingQuota>>,
}

impl InMemoryQuotaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants a buyer a subscription tier with the given distinct-car
    /// bidding limit.
    pub fn set_subscription(&self, user_id: UserId, car_bidding_limit: u32) -> Result<(), DomainError> {
        let mut quotas = locked(&self.quotas, "quota store").map_err(DomainError::Store)?;
        quotas
            .entry(user_id)
            .and_modify(|quota| quota.car_bidding_limit = car_bidding_limit)
            .or_insert_with(|| BiddingQuota {
                car_bidding_limit,
                cars_bid: Default::default(),
            });
        Ok(())
    }
}

impl QuotaProvider for InMemoryQuotaStore {
    fn bidding_quota(&self, user_id: UserId) -> Result<Option<BiddingQuota>, DomainError> {
        let quotas = locked(&self.quotas, "quota store").map_err(DomainError::Store)?;
        Ok(quotas.get(&user_id).cloned())
    }

    fn record_car_bid(&self, user_id: UserId, car_id: CarId) -> Result<(), DomainError> {
        let mut quotas = locked(&self.quotas, "quota store").map_err(DomainError::Store)?;
        let quota = quotas
            .get_mut(&user_id)
            .ok_or(DomainError::NoSubscription(user_id))?;
        quota.cars_bid.insert(car_id);
        Ok(())
    }
}
