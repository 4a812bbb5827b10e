// src/domain/quotas.rs
use std::collections::HashSet;

use super::core::{CarId, DomainError, UserId};

/// A buyer's subscription-derived bidding allowance: how many distinct
/// cars they may bid on, and which cars they already bid on. Quota is
/// consumed per distinct car, never per bid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiddingQuota {
    pub car_bidding_limit: u32,
    pub cars_bid: HashSet<CarId>,
}

impl BiddingQuota {
    pub fn used(&self) -> u32 {
        self.cars_bid.len() as u32
    }

    pub fn covers(&self, car_id: CarId) -> bool {
        self.cars_bid.contains(&car_id) || self.used() < self.car_bidding_limit
    }
}

/// Uniform quota lookup over the account-role-specific subscription
/// documents. A buyer without a subscription yields `None`.
pub trait QuotaProvider: Send + Sync {
    fn bidding_quota(&self, user_id: UserId) -> Result<Option<BiddingQuota>, DomainError>;

    /// Adds the car to the bidder's bid set after their first accepted
    /// bid on it. Best-effort from the caller's point of view.
    fn record_car_bid(&self, user_id: UserId, car_id: CarId) -> Result<(), DomainError>;
}
