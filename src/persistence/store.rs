// src/persistence/store.rs
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::auctions::Auction;
use crate::domain::bids::Bid;
use crate::domain::core::{AuctionId, AuctionStatus, CarId};
use crate::money::Amount;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Write timed out: {0}")]
    WriteTimeout(String),
}

/// Outcome of a won compare-and-set status transition: the status the
/// auction held before the write, and a snapshot taken after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTransition {
    pub prior: AuctionStatus,
    pub auction: Auction,
}

/// Persistent auction records with the two conditional primitives the
/// engine relies on for concurrency control: a compare-and-set on
/// `status`, and a floor-guarded bid append. Implementations must make
/// both atomic per auction; no cross-auction coordination is required.
///
/// Sweep selection queries are expected to be index-backed on
/// `(status, start_time)`, `(status, end_time)` and `car`.
pub trait AuctionStore: Send + Sync {
    fn insert(&self, auction: Auction) -> Result<(), StoreError>;

    fn get(&self, auction_id: AuctionId) -> Result<Option<Auction>, StoreError>;

    fn all(&self) -> Result<Vec<Auction>, StoreError>;

    /// The auction currently occupying the car's live slot (status
    /// scheduled or active), if any.
    fn live_auction_for_car(&self, car_id: CarId) -> Result<Option<AuctionId>, StoreError>;

    /// Scheduled auctions whose start time has been reached.
    fn due_for_activation(&self, now: DateTime<Utc>) -> Result<Vec<AuctionId>, StoreError>;

    /// Live auctions whose end time has been reached, including
    /// scheduled auctions whose whole window lapsed unactivated.
    fn due_for_settlement(&self, now: DateTime<Utc>) -> Result<Vec<AuctionId>, StoreError>;

    /// Atomically moves the auction to `to` if its current status is in
    /// `from`. Returns `None` when the guard fails (another writer got
    /// there first) or the auction does not exist; the caller must treat
    /// that as "someone else owns this transition" and skip.
    fn transition_status(
        &self,
        auction_id: AuctionId,
        from: &[AuctionStatus],
        to: AuctionStatus,
    ) -> Result<Option<StatusTransition>, StoreError>;

    /// Atomically appends a bid and refreshes `current_bid`, but only if
    /// the auction is still active and its floor is still
    /// `expected_floor`. Returns false when the guard fails, in which
    /// case the caller re-evaluates against a fresh snapshot.
    fn append_bid(
        &self,
        auction_id: AuctionId,
        bid: Bid,
        expected_floor: Amount,
    ) -> Result<bool, StoreError>;

    /// Removes an auction record. Only used to compensate a creation
    /// whose car-side writes failed.
    fn remove(&self, auction_id: AuctionId) -> Result<(), StoreError>;
}
