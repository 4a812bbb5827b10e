// src/domain/core.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::money::Amount;
use crate::persistence::StoreError;

pub type AuctionId = Uuid;
pub type CarId = Uuid;
pub type UserId = Uuid;

/// Lifecycle state of an auction.
///
/// The sweep only ever drives Scheduled -> Active -> Ended. `Relisted`
/// marks a manually re-listed auction and is never produced or consumed
/// by the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuctionStatus {
    Scheduled,
    Active,
    Ended,
    Relisted,
}

impl AuctionStatus {
    /// Statuses eligible for the settlement pass. A scheduled auction whose
    /// whole window lapsed without ever activating is settled too.
    pub const SETTLEABLE: [AuctionStatus; 2] = [AuctionStatus::Scheduled, AuctionStatus::Active];

    /// True while the auction still occupies its car's live-auction slot.
    pub fn is_live(&self) -> bool {
        matches!(self, AuctionStatus::Scheduled | AuctionStatus::Active)
    }
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuctionStatus::Scheduled => write!(f, "scheduled"),
            AuctionStatus::Active => write!(f, "active"),
            AuctionStatus::Ended => write!(f, "ended"),
            AuctionStatus::Relisted => write!(f, "relisted"),
        }
    }
}

/// Coarse classification used by the boundary layer to pick a response
/// status. Transient failures are the only retryable class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Transient,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown auction: {0}")]
    UnknownAuction(AuctionId),

    #[error("Unknown car: {0}")]
    UnknownCar(CarId),

    #[error("Auction start time must precede end time")]
    NonChronologicalWindow,

    #[error("Reserve price must be positive")]
    NonPositiveReserve,

    #[error("Car is not approved for auction: {0}")]
    CarNotApproved(CarId),

    #[error("Car already has a live auction: {0}")]
    CarAlreadyInAuction(CarId),

    #[error("Caller does not own car: {0}")]
    NotCarOwner(CarId),

    #[error("Auction not open for bidding: {0}")]
    AuctionNotOpen(AuctionId),

    #[error("Bidder has no subscription with a bidding quota: {0}")]
    NoSubscription(UserId),

    #[error("Car bidding limit reached: {0}")]
    BiddingLimitReached(u32),

    #[error("Bid must exceed {0}")]
    BidTooLow(Amount),

    #[error("Storage failure: {0}")]
    Store(#[from] StoreError),
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::NonChronologicalWindow | DomainError::NonPositiveReserve => {
                ErrorKind::Validation
            }
            DomainError::UnknownAuction(_) | DomainError::UnknownCar(_) => ErrorKind::NotFound,
            DomainError::CarNotApproved(_)
            | DomainError::CarAlreadyInAuction(_)
            | DomainError::NotCarOwner(_)
            | DomainError::AuctionNotOpen(_)
            | DomainError::NoSubscription(_)
            | DomainError::BiddingLimitReached(_)
            | DomainError::BidTooLow(_) => ErrorKind::Conflict,
            DomainError::Store(_) => ErrorKind::Transient,
        }
    }
}
