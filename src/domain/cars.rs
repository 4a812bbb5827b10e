// src/domain/cars.rs
//
// The car catalog is an external collaborator. The engine only reads a
// car's approval status and owner, and writes the auction-tracking
// fields at creation and settlement.
use serde::{Deserialize, Serialize};

use super::core::{AuctionId, CarId, DomainError, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarApproval {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarAuctionStatus {
    None,
    InAuction,
    Sold,
}

/// The auction-tracking fields the engine writes back to a car, always
/// as a pair so a sold car can never point at a live auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarAuctionState {
    pub auction_status: CarAuctionStatus,
    pub current_auction: Option<AuctionId>,
}

impl CarAuctionState {
    pub fn in_auction(auction_id: AuctionId) -> Self {
        CarAuctionState {
            auction_status: CarAuctionStatus::InAuction,
            current_auction: Some(auction_id),
        }
    }

    pub fn sold() -> Self {
        CarAuctionState {
            auction_status: CarAuctionStatus::Sold,
            current_auction: None,
        }
    }

    pub fn released() -> Self {
        CarAuctionState {
            auction_status: CarAuctionStatus::None,
            current_auction: None,
        }
    }
}

/// What the engine sees of a car.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarRecord {
    pub car_id: CarId,
    pub seller: UserId,
    pub approval: CarApproval,
    pub auction_status: CarAuctionStatus,
    pub current_auction: Option<AuctionId>,
    pub auction_count: u32,
}

pub trait CarCatalog: Send + Sync {
    fn car(&self, car_id: CarId) -> Result<Option<CarRecord>, DomainError>;

    fn set_auction_state(&self, car_id: CarId, state: CarAuctionState) -> Result<(), DomainError>;

    fn increment_auction_count(&self, car_id: CarId) -> Result<(), DomainError>;
}
