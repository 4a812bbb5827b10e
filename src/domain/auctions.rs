// src/domain/auctions.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bids::Bid;
use super::core::{AuctionId, AuctionStatus, CarId, UserId};
use crate::money::Amount;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auction {
    #[serde(rename = "id")]
    pub auction_id: AuctionId,
    pub car: CarId,
    pub seller: UserId,
    #[serde(rename = "startTime")]
    pub start_time: DateTime<Utc>,
    #[serde(rename = "endTime")]
    pub end_time: DateTime<Utc>,
    #[serde(rename = "reservePrice")]
    pub reserve_price: Amount,
    /// Denormalized cache of the highest bid. The `bids` sequence is
    /// authoritative; settlement recomputes the maximum instead of
    /// trusting this field.
    #[serde(rename = "currentBid")]
    pub current_bid: Option<Amount>,
    pub bids: Vec<Bid>,
    pub status: AuctionStatus,
}

impl Auction {
    /// The minimum amount a new bid must strictly exceed: the current
    /// high bid, or the reserve price before any bid lands.
    pub fn floor(&self) -> Amount {
        self.current_bid.unwrap_or(self.reserve_price)
    }

    /// Highest amount across the bid sequence, regardless of insertion
    /// order. Zero when the auction drew no bids.
    pub fn max_bid(&self) -> Amount {
        self.bids
            .iter()
            .map(|bid| bid.amount)
            .max()
            .unwrap_or(Amount::ZERO)
    }

    /// The winning bid of a settled auction, if the reserve was met.
    pub fn winning_bid(&self) -> Option<&Bid> {
        let max = self.max_bid();
        if max >= self.reserve_price && !self.bids.is_empty() {
            self.bids.iter().find(|bid| bid.amount == max)
        } else {
            None
        }
    }

    /// Reserve is met on a non-strict comparison: a winning bid equal to
    /// the reserve price sells the car.
    pub fn reserve_met(&self) -> bool {
        !self.bids.is_empty() && self.max_bid() >= self.reserve_price
    }
}
