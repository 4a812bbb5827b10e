// src/web/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::{Auction, AuctionId, AuctionStatus, CarId, UserId};
use crate::engine::{AuctionEngine, CreateAuction};
use crate::money::Amount;
use crate::persistence::{InMemoryCarCatalog, InMemoryQuotaStore};

/// Shared application state: the engine plus handles to the in-memory
/// collaborators so deployments and tests can seed cars and
/// subscriptions.
#[derive(Clone)]
pub struct AppState {
    pub engine: AuctionEngine,
    pub cars: Arc<InMemoryCarCatalog>,
    pub quotas: Arc<InMemoryQuotaStore>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
    Admin,
}

/// The authenticated caller, decoded from the `x-jwt-payload` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateAuctionRequest {
    #[serde(rename = "carId")]
    pub car_id: CarId,
    #[serde(rename = "startTime")]
    pub start_time: DateTime<Utc>,
    #[serde(rename = "endTime")]
    pub end_time: DateTime<Utc>,
    #[serde(rename = "reservePrice")]
    pub reserve_price: Amount,
}

impl CreateAuctionRequest {
    pub fn to_params(&self) -> CreateAuction {
        CreateAuction {
            car_id: self.car_id,
            start_time: self.start_time,
            end_time: self.end_time,
            reserve_price: self.reserve_price,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BidRequest {
    pub amount: Amount,
}

#[derive(Debug, Serialize)]
pub struct AuctionItem {
    pub id: AuctionId,
    #[serde(rename = "carId")]
    pub car_id: CarId,
    #[serde(rename = "startTime")]
    pub start_time: DateTime<Utc>,
    #[serde(rename = "endTime")]
    pub end_time: DateTime<Utc>,
    #[serde(rename = "reservePrice")]
    pub reserve_price: Amount,
    #[serde(rename = "currentBid")]
    pub current_bid: Option<Amount>,
    pub status: AuctionStatus,
    #[serde(rename = "bidCount")]
    pub bid_count: usize,
}

impl From<&Auction> for AuctionItem {
    fn from(auction: &Auction) -> Self {
        AuctionItem {
            id: auction.auction_id,
            car_id: auction.car,
            start_time: auction.start_time,
            end_time: auction.end_time,
            reserve_price: auction.reserve_price,
            current_bid: auction.current_bid,
            status: auction.status,
            bid_count: auction.bids.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BidView {
    pub bidder: UserId,
    pub amount: Amount,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AuctionDetail {
    #[serde(flatten)]
    pub item: AuctionItem,
    pub bids: Vec<BidView>,
    pub winner: Option<UserId>,
    #[serde(rename = "winningAmount")]
    pub winning_amount: Option<Amount>,
}

impl From<&Auction> for AuctionDetail {
    fn from(auction: &Auction) -> Self {
        let winning = if auction.status == AuctionStatus::Ended {
            auction.winning_bid()
        } else {
            None
        };
        AuctionDetail {
            item: AuctionItem::from(auction),
            bids: auction
                .bids
                .iter()
                .map(|bid| BidView {
                    bidder: bid.bidder,
                    amount: bid.amount,
                    at: bid.at,
                })
                .collect(),
            winner: winning.map(|bid| bid.bidder),
            winning_amount: winning.map(|bid| bid.amount),
        }
    }
}
