// src/domain/policy.rs
use super::auctions::Auction;
use super::core::{AuctionStatus, DomainError, UserId};
use super::quotas::BiddingQuota;
use crate::money::Amount;

/// Decides whether a bid attempt is admissible against a snapshot of the
/// auction and the bidder's quota. Checks run in a fixed order and the
/// first failure wins:
///
/// 1. the auction is open for bidding,
/// 2. the bidder holds a subscription with a defined quota,
/// 3. the quota covers the auction's car (repeat bids on a car already
///    in the bidder's bid set are always allowed),
/// 4. the amount strictly exceeds the floor.
///
/// Pure over its inputs; the caller is responsible for re-evaluating
/// against a fresh snapshot if the floor moves before the append lands.
pub fn admit_bid(
    auction: &Auction,
    quota: Option<&BiddingQuota>,
    bidder: UserId,
    amount: Amount,
) -> Result<(), DomainError> {
    if auction.status != AuctionStatus::Active {
        return Err(DomainError::AuctionNotOpen(auction.auction_id));
    }

    let quota = match quota {
        Some(quota) => quota,
        None => return Err(DomainError::NoSubscription(bidder)),
    };

    if !quota.covers(auction.car) {
        return Err(DomainError::BiddingLimitReached(quota.car_bidding_limit));
    }

    let floor = auction.floor();
    if amount <= floor {
        return Err(DomainError::BidTooLow(floor));
    }

    Ok(())
}
