// src/engine.rs
//
// The auction lifecycle engine: creation, bidding admission, and the
// periodic sweep that activates and settles auctions. The engine is the
// sole owner of status transitions; the compare-and-set guard in the
// store is the only synchronization between concurrent sweeps and the
// bid path.
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::auctions::Auction;
use crate::domain::bids::Bid;
use crate::domain::cars::{CarApproval, CarAuctionState, CarCatalog};
use crate::domain::core::{AuctionId, AuctionStatus, CarId, DomainError, UserId};
use crate::domain::policy;
use crate::domain::quotas::QuotaProvider;
use crate::events::{AuctionEvent, EventBus};
use crate::money::Amount;
use crate::persistence::AuctionStore;

/// Who asked for an auction to be created. Sellers may only list their
/// own cars; admins may list any approved car.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOrigin {
    Seller(UserId),
    Admin,
}

#[derive(Debug, Clone)]
pub struct CreateAuction {
    pub car_id: CarId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub reserve_price: Amount,
}

/// What one sweep accomplished, for the scheduler's log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub activated: usize,
    pub settled: usize,
    pub failed: usize,
}

impl SweepReport {
    pub fn is_quiet(&self) -> bool {
        self.activated == 0 && self.settled == 0 && self.failed == 0
    }
}

#[derive(Clone)]
pub struct AuctionEngine {
    store: Arc<dyn AuctionStore>,
    cars: Arc<dyn CarCatalog>,
    quotas: Arc<dyn QuotaProvider>,
    events: EventBus,
}

impl AuctionEngine {
    pub fn new(
        store: Arc<dyn AuctionStore>,
        cars: Arc<dyn CarCatalog>,
        quotas: Arc<dyn QuotaProvider>,
        events: EventBus,
    ) -> Self {
        AuctionEngine {
            store,
            cars,
            quotas,
            events,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn auctions(&self) -> Result<Vec<Auction>, DomainError> {
        Ok(self.store.all()?)
    }

    pub fn auction(&self, auction_id: AuctionId) -> Result<Option<Auction>, DomainError> {
        Ok(self.store.get(auction_id)?)
    }

    /// Creates an auction in `scheduled` status and links the car to it.
    /// The insert and the car-side writes form one logical unit: if the
    /// car writes fail, the inserted auction is removed again so no
    /// orphan survives.
    pub fn create_auction(
        &self,
        origin: CreateOrigin,
        params: CreateAuction,
    ) -> Result<Auction, DomainError> {
        if params.start_time >= params.end_time {
            return Err(DomainError::NonChronologicalWindow);
        }
        if !params.reserve_price.is_positive() {
            return Err(DomainError::NonPositiveReserve);
        }

        let car = self
            .cars
            .car(params.car_id)?
            .ok_or(DomainError::UnknownCar(params.car_id))?;
        if car.approval != CarApproval::Approved {
            return Err(DomainError::CarNotApproved(params.car_id));
        }
        if let CreateOrigin::Seller(caller) = origin {
            if car.seller != caller {
                return Err(DomainError::NotCarOwner(params.car_id));
            }
        }
        if self.store.live_auction_for_car(params.car_id)?.is_some() {
            return Err(DomainError::CarAlreadyInAuction(params.car_id));
        }

        let auction = Auction {
            auction_id: Uuid::new_v4(),
            car: params.car_id,
            seller: car.seller,
            start_time: params.start_time,
            end_time: params.end_time,
            reserve_price: params.reserve_price,
            current_bid: None,
            bids: Vec::new(),
            status: AuctionStatus::Scheduled,
        };
        self.store.insert(auction.clone())?;

        let linked = self
            .cars
            .set_auction_state(params.car_id, CarAuctionState::in_auction(auction.auction_id))
            .and_then(|_| self.cars.increment_auction_count(params.car_id));
        if let Err(err) = linked {
            if let Err(cleanup) = self.store.remove(auction.auction_id) {
                error!(
                    "auction {} is orphaned: car link failed ({}) and removal failed ({})",
                    auction.auction_id, err, cleanup
                );
            }
            return Err(err);
        }

        info!(
            "created auction {} for car {} ({} - {}, reserve {})",
            auction.auction_id,
            auction.car,
            auction.start_time,
            auction.end_time,
            auction.reserve_price
        );
        Ok(auction)
    }

    /// Admits or rejects a bid. The admission policy is evaluated
    /// against a snapshot; the append is guarded by the floor the policy
    /// saw, so two concurrent bids can never both land on a stale floor.
    /// The floor only rises, so re-evaluation terminates.
    pub fn place_bid(
        &self,
        auction_id: AuctionId,
        bidder: UserId,
        amount: Amount,
        now: DateTime<Utc>,
    ) -> Result<Bid, DomainError> {
        let mut auction = self
            .store
            .get(auction_id)?
            .ok_or(DomainError::UnknownAuction(auction_id))?;
        let quota = self.quotas.bidding_quota(bidder)?;

        loop {
            policy::admit_bid(&auction, quota.as_ref(), bidder, amount)?;

            let expected_floor = auction.floor();
            let bid = Bid {
                bidder,
                amount,
                at: now,
            };
            if self.store.append_bid(auction_id, bid.clone(), expected_floor)? {
                let first_bid_on_car = quota
                    .as_ref()
                    .map(|q| !q.cars_bid.contains(&auction.car))
                    .unwrap_or(false);
                if first_bid_on_car {
                    // Best-effort: the accepted bid stands even if the
                    // bid-set write fails, but the drift is logged.
                    if let Err(err) = self.quotas.record_car_bid(bidder, auction.car) {
                        warn!(
                            "bid on auction {} accepted but car {} was not recorded in bid set of {}: {}",
                            auction_id, auction.car, bidder, err
                        );
                    }
                }
                info!(
                    "bid of {} by {} accepted on auction {}",
                    amount, bidder, auction_id
                );
                self.events.publish(AuctionEvent::BidAccepted {
                    auction_id,
                    bid: bid.clone(),
                });
                return Ok(bid);
            }

            // A concurrent bid moved the floor; re-admit against the
            // fresh snapshot.
            auction = self
                .store
                .get(auction_id)?
                .ok_or(DomainError::UnknownAuction(auction_id))?;
        }
    }

    /// One activation-and-settlement pass over all due auctions.
    /// Per-auction failures are logged and skipped; the affected auction
    /// is picked up again by the next sweep.
    pub fn sweep(&self, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport::default();

        match self.store.due_for_activation(now) {
            Ok(due) => {
                for auction_id in due {
                    match self.store.transition_status(
                        auction_id,
                        &[AuctionStatus::Scheduled],
                        AuctionStatus::Active,
                    ) {
                        Ok(Some(_)) => {
                            info!("auction {} started", auction_id);
                            self.events.publish(AuctionEvent::AuctionStarted { auction_id });
                            report.activated += 1;
                        }
                        // Lost the guard to a concurrent sweep; the winner
                        // already announced the start.
                        Ok(None) => {}
                        Err(err) => {
                            warn!("activation of auction {} failed: {}", auction_id, err);
                            report.failed += 1;
                        }
                    }
                }
            }
            Err(err) => {
                error!("activation scan failed: {}", err);
                report.failed += 1;
            }
        }

        match self.store.due_for_settlement(now) {
            Ok(due) => {
                for auction_id in due {
                    match self.settle(auction_id) {
                        Ok(true) => report.settled += 1,
                        Ok(false) => {}
                        Err(err) => {
                            error!(
                                "settlement of auction {} failed, retrying next sweep: {}",
                                auction_id, err
                            );
                            report.failed += 1;
                        }
                    }
                }
            }
            Err(err) => {
                error!("settlement scan failed: {}", err);
                report.failed += 1;
            }
        }

        report
    }

    /// Settles one auction: CAS to `ended`, resolve the outcome from the
    /// bid sequence, write the car's sale state, announce. Returns false
    /// when the status guard failed (already settled elsewhere).
    fn settle(&self, auction_id: AuctionId) -> Result<bool, DomainError> {
        let transition = match self.store.transition_status(
            auction_id,
            &AuctionStatus::SETTLEABLE,
            AuctionStatus::Ended,
        )? {
            Some(transition) => transition,
            None => return Ok(false),
        };
        let auction = &transition.auction;

        // The bid sequence is authoritative; current_bid is a cache that
        // may have drifted, so the maximum is recomputed here.
        let reserve_met = auction.reserve_met();
        let car_state = if reserve_met {
            CarAuctionState::sold()
        } else {
            CarAuctionState::released()
        };

        if let Err(err) = self.cars.set_auction_state(auction.car, car_state) {
            // Put the status back so the next sweep retries the whole
            // settlement rather than leaving an ended auction with an
            // unlinked car.
            if let Err(revert) = self.store.transition_status(
                auction_id,
                &[AuctionStatus::Ended],
                transition.prior,
            ) {
                error!(
                    "auction {} stuck in ended with stale car {}: car write failed ({}) and status revert failed ({})",
                    auction_id, auction.car, err, revert
                );
            }
            return Err(err);
        }

        if reserve_met {
            info!(
                "auction {} ended: car {} sold at {}",
                auction_id,
                auction.car,
                auction.max_bid()
            );
        } else {
            info!(
                "auction {} ended: reserve not met, car {} released",
                auction_id, auction.car
            );
        }
        self.events.publish(AuctionEvent::AuctionEnded { auction_id });
        Ok(true)
    }
}
