// src/domain/bids.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::core::UserId;
use crate::money::Amount;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub bidder: UserId,
    pub amount: Amount,
    /// Server-assigned at admission, never taken from the caller.
    pub at: DateTime<Utc>,
}
