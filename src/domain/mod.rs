// src/domain/mod.rs
pub mod auctions;
pub mod bids;
pub mod cars;
pub mod core;
pub mod policy;
pub mod quotas;

pub use self::auctions::*;
pub use self::bids::*;
pub use self::cars::*;
pub use self::core::*;
pub use self::quotas::*;
