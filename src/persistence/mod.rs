// src/persistence/mod.rs
pub mod memory;
pub mod store;

pub use self::memory::{InMemoryAuctionStore, InMemoryCarCatalog, InMemoryQuotaStore};
pub use self::store::{AuctionStore, StatusTransition, StoreError};
