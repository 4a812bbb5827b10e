// src/lib.rs
pub mod domain;
pub mod engine;
pub mod events;
pub mod money;
pub mod persistence;
pub mod scheduler;
pub mod web;

pub use domain::*;
pub use money::*;
