//! Shared types and models for Flower Stock Management
//!
//! This crate holds the batch lifecycle model and the aggregation logic,
//! shared between the backend and the browser helpers (via WASM).

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
