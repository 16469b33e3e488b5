//! Domain models for Flower Stock Management

mod batch;
mod dashboard;
mod harvest;
mod target;

pub use batch::*;
pub use dashboard::*;
pub use harvest::*;
pub use target::*;
