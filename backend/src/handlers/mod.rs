//! HTTP request handlers

pub mod batch;
pub mod harvest;
pub mod health;
pub mod reporting;
pub mod target;

pub use batch::*;
pub use harvest::*;
pub use health::*;
pub use reporting::*;
pub use target::*;
