//! Fund routes - Donation records

pub mod api;

pub use api::{api_add_fund, api_funds};
