//! Expense routes

pub mod api;

pub use api::{api_add_expense, api_expenses};
