//! Record store abstraction
//!
//! Two independent collections, insert and list only. Stores enforce
//! transaction id uniqueness themselves; a collision comes back as
//! [`CoreError::DuplicateEntry`](crate::CoreError::DuplicateEntry) and is
//! never retried.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::models::{Expense, Fund};

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Persistence for funds and expenses
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a fund, returning it with its store id filled in
    async fn insert_fund(&self, fund: Fund) -> CoreResult<Fund>;

    /// Insert an expense, returning it with its store id filled in
    async fn insert_expense(&self, expense: Expense) -> CoreResult<Expense>;

    /// Every stored fund, in store order
    async fn list_funds(&self) -> CoreResult<Vec<Fund>>;

    /// Every stored expense, in store order
    async fn list_expenses(&self) -> CoreResult<Vec<Expense>>;
}
