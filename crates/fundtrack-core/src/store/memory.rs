//! In-process record store
//!
//! Keeps records in insertion order. Used for tests and for running without a
//! database (`STORE_BACKEND=memory`).

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::RecordStore;
use crate::error::{CoreError, CoreResult};
use crate::models::{Collection, Expense, Fund};

#[derive(Debug, Default)]
pub struct MemoryStore {
    funds: RwLock<Vec<Fund>>,
    expenses: RwLock<Vec<Expense>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Object-id shaped identifier derived from the insertion position
fn document_id(collection: Collection, position: usize) -> String {
    let tag = match collection {
        Collection::Funds => 0xf,
        Collection::Expenses => 0xe,
    };
    format!("{:x}{:023x}", tag, position + 1)
}

fn duplicate(collection: Collection, transaction_id: &str) -> CoreError {
    CoreError::DuplicateEntry {
        collection: collection.name().to_string(),
        entry: format!("transactionId \"{}\" already exists", transaction_id),
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_fund(&self, mut fund: Fund) -> CoreResult<Fund> {
        let mut funds = self.funds.write().await;
        if funds.iter().any(|f| f.transaction_id == fund.transaction_id) {
            return Err(duplicate(Collection::Funds, &fund.transaction_id));
        }
        fund.id = Some(document_id(Collection::Funds, funds.len()));
        funds.push(fund.clone());
        Ok(fund)
    }

    async fn insert_expense(&self, mut expense: Expense) -> CoreResult<Expense> {
        let mut expenses = self.expenses.write().await;
        if expenses.iter().any(|e| e.transaction_id == expense.transaction_id) {
            return Err(duplicate(Collection::Expenses, &expense.transaction_id));
        }
        expense.id = Some(document_id(Collection::Expenses, expenses.len()));
        expenses.push(expense.clone());
        Ok(expense)
    }

    async fn list_funds(&self) -> CoreResult<Vec<Fund>> {
        Ok(self.funds.read().await.clone())
    }

    async fn list_expenses(&self) -> CoreResult<Vec<Expense>> {
        Ok(self.expenses.read().await.clone())
    }
}
