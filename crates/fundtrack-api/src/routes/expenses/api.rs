//! Expenses API endpoints - JSON API

use axum::extract::State;
use axum::Json;
use fundtrack_core::{Expense, ExpenseDraft};

use crate::error::ApiError;
use crate::routes::{decode_draft, Ack, ObjectBody};
use crate::AppState;

pub async fn api_add_expense(
    state: State<AppState>,
    payload: ObjectBody,
) -> Result<Json<Ack>, ApiError> {
    let draft: ExpenseDraft = decode_draft(payload)?;
    let expense = state
        .treasury
        .create_expense(draft)
        .await
        .map_err(|e| ApiError::store("Error adding expense", e))?;

    log::info!("Expense recorded: {}", expense.transaction_id);
    Ok(Json(Ack::new("Expense added successfully")))
}

pub async fn api_expenses(state: State<AppState>) -> Result<Json<Vec<Expense>>, ApiError> {
    let expenses = state
        .treasury
        .list_expenses()
        .await
        .map_err(|e| ApiError::store("Error fetching expenses", e))?;
    Ok(Json(expenses))
}
