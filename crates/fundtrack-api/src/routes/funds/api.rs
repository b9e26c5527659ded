//! Funds API endpoints - JSON API
//!
//! Endpoints:
//! - api_add_fund: Record a donation and notify the admin
//! - api_funds: List every donation

use axum::extract::State;
use axum::Json;
use fundtrack_core::{Fund, FundDraft};

use crate::error::ApiError;
use crate::routes::{decode_draft, Ack, ObjectBody};
use crate::AppState;

/// Record a donation (JSON API)
pub async fn api_add_fund(
    state: State<AppState>,
    payload: ObjectBody,
) -> Result<Json<Ack>, ApiError> {
    let draft: FundDraft = decode_draft(payload)?;
    let receipt = state
        .treasury
        .create_fund(draft)
        .await
        .map_err(|e| ApiError::store("Error adding fund", e))?;

    // The notification handle is dropped here; delivery carries on detached.
    log::info!("Fund recorded: {}", receipt.fund.transaction_id);
    Ok(Json(Ack::new("Fund added successfully")))
}

/// List all donations (JSON API)
pub async fn api_funds(state: State<AppState>) -> Result<Json<Vec<Fund>>, ApiError> {
    let funds = state
        .treasury
        .list_funds()
        .await
        .map_err(|e| ApiError::store("Error fetching funds", e))?;
    Ok(Json(funds))
}
