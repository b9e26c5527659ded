//! HTTP routes
//!
//! - routes::funds: create and list donations
//! - routes::expenses: create and list expenses

pub mod expenses;
pub mod funds;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// A request body that parsed as a JSON object
pub type ObjectBody = Result<Json<Map<String, Value>>, JsonRejection>;

/// Decode a record draft from an object body.
///
/// Arrays and scalars are refused here; serde would otherwise fill struct
/// fields from an array by position.
pub fn decode_draft<T: DeserializeOwned>(payload: ObjectBody) -> Result<T, ApiError> {
    let Json(object) = payload?;
    serde_json::from_value(Value::Object(object)).map_err(|e| ApiError::InvalidBody {
        message: e.to_string(),
    })
}

/// Body of a successful create
#[derive(Debug, Serialize)]
pub struct Ack {
    pub success: bool,
    pub message: &'static str,
}

impl Ack {
    pub fn new(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}
