//! MongoDB record store
//!
//! Documents keep the field names the web client already uses
//! (`transactionId`, `donationType`, ...) with dates as BSON datetimes. A
//! unique index on `transactionId` is created per collection at connect time.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};
use serde::{Deserialize, Serialize};

use super::RecordStore;
use crate::error::{CoreError, CoreResult};
use crate::models::{Collection, Expense, Fund};

/// Server error code for a unique index violation
const DUPLICATE_KEY: i32 = 11000;

pub struct MongoStore {
    funds: mongodb::Collection<FundDocument>,
    expenses: mongodb::Collection<ExpenseDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FundDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    donation_type: Option<String>,
    date: mongodb::bson::DateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mobile_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpenseDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    amount: Option<f64>,
    date: mongodb::bson::DateTime,
}

fn to_bson_date(date: DateTime<Utc>) -> mongodb::bson::DateTime {
    mongodb::bson::DateTime::from_millis(date.timestamp_millis())
}

/// Stored dates outside chrono's range are rejected rather than clamped
fn from_bson_date(date: mongodb::bson::DateTime) -> CoreResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(date.timestamp_millis())
        .single()
        .ok_or_else(|| CoreError::InvalidFormat {
            message: format!("stored date {} ms is out of range", date.timestamp_millis()),
        })
}

impl From<&Fund> for FundDocument {
    fn from(fund: &Fund) -> Self {
        Self {
            id: None,
            transaction_id: fund.transaction_id.clone(),
            name: fund.name.clone(),
            amount: fund.amount,
            donation_type: fund.donation_type.clone(),
            date: to_bson_date(fund.date),
            mobile_number: fund.mobile_number.clone(),
        }
    }
}

impl TryFrom<FundDocument> for Fund {
    type Error = CoreError;

    fn try_from(doc: FundDocument) -> CoreResult<Self> {
        Ok(Self {
            id: doc.id.map(|oid| oid.to_hex()),
            transaction_id: doc.transaction_id,
            name: doc.name,
            amount: doc.amount,
            donation_type: doc.donation_type,
            date: from_bson_date(doc.date)?,
            mobile_number: doc.mobile_number,
        })
    }
}

impl From<&Expense> for ExpenseDocument {
    fn from(expense: &Expense) -> Self {
        Self {
            id: None,
            transaction_id: expense.transaction_id.clone(),
            description: expense.description.clone(),
            amount: expense.amount,
            date: to_bson_date(expense.date),
        }
    }
}

impl TryFrom<ExpenseDocument> for Expense {
    type Error = CoreError;

    fn try_from(doc: ExpenseDocument) -> CoreResult<Self> {
        Ok(Self {
            id: doc.id.map(|oid| oid.to_hex()),
            transaction_id: doc.transaction_id,
            description: doc.description,
            amount: doc.amount,
            date: from_bson_date(doc.date)?,
        })
    }
}

/// Map a driver error into the core taxonomy
fn map_error(collection: Collection, err: mongodb::error::Error) -> CoreError {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY => {
            CoreError::DuplicateEntry {
                collection: collection.name().to_string(),
                entry: write.message.clone(),
            }
        }
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::ConnectionPoolCleared { .. }
        | ErrorKind::DnsResolve { .. } => CoreError::StoreUnavailable {
            message: err.to_string(),
        },
        ErrorKind::BsonDeserialization(_) | ErrorKind::BsonSerialization(_) => {
            CoreError::InvalidFormat {
                message: format!("{}: {}", collection, err),
            }
        }
        _ => CoreError::Storage {
            message: err.to_string(),
        },
    }
}

fn inserted_id(id: &Bson) -> Option<String> {
    id.as_object_id().map(|oid| oid.to_hex())
}

impl MongoStore {
    /// Connect, verify the server answers, and ensure indexes exist.
    ///
    /// The database named in `uri` wins; `fallback_database` is used when the
    /// URI names none.
    pub async fn connect(uri: &str, fallback_database: &str) -> CoreResult<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| CoreError::StoreUnavailable { message: e.to_string() })?;
        let db = client
            .default_database()
            .unwrap_or_else(|| client.database(fallback_database));

        db.run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| CoreError::StoreUnavailable { message: e.to_string() })?;

        let store = Self::from_database(&db);
        store.ensure_indexes().await?;
        log::info!("MongoDB Connected (database: {})", db.name());
        Ok(store)
    }

    pub fn from_database(db: &Database) -> Self {
        Self {
            funds: db.collection(Collection::Funds.name()),
            expenses: db.collection(Collection::Expenses.name()),
        }
    }

    async fn ensure_indexes(&self) -> CoreResult<()> {
        let unique_transaction_id = || {
            IndexModel::builder()
                .keys(doc! { "transactionId": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build()
        };

        self.funds
            .create_index(unique_transaction_id(), None)
            .await
            .map_err(|e| map_error(Collection::Funds, e))?;
        self.expenses
            .create_index(unique_transaction_id(), None)
            .await
            .map_err(|e| map_error(Collection::Expenses, e))?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MongoStore {
    async fn insert_fund(&self, mut fund: Fund) -> CoreResult<Fund> {
        let result = self
            .funds
            .insert_one(FundDocument::from(&fund), None)
            .await
            .map_err(|e| map_error(Collection::Funds, e))?;
        fund.id = inserted_id(&result.inserted_id);
        Ok(fund)
    }

    async fn insert_expense(&self, mut expense: Expense) -> CoreResult<Expense> {
        let result = self
            .expenses
            .insert_one(ExpenseDocument::from(&expense), None)
            .await
            .map_err(|e| map_error(Collection::Expenses, e))?;
        expense.id = inserted_id(&result.inserted_id);
        Ok(expense)
    }

    async fn list_funds(&self) -> CoreResult<Vec<Fund>> {
        let cursor = self
            .funds
            .find(None, None)
            .await
            .map_err(|e| map_error(Collection::Funds, e))?;
        let docs: Vec<FundDocument> = cursor
            .try_collect()
            .await
            .map_err(|e| map_error(Collection::Funds, e))?;
        docs.into_iter().map(Fund::try_from).collect()
    }

    async fn list_expenses(&self) -> CoreResult<Vec<Expense>> {
        let cursor = self
            .expenses
            .find(None, None)
            .await
            .map_err(|e| map_error(Collection::Expenses, e))?;
        let docs: Vec<ExpenseDocument> = cursor
            .try_collect()
            .await
            .map_err(|e| map_error(Collection::Expenses, e))?;
        docs.into_iter().map(Expense::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson;

    fn sample_fund() -> Fund {
        Fund {
            id: None,
            transaction_id: "2b1c0c7e-1f1e-4c55-9d38-1b8d6f0f6a11".to_string(),
            name: Some("Asha".to_string()),
            amount: Some(500.0),
            donation_type: Some("one-time".to_string()),
            date: Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap(),
            mobile_number: Some("9999999999".to_string()),
        }
    }

    #[test]
    fn test_fund_document_field_names() {
        let doc = bson::to_document(&FundDocument::from(&sample_fund())).unwrap();

        assert_eq!(doc.get_str("transactionId").unwrap(), "2b1c0c7e-1f1e-4c55-9d38-1b8d6f0f6a11");
        assert_eq!(doc.get_str("donationType").unwrap(), "one-time");
        assert_eq!(doc.get_str("mobileNumber").unwrap(), "9999999999");
        assert!(doc.get_datetime("date").is_ok());
        assert!(!doc.contains_key("_id"));
    }

    #[test]
    fn test_absent_fields_are_not_written() {
        let mut fund = sample_fund();
        fund.mobile_number = None;
        let doc = bson::to_document(&FundDocument::from(&fund)).unwrap();
        assert!(!doc.contains_key("mobileNumber"));
    }

    #[test]
    fn test_stored_document_reads_back_with_hex_id() {
        let oid = ObjectId::new();
        let raw = doc! {
            "_id": oid,
            "transactionId": "t-1",
            "description": "Printing",
            "amount": 200_i32,
            "date": bson::DateTime::from_millis(1_700_000_000_000),
            "__v": 0,
        };
        let expense = Expense::try_from(bson::from_document::<ExpenseDocument>(raw).unwrap()).unwrap();

        assert_eq!(expense.id, Some(oid.to_hex()));
        assert_eq!(expense.amount, Some(200.0));
        assert_eq!(expense.date.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn test_out_of_range_date_is_invalid_format() {
        let raw = doc! {
            "transactionId": "t-2",
            "name": "Asha",
            "date": bson::DateTime::from_millis(i64::MAX),
        };
        let err = Fund::try_from(bson::from_document::<FundDocument>(raw).unwrap()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidFormat { .. }));
    }
}
