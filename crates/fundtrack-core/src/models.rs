//! Record types for funds and expenses
//!
//! `*Draft` types are what a client submits; `Fund` and `Expense` are what
//! gets stored and listed. Drafts have no transaction id field, so a
//! client-supplied `transactionId` is dropped during decoding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coerce;

/// Which collection a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Funds,
    Expenses,
}

impl Collection {
    /// Collection name in the document store
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Funds => "funds",
            Collection::Expenses => "expenses",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Donation as submitted by a client
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundDraft {
    #[serde(default, deserialize_with = "coerce::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "coerce::text")]
    pub donation_type: Option<String>,
    #[serde(default, deserialize_with = "coerce::timestamp")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "coerce::text")]
    pub mobile_number: Option<String>,
}

/// A recorded donation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fund {
    /// Store-assigned document id, absent until inserted
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "coerce::serialize_amount"
    )]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donation_type: Option<String>,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
}

impl Fund {
    /// Build a record from a draft; `now` fills in a missing date
    pub fn from_draft(draft: FundDraft, transaction_id: String, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            transaction_id,
            name: draft.name,
            amount: draft.amount,
            donation_type: draft.donation_type,
            date: draft.date.unwrap_or(now),
            mobile_number: draft.mobile_number,
        }
    }
}

/// Expense as submitted by a client
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDraft {
    #[serde(default, deserialize_with = "coerce::text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "coerce::amount")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "coerce::timestamp")]
    pub date: Option<DateTime<Utc>>,
}

/// A recorded expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "coerce::serialize_amount"
    )]
    pub amount: Option<f64>,
    pub date: DateTime<Utc>,
}

impl Expense {
    pub fn from_draft(draft: ExpenseDraft, transaction_id: String, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            transaction_id,
            description: draft.description,
            amount: draft.amount,
            date: draft.date.unwrap_or(now),
        }
    }
}
