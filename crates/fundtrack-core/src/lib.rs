//! Fund and expense records, their storage, and donation notifications
//!
//! [`Treasury`] is the service the HTTP layer drives. It owns handles to a
//! [`RecordStore`] and a [`Notifier`], both passed in at construction so tests
//! can substitute their own.

pub mod coerce;
pub mod error;
pub mod models;
pub mod notify;
pub mod store;

use chrono::Utc;
use fundtrack_utils::generate_transaction_id;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use models::{Collection, Expense, ExpenseDraft, Fund, FundDraft};
pub use notify::{LogNotifier, Notification, Notifier, SmtpNotifier};
pub use store::{MemoryStore, MongoStore, RecordStore};

/// Where donation notifications go
#[derive(Debug, Clone)]
pub struct DonationAlert {
    pub recipient: String,
    pub subject: String,
}

/// Outcome of a successful fund creation
pub struct FundReceipt {
    /// The record as stored
    pub fund: Fund,
    /// The detached notification task. Dropping it does not cancel delivery.
    pub notification: JoinHandle<CoreResult<String>>,
}

/// Fund and expense operations
#[derive(Clone)]
pub struct Treasury {
    store: Arc<dyn RecordStore>,
    notifier: Arc<dyn Notifier>,
    alert: DonationAlert,
}

impl Treasury {
    pub fn new(
        store: Arc<dyn RecordStore>,
        notifier: Arc<dyn Notifier>,
        alert: DonationAlert,
    ) -> Self {
        Self {
            store,
            notifier,
            alert,
        }
    }

    /// Persist a donation under a fresh transaction id, then notify in the background.
    ///
    /// Must be called from within a tokio runtime. Nothing is sent if the
    /// insert fails.
    pub async fn create_fund(&self, draft: FundDraft) -> CoreResult<FundReceipt> {
        let fund = Fund::from_draft(draft, generate_transaction_id(), Utc::now());
        let fund = self.store.insert_fund(fund).await.map_err(|e| {
            log::error!("Failed to store fund: {}", e);
            e
        })?;
        log::debug!("Stored fund {}", fund.transaction_id);

        let notification =
            Notification::donation_received(&fund, &self.alert.recipient, &self.alert.subject);
        let notification = self.dispatch(notification);

        Ok(FundReceipt { fund, notification })
    }

    /// Persist an expense under a fresh transaction id
    pub async fn create_expense(&self, draft: ExpenseDraft) -> CoreResult<Expense> {
        let expense = Expense::from_draft(draft, generate_transaction_id(), Utc::now());
        let expense = self.store.insert_expense(expense).await.map_err(|e| {
            log::error!("Failed to store expense: {}", e);
            e
        })?;
        log::debug!("Stored expense {}", expense.transaction_id);
        Ok(expense)
    }

    pub async fn list_funds(&self) -> CoreResult<Vec<Fund>> {
        self.store.list_funds().await.map_err(|e| {
            log::error!("Failed to fetch funds: {}", e);
            e
        })
    }

    pub async fn list_expenses(&self) -> CoreResult<Vec<Expense>> {
        self.store.list_expenses().await.map_err(|e| {
            log::error!("Failed to fetch expenses: {}", e);
            e
        })
    }

    /// Hand the email to the runtime; the outcome is logged, never propagated
    fn dispatch(&self, notification: Notification) -> JoinHandle<CoreResult<String>> {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            let outcome = notifier.send(&notification).await;
            match &outcome {
                Ok(response) => log::info!("Email sent: {}", response),
                Err(e) => log::error!("Error sending email: {}", e),
            }
            outcome
        })
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, notification: &Notification) -> CoreResult<String> {
            self.sent.lock().unwrap().push(notification.clone());
            Ok("250 OK".to_string())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send(&self, _notification: &Notification) -> CoreResult<String> {
            Err(CoreError::Notification {
                message: "535 authentication failed".to_string(),
            })
        }
    }

    struct FailingStore;

    #[async_trait]
    impl RecordStore for FailingStore {
        async fn insert_fund(&self, _fund: Fund) -> CoreResult<Fund> {
            Err(CoreError::StoreUnavailable {
                message: "connection refused".to_string(),
            })
        }

        async fn insert_expense(&self, _expense: Expense) -> CoreResult<Expense> {
            Err(CoreError::StoreUnavailable {
                message: "connection refused".to_string(),
            })
        }

        async fn list_funds(&self) -> CoreResult<Vec<Fund>> {
            Err(CoreError::StoreUnavailable {
                message: "connection refused".to_string(),
            })
        }

        async fn list_expenses(&self) -> CoreResult<Vec<Expense>> {
            Err(CoreError::StoreUnavailable {
                message: "connection refused".to_string(),
            })
        }
    }

    fn alert() -> DonationAlert {
        DonationAlert {
            recipient: "admin@example.com".to_string(),
            subject: "Donation Received".to_string(),
        }
    }

    fn asha() -> FundDraft {
        FundDraft {
            name: Some("Asha".to_string()),
            amount: Some(500.0),
            donation_type: Some("one-time".to_string()),
            date: None,
            mobile_number: Some("9999999999".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_fund_stores_and_notifies() {
        let notifier = Arc::new(RecordingNotifier::default());
        let treasury = Treasury::new(Arc::new(MemoryStore::new()), notifier.clone(), alert());

        let receipt = treasury.create_fund(asha()).await.unwrap();
        assert_eq!(receipt.notification.await.unwrap().unwrap(), "250 OK");

        {
            let sent = notifier.sent.lock().unwrap();
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].to, "admin@example.com");
            assert!(sent[0].body.contains(&receipt.fund.transaction_id));
        }

        let funds = treasury.list_funds().await.unwrap();
        assert_eq!(funds, vec![receipt.fund.clone()]);
    }

    #[tokio::test]
    async fn test_failed_insert_sends_nothing() {
        let notifier = Arc::new(RecordingNotifier::default());
        let treasury = Treasury::new(Arc::new(FailingStore), notifier.clone(), alert());

        let err = treasury.create_fund(asha()).await.err().unwrap();
        assert_eq!(err.code(), ErrorCode::StoreUnavailable);

        tokio::task::yield_now().await;
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_notification_keeps_the_record() {
        let store = Arc::new(MemoryStore::new());
        let treasury = Treasury::new(store.clone(), Arc::new(FailingNotifier), alert());

        let receipt = treasury.create_fund(asha()).await.unwrap();
        let outcome = receipt.notification.await.unwrap();

        assert!(outcome.is_err());
        assert_eq!(store.list_funds().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_expense_does_not_notify() {
        let notifier = Arc::new(RecordingNotifier::default());
        let treasury = Treasury::new(Arc::new(MemoryStore::new()), notifier.clone(), alert());

        let draft = ExpenseDraft {
            description: Some("Printing".to_string()),
            amount: Some(200.0),
            date: None,
        };
        let expense = treasury.create_expense(draft).await.unwrap();

        tokio::task::yield_now().await;
        assert!(notifier.sent.lock().unwrap().is_empty());
        assert_eq!(treasury.list_expenses().await.unwrap(), vec![expense]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_get_distinct_ids() {
        let treasury = Treasury::new(
            Arc::new(MemoryStore::new()),
            Arc::new(RecordingNotifier::default()),
            alert(),
        );

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let treasury = treasury.clone();
                tokio::spawn(async move { treasury.create_fund(asha()).await })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        let funds = treasury.list_funds().await.unwrap();
        let ids: HashSet<&str> = funds.iter().map(|f| f.transaction_id.as_str()).collect();
        assert_eq!(funds.len(), 50);
        assert_eq!(ids.len(), 50);
    }

    #[tokio::test]
    async fn test_list_errors_propagate() {
        let treasury = Treasury::new(Arc::new(FailingStore), Arc::new(LogNotifier), alert());
        assert!(treasury.list_funds().await.is_err());
        assert!(treasury.list_expenses().await.is_err());
    }
}
