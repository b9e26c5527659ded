//! Donation notifications
//!
//! The [`Notifier`] only delivers; deciding when to notify and what happens
//! with the outcome belongs to the caller.

use async_trait::async_trait;
use fundtrack_config::MailConfig;
use fundtrack_utils::format_amount;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::error::{CoreError, CoreResult};
use crate::models::Fund;

/// A plain-text email to one recipient
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    /// Summary of a newly recorded donation
    pub fn donation_received(fund: &Fund, to: &str, subject: &str) -> Self {
        let or_unset = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
        let amount = fund
            .amount
            .map(|a| format!("${}", format_amount(a)))
            .unwrap_or_else(|| "-".to_string());

        let body = format!(
            "A new donation has been received! Here are the details:\n\n\
             Name: {}\n\
             Amount: {}\n\
             Donation Type: {}\n\
             Mobile Number: {}\n\
             Transaction ID: {}\n\
             Date: {}\n",
            or_unset(&fund.name),
            amount,
            or_unset(&fund.donation_type),
            or_unset(&fund.mobile_number),
            fund.transaction_id,
            fund.date.to_rfc2822(),
        );

        Self {
            to: to.to_string(),
            subject: subject.to_string(),
            body,
        }
    }
}

/// Outbound delivery. Returns the server's response text on success.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> CoreResult<String>;
}

/// Delivers through an authenticated SMTP relay
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Build from mail settings; needs `username` and `password`
    pub fn from_config(config: &MailConfig) -> CoreResult<Self> {
        let (username, password) = match (&config.username, &config.password) {
            (Some(u), Some(p)) => (u.clone(), p.clone()),
            _ => {
                return Err(CoreError::Notification {
                    message: "mail username and password are required".to_string(),
                })
            }
        };

        let from: Mailbox = username.parse().map_err(|e| CoreError::Notification {
            message: format!("invalid sender address '{}': {}", username, e),
        })?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| CoreError::Notification {
                message: format!("invalid SMTP relay '{}': {}", config.smtp_host, e),
            })?
            .credentials(Credentials::new(username, password))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, notification: &Notification) -> CoreResult<String> {
        let to: Mailbox = notification.to.parse().map_err(|e| CoreError::Notification {
            message: format!("invalid recipient '{}': {}", notification.to, e),
        })?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(notification.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body.clone())
            .map_err(|e| CoreError::Notification { message: e.to_string() })?;

        let response = self
            .transport
            .send(email)
            .await
            .map_err(|e| CoreError::Notification { message: e.to_string() })?;

        Ok(summarize_response(response.code(), response.message()))
    }
}

/// One-line form of an SMTP reply, e.g. `250 2.0.0 OK queued`
fn summarize_response<'a>(
    code: impl std::fmt::Display,
    lines: impl Iterator<Item = &'a str>,
) -> String {
    let lines: Vec<&str> = lines.collect();
    format!("{} {}", code, lines.join(" "))
}

/// Writes the email to the log instead of sending it, for setups without mail credentials
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> CoreResult<String> {
        log::info!(
            "Mail not configured, logging instead. To: {} Subject: {}\n{}",
            notification.to,
            notification.subject,
            notification.body
        );
        Ok("logged".to_string())
    }
}
