use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::SmtpConfig;
use crate::services::retry::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Email {
    pub fn booking_confirmation(
        to: &str,
        attendee_name: &str,
        event_title: &str,
        event_date: NaiveDate,
        ticket_id: &str,
        amount: i64,
        currency: &str,
    ) -> Self {
        let body = format!(
            "Hello {},\n\n\
             Your booking for \"{}\" is confirmed!\n\n\
             Date: {}\n\
             Ticket ID: {}\n\
             Amount Paid: {}\n\n\
             Show the ticket ID at the venue to check in.\n\n\
             - Team Locavista\n",
            attendee_name,
            event_title,
            event_date.format("%a %b %d %Y"),
            ticket_id,
            format_amount(amount, currency),
        );

        Self {
            to: to.to_string(),
            subject: format!("Booking Confirmed: {}", event_title),
            body,
        }
    }

    pub fn password_reset_otp(to: &str, name: &str, otp: &str, ttl_minutes: i64) -> Self {
        let body = format!(
            "Hello {},\n\n\
             Your password reset code is {}.\n\
             It is valid for {} minutes. If you did not request a reset, ignore this email.\n\n\
             - Team Locavista\n",
            name, otp, ttl_minutes,
        );

        Self {
            to: to.to_string(),
            subject: "Your password reset code".to_string(),
            body,
        }
    }
}

/// Renders minor units as `major.minor CURRENCY`.
pub fn format_amount(amount: i64, currency: &str) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{}{}.{:02} {}", sign, abs / 100, abs % 100, currency)
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, email: &Email) -> Result<()>;
}

/// Writes mail to the log. Used when no SMTP relay is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, email: &Email) -> Result<()> {
        info!(
            "Email to {} [{}]:\n{}",
            email.to, email.subject, email.body
        );
        Ok(())
    }
}

pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .with_context(|| format!("Invalid SMTP relay {}", config.host))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        let from = config
            .from
            .parse::<Mailbox>()
            .with_context(|| format!("Invalid SMTP_FROM address '{}'", config.from))?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, email: &Email) -> Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(email
                .to
                .parse::<Mailbox>()
                .with_context(|| format!("Invalid recipient '{}'", email.to))?)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())
            .context("Failed to build email")?;

        self.transport
            .send(message)
            .await
            .with_context(|| format!("SMTP delivery to {} failed", email.to))?;

        info!("Email sent to {} [{}]", email.to, email.subject);
        Ok(())
    }
}

/// Best-effort delivery on a detached task. Failures are retried per the
/// policy and then only logged.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    retry: RetryPolicy,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, retry: RetryPolicy) -> Self {
        Self { notifier, retry }
    }

    pub async fn deliver(&self, email: &Email) -> Result<()> {
        self.retry.run(|| self.notifier.send(email)).await
    }

    pub fn dispatch(&self, email: Email) -> JoinHandle<()> {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            if let Err(err) = dispatcher.deliver(&email).await {
                warn!(
                    "Giving up on email to {} [{}]: {:#}",
                    email.to, email.subject, err
                );
            }
        })
    }
}
