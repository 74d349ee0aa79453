use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::PaymentConfig;

pub const NOTE_EVENT_ID: &str = "event_id";
pub const NOTE_ATTENDEE_ID: &str = "attendee_id";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway unreachable: {0}")]
    Unreachable(String),

    #[error("gateway rejected request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected gateway response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrder {
    /// Minor currency units.
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub notes: HashMap<String, String>,
}

impl CreateOrder {
    pub fn for_booking(event_id: Uuid, attendee_id: Uuid, amount: i64, currency: &str) -> Self {
        let notes = HashMap::from([
            (NOTE_EVENT_ID.to_string(), event_id.to_string()),
            (NOTE_ATTENDEE_ID.to_string(), attendee_id.to_string()),
        ]);

        Self {
            amount,
            currency: currency.to_string(),
            receipt: format!("rcpt_{}", Uuid::new_v4().simple()),
            notes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,

    pub amount: i64,

    pub currency: String,

    #[serde(default)]
    pub receipt: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default, deserialize_with = "notes_map")]
    pub notes: HashMap<String, String>,
}

impl GatewayOrder {
    pub fn note(&self, key: &str) -> Option<&str> {
        self.notes.get(key).map(String::as_str)
    }
}

// Razorpay sends `"notes": []` for orders created without notes.
fn notes_map<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let map = match value {
        serde_json::Value::Object(entries) => entries
            .into_iter()
            .map(|(k, v)| match v {
                serde_json::Value::String(s) => (k, s),
                other => (k, other.to_string()),
            })
            .collect(),
        _ => HashMap::new(),
    };
    Ok(map)
}

/// Outbound contract with the payment gateway. Implementations must be cheap
/// to share across requests.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: CreateOrder) -> Result<GatewayOrder, GatewayError>;

    async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder, GatewayError>;
}

#[derive(Clone)]
pub struct RazorpayGateway {
    client: Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayGateway {
    pub fn new(config: &PaymentConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        })
    }

    async fn read_order(response: reqwest::Response) -> Result<GatewayOrder, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Gateway returned status {}: {}", status, message);
            return Err(GatewayError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<GatewayOrder>()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(&self, request: CreateOrder) -> Result<GatewayOrder, GatewayError> {
        let url = format!("{}/v1/orders", self.base_url);

        info!(
            "Creating gateway order for {} {} (receipt {})",
            request.amount, request.currency, request.receipt
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                error!("Failed to reach payment gateway at {}: {}", url, err);
                GatewayError::Unreachable(err.to_string())
            })?;

        let order = Self::read_order(response).await?;
        info!("Gateway order {} created", order.id);
        Ok(order)
    }

    async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder, GatewayError> {
        let url = format!("{}/v1/orders/{}", self.base_url, order_id);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await
            .map_err(|err| {
                error!("Failed to reach payment gateway at {}: {}", url, err);
                GatewayError::Unreachable(err.to_string())
            })?;

        Self::read_order(response).await
    }
}
