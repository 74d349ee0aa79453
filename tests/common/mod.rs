#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use locavista::api::AppState;
use locavista::config::{Config, PaymentConfig};
use locavista::models::event::{CreateEvent, EventCategory};
use locavista::models::{Account, Caller, Event, InitiatePayment, Role, VerifyPayment};
use locavista::repositories::{AccountRepository, EventRepository};
use locavista::services::auth::hash_password;
use locavista::services::gateway::{CreateOrder, GatewayError, GatewayOrder, PaymentGateway};
use locavista::services::notifications::{Email, Notifier};
use locavista::services::signature::compute_payment_signature;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

pub const KEY_SECRET: &str = "rzp_test_secret";
pub const PASSWORD: &str = "correct-horse";

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        database_max_connections: 5,
        host: "127.0.0.1".to_string(),
        port: 0,
        jwt_secret: "test-jwt-secret".to_string(),
        jwt_ttl_minutes: 60,
        payment: PaymentConfig {
            key_id: "rzp_test_key".to_string(),
            key_secret: KEY_SECRET.to_string(),
            base_url: "http://gateway.invalid".to_string(),
            currency: "INR".to_string(),
        },
        smtp: None,
        otp_ttl_minutes: 10,
        allow_admin_signup: false,
        notification_max_attempts: 1,
    }
}

/// In-memory gateway that remembers every order it creates.
#[derive(Default)]
pub struct FakeGateway {
    orders: Mutex<HashMap<String, GatewayOrder>>,
    created: AtomicUsize,
}

impl FakeGateway {
    pub fn created_orders(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(&self, request: CreateOrder) -> Result<GatewayOrder, GatewayError> {
        let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        let order = GatewayOrder {
            id: format!("order_test{}", n),
            amount: request.amount,
            currency: request.currency,
            receipt: Some(request.receipt),
            status: Some("created".to_string()),
            notes: request.notes,
        };
        self.orders
            .lock()
            .unwrap()
            .insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn fetch_order(&self, order_id: &str) -> Result<GatewayOrder, GatewayError> {
        self.orders
            .lock()
            .unwrap()
            .get(order_id)
            .cloned()
            .ok_or_else(|| GatewayError::Rejected {
                status: 400,
                message: "The id provided does not exist".to_string(),
            })
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Email>>,
}

impl RecordingNotifier {
    /// Detached sends land shortly after the request returns.
    pub async fn wait_for(&self, count: usize) -> Vec<Email> {
        for _ in 0..100 {
            {
                let sent = self.sent.lock().unwrap();
                if sent.len() >= count {
                    return sent.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, email: &Email) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _email: &Email) -> anyhow::Result<()> {
        anyhow::bail!("SMTP relay refused connection")
    }
}

/// Never finishes a send.
pub struct HangingNotifier;

#[async_trait]
impl Notifier for HangingNotifier {
    async fn send(&self, _email: &Email) -> anyhow::Result<()> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub gateway: Arc<FakeGateway>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn test_app(pool: PgPool) -> TestApp {
    let gateway = Arc::new(FakeGateway::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let state = AppState::new(pool, &test_config(), gateway.clone(), notifier.clone());

    TestApp {
        state,
        gateway,
        notifier,
    }
}

pub fn test_app_with_notifier(pool: PgPool, notifier: Arc<dyn Notifier>) -> (AppState, Arc<FakeGateway>) {
    let gateway = Arc::new(FakeGateway::default());
    let state = AppState::new(pool, &test_config(), gateway.clone(), notifier);
    (state, gateway)
}

pub async fn seed_account(pool: &PgPool, name: &str, role: Role) -> Account {
    let account = Account::new(
        name.to_string(),
        format!("{}.{}@example.com", name.to_lowercase(), Uuid::new_v4().simple()),
        hash_password(PASSWORD).unwrap(),
        role,
    );
    assert!(AccountRepository::new(pool).create(&account).await.unwrap());
    account
}

pub async fn seed_event(pool: &PgPool, organizer: &Account, price: i64, approved: bool) -> Event {
    seed_event_on(pool, organizer, price, approved, NaiveDate::from_ymd_opt(2099, 6, 1).unwrap()).await
}

pub async fn seed_event_on(
    pool: &PgPool,
    organizer: &Account,
    price: i64,
    approved: bool,
    date: NaiveDate,
) -> Event {
    let mut event = Event::new(
        organizer.id,
        CreateEvent {
            title: "Jazz Night".to_string(),
            date,
            location: "Pune".to_string(),
            description: Some("Live jazz by the river".to_string()),
            ticket_price: price,
            category: EventCategory::Concerts,
            image_url: None,
        },
    )
    .unwrap();
    event.approved = approved;

    EventRepository::new(pool).create(&event).await.unwrap();
    event
}

/// What the client checkout hands back after the gateway captured the payment.
pub fn signed_callback(order_id: &str, event_id: Uuid, secret: &str) -> VerifyPayment {
    let payment_id = format!("pay_{}", &order_id["order_".len()..]);
    VerifyPayment {
        signature: compute_payment_signature(order_id, &payment_id, secret),
        payment_id,
        order_id: order_id.to_string(),
        event_id,
    }
}

pub async fn initiate(state: &AppState, caller: Caller, event_id: Uuid) -> String {
    state
        .bookings
        .initiate_payment(
            caller,
            InitiatePayment {
                event_id,
                amount: None,
            },
        )
        .await
        .unwrap()
        .order_id
}
