pub mod account_service;
pub mod auth;
pub mod booking_service;
pub mod event_service;
pub mod gateway;
pub mod notifications;
pub mod retry;
pub mod revenue_service;
pub mod signature;

pub use account_service::AccountService;
pub use booking_service::BookingService;
pub use event_service::EventService;
pub use gateway::{PaymentGateway, RazorpayGateway};
pub use notifications::{LogNotifier, NotificationDispatcher, Notifier, SmtpNotifier};
pub use revenue_service::RevenueService;
