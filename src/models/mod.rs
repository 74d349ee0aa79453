pub mod account;
pub mod booking;
pub mod event;
pub mod payment;
pub mod revenue;

pub use account::{Account, Caller, Role};
pub use booking::{Booking, BookingSummary, CheckInStatus, PaymentStatus};
pub use event::{Event, EventCategory};
pub use payment::{InitiatePayment, OrderHandle, VerifyPayment};
pub use revenue::{split_revenue, RevenueSnapshot, RevenueSplit};
