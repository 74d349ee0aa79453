pub mod account_repository;
pub mod booking_repository;
pub mod event_repository;
pub mod revenue_repository;

pub use account_repository::AccountRepository;
pub use booking_repository::BookingRepository;
pub use event_repository::EventRepository;
pub use revenue_repository::RevenueRepository;
