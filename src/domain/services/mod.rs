pub mod availability;
pub mod block_manager;
pub mod booking_lifecycle;
pub mod calendar;
pub mod conflict;
pub mod notification;
pub mod pricing;
pub mod timezone;
