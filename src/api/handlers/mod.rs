pub mod admin_booking;
pub mod block;
pub mod booking;
pub mod health;
pub mod payment;
pub mod resource;
