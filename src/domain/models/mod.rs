pub mod auth;
pub mod block;
pub mod booking;
pub mod interval;
pub mod pending_booking;
pub mod resource;
