use crate::domain::models::booking::Booking;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use super::requests::CalendarView;

#[derive(Serialize)]
pub struct SlotView {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Wall-clock start in the business timezone, `HH:mm`.
    pub time: String,
    pub available: bool,
}

#[derive(Serialize)]
pub struct SlotsResponse {
    pub resource_id: String,
    pub date: NaiveDate,
    pub timezone: String,
    pub granularity_minutes: i64,
    pub slots: Vec<SlotView>,
}

#[derive(Serialize)]
pub struct ReservationResponse {
    pub pending_booking_id: String,
    pub payment_url: String,
    pub price_per_hour: i64,
    pub total_price: i64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub bookings: Vec<Booking>,
}

#[derive(Serialize)]
pub struct CalendarResponse {
    pub view: CalendarView,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub days: Vec<CalendarDay>,
}
