use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use crate::domain::models::booking::ActivityType;
use crate::domain::models::interval::Interval;

/// Draft held only for the payment round-trip. Its id is the gateway correlation key.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct PendingBooking {
    pub id: String,
    pub resource_id: String,
    pub user_id: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub participants: i32,
    pub activity_type: ActivityType,
    pub is_commercial: bool,
    pub price_per_hour: i64,
    pub total_price: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct NewPendingBookingParams {
    pub resource_id: String,
    pub user_id: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub interval: Interval,
    pub participants: i32,
    pub activity_type: ActivityType,
    pub is_commercial: bool,
    pub price_per_hour: i64,
    pub total_price: i64,
    pub notes: Option<String>,
}

impl PendingBooking {
    pub fn new(params: NewPendingBookingParams, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            resource_id: params.resource_id,
            user_id: params.user_id,
            customer_name: params.customer_name,
            customer_email: params.customer_email,
            start_time: params.interval.start,
            end_time: params.interval.end,
            participants: params.participants,
            activity_type: params.activity_type,
            is_commercial: params.is_commercial,
            price_per_hour: params.price_per_hour,
            total_price: params.total_price,
            notes: params.notes,
            created_at,
        }
    }

    pub fn interval(&self) -> Interval {
        Interval { start: self.start_time, end: self.end_time }
    }

    pub fn expires_at(&self, ttl: Duration) -> DateTime<Utc> {
        self.created_at + ttl
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now >= self.expires_at(ttl)
    }
}
