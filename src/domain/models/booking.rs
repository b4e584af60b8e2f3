use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::domain::models::interval::Interval;
use crate::domain::models::pending_booking::PendingBooking;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ActivityType {
    Rehearsal,
    Lesson,
    Workshop,
}

impl ActivityType {
    pub fn label(&self) -> &'static str {
        match self {
            ActivityType::Rehearsal => "Rehearsal",
            ActivityType::Lesson => "Lesson / training",
            ActivityType::Workshop => "Workshop / private session",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
        )
    }

    /// Everything except a cancelled booking keeps its interval occupied.
    pub fn occupies_interval(self) -> bool {
        self != BookingStatus::Cancelled
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
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
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_transaction_id: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Materializes the paid, confirmed booking for a draft whose payment was verified.
    pub fn confirmed_from(pending: &PendingBooking, transaction_id: Option<String>, paid_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            resource_id: pending.resource_id.clone(),
            user_id: pending.user_id.clone(),
            customer_name: pending.customer_name.clone(),
            customer_email: pending.customer_email.clone(),
            start_time: pending.start_time,
            end_time: pending.end_time,
            participants: pending.participants,
            activity_type: pending.activity_type,
            is_commercial: pending.is_commercial,
            price_per_hour: pending.price_per_hour,
            total_price: pending.total_price,
            status: BookingStatus::Confirmed,
            payment_status: PaymentStatus::Paid,
            payment_transaction_id: transaction_id.filter(|t| !t.is_empty()),
            paid_at: Some(paid_at),
            notes: pending.notes.clone(),
            created_at: paid_at,
            updated_at: paid_at,
        }
    }

    pub fn interval(&self) -> Interval {
        Interval { start: self.start_time, end: self.end_time }
    }

    pub fn hours(&self) -> f64 {
        self.interval().minutes() as f64 / 60.0
    }

    /// Last six characters of the id, used as a human-facing reference.
    pub fn short_reference(&self) -> &str {
        let len = self.id.len();
        &self.id[len.saturating_sub(6)..]
    }
}
