use crate::domain::models::{
    resource::Resource,
    booking::{Booking, BookingStatus, PaymentStatus},
    pending_booking::PendingBooking,
    block::{RecurringBlock, AvailabilityOverride},
    interval::Interval,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

#[async_trait]
pub trait ResourceRepository: Send + Sync {
    async fn create(&self, resource: &Resource) -> Result<Resource, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Resource>, AppError>;
    async fn list_active(&self) -> Result<Vec<Resource>, AppError>;
    async fn set_active(&self, id: &str, is_active: bool) -> Result<Resource, AppError>;
}

#[derive(Debug, Default, Clone)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub resource_id: Option<String>,
    pub limit: Option<i64>,
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>, AppError>;
    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>, AppError>;
    /// Non-cancelled bookings of one resource intersecting `[start, end)`.
    async fn list_by_range(&self, resource_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Booking>, AppError>;
    /// Non-cancelled bookings of every resource intersecting `[start, end)`.
    async fn list_all_by_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Booking>, AppError>;
    async fn find_overlapping(&self, resource_id: &str, interval: &Interval) -> Result<Vec<Booking>, AppError>;
    /// Writes `booking` only if no non-cancelled booking of the same resource overlaps it,
    /// removing `consumed_pending` in the same transaction. `None` means the slot was taken.
    async fn insert_if_free(&self, booking: &Booking, consumed_pending: Option<&str>) -> Result<Option<Booking>, AppError>;
    /// Compare-and-set on `status`. `None` means the row was no longer in `expected`.
    async fn transition(
        &self,
        id: &str,
        expected: BookingStatus,
        next: BookingStatus,
        payment_status: Option<PaymentStatus>,
    ) -> Result<Option<Booking>, AppError>;
}

#[async_trait]
pub trait PendingBookingRepository: Send + Sync {
    async fn create(&self, pending: &PendingBooking) -> Result<PendingBooking, AppError>;
    /// Drafts created at or before `created_after` count as expired and are never returned.
    async fn find_live(&self, id: &str, created_after: DateTime<Utc>) -> Result<Option<PendingBooking>, AppError>;
    async fn delete(&self, id: &str) -> Result<bool, AppError>;
    async fn purge_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;
}

#[async_trait]
pub trait RecurringBlockRepository: Send + Sync {
    async fn create(&self, block: &RecurringBlock) -> Result<RecurringBlock, AppError>;
    async fn list_active(&self, resource_id: Option<&str>) -> Result<Vec<RecurringBlock>, AppError>;
    async fn list_for_day(&self, resource_id: &str, day_of_week: i32, date: NaiveDate) -> Result<Vec<RecurringBlock>, AppError>;
    async fn deactivate(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait AvailabilityOverrideRepository: Send + Sync {
    async fn create(&self, rule: &AvailabilityOverride) -> Result<AvailabilityOverride, AppError>;
    async fn list_active(&self, resource_id: Option<&str>) -> Result<Vec<AvailabilityOverride>, AppError>;
    /// Active rules for `date` itself plus weekly rules for its weekday.
    async fn list_for_day(&self, resource_id: &str, date: NaiveDate, day_of_week: i32) -> Result<Vec<AvailabilityOverride>, AppError>;
    async fn deactivate(&self, id: &str) -> Result<(), AppError>;
}

#[derive(Debug, Clone)]
pub struct PaymentInit {
    pub amount_minor: i64,
    pub correlation_key: String,
    pub good_url: String,
    pub error_url: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Returns the hosted payment page URL the customer is redirected to.
    async fn init(&self, request: &PaymentInit) -> Result<String, AppError>;
    /// Server-to-server confirmation that the transaction really happened for `amount_minor`.
    async fn verify(&self, confirmation_key: &str, correlation_key: &str, amount_minor: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str, attachment_name: Option<&str>, attachment_data: Option<&[u8]>) -> Result<(), AppError>;
}
