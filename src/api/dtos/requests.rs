use crate::domain::models::booking::{ActivityType, BookingStatus};
use crate::domain::models::resource::PriceTier;
use crate::domain::services::booking_lifecycle::CallbackParams;
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateResourceRequest {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub capacity: i32,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    #[serde(default)]
    pub pricing: Vec<PriceTier>,
}

#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: String,
    pub granularity: Option<u32>,
}

#[derive(Deserialize)]
pub struct QuoteRequest {
    pub resource_id: String,
    pub participants: i32,
    pub hours: f64,
    pub activity_type: ActivityType,
    #[serde(default)]
    pub is_commercial: bool,
    pub date: Option<String>,
    pub start_time: Option<String>,
}

#[derive(Deserialize)]
pub struct ReserveRequest {
    pub resource_id: String,
    pub date: String,
    pub start_time: String,
    pub hours: f64,
    pub participants: i32,
    pub activity_type: ActivityType,
    #[serde(default)]
    pub is_commercial: bool,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct CancelQuery {
    #[serde(default)]
    pub refund: bool,
}

/// Query string the gateway appends to the redirect. Snake-case spellings are accepted too.
#[derive(Deserialize, Default)]
pub struct PaymentCallbackQuery {
    #[serde(rename = "PelecardStatusCode", alias = "pelecard_status_code", alias = "status_code")]
    pub status_code: Option<String>,
    #[serde(rename = "ConfirmationKey", alias = "confirmation_key")]
    pub confirmation_key: Option<String>,
    #[serde(rename = "UserKey", alias = "user_key")]
    pub user_key: Option<String>,
    #[serde(rename = "PelecardTransactionId", alias = "pelecard_transaction_id", alias = "transaction_id")]
    pub transaction_id: Option<String>,
}

impl From<PaymentCallbackQuery> for CallbackParams {
    fn from(q: PaymentCallbackQuery) -> Self {
        CallbackParams {
            status_code: q.status_code,
            confirmation_key: q.confirmation_key,
            correlation_key: q.user_key,
            transaction_id: q.transaction_id,
        }
    }
}

#[derive(Deserialize)]
pub struct AdminBookingsQuery {
    pub status: Option<BookingStatus>,
    pub resource_id: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Deserialize, Clone, Copy, PartialEq, Eq, Default, Debug, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarView {
    #[default]
    Day,
    Week,
}

#[derive(Deserialize)]
pub struct CalendarQuery {
    pub date: String,
    #[serde(default)]
    pub view: CalendarView,
}

#[derive(Deserialize)]
pub struct ResourceFilterQuery {
    pub resource_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateRecurringBlockRequest {
    pub resource_id: String,
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
}

fn blocked_by_default() -> bool {
    true
}

#[derive(Deserialize)]
pub struct CreateOverrideRequest {
    pub resource_id: String,
    pub date: Option<String>,
    pub day_of_week: Option<i32>,
    #[serde(default = "blocked_by_default")]
    pub is_blocked: bool,
    pub start_time: String,
    pub end_time: String,
    pub reason: Option<String>,
}
