use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

/// Standing weekly unavailability window in the business's wall-clock time.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct RecurringBlock {
    pub id: String,
    pub resource_id: String,
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub created_by: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl RecurringBlock {
    pub fn applies_on(&self, date: NaiveDate, day_of_week: i32) -> bool {
        self.is_active
            && self.day_of_week == day_of_week
            && self.end_date.is_none_or(|end| end >= date)
    }
}

pub struct NewRecurringBlockParams {
    pub resource_id: String,
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub created_by: String,
}

impl RecurringBlock {
    pub fn new(params: NewRecurringBlockParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            resource_id: params.resource_id,
            day_of_week: params.day_of_week,
            start_time: params.start_time,
            end_time: params.end_time,
            end_date: params.end_date,
            reason: params.reason,
            created_by: params.created_by,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// Either a one-off rule for a specific `date` (`recurring == false`) or a
/// weekly rule for `day_of_week` (`recurring == true`). `is_blocked == false`
/// marks the range as explicitly open.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct AvailabilityOverride {
    pub id: String,
    pub resource_id: String,
    pub day_of_week: Option<i32>,
    pub date: Option<NaiveDate>,
    pub is_blocked: bool,
    pub start_time: String,
    pub end_time: String,
    pub reason: Option<String>,
    pub recurring: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl AvailabilityOverride {
    pub fn is_for_date(&self, date: NaiveDate) -> bool {
        self.is_active && !self.recurring && self.date == Some(date)
    }

    pub fn is_for_weekday(&self, day_of_week: i32) -> bool {
        self.is_active && self.recurring && self.day_of_week == Some(day_of_week)
    }
}

pub struct NewOverrideParams {
    pub resource_id: String,
    pub day_of_week: Option<i32>,
    pub date: Option<NaiveDate>,
    pub is_blocked: bool,
    pub start_time: String,
    pub end_time: String,
    pub reason: Option<String>,
}

impl AvailabilityOverride {
    pub fn new(params: NewOverrideParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            resource_id: params.resource_id,
            recurring: params.date.is_none(),
            day_of_week: params.day_of_week,
            date: params.date,
            is_blocked: params.is_blocked,
            start_time: params.start_time,
            end_time: params.end_time,
            reason: params.reason,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
