use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use sqlx::types::Json;
use crate::domain::models::booking::ActivityType;

/// One row of a resource's price table. Rates are in minor currency units per hour.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PriceTier {
    pub min_participants: i32,
    pub max_participants: Option<i32>,
    pub activity_type: ActivityType,
    pub commercial: bool,
    pub price_per_hour: i64,
}

impl PriceTier {
    pub fn matches(&self, participants: i32, activity_type: ActivityType, commercial: bool) -> bool {
        participants >= self.min_participants
            && self.max_participants.is_none_or(|max| participants <= max)
            && self.activity_type == activity_type
            && self.commercial == commercial
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub capacity: i32,
    pub open_time: String,
    pub close_time: String,
    pub pricing: Json<Vec<PriceTier>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NewResourceParams {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub capacity: i32,
    pub open_time: String,
    pub close_time: String,
    pub pricing: Vec<PriceTier>,
}

impl Resource {
    pub fn new(params: NewResourceParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: params.name,
            description: params.description,
            address: params.address,
            capacity: params.capacity,
            open_time: params.open_time,
            close_time: params.close_time,
            pricing: Json(params.pricing),
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
