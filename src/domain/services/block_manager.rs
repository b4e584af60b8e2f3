use std::sync::Arc;
use chrono::NaiveDate;
use crate::domain::models::block::{AvailabilityOverride, NewOverrideParams, NewRecurringBlockParams, RecurringBlock};
use crate::domain::ports::{AvailabilityOverrideRepository, RecurringBlockRepository, ResourceRepository};
use crate::domain::services::timezone::parse_wall_clock;
use crate::error::AppError;

pub fn validate_day_of_week(day_of_week: i32) -> Result<(), AppError> {
    if (0..=6).contains(&day_of_week) {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!("day_of_week must be 0-6, got {}", day_of_week)))
    }
}

/// Both ends must be `HH:mm` and the range must not be empty.
pub fn validate_time_range(start_time: &str, end_time: &str) -> Result<(), AppError> {
    let start = parse_wall_clock(start_time)?;
    let end = parse_wall_clock(end_time)?;
    if end <= start {
        return Err(AppError::InvalidInput("end_time must be after start_time".into()));
    }
    Ok(())
}

pub struct OverrideDraft {
    pub resource_id: String,
    pub date: Option<NaiveDate>,
    pub day_of_week: Option<i32>,
    pub is_blocked: bool,
    pub start_time: String,
    pub end_time: String,
    pub reason: Option<String>,
}

/// Write path for the rules the availability engine reads.
pub struct BlockManager {
    resource_repo: Arc<dyn ResourceRepository>,
    block_repo: Arc<dyn RecurringBlockRepository>,
    override_repo: Arc<dyn AvailabilityOverrideRepository>,
}

impl BlockManager {
    pub fn new(
        resource_repo: Arc<dyn ResourceRepository>,
        block_repo: Arc<dyn RecurringBlockRepository>,
        override_repo: Arc<dyn AvailabilityOverrideRepository>,
    ) -> Self {
        Self { resource_repo, block_repo, override_repo }
    }

    async fn ensure_resource(&self, resource_id: &str) -> Result<(), AppError> {
        self.resource_repo.find_by_id(resource_id).await?
            .ok_or_else(|| AppError::NotFound("Resource not found".into()))?;
        Ok(())
    }

    pub async fn create_recurring_block(&self, params: NewRecurringBlockParams) -> Result<RecurringBlock, AppError> {
        validate_day_of_week(params.day_of_week)?;
        validate_time_range(&params.start_time, &params.end_time)?;
        self.ensure_resource(&params.resource_id).await?;
        self.block_repo.create(&RecurringBlock::new(params)).await
    }

    pub async fn list_recurring_blocks(&self, resource_id: Option<&str>) -> Result<Vec<RecurringBlock>, AppError> {
        self.block_repo.list_active(resource_id).await
    }

    pub async fn remove_recurring_block(&self, id: &str) -> Result<(), AppError> {
        self.block_repo.deactivate(id).await
    }

    pub async fn create_override(&self, draft: OverrideDraft) -> Result<AvailabilityOverride, AppError> {
        match (draft.date, draft.day_of_week) {
            (Some(_), None) => {}
            (None, Some(dow)) => validate_day_of_week(dow)?,
            _ => return Err(AppError::InvalidInput("Provide exactly one of date or day_of_week".into())),
        }
        validate_time_range(&draft.start_time, &draft.end_time)?;
        self.ensure_resource(&draft.resource_id).await?;

        let rule = AvailabilityOverride::new(NewOverrideParams {
            resource_id: draft.resource_id,
            day_of_week: draft.day_of_week,
            date: draft.date,
            is_blocked: draft.is_blocked,
            start_time: draft.start_time,
            end_time: draft.end_time,
            reason: draft.reason,
        });
        self.override_repo.create(&rule).await
    }

    pub async fn list_overrides(&self, resource_id: Option<&str>) -> Result<Vec<AvailabilityOverride>, AppError> {
        self.override_repo.list_active(resource_id).await
    }

    pub async fn remove_override(&self, id: &str) -> Result<(), AppError> {
        self.override_repo.deactivate(id).await
    }
}
