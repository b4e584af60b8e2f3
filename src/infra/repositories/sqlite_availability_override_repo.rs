use crate::domain::{models::block::AvailabilityOverride, ports::AvailabilityOverrideRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::NaiveDate;

pub struct SqliteAvailabilityOverrideRepo {
    pool: SqlitePool,
}

impl SqliteAvailabilityOverrideRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl AvailabilityOverrideRepository for SqliteAvailabilityOverrideRepo {
    async fn create(&self, rule: &AvailabilityOverride) -> Result<AvailabilityOverride, AppError> {
        sqlx::query_as::<_, AvailabilityOverride>(
            r#"INSERT INTO availability_overrides (id, resource_id, day_of_week, date, is_blocked, start_time, end_time, reason, recurring, is_active, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               RETURNING *"#
        )
            .bind(&rule.id)
            .bind(&rule.resource_id)
            .bind(rule.day_of_week)
            .bind(rule.date)
            .bind(rule.is_blocked)
            .bind(&rule.start_time)
            .bind(&rule.end_time)
            .bind(&rule.reason)
            .bind(rule.recurring)
            .bind(rule.is_active)
            .bind(rule.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_active(&self, resource_id: Option<&str>) -> Result<Vec<AvailabilityOverride>, AppError> {
        sqlx::query_as::<_, AvailabilityOverride>(
            "SELECT * FROM availability_overrides WHERE is_active = 1 AND (? IS NULL OR resource_id = ?) ORDER BY date ASC, day_of_week ASC, start_time ASC"
        )
            .bind(resource_id)
            .bind(resource_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_for_day(&self, resource_id: &str, date: NaiveDate, day_of_week: i32) -> Result<Vec<AvailabilityOverride>, AppError> {
        sqlx::query_as::<_, AvailabilityOverride>(
            "SELECT * FROM availability_overrides
             WHERE resource_id = ? AND is_active = 1
               AND ((recurring = 0 AND date = ?) OR (recurring = 1 AND day_of_week = ?))"
        )
            .bind(resource_id)
            .bind(date)
            .bind(day_of_week)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn deactivate(&self, id: &str) -> Result<(), AppError> {
        let res = sqlx::query("UPDATE availability_overrides SET is_active = 0 WHERE id = ? AND is_active = 1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Override not found".into()));
        }
        Ok(())
    }
}
