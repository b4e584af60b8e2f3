use crate::domain::{models::block::RecurringBlock, ports::RecurringBlockRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::NaiveDate;

pub struct SqliteRecurringBlockRepo {
    pool: SqlitePool,
}

impl SqliteRecurringBlockRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl RecurringBlockRepository for SqliteRecurringBlockRepo {
    async fn create(&self, block: &RecurringBlock) -> Result<RecurringBlock, AppError> {
        sqlx::query_as::<_, RecurringBlock>(
            r#"INSERT INTO recurring_blocks (id, resource_id, day_of_week, start_time, end_time, end_date, reason, created_by, is_active, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               RETURNING *"#
        )
            .bind(&block.id)
            .bind(&block.resource_id)
            .bind(block.day_of_week)
            .bind(&block.start_time)
            .bind(&block.end_time)
            .bind(block.end_date)
            .bind(&block.reason)
            .bind(&block.created_by)
            .bind(block.is_active)
            .bind(block.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_active(&self, resource_id: Option<&str>) -> Result<Vec<RecurringBlock>, AppError> {
        sqlx::query_as::<_, RecurringBlock>(
            "SELECT * FROM recurring_blocks WHERE is_active = 1 AND (? IS NULL OR resource_id = ?) ORDER BY day_of_week ASC, start_time ASC"
        )
            .bind(resource_id)
            .bind(resource_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_for_day(&self, resource_id: &str, day_of_week: i32, date: NaiveDate) -> Result<Vec<RecurringBlock>, AppError> {
        sqlx::query_as::<_, RecurringBlock>(
            "SELECT * FROM recurring_blocks WHERE resource_id = ? AND day_of_week = ? AND is_active = 1 AND (end_date IS NULL OR end_date >= ?)"
        )
            .bind(resource_id)
            .bind(day_of_week)
            .bind(date)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn deactivate(&self, id: &str) -> Result<(), AppError> {
        let res = sqlx::query("UPDATE recurring_blocks SET is_active = 0 WHERE id = ? AND is_active = 1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("Recurring block not found".into()));
        }
        Ok(())
    }
}
