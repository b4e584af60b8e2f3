use crate::domain::{models::pending_booking::PendingBooking, ports::PendingBookingRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;
use chrono::{DateTime, Utc};

pub struct SqlitePendingBookingRepo {
    pool: SqlitePool,
}

impl SqlitePendingBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PendingBookingRepository for SqlitePendingBookingRepo {
    async fn create(&self, pending: &PendingBooking) -> Result<PendingBooking, AppError> {
        sqlx::query_as::<_, PendingBooking>(
            "INSERT INTO pending_bookings (id, resource_id, user_id, customer_name, customer_email, start_time, end_time, participants, activity_type, is_commercial, price_per_hour, total_price, notes, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&pending.id).bind(&pending.resource_id).bind(&pending.user_id)
            .bind(&pending.customer_name).bind(&pending.customer_email)
            .bind(pending.start_time).bind(pending.end_time).bind(pending.participants)
            .bind(pending.activity_type).bind(pending.is_commercial)
            .bind(pending.price_per_hour).bind(pending.total_price)
            .bind(&pending.notes).bind(pending.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_live(&self, id: &str, created_after: DateTime<Utc>) -> Result<Option<PendingBooking>, AppError> {
        sqlx::query_as::<_, PendingBooking>("SELECT * FROM pending_bookings WHERE id = ? AND created_at > ?")
            .bind(id).bind(created_after)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let res = sqlx::query("DELETE FROM pending_bookings WHERE id = ?").bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(res.rows_affected() > 0)
    }

    async fn purge_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let res = sqlx::query("DELETE FROM pending_bookings WHERE created_at <= ?").bind(cutoff).execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(res.rows_affected())
    }
}
