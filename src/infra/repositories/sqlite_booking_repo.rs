use crate::domain::{
    models::{booking::{Booking, BookingStatus, PaymentStatus}, interval::Interval},
    ports::{BookingFilter, BookingRepository},
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use chrono::{DateTime, Utc};

const DEFAULT_LIST_LIMIT: i64 = 50;

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE user_id = ? ORDER BY start_time DESC").bind(user_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self, filter: &BookingFilter) -> Result<Vec<Booking>, AppError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM bookings WHERE 1 = 1");
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(resource_id) = &filter.resource_id {
            qb.push(" AND resource_id = ").push_bind(resource_id.clone());
        }
        qb.push(" ORDER BY created_at DESC LIMIT ").push_bind(filter.limit.unwrap_or(DEFAULT_LIST_LIMIT));
        qb.build_query_as::<Booking>().fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_range(&self, resource_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE resource_id = ? AND start_time < ? AND end_time > ? AND status != 'cancelled' ORDER BY start_time ASC"
        )
            .bind(resource_id).bind(end).bind(start)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_all_by_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE start_time < ? AND end_time > ? AND status != 'cancelled' ORDER BY start_time ASC"
        )
            .bind(end).bind(start)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_overlapping(&self, resource_id: &str, interval: &Interval) -> Result<Vec<Booking>, AppError> {
        self.list_by_range(resource_id, interval.start, interval.end).await
    }

    async fn insert_if_free(&self, booking: &Booking, consumed_pending: Option<&str>) -> Result<Option<Booking>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // One statement: the overlap probe and the write cannot interleave with another writer.
        let created = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, resource_id, user_id, customer_name, customer_email, start_time, end_time, participants, activity_type, is_commercial, price_per_hour, total_price, status, payment_status, payment_transaction_id, paid_at, notes, created_at, updated_at)
             SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
             WHERE NOT EXISTS (
                 SELECT 1 FROM bookings
                 WHERE resource_id = ? AND status != 'cancelled' AND start_time < ? AND end_time > ?
             )
             RETURNING *"
        )
            .bind(&booking.id).bind(&booking.resource_id).bind(&booking.user_id)
            .bind(&booking.customer_name).bind(&booking.customer_email)
            .bind(booking.start_time).bind(booking.end_time).bind(booking.participants)
            .bind(booking.activity_type).bind(booking.is_commercial)
            .bind(booking.price_per_hour).bind(booking.total_price)
            .bind(booking.status).bind(booking.payment_status)
            .bind(&booking.payment_transaction_id).bind(booking.paid_at).bind(&booking.notes)
            .bind(booking.created_at).bind(booking.updated_at)
            .bind(&booking.resource_id).bind(booking.end_time).bind(booking.start_time)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?;

        let Some(created) = created else {
            tx.rollback().await.map_err(AppError::Database)?;
            return Ok(None);
        };

        if let Some(pending_id) = consumed_pending {
            sqlx::query("DELETE FROM pending_bookings WHERE id = ?").bind(pending_id).execute(&mut *tx).await.map_err(AppError::Database)?;
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(Some(created))
    }

    async fn transition(
        &self,
        id: &str,
        expected: BookingStatus,
        next: BookingStatus,
        payment_status: Option<PaymentStatus>,
    ) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET status = ?, payment_status = COALESCE(?, payment_status), updated_at = ?
             WHERE id = ? AND status = ?
             RETURNING *"
        )
            .bind(next).bind(payment_status).bind(Utc::now())
            .bind(id).bind(expected)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
}
