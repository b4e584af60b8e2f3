use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AdminUser;
use crate::api::dtos::requests::{AdminBookingsQuery, CalendarQuery, CalendarView, CancelQuery};
use crate::api::dtos::responses::{CalendarDay, CalendarResponse};
use crate::domain::ports::BookingFilter;
use crate::domain::services::timezone::{day_of_week, end_of_civil_day, parse_civil_date, start_of_civil_day, to_civil};
use crate::error::AppError;
use std::collections::HashSet;
use std::sync::Arc;
use chrono::Duration;
use tracing::info;

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<AdminBookingsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = BookingFilter {
        status: query.status,
        resource_id: query.resource_id,
        limit: query.limit.map(|l| l.clamp(1, 500)),
    };
    let bookings = state.booking_repo.list(&filter).await?;
    Ok(Json(bookings))
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.lifecycle.find_visible(&admin, &booking_id).await?;
    Ok(Json(booking))
}

pub async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.lifecycle.confirm(&booking_id).await?;
    info!("Booking {} confirmed by admin {}", booking.id, admin.user_id);
    Ok(Json(booking))
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(booking_id): Path<String>,
    Query(query): Query<CancelQuery>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.lifecycle.cancel(&admin, &booking_id, query.refund).await?;
    info!("Booking {} cancelled by admin {} (refund: {})", booking.id, admin.user_id, query.refund);
    Ok(Json(booking))
}

pub async fn complete_booking(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.lifecycle.complete(&booking_id).await?;
    info!("Booking {} completed by admin {}", booking.id, admin.user_id);
    Ok(Json(booking))
}

/// Occupancy for one civil day, or the Sunday-to-Saturday week containing it.
pub async fn calendar(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<CalendarQuery>,
) -> Result<impl IntoResponse, AppError> {
    let zone = state.availability.zone();
    let date = parse_civil_date(&query.date)?;
    let (first_day, day_count) = match query.view {
        CalendarView::Day => (date, 1),
        CalendarView::Week => (date - Duration::days(day_of_week(date) as i64), 7),
    };
    let last_day = first_day + Duration::days(day_count - 1);

    let from = start_of_civil_day(first_day, zone)?;
    let to = end_of_civil_day(last_day, zone)?;

    let active: HashSet<String> = state.resource_repo.list_active().await?
        .into_iter()
        .map(|r| r.id)
        .collect();
    let bookings: Vec<_> = state.booking_repo.list_all_by_range(from, to).await?
        .into_iter()
        .filter(|b| active.contains(&b.resource_id))
        .collect();

    let days = (0..day_count)
        .map(|offset| {
            let day = first_day + Duration::days(offset);
            CalendarDay {
                date: day,
                bookings: bookings.iter()
                    .filter(|b| to_civil(b.start_time, zone).date() == day)
                    .cloned()
                    .collect(),
            }
        })
        .collect();

    Ok(Json(CalendarResponse { view: query.view, from, to, days }))
}
