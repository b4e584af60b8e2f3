use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::{CancelQuery, QuoteRequest, ReserveRequest};
use crate::api::dtos::responses::ReservationResponse;
use crate::domain::services::booking_lifecycle;
use crate::domain::services::pricing::minutes_from_hours;
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;
use tracing::info;

pub async fn quote(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QuoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let minutes = minutes_from_hours(payload.hours)?;
    let slot = match (payload.date, payload.start_time) {
        (Some(date), Some(start_time)) => Some((date, start_time)),
        (None, None) => None,
        _ => return Err(AppError::InvalidInput("date and start_time must be given together".into())),
    };

    let outcome = state.lifecycle.quote(booking_lifecycle::QuoteRequest {
        resource_id: payload.resource_id,
        participants: payload.participants,
        minutes,
        activity_type: payload.activity_type,
        is_commercial: payload.is_commercial,
        slot,
    }).await?;
    Ok(Json(outcome))
}

pub async fn reserve(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<ReserveRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("reserve: {} requests {} {} for {}h", identity.user_id, payload.date, payload.start_time, payload.hours);
    let minutes = minutes_from_hours(payload.hours)?;

    let reservation = state.lifecycle.reserve(&identity, booking_lifecycle::ReserveRequest {
        resource_id: payload.resource_id,
        date: payload.date,
        start_time: payload.start_time,
        minutes,
        participants: payload.participants,
        activity_type: payload.activity_type,
        is_commercial: payload.is_commercial,
        customer_name: payload.customer_name,
        customer_email: payload.customer_email,
        notes: payload.notes,
    }, Utc::now()).await?;

    Ok(Json(ReservationResponse {
        pending_booking_id: reservation.pending.id,
        payment_url: reservation.payment_url,
        price_per_hour: reservation.pending.price_per_hour,
        total_price: reservation.pending.total_price,
        start: reservation.pending.start_time,
        end: reservation.pending.end_time,
        expires_at: reservation.expires_at,
    }))
}

pub async fn list_my_bookings(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_repo.list_by_user(&identity.user_id).await?;
    Ok(Json(bookings))
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.lifecycle.find_visible(&identity, &booking_id).await?;
    Ok(Json(booking))
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(booking_id): Path<String>,
    Query(query): Query<CancelQuery>,
) -> Result<impl IntoResponse, AppError> {
    let cancelled = state.lifecycle.cancel(&identity, &booking_id, query.refund).await?;
    Ok(Json(cancelled))
}
