use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AdminUser;
use crate::api::dtos::requests::{CreateResourceRequest, SlotsQuery};
use crate::api::dtos::responses::{SlotView, SlotsResponse};
use crate::domain::models::resource::{NewResourceParams, Resource};
use crate::domain::services::availability::Granularity;
use crate::domain::services::block_manager::validate_time_range;
use crate::domain::services::timezone::{parse_civil_date, to_civil};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn list_resources(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let resources = state.resource_repo.list_active().await?;
    Ok(Json(resources))
}

pub async fn get_resource(
    State(state): State<Arc<AppState>>,
    Path(resource_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let resource = state.lifecycle.active_resource(&resource_id).await?;
    Ok(Json(resource))
}

pub async fn create_resource(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateResourceRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidInput("name is required".into()));
    }
    if payload.capacity < 1 {
        return Err(AppError::InvalidInput("capacity must be at least 1".into()));
    }
    let open_time = payload.open_time.unwrap_or_else(|| "09:00".to_string());
    let close_time = payload.close_time.unwrap_or_else(|| "22:00".to_string());
    validate_time_range(&open_time, &close_time)?;
    if let Some(tier) = payload.pricing.iter().find(|t| t.price_per_hour < 0 || t.min_participants < 1) {
        return Err(AppError::InvalidInput(format!("Invalid price tier for {}", tier.activity_type.label())));
    }

    let resource = Resource::new(NewResourceParams {
        name: payload.name,
        description: payload.description,
        address: payload.address,
        capacity: payload.capacity,
        open_time,
        close_time,
        pricing: payload.pricing,
    });
    let created = state.resource_repo.create(&resource).await?;
    info!("Resource {} created by {}", created.id, admin.user_id);
    Ok(Json(created))
}

pub async fn deactivate_resource(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(resource_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let resource = state.resource_repo.set_active(&resource_id, false).await?;
    info!("Resource {} deactivated by {}", resource.id, admin.user_id);
    Ok(Json(resource))
}

pub async fn get_slots(
    State(state): State<Arc<AppState>>,
    Path(resource_id): Path<String>,
    Query(query): Query<SlotsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let resource = state.lifecycle.active_resource(&resource_id).await?;
    let date = parse_civil_date(&query.date)?;
    let granularity = Granularity::from_minutes(query.granularity.unwrap_or(15))?;
    let zone = state.availability.zone();

    let slots = state.availability.day_slots(&resource, date, granularity).await?;
    let slots = slots.into_iter()
        .map(|s| SlotView {
            time: to_civil(s.start, zone).format("%H:%M").to_string(),
            start: s.start,
            end: s.end,
            available: s.available,
        })
        .collect();

    Ok(Json(SlotsResponse {
        resource_id: resource.id,
        date,
        timezone: zone.name().to_string(),
        granularity_minutes: granularity.minutes(),
        slots,
    }))
}
