use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AdminUser;
use crate::api::dtos::requests::{CreateOverrideRequest, CreateRecurringBlockRequest, ResourceFilterQuery};
use crate::domain::models::block::NewRecurringBlockParams;
use crate::domain::services::block_manager::OverrideDraft;
use crate::domain::services::timezone::parse_civil_date;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn create_recurring_block(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateRecurringBlockRequest>,
) -> Result<impl IntoResponse, AppError> {
    let block = state.block_manager.create_recurring_block(NewRecurringBlockParams {
        resource_id: payload.resource_id,
        day_of_week: payload.day_of_week,
        start_time: payload.start_time,
        end_time: payload.end_time,
        end_date: payload.end_date,
        reason: payload.reason,
        created_by: admin.user_id.clone(),
    }).await?;
    info!("Recurring block {} created for resource {} (day {})", block.id, block.resource_id, block.day_of_week);
    Ok(Json(block))
}

pub async fn list_recurring_blocks(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<ResourceFilterQuery>,
) -> Result<impl IntoResponse, AppError> {
    let blocks = state.block_manager.list_recurring_blocks(query.resource_id.as_deref()).await?;
    Ok(Json(blocks))
}

pub async fn delete_recurring_block(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(block_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.block_manager.remove_recurring_block(&block_id).await?;
    info!("Recurring block {} deactivated", block_id);
    Ok(Json(serde_json::json!({"status": "deleted"})))
}

pub async fn create_override(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(payload): Json<CreateOverrideRequest>,
) -> Result<impl IntoResponse, AppError> {
    let date = payload.date.as_deref().map(parse_civil_date).transpose()?;
    let rule = state.block_manager.create_override(OverrideDraft {
        resource_id: payload.resource_id,
        date,
        day_of_week: payload.day_of_week,
        is_blocked: payload.is_blocked,
        start_time: payload.start_time,
        end_time: payload.end_time,
        reason: payload.reason,
    }).await?;
    info!("Override {} created for resource {} (blocked: {})", rule.id, rule.resource_id, rule.is_blocked);
    Ok(Json(rule))
}

pub async fn list_overrides(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(query): Query<ResourceFilterQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rules = state.block_manager.list_overrides(query.resource_id.as_deref()).await?;
    Ok(Json(rules))
}

pub async fn delete_override(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(override_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.block_manager.remove_override(&override_id).await?;
    info!("Override {} deactivated", override_id);
    Ok(Json(serde_json::json!({"status": "deleted"})))
}
