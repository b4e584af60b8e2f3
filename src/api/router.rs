use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, delete},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, resource, booking, payment, admin_booking, block};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Catalogue & availability
        .route("/api/v1/resources", get(resource::list_resources).post(resource::create_resource))
        .route("/api/v1/resources/{resource_id}", get(resource::get_resource).delete(resource::deactivate_resource))
        .route("/api/v1/resources/{resource_id}/slots", get(resource::get_slots))

        // Booking flow
        .route("/api/v1/bookings/quote", post(booking::quote))
        .route("/api/v1/bookings", post(booking::reserve).get(booking::list_my_bookings))
        .route("/api/v1/bookings/{booking_id}", get(booking::get_booking))
        .route("/api/v1/bookings/{booking_id}/cancel", post(booking::cancel_booking))
        .route("/api/v1/payment/callback", get(payment::payment_callback))

        // Admin bookings
        .route("/api/v1/admin/bookings", get(admin_booking::list_bookings))
        .route("/api/v1/admin/bookings/{booking_id}", get(admin_booking::get_booking))
        .route("/api/v1/admin/bookings/{booking_id}/confirm", post(admin_booking::confirm_booking))
        .route("/api/v1/admin/bookings/{booking_id}/cancel", post(admin_booking::cancel_booking))
        .route("/api/v1/admin/bookings/{booking_id}/complete", post(admin_booking::complete_booking))
        .route("/api/v1/admin/calendar", get(admin_booking::calendar))

        // Admin blocks
        .route("/api/v1/admin/recurring-blocks", get(block::list_recurring_blocks).post(block::create_recurring_block))
        .route("/api/v1/admin/recurring-blocks/{block_id}", delete(block::delete_recurring_block))
        .route("/api/v1/admin/overrides", get(block::list_overrides).post(block::create_override))
        .route("/api/v1/admin/overrides/{override_id}", delete(block::delete_override))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri().path(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
