use axum::{extract::{State, Query}, response::Redirect};
use crate::state::AppState;
use crate::api::dtos::requests::PaymentCallbackQuery;
use crate::domain::services::booking_lifecycle::CallbackOutcome;
use std::sync::Arc;
use chrono::Utc;

/// Gateway redirect target. Always answers with a redirect to the frontend's outcome page.
pub async fn payment_callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PaymentCallbackQuery>,
) -> Redirect {
    let base = state.config.frontend_url.trim_end_matches('/');

    match state.lifecycle.handle_callback(query.into(), Utc::now()).await {
        CallbackOutcome::Confirmed(booking) => {
            Redirect::to(&format!("{}/payment/success?bookingId={}", base, booking.id))
        }
        CallbackOutcome::Failed { reason, gateway_code } => {
            let mut target = format!("{}/payment/failed?reason={}", base, reason.as_str());
            if let Some(code) = gateway_code {
                let code: String = code.chars().filter(char::is_ascii_alphanumeric).collect();
                target.push_str("&code=");
                target.push_str(&code);
            }
            Redirect::to(&target)
        }
    }
}
