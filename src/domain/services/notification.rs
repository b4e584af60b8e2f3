use std::sync::Arc;
use chrono_tz::Tz;
use serde_json::json;
use tera::{Context, Tera};
use tracing::{info, warn};
use crate::domain::models::{booking::Booking, resource::Resource};
use crate::domain::ports::EmailService;
use crate::domain::services::{calendar, timezone::to_civil};
use crate::error::AppError;

pub const CONFIRMATION_TEMPLATE: &str = "confirmation.html";

/// Formats minor units as a decimal amount, e.g. `12050` -> `120.50`.
pub fn format_minor_units(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

pub struct BookingNotifier {
    email_service: Arc<dyn EmailService>,
    templates: Arc<Tera>,
    zone: Tz,
}

impl BookingNotifier {
    pub fn new(email_service: Arc<dyn EmailService>, templates: Arc<Tera>, zone: Tz) -> Self {
        Self { email_service, templates, zone }
    }

    pub fn render_confirmation(&self, resource: &Resource, booking: &Booking) -> Result<(String, String), AppError> {
        let start = to_civil(booking.start_time, self.zone);
        let end = to_civil(booking.end_time, self.zone);
        let date = start.format("%d/%m/%Y").to_string();

        let context = Context::from_value(json!({
            "customer_name": booking.customer_name.as_deref().unwrap_or("there"),
            "resource_name": resource.name,
            "address": resource.address,
            "reference": booking.short_reference(),
            "date": date,
            "start_time": start.format("%H:%M").to_string(),
            "end_time": end.format("%H:%M").to_string(),
            "hours": booking.hours(),
            "activity": booking.activity_type.label(),
            "participants": booking.participants,
            "total_price": format_minor_units(booking.total_price),
        }))
        .map_err(|e| AppError::InternalWithMsg(format!("Template context: {}", e)))?;

        let body = self.templates.render(CONFIRMATION_TEMPLATE, &context)
            .map_err(|e| AppError::InternalWithMsg(format!("Template render: {}", e)))?;
        let subject = format!("Booking confirmed: {} on {}", resource.name, date);
        Ok((subject, body))
    }

    async fn try_send_confirmation(&self, resource: &Resource, booking: &Booking) -> Result<bool, AppError> {
        let Some(recipient) = booking.customer_email.as_deref().filter(|e| !e.is_empty()) else {
            return Ok(false);
        };
        let (subject, body) = self.render_confirmation(resource, booking)?;
        let ics = calendar::generate_ics(resource, booking);
        self.email_service
            .send(recipient, &subject, &body, Some("invite.ics"), Some(ics.as_bytes()))
            .await?;
        Ok(true)
    }

    /// Best effort: failures are logged and never reach the caller.
    pub async fn send_confirmation(&self, resource: &Resource, booking: &Booking) {
        match self.try_send_confirmation(resource, booking).await {
            Ok(true) => info!(booking_id = %booking.id, "Confirmation email sent"),
            Ok(false) => info!(booking_id = %booking.id, "No customer email on booking, confirmation skipped"),
            Err(e) => warn!(booking_id = %booking.id, error = %e, "Failed to send confirmation email"),
        }
    }
}
