use std::sync::Arc;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::{error, info, warn};
use crate::domain::models::auth::Identity;
use crate::domain::models::booking::{ActivityType, Booking, BookingStatus, PaymentStatus};
use crate::domain::models::interval::Interval;
use crate::domain::models::pending_booking::{NewPendingBookingParams, PendingBooking};
use crate::domain::models::resource::Resource;
use crate::domain::ports::{BookingRepository, PaymentGateway, PaymentInit, PendingBookingRepository, ResourceRepository};
use crate::domain::services::availability::{is_interval_open, AvailabilityService, Granularity};
use crate::domain::services::conflict::ConflictGuard;
use crate::domain::services::notification::BookingNotifier;
use crate::domain::services::pricing::{self, Quote};
use crate::domain::services::timezone::{local_wall_clock_to_instant, parse_civil_date};
use crate::error::AppError;

/// Status code the gateway sends for an approved transaction.
pub const GATEWAY_SUCCESS_CODE: &str = "000";

pub struct QuoteRequest {
    pub resource_id: String,
    pub participants: i32,
    pub minutes: i64,
    pub activity_type: ActivityType,
    pub is_commercial: bool,
    /// Optional civil date and `HH:mm` start used for the advisory availability hint.
    pub slot: Option<(String, String)>,
}

#[derive(Debug, Serialize)]
pub struct QuoteOutcome {
    #[serde(flatten)]
    pub quote: Quote,
    pub available: Option<bool>,
}

pub struct ReserveRequest {
    pub resource_id: String,
    pub date: String,
    pub start_time: String,
    pub minutes: i64,
    pub participants: i32,
    pub activity_type: ActivityType,
    pub is_commercial: bool,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug)]
pub struct Reservation {
    pub pending: PendingBooking,
    pub payment_url: String,
    pub expires_at: DateTime<Utc>,
}

/// Parameters echoed back by the gateway on the browser redirect. All of them are client-visible.
#[derive(Debug, Clone, Default)]
pub struct CallbackParams {
    pub status_code: Option<String>,
    pub confirmation_key: Option<String>,
    pub correlation_key: Option<String>,
    pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    PaymentDeclined,
    MissingKey,
    BookingNotFound,
    VerificationFailed,
    SlotTaken,
    ServerError,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::PaymentDeclined => "payment_declined",
            FailureReason::MissingKey => "missing_key",
            FailureReason::BookingNotFound => "booking_not_found",
            FailureReason::VerificationFailed => "verification_failed",
            FailureReason::SlotTaken => "slot_taken",
            FailureReason::ServerError => "server_error",
        }
    }

    pub fn from_error(err: &AppError) -> Self {
        match err {
            AppError::PaymentDeclined(_) => FailureReason::PaymentDeclined,
            AppError::InvalidInput(_) => FailureReason::MissingKey,
            AppError::BookingContextLost(_) => FailureReason::BookingNotFound,
            AppError::PaymentVerificationFailed => FailureReason::VerificationFailed,
            AppError::SlotConflict(_) => FailureReason::SlotTaken,
            _ => FailureReason::ServerError,
        }
    }
}

#[derive(Debug)]
pub enum CallbackOutcome {
    Confirmed(Booking),
    Failed {
        reason: FailureReason,
        gateway_code: Option<String>,
    },
}

/// Drives a booking from quote through the payment round-trip to a confirmed record,
/// plus the status transitions applied afterwards.
pub struct BookingLifecycle {
    resource_repo: Arc<dyn ResourceRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    pending_repo: Arc<dyn PendingBookingRepository>,
    gateway: Arc<dyn PaymentGateway>,
    availability: Arc<AvailabilityService>,
    guard: Arc<ConflictGuard>,
    notifier: Arc<BookingNotifier>,
    pending_ttl: Duration,
    callback_url: String,
}

pub struct LifecycleDeps {
    pub resource_repo: Arc<dyn ResourceRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub pending_repo: Arc<dyn PendingBookingRepository>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub availability: Arc<AvailabilityService>,
    pub guard: Arc<ConflictGuard>,
    pub notifier: Arc<BookingNotifier>,
}

impl BookingLifecycle {
    pub fn new(deps: LifecycleDeps, pending_ttl: Duration, callback_url: String) -> Self {
        Self {
            resource_repo: deps.resource_repo,
            booking_repo: deps.booking_repo,
            pending_repo: deps.pending_repo,
            gateway: deps.gateway,
            availability: deps.availability,
            guard: deps.guard,
            notifier: deps.notifier,
            pending_ttl,
            callback_url,
        }
    }

    pub async fn active_resource(&self, resource_id: &str) -> Result<Resource, AppError> {
        self.resource_repo.find_by_id(resource_id).await?
            .filter(|r| r.is_active)
            .ok_or_else(|| AppError::NotFound("Resource not found".into()))
    }

    fn proposed_interval(&self, date: &str, start_time: &str, minutes: i64) -> Result<(NaiveDate, Interval), AppError> {
        let date = parse_civil_date(date)?;
        let start = local_wall_clock_to_instant(date, start_time, self.availability.zone())?;
        Ok((date, Interval::starting_at(start, minutes)?))
    }

    async fn within_open_hours(&self, resource: &Resource, date: NaiveDate, interval: &Interval) -> Result<bool, AppError> {
        let slots = self.availability.day_slots(resource, date, Granularity::Quarter).await?;
        Ok(is_interval_open(&slots, interval))
    }

    /// Fast feedback only. The authoritative check runs again at commit time.
    async fn ensure_bookable(&self, resource: &Resource, date: NaiveDate, interval: &Interval) -> Result<(), AppError> {
        self.guard.assert_no_overlap(&resource.id, interval, None).await?;
        if !self.within_open_hours(resource, date, interval).await? {
            return Err(AppError::SlotConflict("The requested time is outside opening hours or blocked".into()));
        }
        Ok(())
    }

    pub async fn quote(&self, request: QuoteRequest) -> Result<QuoteOutcome, AppError> {
        let resource = self.active_resource(&request.resource_id).await?;
        let quote = pricing::quote(&resource, request.participants, request.minutes, request.activity_type, request.is_commercial)?;

        let available = match &request.slot {
            Some((date, start_time)) => {
                let (date, interval) = self.proposed_interval(date, start_time, request.minutes)?;
                let free = self.guard.can_confirm(&resource.id, &interval, None).await?;
                Some(free && self.within_open_hours(&resource, date, &interval).await?)
            }
            None => None,
        };

        Ok(QuoteOutcome { quote, available })
    }

    pub async fn reserve(&self, identity: &Identity, request: ReserveRequest, now: DateTime<Utc>) -> Result<Reservation, AppError> {
        let resource = self.active_resource(&request.resource_id).await?;
        let quote = pricing::quote(&resource, request.participants, request.minutes, request.activity_type, request.is_commercial)?;
        let (date, interval) = self.proposed_interval(&request.date, &request.start_time, request.minutes)?;

        if interval.start <= now {
            return Err(AppError::InvalidInput("Cannot book in the past".into()));
        }
        self.ensure_bookable(&resource, date, &interval).await?;

        let pending = PendingBooking::new(NewPendingBookingParams {
            resource_id: resource.id.clone(),
            user_id: identity.user_id.clone(),
            customer_name: request.customer_name.or_else(|| identity.name.clone()),
            customer_email: request.customer_email.or_else(|| identity.email.clone()),
            interval,
            participants: request.participants,
            activity_type: request.activity_type,
            is_commercial: request.is_commercial,
            price_per_hour: quote.price_per_hour,
            total_price: quote.total_price,
            notes: request.notes,
        }, now);
        let pending = self.pending_repo.create(&pending).await?;

        let init = PaymentInit {
            amount_minor: pending.total_price,
            correlation_key: pending.id.clone(),
            good_url: self.callback_url.clone(),
            error_url: self.callback_url.clone(),
        };
        let payment_url = match self.gateway.init(&init).await {
            Ok(url) => url,
            Err(e) => {
                warn!(pending_id = %pending.id, error = %e, "reserve: payment init failed, dropping draft");
                if let Err(cleanup) = self.pending_repo.delete(&pending.id).await {
                    warn!(pending_id = %pending.id, error = %cleanup, "reserve: failed to drop draft");
                }
                return Err(e);
            }
        };

        info!(pending_id = %pending.id, resource_id = %resource.id, total = pending.total_price, "reserve: awaiting payment");
        let expires_at = pending.expires_at(self.pending_ttl);
        Ok(Reservation { pending, payment_url, expires_at })
    }

    /// Resolves a gateway redirect. Never fails: every error becomes a [`FailureReason`].
    pub async fn handle_callback(&self, params: CallbackParams, now: DateTime<Utc>) -> CallbackOutcome {
        match self.commit_payment(&params, now).await {
            Ok(booking) => CallbackOutcome::Confirmed(booking),
            Err(e) => {
                let reason = FailureReason::from_error(&e);
                let gateway_code = match &e {
                    AppError::PaymentDeclined(code) => Some(code.clone()),
                    _ => None,
                };
                match reason {
                    FailureReason::VerificationFailed => {}
                    FailureReason::ServerError => error!(correlation_key = ?params.correlation_key, error = %e, "Payment callback failed"),
                    _ => warn!(correlation_key = ?params.correlation_key, reason = reason.as_str(), error = %e, "Payment callback rejected"),
                }
                CallbackOutcome::Failed { reason, gateway_code }
            }
        }
    }

    async fn commit_payment(&self, params: &CallbackParams, now: DateTime<Utc>) -> Result<Booking, AppError> {
        let status = params.status_code.as_deref().unwrap_or_default();
        let correlation_key = params.correlation_key.as_deref().filter(|k| !k.is_empty());

        if status != GATEWAY_SUCCESS_CODE {
            if let Some(key) = correlation_key {
                self.pending_repo.delete(key).await?;
            }
            return Err(AppError::PaymentDeclined(status.to_string()));
        }

        let (Some(confirmation_key), Some(correlation_key)) = (
            params.confirmation_key.as_deref().filter(|k| !k.is_empty()),
            correlation_key,
        ) else {
            return Err(AppError::InvalidInput("Callback is missing the confirmation or correlation key".into()));
        };

        let pending = self.pending_repo
            .find_live(correlation_key, now - self.pending_ttl)
            .await?
            .ok_or_else(|| AppError::BookingContextLost(correlation_key.to_string()))?;

        // Redirect parameters are spoofable; only the server-to-server answer counts.
        if !self.gateway.verify(confirmation_key, correlation_key, pending.total_price).await? {
            warn!(
                security = true,
                pending_id = %pending.id,
                transaction_id = ?params.transaction_id,
                "Payment verification failed for callback"
            );
            return Err(AppError::PaymentVerificationFailed);
        }

        let interval = pending.interval();
        if let Err(e) = self.guard.assert_no_overlap(&pending.resource_id, &interval, None).await {
            self.pending_repo.delete(&pending.id).await?;
            return Err(e);
        }

        let booking = Booking::confirmed_from(&pending, params.transaction_id.clone(), now);
        let created = match self.booking_repo.insert_if_free(&booking, Some(&pending.id)).await {
            Ok(Some(created)) => created,
            Ok(None) => {
                self.pending_repo.delete(&pending.id).await?;
                return Err(AppError::SlotConflict("Slot was taken while the payment was processed".into()));
            }
            Err(e) => {
                error!(
                    incident = "payment_captured_without_booking",
                    pending_id = %pending.id,
                    transaction_id = ?params.transaction_id,
                    amount = pending.total_price,
                    error = %e,
                    "Payment verified but the booking could not be written"
                );
                return Err(e);
            }
        };

        info!(booking_id = %created.id, resource_id = %created.resource_id, "Booking confirmed after payment");

        match self.resource_repo.find_by_id(&created.resource_id).await {
            Ok(Some(resource)) => self.notifier.send_confirmation(&resource, &created).await,
            Ok(None) => warn!(booking_id = %created.id, "Resource vanished, confirmation skipped"),
            Err(e) => warn!(booking_id = %created.id, error = %e, "Resource lookup failed, confirmation skipped"),
        }

        Ok(created)
    }

    pub async fn find_visible(&self, identity: &Identity, booking_id: &str) -> Result<Booking, AppError> {
        let booking = self.booking_repo.find_by_id(booking_id).await?
            .ok_or_else(|| AppError::NotFound("Booking not found".into()))?;
        if !identity.is_admin() && booking.user_id != identity.user_id {
            return Err(AppError::Forbidden("Not your booking".into()));
        }
        Ok(booking)
    }

    async fn transition(&self, booking: &Booking, next: BookingStatus, payment_status: Option<PaymentStatus>) -> Result<Booking, AppError> {
        if !booking.status.can_transition_to(next) {
            return Err(AppError::InvalidInput(format!(
                "Cannot move a {} booking to {}", booking.status.as_str(), next.as_str()
            )));
        }
        let updated = self.booking_repo
            .transition(&booking.id, booking.status, next, payment_status)
            .await?
            .ok_or_else(|| AppError::InvalidInput("Booking was modified concurrently, reload and retry".into()))?;
        info!(booking_id = %updated.id, from = booking.status.as_str(), to = next.as_str(), "Booking status changed");
        Ok(updated)
    }

    /// Admin confirmation of a booking still awaiting it; re-runs the authoritative guard.
    pub async fn confirm(&self, booking_id: &str) -> Result<Booking, AppError> {
        let booking = self.booking_repo.find_by_id(booking_id).await?
            .ok_or_else(|| AppError::NotFound("Booking not found".into()))?;
        self.guard.assert_no_overlap(&booking.resource_id, &booking.interval(), Some(&booking.id)).await?;
        self.transition(&booking, BookingStatus::Confirmed, None).await
    }

    /// Owners may cancel their own bookings; only admins may mark the payment refunded.
    pub async fn cancel(&self, identity: &Identity, booking_id: &str, refund: bool) -> Result<Booking, AppError> {
        let booking = self.find_visible(identity, booking_id).await?;
        if refund && !identity.is_admin() {
            return Err(AppError::Forbidden("Only admins can record refunds".into()));
        }
        let payment_status = (refund && booking.payment_status == PaymentStatus::Paid).then_some(PaymentStatus::Refunded);
        self.transition(&booking, BookingStatus::Cancelled, payment_status).await
    }

    pub async fn complete(&self, booking_id: &str) -> Result<Booking, AppError> {
        let booking = self.booking_repo.find_by_id(booking_id).await?
            .ok_or_else(|| AppError::NotFound("Booking not found".into()))?;
        self.transition(&booking, BookingStatus::Completed, None).await
    }
}
