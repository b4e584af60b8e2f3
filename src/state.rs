use std::sync::Arc;
use crate::domain::ports::{
    AvailabilityOverrideRepository, BookingRepository, EmailService, PaymentGateway,
    PendingBookingRepository, RecurringBlockRepository, ResourceRepository,
};
use crate::domain::services::{
    availability::AvailabilityService,
    block_manager::BlockManager,
    booking_lifecycle::{BookingLifecycle, LifecycleDeps},
    conflict::ConflictGuard,
    notification::BookingNotifier,
};
use crate::config::Config;
use tera::Tera;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub resource_repo: Arc<dyn ResourceRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub pending_repo: Arc<dyn PendingBookingRepository>,
    pub availability: Arc<AvailabilityService>,
    pub block_manager: Arc<BlockManager>,
    pub lifecycle: Arc<BookingLifecycle>,
}

/// Concrete adapters behind every port, chosen by the caller (factory or test harness).
pub struct Ports {
    pub resource_repo: Arc<dyn ResourceRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub pending_repo: Arc<dyn PendingBookingRepository>,
    pub block_repo: Arc<dyn RecurringBlockRepository>,
    pub override_repo: Arc<dyn AvailabilityOverrideRepository>,
    pub payment_gateway: Arc<dyn PaymentGateway>,
    pub email_service: Arc<dyn EmailService>,
}

impl AppState {
    pub fn new(config: Config, ports: Ports, templates: Arc<Tera>) -> Self {
        let zone = config.business_timezone;

        let availability = Arc::new(AvailabilityService::new(
            ports.booking_repo.clone(),
            ports.block_repo.clone(),
            ports.override_repo.clone(),
            zone,
        ));
        let block_manager = Arc::new(BlockManager::new(
            ports.resource_repo.clone(),
            ports.block_repo,
            ports.override_repo,
        ));
        let guard = Arc::new(ConflictGuard::new(ports.booking_repo.clone()));
        let notifier = Arc::new(BookingNotifier::new(ports.email_service, templates, zone));

        let lifecycle = Arc::new(BookingLifecycle::new(
            LifecycleDeps {
                resource_repo: ports.resource_repo.clone(),
                booking_repo: ports.booking_repo.clone(),
                pending_repo: ports.pending_repo.clone(),
                gateway: ports.payment_gateway,
                availability: availability.clone(),
                guard,
                notifier,
            },
            config.pending_booking_ttl(),
            config.payment_callback_url(),
        ));

        Self {
            config,
            resource_repo: ports.resource_repo,
            booking_repo: ports.booking_repo,
            pending_repo: ports.pending_repo,
            availability,
            block_manager,
            lifecycle,
        }
    }
}
