use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use tokio::time::sleep;
use tracing::{error, info, info_span, Instrument};
use crate::state::AppState;

/// Deletes payment drafts whose lifetime has run out. Returns how many were removed.
pub async fn sweep_expired_pending(state: &AppState) -> Result<u64, crate::error::AppError> {
    let cutoff = Utc::now() - state.config.pending_booking_ttl();
    state.pending_repo.purge_created_before(cutoff).await
}

pub async fn start_pending_sweeper(state: Arc<AppState>) {
    let interval = Duration::from_secs(state.config.pending_sweep_interval_secs.max(1));
    info!("Starting pending booking sweeper (every {:?})...", interval);

    loop {
        let span = info_span!("pending_sweep", ttl_secs = state.config.pending_booking_ttl_secs);
        async {
            match sweep_expired_pending(&state).await {
                Ok(0) => {}
                Ok(purged) => info!("Purged {} expired pending bookings", purged),
                Err(e) => error!("Failed to purge expired pending bookings: {:?}", e),
            }
        }
            .instrument(span)
            .await;
        sleep(interval).await;
    }
}
