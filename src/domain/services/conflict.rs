use std::sync::Arc;
use crate::domain::models::booking::Booking;
use crate::domain::models::interval::Interval;
use crate::domain::ports::BookingRepository;
use crate::error::AppError;

/// True when no occupying booking in `existing` overlaps `proposed`.
/// `excluding` skips one booking id, so a booking never conflicts with itself.
pub fn can_confirm(existing: &[Booking], resource_id: &str, proposed: &Interval, excluding: Option<&str>) -> bool {
    !existing.iter().any(|b| {
        b.resource_id == resource_id
            && b.status.occupies_interval()
            && excluding != Some(b.id.as_str())
            && b.interval().overlaps(proposed)
    })
}

pub fn assert_no_overlap(existing: &[Booking], resource_id: &str, proposed: &Interval, excluding: Option<&str>) -> Result<(), AppError> {
    if can_confirm(existing, resource_id, proposed, excluding) {
        Ok(())
    } else {
        Err(AppError::SlotConflict("The requested time overlaps an existing booking".into()))
    }
}

/// Reads the current bookings straight from storage on every call.
pub struct ConflictGuard {
    booking_repo: Arc<dyn BookingRepository>,
}

impl ConflictGuard {
    pub fn new(booking_repo: Arc<dyn BookingRepository>) -> Self {
        Self { booking_repo }
    }

    pub async fn can_confirm(&self, resource_id: &str, proposed: &Interval, excluding: Option<&str>) -> Result<bool, AppError> {
        let overlapping = self.booking_repo.find_overlapping(resource_id, proposed).await?;
        Ok(can_confirm(&overlapping, resource_id, proposed, excluding))
    }

    pub async fn assert_no_overlap(&self, resource_id: &str, proposed: &Interval, excluding: Option<&str>) -> Result<(), AppError> {
        let overlapping = self.booking_repo.find_overlapping(resource_id, proposed).await?;
        assert_no_overlap(&overlapping, resource_id, proposed, excluding)
    }
}
