use serde::Serialize;
use crate::domain::models::booking::ActivityType;
use crate::domain::models::resource::Resource;
use crate::error::AppError;

/// Bookings are sold in quarter-hour increments.
pub const BOOKING_STEP_MINUTES: i64 = 15;

/// Longest single booking.
pub const MAX_BOOKING_MINUTES: i64 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub price_per_hour: i64,
    pub minutes: i64,
    pub total_price: i64,
}

/// First tier of the resource's table matching the request, as an hourly rate in minor units.
pub fn price_for(resource: &Resource, participants: i32, activity_type: ActivityType, commercial: bool) -> Result<i64, AppError> {
    resource.pricing.iter()
        .find(|tier| tier.matches(participants, activity_type, commercial))
        .map(|tier| tier.price_per_hour)
        .ok_or_else(|| AppError::NotFound(format!(
            "No price tier for {} participants ({}, {})",
            participants,
            activity_type.label(),
            if commercial { "commercial" } else { "non-commercial" },
        )))
}

/// `rate × minutes / 60`, rounded half away from zero to whole minor units.
pub fn total_price(price_per_hour: i64, minutes: i64) -> Result<i64, AppError> {
    price_per_hour.checked_mul(minutes)
        .and_then(|scaled| scaled.checked_add(30))
        .map(|scaled| scaled.div_euclid(60))
        .ok_or_else(|| AppError::InvalidInput("Booking total is out of range".into()))
}

/// Converts a decimal hour count into booking minutes.
pub fn minutes_from_hours(hours: f64) -> Result<i64, AppError> {
    if !hours.is_finite() || hours <= 0.0 {
        return Err(AppError::InvalidInput("hours must be a positive number".into()));
    }
    let minutes = hours * 60.0;
    if minutes > MAX_BOOKING_MINUTES as f64 {
        return Err(AppError::InvalidInput(format!(
            "a booking may last at most {} hours", MAX_BOOKING_MINUTES / 60
        )));
    }
    let rounded = minutes.round();
    if (minutes - rounded).abs() > 1e-6 || rounded as i64 % BOOKING_STEP_MINUTES != 0 {
        return Err(AppError::InvalidInput(format!(
            "hours must be a multiple of {} minutes", BOOKING_STEP_MINUTES
        )));
    }
    Ok(rounded as i64)
}

pub fn quote(resource: &Resource, participants: i32, minutes: i64, activity_type: ActivityType, commercial: bool) -> Result<Quote, AppError> {
    if participants < 1 {
        return Err(AppError::InvalidInput("participants must be at least 1".into()));
    }
    if participants > resource.capacity {
        return Err(AppError::InvalidInput(format!(
            "{} allows at most {} participants", resource.name, resource.capacity
        )));
    }
    if minutes <= 0 || minutes % BOOKING_STEP_MINUTES != 0 {
        return Err(AppError::InvalidInput(format!(
            "duration must be a positive multiple of {} minutes", BOOKING_STEP_MINUTES
        )));
    }
    if minutes > MAX_BOOKING_MINUTES {
        return Err(AppError::InvalidInput(format!(
            "a booking may last at most {} minutes", MAX_BOOKING_MINUTES
        )));
    }
    let price_per_hour = price_for(resource, participants, activity_type, commercial)?;
    Ok(Quote { price_per_hour, minutes, total_price: total_price(price_per_hour, minutes)? })
}
