use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use crate::error::AppError;

/// Half-open `[start, end)` span of absolute time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, AppError> {
        if end <= start {
            return Err(AppError::InvalidInput("Interval end must be after its start".into()));
        }
        Ok(Self { start, end })
    }

    pub fn starting_at(start: DateTime<Utc>, minutes: i64) -> Result<Self, AppError> {
        let end = Duration::try_minutes(minutes)
            .and_then(|span| start.checked_add_signed(span))
            .ok_or_else(|| AppError::InvalidInput("Interval end is out of range".into()))?;
        Self::new(start, end)
    }

    /// Touching endpoints are adjacent, not overlapping.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, inner: &Interval) -> bool {
        self.start <= inner.start && inner.end <= self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn minutes(&self) -> i64 {
        self.duration().num_minutes()
    }
}
