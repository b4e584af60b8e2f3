use std::sync::Arc;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use crate::domain::models::block::{AvailabilityOverride, RecurringBlock};
use crate::domain::models::booking::Booking;
use crate::domain::models::interval::Interval;
use crate::domain::models::resource::Resource;
use crate::domain::ports::{AvailabilityOverrideRepository, BookingRepository, RecurringBlockRepository};
use crate::domain::services::timezone::{day_of_week, local_wall_clock_to_instant, parse_wall_clock};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Granularity {
    Quarter,
    HalfHour,
    Hour,
}

impl Granularity {
    pub fn from_minutes(minutes: u32) -> Result<Self, AppError> {
        match minutes {
            15 => Ok(Granularity::Quarter),
            30 => Ok(Granularity::HalfHour),
            60 => Ok(Granularity::Hour),
            other => Err(AppError::InvalidInput(format!("Unsupported slot granularity {} (use 15, 30 or 60)", other))),
        }
    }

    pub fn minutes(self) -> i64 {
        match self {
            Granularity::Quarter => 15,
            Granularity::HalfHour => 30,
            Granularity::Hour => 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub available: bool,
}

impl Slot {
    pub fn interval(&self) -> Interval {
        Interval { start: self.start, end: self.end }
    }
}

/// Everything known about one resource on one civil date.
pub struct DaySchedule<'a> {
    pub resource: &'a Resource,
    pub date: NaiveDate,
    pub zone: Tz,
    pub bookings: &'a [Booking],
    pub recurring_blocks: &'a [RecurringBlock],
    pub overrides: &'a [AvailabilityOverride],
}

struct Windows {
    busy: Vec<Interval>,
    weekly_blocks: Vec<Interval>,
    open: Vec<Interval>,
}

/// The resource's operating window on `date`, or `None` when it does not open that day.
pub fn operating_window(resource: &Resource, date: NaiveDate, zone: Tz) -> Result<Option<Interval>, AppError> {
    let open = parse_wall_clock(&resource.open_time)?;
    let close = parse_wall_clock(&resource.close_time)?;
    if close <= open {
        return Ok(None);
    }
    let start = local_wall_clock_to_instant(date, &resource.open_time, zone)?;
    let end = local_wall_clock_to_instant(date, &resource.close_time, zone)?;
    Ok(Some(Interval { start, end }))
}

/// Date-specific rules replace weekly rules for the same resource and day; they are never merged.
pub fn applicable_overrides<'a>(overrides: &'a [AvailabilityOverride], resource_id: &str, date: NaiveDate) -> Vec<&'a AvailabilityOverride> {
    let own: Vec<_> = overrides.iter().filter(|r| r.resource_id == resource_id).collect();
    let specific: Vec<_> = own.iter().copied().filter(|r| r.is_for_date(date)).collect();
    if !specific.is_empty() {
        return specific;
    }
    let weekday = day_of_week(date);
    own.into_iter().filter(|r| r.is_for_weekday(weekday)).collect()
}

fn wall_clock_span(date: NaiveDate, start: &str, end: &str, zone: Tz) -> Result<Option<Interval>, AppError> {
    let start = local_wall_clock_to_instant(date, start, zone)?;
    let end = local_wall_clock_to_instant(date, end, zone)?;
    Ok((end > start).then_some(Interval { start, end }))
}

fn collect_windows(day: &DaySchedule<'_>) -> Result<Windows, AppError> {
    let weekday = day_of_week(day.date);

    let busy_bookings = day.bookings.iter()
        .filter(|b| b.resource_id == day.resource.id && b.status.occupies_interval())
        .map(Booking::interval);

    let mut weekly_blocks = Vec::new();
    for block in day.recurring_blocks.iter().filter(|b| b.resource_id == day.resource.id && b.applies_on(day.date, weekday)) {
        if let Some(span) = wall_clock_span(day.date, &block.start_time, &block.end_time, day.zone)? {
            weekly_blocks.push(span);
        }
    }

    let mut blocked_rules = Vec::new();
    let mut open = Vec::new();
    for rule in applicable_overrides(day.overrides, &day.resource.id, day.date) {
        if let Some(span) = wall_clock_span(day.date, &rule.start_time, &rule.end_time, day.zone)? {
            if rule.is_blocked {
                blocked_rules.push(span);
            } else {
                open.push(span);
            }
        }
    }

    Ok(Windows {
        busy: busy_bookings.chain(blocked_rules).collect(),
        weekly_blocks,
        open,
    })
}

impl Windows {
    fn is_free(&self, slot: &Interval) -> bool {
        if self.busy.iter().any(|b| b.overlaps(slot)) {
            return false;
        }
        let weekly_blocked = self.weekly_blocks.iter().any(|b| b.overlaps(slot));
        !weekly_blocked || self.open.iter().any(|o| o.contains(slot))
    }
}

/// Tiles the operating window of `day` into consecutive slots of `granularity`.
///
/// A slot is available when it overlaps no occupying booking, no blocked override
/// rule and no recurring block. An explicitly open override rule that fully covers
/// the slot lifts recurring blocks, never bookings.
pub fn compute_slots(day: &DaySchedule<'_>, granularity: Granularity) -> Result<Vec<Slot>, AppError> {
    let Some(window) = operating_window(day.resource, day.date, day.zone)? else {
        return Ok(Vec::new());
    };
    let windows = collect_windows(day)?;
    let step = Duration::minutes(granularity.minutes());

    let mut slots = Vec::new();
    let mut cursor = window.start;
    while cursor < window.end {
        let end = (cursor + step).min(window.end);
        let span = Interval { start: cursor, end };
        slots.push(Slot { start: cursor, end, available: windows.is_free(&span) });
        cursor = end;
    }
    Ok(slots)
}

/// True when `interval` lies inside the tiled day and every slot it touches is free.
pub fn is_interval_open(slots: &[Slot], interval: &Interval) -> bool {
    let (Some(first), Some(last)) = (slots.first(), slots.last()) else {
        return false;
    };
    let day = Interval { start: first.start, end: last.end };
    day.contains(interval)
        && slots.iter()
            .filter(|s| s.interval().overlaps(interval))
            .all(|s| s.available)
}

/// Loads the day's bookings and rules for a resource and runs [`compute_slots`].
/// Nothing is cached between calls.
pub struct AvailabilityService {
    booking_repo: Arc<dyn BookingRepository>,
    block_repo: Arc<dyn RecurringBlockRepository>,
    override_repo: Arc<dyn AvailabilityOverrideRepository>,
    zone: Tz,
}

impl AvailabilityService {
    pub fn new(
        booking_repo: Arc<dyn BookingRepository>,
        block_repo: Arc<dyn RecurringBlockRepository>,
        override_repo: Arc<dyn AvailabilityOverrideRepository>,
        zone: Tz,
    ) -> Self {
        Self { booking_repo, block_repo, override_repo, zone }
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    pub async fn day_slots(&self, resource: &Resource, date: NaiveDate, granularity: Granularity) -> Result<Vec<Slot>, AppError> {
        let Some(window) = operating_window(resource, date, self.zone)? else {
            return Ok(Vec::new());
        };
        let weekday = day_of_week(date);

        let bookings = self.booking_repo.list_by_range(&resource.id, window.start, window.end).await?;
        let recurring_blocks = self.block_repo.list_for_day(&resource.id, weekday, date).await?;
        let overrides = self.override_repo.list_for_day(&resource.id, date, weekday).await?;

        compute_slots(&DaySchedule {
            resource,
            date,
            zone: self.zone,
            bookings: &bookings,
            recurring_blocks: &recurring_blocks,
            overrides: &overrides,
        }, granularity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::block::{NewOverrideParams, NewRecurringBlockParams};
    use crate::domain::models::booking::{ActivityType, BookingStatus, PaymentStatus};
    use crate::domain::models::resource::NewResourceParams;
    use crate::domain::services::timezone::parse_civil_date;

    const ISRAEL: Tz = chrono_tz::Asia::Jerusalem;

    fn studio(open: &str, close: &str) -> Resource {
        Resource::new(NewResourceParams {
            name: "Studio A".into(),
            description: None,
            address: None,
            capacity: 25,
            open_time: open.into(),
            close_time: close.into(),
            pricing: vec![],
        })
    }

    fn local(date: &str, time: &str) -> DateTime<Utc> {
        local_wall_clock_to_instant(parse_civil_date(date).unwrap(), time, ISRAEL).unwrap()
    }

    fn booking(resource: &Resource, date: &str, start: &str, end: &str, status: BookingStatus) -> Booking {
        let now = Utc::now();
        Booking {
            id: uuid::Uuid::new_v4().to_string(),
            resource_id: resource.id.clone(),
            user_id: "u1".into(),
            customer_name: None,
            customer_email: None,
            start_time: local(date, start),
            end_time: local(date, end),
            participants: 2,
            activity_type: ActivityType::Rehearsal,
            is_commercial: false,
            price_per_hour: 10_000,
            total_price: 10_000,
            status,
            payment_status: PaymentStatus::Paid,
            payment_transaction_id: None,
            paid_at: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn weekly_block(resource: &Resource, dow: i32, start: &str, end: &str) -> RecurringBlock {
        RecurringBlock::new(NewRecurringBlockParams {
            resource_id: resource.id.clone(),
            day_of_week: dow,
            start_time: start.into(),
            end_time: end.into(),
            end_date: None,
            reason: Some("Dance class".into()),
            created_by: "admin".into(),
        })
    }

    fn rule(resource: &Resource, date: Option<&str>, dow: Option<i32>, blocked: bool, start: &str, end: &str) -> AvailabilityOverride {
        AvailabilityOverride::new(NewOverrideParams {
            resource_id: resource.id.clone(),
            day_of_week: dow,
            date: date.map(|d| parse_civil_date(d).unwrap()),
            is_blocked: blocked,
            start_time: start.into(),
            end_time: end.into(),
            reason: None,
        })
    }

    fn slots_for(
        resource: &Resource,
        date: &str,
        bookings: &[Booking],
        blocks: &[RecurringBlock],
        overrides: &[AvailabilityOverride],
        granularity: Granularity,
    ) -> Vec<Slot> {
        compute_slots(&DaySchedule {
            resource,
            date: parse_civil_date(date).unwrap(),
            zone: ISRAEL,
            bookings,
            recurring_blocks: blocks,
            overrides,
        }, granularity).unwrap()
    }

    fn availability_at(slots: &[Slot], date: &str, time: &str) -> bool {
        let start = local(date, time);
        slots.iter().find(|s| s.start == start).expect("slot exists").available
    }

    #[test]
    fn empty_tuesday_yields_52_open_quarter_slots() {
        let r = studio("09:00", "22:00");
        let slots = slots_for(&r, "2026-01-27", &[], &[], &[], Granularity::Quarter);
        assert_eq!(slots.len(), 52);
        assert!(slots.iter().all(|s| s.available));
    }

    #[test]
    fn slots_tile_the_operating_window_for_every_granularity() {
        let r = studio("09:00", "22:00");
        for date in ["2026-01-27", "2026-03-27", "2026-10-25"] {
            for g in [Granularity::Quarter, Granularity::HalfHour, Granularity::Hour] {
                let slots = slots_for(&r, date, &[], &[], &[], g);
                assert_eq!(slots.first().unwrap().start, local(date, "09:00"));
                assert_eq!(slots.last().unwrap().end, local(date, "22:00"));
                for pair in slots.windows(2) {
                    assert_eq!(pair[0].end, pair[1].start, "contiguous");
                    assert!(!pair[0].interval().overlaps(&pair[1].interval()));
                }
            }
        }
    }

    #[test]
    fn uneven_window_clips_the_last_slot() {
        let r = studio("09:00", "10:45");
        let slots = slots_for(&r, "2026-01-27", &[], &[], &[], Granularity::Hour);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].end - slots[1].start, Duration::minutes(45));
    }

    #[test]
    fn zero_operating_hours_yield_no_slots() {
        let r = studio("09:00", "09:00");
        assert!(slots_for(&r, "2026-01-27", &[], &[], &[], Granularity::Hour).is_empty());
    }

    #[test]
    fn confirmed_booking_blocks_only_its_own_hour() {
        let r = studio("09:00", "22:00");
        let b = booking(&r, "2026-01-27", "10:00", "11:00", BookingStatus::Confirmed);
        let slots = slots_for(&r, "2026-01-27", &[b], &[], &[], Granularity::Hour);
        assert!(availability_at(&slots, "2026-01-27", "09:00"));
        assert!(!availability_at(&slots, "2026-01-27", "10:00"));
        assert!(availability_at(&slots, "2026-01-27", "11:00"));
    }

    #[test]
    fn cancelled_and_foreign_bookings_are_ignored() {
        let r = studio("09:00", "22:00");
        let other = studio("09:00", "22:00");
        let bookings = vec![
            booking(&r, "2026-01-27", "10:00", "11:00", BookingStatus::Cancelled),
            booking(&other, "2026-01-27", "12:00", "13:00", BookingStatus::Confirmed),
        ];
        let slots = slots_for(&r, "2026-01-27", &bookings, &[], &[], Granularity::Hour);
        assert!(slots.iter().all(|s| s.available));
    }

    #[test]
    fn recurring_block_applies_on_its_weekday_until_end_date() {
        let r = studio("09:00", "22:00");
        let mut block = weekly_block(&r, 2, "18:00", "20:00");
        let slots = slots_for(&r, "2026-01-27", &[], std::slice::from_ref(&block), &[], Granularity::Quarter);
        assert!(availability_at(&slots, "2026-01-27", "17:45"));
        assert!(!availability_at(&slots, "2026-01-27", "18:00"));
        assert!(!availability_at(&slots, "2026-01-27", "19:45"));
        assert!(availability_at(&slots, "2026-01-27", "20:00"));

        // Wednesday is untouched.
        let wed = slots_for(&r, "2026-01-28", &[], std::slice::from_ref(&block), &[], Granularity::Hour);
        assert!(wed.iter().all(|s| s.available));

        block.end_date = Some(parse_civil_date("2026-01-26").unwrap());
        let expired = slots_for(&r, "2026-01-27", &[], &[block], &[], Granularity::Hour);
        assert!(expired.iter().all(|s| s.available));
    }

    #[test]
    fn specific_date_rule_overrides_weekday_rule() {
        let r = studio("09:00", "22:00");
        let weekly = rule(&r, None, Some(2), true, "09:00", "22:00");
        let specific = rule(&r, Some("2026-01-27"), None, true, "12:00", "13:00");

        let only_weekly = slots_for(&r, "2026-01-27", &[], &[], std::slice::from_ref(&weekly), Granularity::Hour);
        assert!(only_weekly.iter().all(|s| !s.available));

        let both = slots_for(&r, "2026-01-27", &[], &[], &[weekly, specific], Granularity::Hour);
        assert!(availability_at(&both, "2026-01-27", "09:00"));
        assert!(!availability_at(&both, "2026-01-27", "12:00"));
        assert!(availability_at(&both, "2026-01-27", "21:00"));
    }

    #[test]
    fn another_resources_date_rule_leaves_weekday_rule_in_force() {
        let r = studio("09:00", "22:00");
        let other = studio("09:00", "22:00");
        let weekly = rule(&r, None, Some(2), true, "09:00", "22:00");
        let foreign = rule(&other, Some("2026-01-27"), None, true, "12:00", "13:00");

        let slots = slots_for(&r, "2026-01-27", &[], &[], &[weekly.clone(), foreign.clone()], Granularity::Hour);
        assert!(slots.iter().all(|s| !s.available));

        let date = parse_civil_date("2026-01-27").unwrap();
        let overrides = [weekly, foreign];
        let picked = applicable_overrides(&overrides, &r.id, date);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].id, overrides[0].id);
        assert_eq!(applicable_overrides(&overrides, &other.id, date)[0].id, overrides[1].id);
    }

    #[test]
    fn explicitly_open_date_rule_lifts_recurring_block_but_not_bookings() {
        let r = studio("09:00", "22:00");
        let block = weekly_block(&r, 2, "18:00", "22:00");
        let open = rule(&r, Some("2026-01-27"), None, false, "18:00", "20:00");
        let b = booking(&r, "2026-01-27", "19:00", "20:00", BookingStatus::Confirmed);

        let slots = slots_for(&r, "2026-01-27", &[b], &[block], &[open], Granularity::Hour);
        assert!(availability_at(&slots, "2026-01-27", "18:00"));
        assert!(!availability_at(&slots, "2026-01-27", "19:00"), "bookings always win");
        assert!(!availability_at(&slots, "2026-01-27", "20:00"), "outside the open rule");
    }

    #[test]
    fn inactive_rules_are_ignored() {
        let r = studio("09:00", "22:00");
        let mut block = weekly_block(&r, 2, "09:00", "22:00");
        block.is_active = false;
        let mut closed = rule(&r, Some("2026-01-27"), None, true, "09:00", "22:00");
        closed.is_active = false;
        let slots = slots_for(&r, "2026-01-27", &[], &[block], &[closed], Granularity::Hour);
        assert!(slots.iter().all(|s| s.available));
    }

    #[test]
    fn interval_openness_requires_every_touched_slot() {
        let r = studio("09:00", "22:00");
        let b = booking(&r, "2026-01-27", "12:00", "13:00", BookingStatus::Confirmed);
        let slots = slots_for(&r, "2026-01-27", &[b], &[], &[], Granularity::Quarter);

        let before = Interval::new(local("2026-01-27", "10:00"), local("2026-01-27", "12:00")).unwrap();
        let across = Interval::new(local("2026-01-27", "11:30"), local("2026-01-27", "12:15")).unwrap();
        let too_early = Interval::new(local("2026-01-27", "08:00"), local("2026-01-27", "09:30")).unwrap();
        let too_late = Interval::new(local("2026-01-27", "21:30"), local("2026-01-27", "22:30")).unwrap();

        assert!(is_interval_open(&slots, &before));
        assert!(!is_interval_open(&slots, &across));
        assert!(!is_interval_open(&slots, &too_early));
        assert!(!is_interval_open(&slots, &too_late));
        assert!(!is_interval_open(&[], &before));
    }

    #[test]
    fn slot_instants_track_the_daylight_saving_offset() {
        let r = studio("09:00", "22:00");
        let winter = slots_for(&r, "2026-01-27", &[], &[], &[], Granularity::Hour);
        let summer = slots_for(&r, "2026-03-27", &[], &[], &[], Granularity::Hour);
        assert_eq!(winter[1].start.to_rfc3339(), "2026-01-27T08:00:00+00:00");
        assert_eq!(summer[1].start.to_rfc3339(), "2026-03-27T07:00:00+00:00");
    }
}
