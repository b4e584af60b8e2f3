//! Civil (wall-clock) date/time to absolute instant conversion.
//!
//! Offsets are resolved for the civil date being converted, never for "now",
//! so results are deterministic across daylight-saving transitions.

use chrono::{DateTime, Datelike, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use crate::error::AppError;

/// Accepts `YYYY-MM-DD`, or an ISO timestamp whose date part is used.
pub fn parse_civil_date(input: &str) -> Result<NaiveDate, AppError> {
    let date_part = input.split('T').next().unwrap_or(input).trim();
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidInput(format!("Invalid date '{}', expected YYYY-MM-DD", input)))
}

/// Parses a strict `HH:mm` wall-clock time.
pub fn parse_wall_clock(input: &str) -> Result<NaiveTime, AppError> {
    let valid_shape = input.len() == 5 && input.as_bytes()[2] == b':';
    if !valid_shape {
        return Err(AppError::InvalidInput(format!("Invalid time '{}', expected HH:mm", input)));
    }
    NaiveTime::parse_from_str(input, "%H:%M")
        .map_err(|_| AppError::InvalidInput(format!("Invalid time '{}', expected HH:mm", input)))
}

pub fn civil_date_time_to_instant(zone: Tz, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Utc>, AppError> {
    resolve(zone, date.and_time(time))
}

pub fn local_wall_clock_to_instant(date: NaiveDate, time: &str, zone: Tz) -> Result<DateTime<Utc>, AppError> {
    civil_date_time_to_instant(zone, date, parse_wall_clock(time)?)
}

pub fn start_of_civil_day(date: NaiveDate, zone: Tz) -> Result<DateTime<Utc>, AppError> {
    civil_date_time_to_instant(zone, date, NaiveTime::MIN)
}

/// Exclusive end of the civil day, i.e. the start of the next one.
pub fn end_of_civil_day(date: NaiveDate, zone: Tz) -> Result<DateTime<Utc>, AppError> {
    let next = date
        .succ_opt()
        .ok_or_else(|| AppError::InvalidInput(format!("Date {} is out of range", date)))?;
    start_of_civil_day(next, zone)
}

/// 0 = Sunday .. 6 = Saturday
pub fn day_of_week(date: NaiveDate) -> i32 {
    date.weekday().num_days_from_sunday() as i32
}

pub fn to_civil(instant: DateTime<Utc>, zone: Tz) -> NaiveDateTime {
    instant.with_timezone(&zone).naive_local()
}

fn resolve(zone: Tz, local: NaiveDateTime) -> Result<DateTime<Utc>, AppError> {
    match zone.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        // Repeated hour when clocks fall back: the first occurrence wins.
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(AppError::InvalidInput(format!(
            "Local time {} does not exist in {} (skipped by a daylight-saving change)",
            local, zone
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const ISRAEL: Tz = chrono_tz::Asia::Jerusalem;

    fn date(s: &str) -> NaiveDate {
        parse_civil_date(s).unwrap()
    }

    #[test]
    fn offset_follows_the_civil_date_not_the_clock() {
        let winter = local_wall_clock_to_instant(date("2026-01-27"), "10:00", ISRAEL).unwrap();
        let summer = local_wall_clock_to_instant(date("2026-03-27"), "10:00", ISRAEL).unwrap();

        assert_eq!(winter.hour(), 8, "UTC+2 in January");
        assert_eq!(summer.hour(), 7, "UTC+3 after the spring-forward");
        assert_eq!(winter.to_rfc3339(), "2026-01-27T08:00:00+00:00");
        assert_eq!(summer.to_rfc3339(), "2026-03-27T07:00:00+00:00");
    }

    #[test]
    fn conversion_is_repeatable() {
        let a = local_wall_clock_to_instant(date("2026-10-25"), "21:45", ISRAEL).unwrap();
        let b = local_wall_clock_to_instant(date("2026-10-25"), "21:45", ISRAEL).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn skipped_local_time_is_rejected() {
        // Clocks jump from 02:00 to 03:00 on 2026-03-27 in Israel.
        let err = local_wall_clock_to_instant(date("2026-03-27"), "02:30", ISRAEL).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn repeated_local_time_resolves_to_first_occurrence() {
        // Clocks fall back from 02:00 to 01:00 on 2026-10-25 in Israel.
        let instant = local_wall_clock_to_instant(date("2026-10-25"), "01:30", ISRAEL).unwrap();
        assert_eq!(instant.to_rfc3339(), "2026-10-24T22:30:00+00:00");
    }

    #[test]
    fn civil_day_bounds_are_half_open() {
        let d = date("2026-01-27");
        let start = start_of_civil_day(d, ISRAEL).unwrap();
        let end = end_of_civil_day(d, ISRAEL).unwrap();
        assert_eq!(start.to_rfc3339(), "2026-01-26T22:00:00+00:00");
        assert_eq!((end - start).num_hours(), 24);

        // The spring-forward day is only 23 hours long.
        let dst = date("2026-03-27");
        let len = end_of_civil_day(dst, ISRAEL).unwrap() - start_of_civil_day(dst, ISRAEL).unwrap();
        assert_eq!(len.num_hours(), 23);
    }

    #[test]
    fn malformed_inputs_are_invalid() {
        assert!(parse_civil_date("2026-02-30").is_err());
        assert!(parse_civil_date("27/01/2026").is_err());
        assert!(parse_wall_clock("9:00").is_err());
        assert!(parse_wall_clock("24:00").is_err());
        assert!(parse_wall_clock("10:60").is_err());
        assert_eq!(parse_civil_date("2026-01-27T00:00:00.000Z").unwrap(), date("2026-01-27"));
    }

    #[test]
    fn weekdays_start_on_sunday() {
        assert_eq!(day_of_week(date("2026-01-25")), 0);
        assert_eq!(day_of_week(date("2026-01-27")), 2);
        assert_eq!(day_of_week(date("2026-01-31")), 6);
    }
}
