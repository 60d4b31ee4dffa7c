//! Anchoring simulation time to the calendar.
//!
//! Simulation time is a signed number of days since the J2000.0 epoch,
//! 2000-01-01T12:00:00 UTC (Julian date 2 451 545.0). Leap seconds are
//! ignored; one day is always 86 400 seconds.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::{MechanicsError, Result};

/// Unix timestamp of the J2000.0 epoch.
pub const J2000_UNIX_SECONDS: i64 = 946_728_000;

/// Julian date of the J2000.0 epoch.
pub const J2000_JULIAN_DATE: f64 = 2_451_545.0;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// The instant simulation time `0.0` refers to.
pub fn reference_epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(J2000_UNIX_SECONDS, 0).unwrap_or_default()
}

/// Calendar instant for simulation time `t` (days since J2000.0).
///
/// # Errors
///
/// Returns [`MechanicsError::InvalidParameter`] if `t` is not finite or lies
/// outside the range `chrono` can represent.
pub fn simulation_time_to_calendar_date(t: f64) -> Result<DateTime<Utc>> {
    let out_of_range = || {
        MechanicsError::invalid(
            "simulation_time",
            format!("{t} days is not a representable calendar date"),
        )
    };
    if !t.is_finite() {
        return Err(out_of_range());
    }
    let offset_seconds = t * SECONDS_PER_DAY;
    if offset_seconds.abs() >= i64::MAX as f64 / 2.0 {
        return Err(out_of_range());
    }
    let whole = offset_seconds.floor();
    let nanos = ((offset_seconds - whole) * 1e9).round();
    let (whole, nanos) = if nanos >= 1e9 {
        (whole + 1.0, 0.0)
    } else {
        (whole, nanos)
    };
    let secs = J2000_UNIX_SECONDS
        .checked_add(whole as i64)
        .ok_or_else(out_of_range)?;
    DateTime::from_timestamp(secs, nanos as u32).ok_or_else(out_of_range)
}

/// Simulation time in days for a calendar instant. Infallible for any
/// `DateTime<Utc>`.
pub fn calendar_date_to_simulation_time(date: DateTime<Utc>) -> f64 {
    let seconds = (date.timestamp() - J2000_UNIX_SECONDS) as f64;
    let fraction = f64::from(date.timestamp_subsec_nanos()) * 1e-9;
    (seconds + fraction) / SECONDS_PER_DAY
}

/// Midnight UTC at the start of a calendar day.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Julian date of simulation time `t`.
pub fn julian_date(t: f64) -> f64 {
    J2000_JULIAN_DATE + t
}
