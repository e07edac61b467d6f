// Business clock
// Guest status and calendar boundaries are evaluated in the property's time zone

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::app_config::BusinessConfig;
use crate::models::reservation::GuestStatus;

/// Resolve a local wall-clock time to UTC; times inside a DST gap move forward
/// to the first instant that exists
pub fn local_to_utc(naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    if let Some(instant) = tz.from_local_datetime(&naive).earliest() {
        return instant.with_timezone(&Utc);
    }

    // Gaps are at most an hour in every zone we care about
    tz.from_local_datetime(&(naive + Duration::hours(1)))
        .earliest()
        .map(|instant| instant.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

fn cutoff_time(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Calendar day of `instant` in the business zone
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// The moment a stay ends: the check-out day at the cutoff hour, local time
pub fn checkout_cutoff(check_out: DateTime<Utc>, business: &BusinessConfig) -> DateTime<Utc> {
    let day = local_date(check_out, business.timezone);
    local_to_utc(
        day.and_time(cutoff_time(business.checkout_cutoff_hour)),
        business.timezone,
    )
}

/// Active while `now` is strictly before the check-out cutoff
pub fn compute_guest_status(
    check_out: DateTime<Utc>,
    now: DateTime<Utc>,
    business: &BusinessConfig,
) -> GuestStatus {
    if now < checkout_cutoff(check_out, business) {
        GuestStatus::Active
    } else {
        GuestStatus::Inactive
    }
}

/// Local midnight of `day` as a UTC instant
pub fn start_of_day(day: NaiveDate, tz: Tz) -> DateTime<Utc> {
    local_to_utc(day.and_time(NaiveTime::MIN), tz)
}

/// Half-open `[start, end)` range covering a calendar month in the business zone
pub fn month_range(year: i32, month: u32, tz: Tz) -> Result<(DateTime<Utc>, DateTime<Utc>), String> {
    if !(1..=12).contains(&month) {
        return Err(format!("Month must be between 1 and 12, got {}", month));
    }

    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| format!("Invalid year {}", year))?;
    let next = first
        .checked_add_months(Months::new(1))
        .ok_or_else(|| format!("Invalid year {}", year))?;

    Ok((start_of_day(first, tz), start_of_day(next, tz)))
}
