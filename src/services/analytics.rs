// Weekly reservation analytics
// Reservations are bucketed into every Sunday-based week their stay touches

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::app_config::BusinessConfig;
use crate::models::pagination::SortDirection;
use crate::models::reservation::{Reservation, ReservationSortKey};
use crate::services::guest_status::{checkout_cutoff, local_date, start_of_day};

/// Reservation tagged with its number of linked guests
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnalyticsReservation {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub guest_count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeekBucket {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub total_reservations: usize,
    pub total_guests: i64,
    pub total_amount: f64,
    pub reservations: Vec<AnalyticsReservation>,
}

impl WeekBucket {
    fn new(week_start: NaiveDate) -> Self {
        Self {
            week_start,
            week_end: week_start + Duration::days(6),
            total_reservations: 0,
            total_guests: 0,
            total_amount: 0.0,
            reservations: Vec::new(),
        }
    }

    fn push(&mut self, entry: AnalyticsReservation) {
        self.total_reservations += 1;
        self.total_guests += entry.guest_count;
        self.total_amount += entry.reservation.total_amount;
        self.reservations.push(entry);
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReservationAnalytics {
    pub reference_week_start: NaiveDate,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub weeks: Vec<WeekBucket>,
    pub reservations: Vec<AnalyticsReservation>,
}

/// Sunday on or before `day`
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_sunday() as i64)
}

/// Local dates bounding the window: a month either side of the reference week's Sunday
fn window_dates(reference: NaiveDate) -> (NaiveDate, NaiveDate) {
    let week = week_start(reference);
    let start = week.checked_sub_months(Months::new(1)).unwrap_or(week);
    let end = week.checked_add_months(Months::new(1)).unwrap_or(week);
    (start, end)
}

/// One month either side of the start of the reference week, as UTC instants
pub fn analysis_window(reference: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let (start, end) = window_dates(reference);
    (start_of_day(start, tz), start_of_day(end, tz))
}

fn stay_weeks(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    business: &BusinessConfig,
) -> (NaiveDate, NaiveDate) {
    let first = week_start(local_date(check_in, business.timezone));
    let last = week_start(local_date(
        checkout_cutoff(check_out, business),
        business.timezone,
    ));
    (first, last.max(first))
}

fn weeks_between(first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    let mut weeks = Vec::new();
    let mut current = first;
    while current <= last {
        weeks.push(current);
        current += Duration::days(7);
    }
    weeks
}

/// Week starts from check-in's day through the check-out cutoff
pub fn weeks_spanned(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    business: &BusinessConfig,
) -> Vec<NaiveDate> {
    let (first, last) = stay_weeks(check_in, check_out, business);
    weeks_between(first, last)
}

/// Weeks of the stay that overlap `[from, until)`
pub fn weeks_within(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
    business: &BusinessConfig,
    from: NaiveDate,
    until: NaiveDate,
) -> Vec<NaiveDate> {
    let (first, last) = stay_weeks(check_in, check_out, business);
    let first = first.max(week_start(from));
    let last = last.min(until - Duration::days(1));
    weeks_between(first, last)
}

pub fn compare_reservations(a: &Reservation, b: &Reservation, key: ReservationSortKey) -> Ordering {
    match key {
        ReservationSortKey::CreatedDate => a.created_date.cmp(&b.created_date),
        ReservationSortKey::CheckIn => a.check_in.cmp(&b.check_in),
        ReservationSortKey::CheckOut => a.check_out.cmp(&b.check_out),
        ReservationSortKey::TotalAmount => a.total_amount.total_cmp(&b.total_amount),
    }
}

/// Sort the raw list, then fan each reservation out into its weeks
pub fn build_analytics(
    reference: NaiveDate,
    reservations: Vec<(Reservation, i64)>,
    sort: (ReservationSortKey, SortDirection),
    business: &BusinessConfig,
) -> ReservationAnalytics {
    let (window_start, window_end) = analysis_window(reference, business.timezone);
    let (from, until) = window_dates(reference);
    let (key, direction) = sort;

    let mut entries: Vec<AnalyticsReservation> = reservations
        .into_iter()
        .map(|(reservation, guest_count)| AnalyticsReservation {
            reservation,
            guest_count,
        })
        .collect();

    entries.sort_by(|a, b| {
        let ordering = compare_reservations(&a.reservation, &b.reservation, key);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    let mut buckets: BTreeMap<NaiveDate, WeekBucket> = BTreeMap::new();
    for entry in &entries {
        let reservation = &entry.reservation;
        let weeks = weeks_within(
            reservation.check_in,
            reservation.check_out,
            business,
            from,
            until,
        );
        for week in weeks {
            buckets
                .entry(week)
                .or_insert_with(|| WeekBucket::new(week))
                .push(entry.clone());
        }
    }

    ReservationAnalytics {
        reference_week_start: week_start(reference),
        window_start,
        window_end,
        weeks: buckets.into_values().collect(),
        reservations: entries,
    }
}
