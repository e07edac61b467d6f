// Reservation Database Model
// A reservation links one primary guest and any number of additional guests
// through the reservation_guests table

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::guest::{Guest, GuestRef};
use crate::schema::{guests, reservation_guests, reservations};

/// Derived occupancy state of a reservation's party
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    diesel::expression::AsExpression,
    diesel::deserialize::FromSqlRow,
)]
#[diesel(sql_type = diesel::sql_types::Text)]
#[serde(rename_all = "lowercase")]
pub enum GuestStatus {
    Active,
    Inactive,
}

impl GuestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuestStatus::Active => "active",
            GuestStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for GuestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(GuestStatus::Active),
            "inactive" => Ok(GuestStatus::Inactive),
            _ => Err(format!("Invalid guest status: {}", s)),
        }
    }
}

text_column_enum!(GuestStatus);

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    ToSchema,
    diesel::expression::AsExpression,
    diesel::deserialize::FromSqlRow,
)]
#[diesel(sql_type = diesel::sql_types::Text)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    PartiallyPaid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::PartiallyPaid => "PartiallyPaid",
            PaymentStatus::Refunded => "Refunded",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(PaymentStatus::Pending),
            "Paid" => Ok(PaymentStatus::Paid),
            "PartiallyPaid" => Ok(PaymentStatus::PartiallyPaid),
            "Refunded" => Ok(PaymentStatus::Refunded),
            _ => Err(format!("Invalid payment status: {}", s)),
        }
    }
}

text_column_enum!(PaymentStatus);

/// Reservation database model
#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema,
)]
#[diesel(table_name = reservations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Reservation {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub primary_guest_id: Uuid,
    /// Name of the primary guest when the reservation was made
    pub primary_guest_name: String,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub room_numbers: Vec<String>,
    pub payment_method: Option<String>,
    pub total_amount: f64,
    pub payment_status: PaymentStatus,
    pub guest_status: GuestStatus,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reservations)]
pub struct NewReservation {
    pub tenant_id: Uuid,
    pub primary_guest_id: Uuid,
    pub primary_guest_name: String,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub room_numbers: Vec<String>,
    pub payment_method: Option<String>,
    pub total_amount: f64,
    pub payment_status: PaymentStatus,
    pub guest_status: GuestStatus,
}

/// Row of the reservation_guests link table
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize)]
#[diesel(table_name = reservation_guests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReservationGuest {
    pub reservation_id: Uuid,
    pub guest_id: Uuid,
    pub tenant_id: Uuid,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reservation_guests)]
pub struct NewReservationGuest {
    pub reservation_id: Uuid,
    pub guest_id: Uuid,
    pub tenant_id: Uuid,
}

/// Errors for reservation operations
#[derive(thiserror::Error, Debug)]
pub enum ReservationError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Reservation not found")]
    NotFound,
}

impl Reservation {
    pub async fn find_for_tenant(
        conn: &mut AsyncPgConnection,
        tenant: Uuid,
        reservation_id: Uuid,
    ) -> Result<Self, ReservationError> {
        reservations::table
            .filter(reservations::id.eq(reservation_id))
            .filter(reservations::tenant_id.eq(tenant))
            .first::<Reservation>(conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => ReservationError::NotFound,
                _ => ReservationError::Database(e),
            })
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_reservation: &NewReservation,
    ) -> Result<Self, ReservationError> {
        diesel::insert_into(reservations::table)
            .values(new_reservation)
            .get_result::<Reservation>(conn)
            .await
            .map_err(ReservationError::Database)
    }

    /// Insert a link row; linking the same guest twice is a no-op
    pub async fn link_guest(
        conn: &mut AsyncPgConnection,
        link: &NewReservationGuest,
    ) -> Result<bool, ReservationError> {
        let inserted = diesel::insert_into(reservation_guests::table)
            .values(link)
            .on_conflict_do_nothing()
            .execute(conn)
            .await?;
        Ok(inserted > 0)
    }

    /// Guests linked to each of the given reservations
    pub async fn linked_guests(
        conn: &mut AsyncPgConnection,
        tenant: Uuid,
        reservation_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, Guest)>, ReservationError> {
        if reservation_ids.is_empty() {
            return Ok(Vec::new());
        }

        reservation_guests::table
            .inner_join(guests::table)
            .filter(reservation_guests::tenant_id.eq(tenant))
            .filter(reservation_guests::reservation_id.eq_any(reservation_ids))
            .order((reservation_guests::reservation_id, guests::created_date.asc()))
            .select((reservation_guests::reservation_id, Guest::as_select()))
            .load::<(Uuid, Guest)>(conn)
            .await
            .map_err(ReservationError::Database)
    }

    /// Reservations linked to any of the given guests, keyed by guest id
    pub async fn linked_to_guests(
        conn: &mut AsyncPgConnection,
        tenant: Uuid,
        guest_ids: &[Uuid],
        check_out_after: Option<DateTime<Utc>>,
    ) -> Result<Vec<(Uuid, Reservation)>, ReservationError> {
        if guest_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = reservation_guests::table
            .inner_join(reservations::table)
            .filter(reservation_guests::tenant_id.eq(tenant))
            .filter(reservation_guests::guest_id.eq_any(guest_ids))
            .into_boxed();

        if let Some(after) = check_out_after {
            query = query.filter(reservations::check_out.gt(after));
        }

        query
            .order(reservations::check_in.asc())
            .select((reservation_guests::guest_id, Reservation::as_select()))
            .load::<(Uuid, Reservation)>(conn)
            .await
            .map_err(ReservationError::Database)
    }

    /// Every (guest, reservation) pair whose reservation is still active
    pub async fn active_guest_rows(
        conn: &mut AsyncPgConnection,
        tenant: Uuid,
    ) -> Result<Vec<(Guest, Reservation)>, ReservationError> {
        reservation_guests::table
            .inner_join(guests::table)
            .inner_join(reservations::table)
            .filter(reservation_guests::tenant_id.eq(tenant))
            .filter(reservations::guest_status.eq(GuestStatus::Active))
            .select((Guest::as_select(), Reservation::as_select()))
            .load::<(Guest, Reservation)>(conn)
            .await
            .map_err(ReservationError::Database)
    }

    /// Reservations whose check-in falls in `[start, end)`
    pub async fn checking_in_between(
        conn: &mut AsyncPgConnection,
        tenant: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Reservation>, ReservationError> {
        reservations::table
            .filter(reservations::tenant_id.eq(tenant))
            .filter(reservations::check_in.ge(start))
            .filter(reservations::check_in.lt(end))
            .order(reservations::check_in.asc())
            .load::<Reservation>(conn)
            .await
            .map_err(ReservationError::Database)
    }

    /// Number of linked guests per reservation
    pub async fn guest_counts(
        conn: &mut AsyncPgConnection,
        tenant: Uuid,
        reservation_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, i64)>, ReservationError> {
        if reservation_ids.is_empty() {
            return Ok(Vec::new());
        }

        reservation_guests::table
            .filter(reservation_guests::tenant_id.eq(tenant))
            .filter(reservation_guests::reservation_id.eq_any(reservation_ids))
            .group_by(reservation_guests::reservation_id)
            .select((
                reservation_guests::reservation_id,
                diesel::dsl::count(reservation_guests::guest_id),
            ))
            .load::<(Uuid, i64)>(conn)
            .await
            .map_err(ReservationError::Database)
    }
}

// =============================================================================
// REQUEST/RESPONSE DTOs
// =============================================================================

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "primary_guest_id": "123e4567-e89b-12d3-a456-426614174000",
    "room_numbers": ["101"],
    "check_in": "2024-01-29T20:00:00Z",
    "check_out": "2024-02-05T16:00:00Z",
    "payment_method": "card",
    "total_amount": 840.0,
    "additional_guests": [{"identification_number": "P-42", "first_name": "Grace", "last_name": "Hopper"}]
}))]
pub struct CreateReservationRequest {
    pub primary_guest_id: Uuid,

    #[validate(length(min = 1, max = 50, message = "At least one room number is required"))]
    pub room_numbers: Vec<String>,

    pub check_in: DateTime<Utc>,

    pub check_out: DateTime<Utc>,

    #[validate(length(max = 50, message = "Payment method must be less than 50 characters"))]
    pub payment_method: Option<String>,

    #[validate(range(min = 0.0, message = "Total amount cannot be negative"))]
    #[serde(default)]
    pub total_amount: f64,

    pub payment_status: Option<PaymentStatus>,

    #[serde(default)]
    pub additional_guests: Vec<GuestRef>,
}

impl CreateReservationRequest {
    pub fn validate_custom(&self) -> Result<(), String> {
        if self.check_out <= self.check_in {
            return Err("Check-out must be after check-in".to_string());
        }
        if self.room_numbers.iter().any(|n| n.trim().is_empty()) {
            return Err("Room numbers cannot be blank".to_string());
        }
        Ok(())
    }

    /// Trimmed room numbers, duplicates removed, order kept
    pub fn normalized_room_numbers(&self) -> Vec<String> {
        let mut numbers: Vec<String> = Vec::with_capacity(self.room_numbers.len());
        for number in &self.room_numbers {
            let number = number.trim().to_string();
            if !numbers.contains(&number) {
                numbers.push(number);
            }
        }
        numbers
    }
}

/// Reservation with its guests resolved
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReservationDetail {
    #[serde(flatten)]
    pub reservation: Reservation,
    /// `None` once the primary guest has been deleted; the name snapshot remains
    pub primary_guest: Option<Guest>,
    pub additional_guests: Vec<Guest>,
}

/// Calendar entry: reservation plus its non-primary guests
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReservationWithGuests {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub additional_guests: Vec<Guest>,
}

/// Guest with the reservations it is linked to
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GuestWithReservations {
    #[serde(flatten)]
    pub guest: Guest,
    pub reservations: Vec<Reservation>,
}

/// A guest currently staying, with the reservation that places them here
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CurrentGuest {
    pub guest: Guest,
    pub reservation: Reservation,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CalendarQuery {
    pub month: u32,
    pub year: i32,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AnalyticsQuery {
    /// Any day in the reference week (defaults to today)
    pub date: Option<NaiveDate>,
    #[serde(alias = "sort_by")]
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

/// Sort keys accepted by `GET /reservations` and the analytics listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReservationSortKey {
    #[default]
    CreatedDate,
    CheckIn,
    CheckOut,
    TotalAmount,
}

impl FromStr for ReservationSortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_date" => Ok(ReservationSortKey::CreatedDate),
            "check_in" => Ok(ReservationSortKey::CheckIn),
            "check_out" => Ok(ReservationSortKey::CheckOut),
            "total_amount" => Ok(ReservationSortKey::TotalAmount),
            _ => Err(format!("Invalid sort key for reservations: {}", s)),
        }
    }
}

/// Sort keys accepted by `GET /guests/current`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurrentGuestSortKey {
    #[default]
    CreatedDate,
    CheckIn,
    CheckOut,
    FirstName,
    LastName,
}

impl FromStr for CurrentGuestSortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_date" => Ok(CurrentGuestSortKey::CreatedDate),
            "check_in" => Ok(CurrentGuestSortKey::CheckIn),
            "check_out" => Ok(CurrentGuestSortKey::CheckOut),
            "first_name" => Ok(CurrentGuestSortKey::FirstName),
            "last_name" => Ok(CurrentGuestSortKey::LastName),
            _ => Err(format!("Invalid sort key for current guests: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> CreateReservationRequest {
        CreateReservationRequest {
            primary_guest_id: Uuid::new_v4(),
            room_numbers: vec![" 101".to_string(), "102".to_string(), "101 ".to_string()],
            check_in,
            check_out,
            payment_method: None,
            total_amount: 120.0,
            payment_status: None,
            additional_guests: vec![],
        }
    }

    #[test]
    fn test_check_out_must_follow_check_in() {
        let day = Utc.with_ymd_and_hms(2024, 1, 29, 12, 0, 0).unwrap();
        assert!(request(day, day).validate_custom().is_err());
        assert!(request(day, day + chrono::Duration::days(1))
            .validate_custom()
            .is_ok());
    }

    #[test]
    fn test_room_numbers_deduplicated() {
        let day = Utc.with_ymd_and_hms(2024, 1, 29, 12, 0, 0).unwrap();
        let req = request(day, day + chrono::Duration::days(2));
        assert_eq!(req.normalized_room_numbers(), vec!["101", "102"]);
    }

    #[test]
    fn test_negative_amount_rejected() {
        let day = Utc.with_ymd_and_hms(2024, 1, 29, 12, 0, 0).unwrap();
        let mut req = request(day, day + chrono::Duration::days(2));
        req.total_amount = -1.0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_guest_status_wire_format() {
        assert_eq!(serde_json::to_value(GuestStatus::Active).unwrap(), "active");
        assert_eq!(GuestStatus::from_str("inactive"), Ok(GuestStatus::Inactive));
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
    }

    #[test]
    fn test_detail_flattens_reservation() {
        let now = Utc::now();
        let reservation = Reservation {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            primary_guest_id: Uuid::new_v4(),
            primary_guest_name: "Ada Lovelace".to_string(),
            check_in: now,
            check_out: now + chrono::Duration::days(1),
            room_numbers: vec!["101".to_string()],
            payment_method: None,
            total_amount: 10.0,
            payment_status: PaymentStatus::Paid,
            guest_status: GuestStatus::Active,
            created_date: now,
            updated_date: now,
        };
        let detail = ReservationDetail {
            reservation,
            primary_guest: None,
            additional_guests: vec![],
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["primary_guest_name"], "Ada Lovelace");
        assert_eq!(json["guest_status"], "active");
        assert_eq!(json["payment_status"], "Paid");
        assert!(json["primary_guest"].is_null());
        assert_eq!(json["additional_guests"].as_array().unwrap().len(), 0);
    }
}
