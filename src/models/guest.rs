// Guest Database Model
// Guests are tenant scoped; identity for upserts is (tenant_id, email)

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::schema::{guests, reservation_guests};
use crate::utils::validation::{normalize_email, normalize_optional};

/// Map a typed record onto a JSONB column, unknown keys preserved in `extra`
macro_rules! jsonb_record {
    ($ty:ty) => {
        impl diesel::deserialize::FromSql<diesel::sql_types::Jsonb, diesel::pg::Pg> for $ty {
            fn from_sql(bytes: diesel::pg::PgValue<'_>) -> diesel::deserialize::Result<Self> {
                let value = <serde_json::Value as diesel::deserialize::FromSql<
                    diesel::sql_types::Jsonb,
                    diesel::pg::Pg,
                >>::from_sql(bytes)?;
                Ok(serde_json::from_value(value)?)
            }
        }

        impl diesel::serialize::ToSql<diesel::sql_types::Jsonb, diesel::pg::Pg> for $ty {
            fn to_sql<'b>(
                &'b self,
                out: &mut diesel::serialize::Output<'b, '_, diesel::pg::Pg>,
            ) -> diesel::serialize::Result {
                let value = serde_json::to_value(self)?;
                <serde_json::Value as diesel::serialize::ToSql<
                    diesel::sql_types::Jsonb,
                    diesel::pg::Pg,
                >>::to_sql(&value, &mut out.reborrow())
            }
        }
    };
}

/// Postal address stored in `guests.address`
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    diesel::expression::AsExpression,
    diesel::deserialize::FromSqlRow,
)]
#[diesel(sql_type = diesel::sql_types::Jsonb)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Emergency contact stored in `guests.emergency_contact`
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    diesel::expression::AsExpression,
    diesel::deserialize::FromSqlRow,
)]
#[diesel(sql_type = diesel::sql_types::Jsonb)]
pub struct EmergencyContact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Vehicle stored in `guests.vehicle`
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    diesel::expression::AsExpression,
    diesel::deserialize::FromSqlRow,
)]
#[diesel(sql_type = diesel::sql_types::Jsonb)]
pub struct Vehicle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

jsonb_record!(Address);
jsonb_record!(EmergencyContact);
jsonb_record!(Vehicle);

/// Guest database model
#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema,
)]
#[diesel(table_name = guests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Guest {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub nationality: Option<String>,
    pub identification_number: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub address: Option<Address>,
    #[schema(value_type = Option<Object>)]
    pub emergency_contact: Option<EmergencyContact>,
    #[schema(value_type = Option<Object>)]
    pub vehicle: Option<Vehicle>,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

impl Guest {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// New guest for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = guests)]
pub struct NewGuest {
    pub tenant_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub nationality: Option<String>,
    pub identification_number: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<Address>,
    pub emergency_contact: Option<EmergencyContact>,
    pub vehicle: Option<Vehicle>,
}

/// Full replacement of a guest's mutable fields; `None` clears the column
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = guests)]
#[diesel(treat_none_as_null = true)]
pub struct GuestChanges {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub nationality: Option<String>,
    pub identification_number: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<Address>,
    pub emergency_contact: Option<EmergencyContact>,
    pub vehicle: Option<Vehicle>,
    pub updated_date: DateTime<Utc>,
}

impl From<&NewGuest> for GuestChanges {
    fn from(guest: &NewGuest) -> Self {
        Self {
            first_name: guest.first_name.clone(),
            last_name: guest.last_name.clone(),
            date_of_birth: guest.date_of_birth,
            nationality: guest.nationality.clone(),
            identification_number: guest.identification_number.clone(),
            phone_number: guest.phone_number.clone(),
            address: guest.address.clone(),
            emergency_contact: guest.emergency_contact.clone(),
            vehicle: guest.vehicle.clone(),
            updated_date: Utc::now(),
        }
    }
}

/// Errors for guest operations
#[derive(thiserror::Error, Debug)]
pub enum GuestError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Guest not found")]
    NotFound,

    #[error("Guest reference could not be resolved: {0}")]
    Unresolvable(String),
}

fn not_found_or(e: diesel::result::Error) -> GuestError {
    match e {
        diesel::result::Error::NotFound => GuestError::NotFound,
        _ => GuestError::Database(e),
    }
}

impl Guest {
    /// Find a guest owned by the tenant
    pub async fn find_for_tenant(
        conn: &mut AsyncPgConnection,
        tenant: Uuid,
        guest_id: Uuid,
    ) -> Result<Self, GuestError> {
        guests::table
            .filter(guests::id.eq(guest_id))
            .filter(guests::tenant_id.eq(tenant))
            .first::<Guest>(conn)
            .await
            .map_err(not_found_or)
    }

    /// Oldest guest with this email in the tenant, if any
    pub async fn find_by_email(
        conn: &mut AsyncPgConnection,
        tenant: Uuid,
        email: &str,
    ) -> Result<Option<Self>, GuestError> {
        guests::table
            .filter(guests::tenant_id.eq(tenant))
            .filter(guests::email.eq(email))
            .order(guests::created_date.asc())
            .first::<Guest>(conn)
            .await
            .optional()
            .map_err(GuestError::Database)
    }

    pub async fn find_by_identification(
        conn: &mut AsyncPgConnection,
        tenant: Uuid,
        identification_number: &str,
    ) -> Result<Option<Self>, GuestError> {
        guests::table
            .filter(guests::tenant_id.eq(tenant))
            .filter(guests::identification_number.eq(identification_number))
            .order(guests::created_date.asc())
            .first::<Guest>(conn)
            .await
            .optional()
            .map_err(GuestError::Database)
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_guest: &NewGuest,
    ) -> Result<Self, GuestError> {
        diesel::insert_into(guests::table)
            .values(new_guest)
            .get_result::<Guest>(conn)
            .await
            .map_err(GuestError::Database)
    }

    pub async fn replace(
        conn: &mut AsyncPgConnection,
        guest_id: Uuid,
        changes: &GuestChanges,
    ) -> Result<Self, GuestError> {
        diesel::update(guests::table.filter(guests::id.eq(guest_id)))
            .set(changes)
            .get_result::<Guest>(conn)
            .await
            .map_err(not_found_or)
    }

    /// Remove every reservation link of a guest, returning the number removed
    pub async fn delete_links(
        conn: &mut AsyncPgConnection,
        tenant: Uuid,
        guest_id: Uuid,
    ) -> Result<usize, GuestError> {
        diesel::delete(
            reservation_guests::table
                .filter(reservation_guests::guest_id.eq(guest_id))
                .filter(reservation_guests::tenant_id.eq(tenant)),
        )
        .execute(conn)
        .await
        .map_err(GuestError::Database)
    }

    pub async fn delete(
        conn: &mut AsyncPgConnection,
        tenant: Uuid,
        guest_id: Uuid,
    ) -> Result<(), GuestError> {
        let deleted = diesel::delete(
            guests::table
                .filter(guests::id.eq(guest_id))
                .filter(guests::tenant_id.eq(tenant)),
        )
        .execute(conn)
        .await?;

        if deleted == 0 {
            return Err(GuestError::NotFound);
        }
        Ok(())
    }
}

// =============================================================================
// REQUEST DTOs
// =============================================================================

/// Request to create (or upsert by email) a guest
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "first_name": "Ada",
    "last_name": "Lovelace",
    "email": "ada@example.com",
    "phone_number": "+1 555 0100",
    "identification_number": "P1234567",
    "address": {"street": "1 Main St", "city": "Springfield", "country": "US"}
}))]
pub struct CreateGuestRequest {
    /// Only honoured for SuperAdmin callers
    pub tenant_id: Option<Uuid>,

    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(max = 50, message = "Phone number must be less than 50 characters"))]
    pub phone_number: Option<String>,

    pub date_of_birth: Option<NaiveDate>,

    #[validate(length(max = 100, message = "Nationality must be less than 100 characters"))]
    pub nationality: Option<String>,

    #[validate(length(
        max = 100,
        message = "Identification number must be less than 100 characters"
    ))]
    pub identification_number: Option<String>,

    #[schema(value_type = Option<Object>)]
    pub address: Option<Address>,

    #[schema(value_type = Option<Object>)]
    pub emergency_contact: Option<EmergencyContact>,

    #[schema(value_type = Option<Object>)]
    pub vehicle: Option<Vehicle>,
}

impl CreateGuestRequest {
    /// Normalize the email so validation sees the value that gets stored
    pub fn normalized(mut self) -> Self {
        self.email = self.email.as_deref().map(normalize_email);
        self
    }

    /// Build the row for `tenant`, trimming text and normalizing the email
    pub fn into_new_guest(self, tenant: Uuid) -> NewGuest {
        NewGuest {
            tenant_id: tenant,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            date_of_birth: self.date_of_birth,
            nationality: normalize_optional(self.nationality),
            identification_number: normalize_optional(self.identification_number),
            email: self.email.as_deref().map(normalize_email),
            phone_number: normalize_optional(self.phone_number),
            address: self.address,
            emergency_contact: self.emergency_contact,
            vehicle: self.vehicle,
        }
    }
}

/// Query for `GET /guests/search`
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchGuestsQuery {
    /// Substring matched against first name, last name and email
    #[serde(alias = "searchQuery", alias = "q")]
    pub search_query: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Sort keys accepted by `GET /guests`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuestSortKey {
    #[default]
    CreatedDate,
    FirstName,
    LastName,
    Email,
}

impl FromStr for GuestSortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_date" => Ok(GuestSortKey::CreatedDate),
            "first_name" => Ok(GuestSortKey::FirstName),
            "last_name" => Ok(GuestSortKey::LastName),
            "email" => Ok(GuestSortKey::Email),
            _ => Err(format!("Invalid sort key for guests: {}", s)),
        }
    }
}

// =============================================================================
// ADDITIONAL GUEST RESOLUTION
// =============================================================================

/// Reference to an additional guest on a reservation
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct GuestRef {
    pub guest_id: Option<Uuid>,
    pub identification_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub nationality: Option<String>,
}

/// One attempt in the find-or-create chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionStep {
    ById(Uuid),
    ByIdentification(String),
    Create,
}

impl GuestRef {
    fn identification(&self) -> Option<String> {
        self.identification_number
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Enough data to insert a fresh guest row
    pub fn can_create(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.first_name) && present(&self.last_name)
    }

    /// Ordered lookups; the first one that yields a guest wins
    pub fn resolution_steps(&self) -> Vec<ResolutionStep> {
        let mut steps = Vec::with_capacity(3);
        if let Some(id) = self.guest_id {
            steps.push(ResolutionStep::ById(id));
        }
        if let Some(identification) = self.identification() {
            steps.push(ResolutionStep::ByIdentification(identification));
        }
        if self.can_create() {
            steps.push(ResolutionStep::Create);
        }
        steps
    }

    /// Short description used in error messages and logs
    pub fn describe(&self) -> String {
        match (self.guest_id, self.identification()) {
            (Some(id), _) => format!("guest_id {}", id),
            (None, Some(identification)) => format!("identification_number {}", identification),
            (None, None) => "guest without id or identification number".to_string(),
        }
    }

    pub fn to_new_guest(&self, tenant: Uuid) -> NewGuest {
        NewGuest {
            tenant_id: tenant,
            first_name: self.first_name.as_deref().unwrap_or_default().trim().to_string(),
            last_name: self.last_name.as_deref().unwrap_or_default().trim().to_string(),
            date_of_birth: self.date_of_birth,
            nationality: normalize_optional(self.nationality.clone()),
            identification_number: self.identification(),
            email: self.email.as_deref().map(normalize_email),
            phone_number: normalize_optional(self.phone_number.clone()),
            address: None,
            emergency_contact: None,
            vehicle: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_padded_email_passes_validation_once_normalized() {
        let request: CreateGuestRequest = serde_json::from_value(json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": " Ada@Example.com "
        }))
        .unwrap();
        assert!(request.clone().validate().is_err());

        let request = request.normalized();
        assert!(request.validate().is_ok());
        assert_eq!(request.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn test_resolution_prefers_id_then_identification_then_create() {
        let id = Uuid::new_v4();
        let guest = GuestRef {
            guest_id: Some(id),
            identification_number: Some(" P-42 ".to_string()),
            first_name: Some("Grace".to_string()),
            last_name: Some("Hopper".to_string()),
            ..Default::default()
        };

        assert_eq!(
            guest.resolution_steps(),
            vec![
                ResolutionStep::ById(id),
                ResolutionStep::ByIdentification("P-42".to_string()),
                ResolutionStep::Create,
            ]
        );
    }

    #[test]
    fn test_resolution_without_names_cannot_create() {
        let guest = GuestRef {
            identification_number: Some("X1".to_string()),
            first_name: Some("Only".to_string()),
            ..Default::default()
        };
        assert_eq!(
            guest.resolution_steps(),
            vec![ResolutionStep::ByIdentification("X1".to_string())]
        );

        let empty = GuestRef::default();
        assert!(empty.resolution_steps().is_empty());
    }

    #[test]
    fn test_blank_identification_is_ignored() {
        let guest = GuestRef {
            identification_number: Some("   ".to_string()),
            first_name: Some("A".to_string()),
            last_name: Some("B".to_string()),
            ..Default::default()
        };
        assert_eq!(guest.resolution_steps(), vec![ResolutionStep::Create]);
        assert_eq!(guest.to_new_guest(Uuid::new_v4()).identification_number, None);
    }

    #[test]
    fn test_address_keeps_unknown_keys() {
        let raw = json!({
            "street": "1 Main St",
            "city": "Springfield",
            "unit": "4B",
            "geo": {"lat": 1.5, "lng": 2.5}
        });

        let address: Address = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(address.street.as_deref(), Some("1 Main St"));
        assert_eq!(address.extra.get("unit"), Some(&json!("4B")));
        assert_eq!(serde_json::to_value(&address).unwrap(), raw);
    }

    #[test]
    fn test_create_request_normalizes_email() {
        let request = CreateGuestRequest {
            tenant_id: None,
            first_name: " Ada ".to_string(),
            last_name: "Lovelace".to_string(),
            email: Some("  Ada@Example.COM ".to_string()),
            phone_number: Some(String::new()),
            date_of_birth: None,
            nationality: None,
            identification_number: None,
            address: None,
            emergency_contact: None,
            vehicle: None,
        };

        let tenant = Uuid::new_v4();
        let guest = request.into_new_guest(tenant);
        assert_eq!(guest.tenant_id, tenant);
        assert_eq!(guest.first_name, "Ada");
        assert_eq!(guest.email.as_deref(), Some("ada@example.com"));
        assert_eq!(guest.phone_number, None);
    }

    #[test]
    fn test_guest_sort_keys() {
        assert_eq!("first_name".parse(), Ok(GuestSortKey::FirstName));
        assert!("password".parse::<GuestSortKey>().is_err());
        assert_eq!(GuestSortKey::default(), GuestSortKey::CreatedDate);
    }
}
