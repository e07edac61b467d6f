// Room Database Model
// Room numbers are unique per tenant; `occupied` is flipped by reservations

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::schema::rooms;

/// Room database model
#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Serialize, Deserialize, ToSchema,
)]
#[diesel(table_name = rooms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Room {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub number: String,
    pub name: Option<String>,
    pub occupied: bool,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

/// New room for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = rooms)]
pub struct NewRoom {
    pub tenant_id: Uuid,
    pub number: String,
    pub name: Option<String>,
    pub occupied: bool,
}

/// Room update struct
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = rooms)]
pub struct RoomUpdate {
    pub number: Option<String>,
    pub name: Option<Option<String>>,
    pub occupied: Option<bool>,
    pub updated_date: Option<DateTime<Utc>>,
}

/// Errors for room operations
#[derive(thiserror::Error, Debug)]
pub enum RoomError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Room not found")]
    NotFound,

    #[error("Room number {0} already exists")]
    DuplicateNumber(String),

    #[error("Unknown room numbers: {}", .0.join(", "))]
    UnknownNumbers(Vec<String>),
}

impl Room {
    pub async fn find_for_tenant(
        conn: &mut AsyncPgConnection,
        tenant: Uuid,
        room_id: Uuid,
    ) -> Result<Self, RoomError> {
        rooms::table
            .filter(rooms::id.eq(room_id))
            .filter(rooms::tenant_id.eq(tenant))
            .first::<Room>(conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => RoomError::NotFound,
                _ => RoomError::Database(e),
            })
    }

    /// Whether `number` is taken in the tenant, optionally ignoring one room
    pub async fn number_taken(
        conn: &mut AsyncPgConnection,
        tenant: Uuid,
        number: &str,
        except: Option<Uuid>,
    ) -> Result<bool, RoomError> {
        let mut query = rooms::table
            .filter(rooms::tenant_id.eq(tenant))
            .filter(rooms::number.eq(number))
            .into_boxed();

        if let Some(room_id) = except {
            query = query.filter(rooms::id.ne(room_id));
        }

        let count: i64 = query.count().get_result(conn).await?;
        Ok(count > 0)
    }

    pub async fn create(conn: &mut AsyncPgConnection, new_room: &NewRoom) -> Result<Self, RoomError> {
        diesel::insert_into(rooms::table)
            .values(new_room)
            .get_result::<Room>(conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::UniqueViolation,
                    _,
                ) => RoomError::DuplicateNumber(new_room.number.clone()),
                _ => RoomError::Database(e),
            })
    }

    pub async fn update(
        conn: &mut AsyncPgConnection,
        tenant: Uuid,
        room_id: Uuid,
        update: &RoomUpdate,
    ) -> Result<Self, RoomError> {
        diesel::update(
            rooms::table
                .filter(rooms::id.eq(room_id))
                .filter(rooms::tenant_id.eq(tenant)),
        )
        .set(update)
        .get_result::<Room>(conn)
        .await
        .map_err(|e| match e {
            diesel::result::Error::NotFound => RoomError::NotFound,
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => RoomError::DuplicateNumber(update.number.clone().unwrap_or_default()),
            _ => RoomError::Database(e),
        })
    }

    pub async fn delete(conn: &mut AsyncPgConnection, tenant: Uuid, room_id: Uuid) -> Result<(), RoomError> {
        let deleted = diesel::delete(
            rooms::table
                .filter(rooms::id.eq(room_id))
                .filter(rooms::tenant_id.eq(tenant)),
        )
        .execute(conn)
        .await?;

        if deleted == 0 {
            return Err(RoomError::NotFound);
        }
        Ok(())
    }

    /// Flip `occupied` on for the booked numbers; every number must exist
    pub async fn mark_occupied(
        conn: &mut AsyncPgConnection,
        tenant: Uuid,
        numbers: &[String],
    ) -> Result<Vec<Room>, RoomError> {
        let updated: Vec<Room> = diesel::update(
            rooms::table
                .filter(rooms::tenant_id.eq(tenant))
                .filter(rooms::number.eq_any(numbers)),
        )
        .set((
            rooms::occupied.eq(true),
            rooms::updated_date.eq(Utc::now()),
        ))
        .get_results(conn)
        .await?;

        let missing = missing_numbers(numbers, &updated);
        if !missing.is_empty() {
            return Err(RoomError::UnknownNumbers(missing));
        }
        Ok(updated)
    }
}

/// Requested numbers that have no matching room
pub fn missing_numbers(requested: &[String], found: &[Room]) -> Vec<String> {
    let mut missing: Vec<String> = requested
        .iter()
        .filter(|number| !found.iter().any(|room| &room.number == *number))
        .cloned()
        .collect();
    missing.dedup();
    missing
}

// =============================================================================
// REQUEST DTOs
// =============================================================================

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(example = json!({"number": "101", "name": "Garden King", "occupied": false}))]
pub struct CreateRoomRequest {
    /// Only honoured for SuperAdmin callers
    pub tenant_id: Option<Uuid>,

    #[validate(length(min = 1, max = 20, message = "Room number must be 1-20 characters"))]
    pub number: String,

    #[validate(length(max = 255, message = "Room name must be less than 255 characters"))]
    pub name: Option<String>,

    #[serde(default)]
    pub occupied: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateRoomRequest {
    #[validate(length(min = 1, max = 20, message = "Room number must be 1-20 characters"))]
    pub number: Option<String>,

    #[validate(length(max = 255, message = "Room name must be less than 255 characters"))]
    pub name: Option<String>,

    pub occupied: Option<bool>,
}

impl UpdateRoomRequest {
    pub fn into_update(self) -> RoomUpdate {
        RoomUpdate {
            number: self.number.map(|n| n.trim().to_string()),
            name: self.name.map(|n| Some(n.trim().to_string()).filter(|n| !n.is_empty())),
            occupied: self.occupied,
            updated_date: Some(Utc::now()),
        }
    }
}

/// Sort keys accepted by `GET /rooms`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoomSortKey {
    #[default]
    CreatedDate,
    Number,
    Name,
}

impl FromStr for RoomSortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_date" => Ok(RoomSortKey::CreatedDate),
            "number" => Ok(RoomSortKey::Number),
            "name" => Ok(RoomSortKey::Name),
            _ => Err(format!("Invalid sort key for rooms: {}", s)),
        }
    }
}
