// Guest registry
// Upsert-by-email, additional guest resolution, search and deletion

use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use std::collections::HashMap;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::db::DieselPool;
use crate::models::{
    CreateGuestRequest, Guest, GuestChanges, GuestError, GuestRef, GuestSortKey,
    GuestWithReservations, ListQuery, PageMeta, Reservation, ResolutionStep, SearchGuestsQuery,
    SortDirection,
};
use crate::schema::guests;
use crate::utils::service_error::{ServiceError, ServiceResult};
use crate::utils::validation::contains_pattern;

pub const DEFAULT_SEARCH_LIMIT: i64 = 10;
pub const MAX_SEARCH_LIMIT: i64 = 100;

fn sorted(
    query: guests::BoxedQuery<'static, Pg>,
    key: GuestSortKey,
    direction: SortDirection,
) -> guests::BoxedQuery<'static, Pg> {
    use SortDirection::{Asc, Desc};

    let query = match (key, direction) {
        (GuestSortKey::CreatedDate, Asc) => query.order(guests::created_date.asc()),
        (GuestSortKey::CreatedDate, Desc) => query.order(guests::created_date.desc()),
        (GuestSortKey::FirstName, Asc) => query.order(guests::first_name.asc()),
        (GuestSortKey::FirstName, Desc) => query.order(guests::first_name.desc()),
        (GuestSortKey::LastName, Asc) => query.order(guests::last_name.asc()),
        (GuestSortKey::LastName, Desc) => query.order(guests::last_name.desc()),
        (GuestSortKey::Email, Asc) => query.order(guests::email.asc()),
        (GuestSortKey::Email, Desc) => query.order(guests::email.desc()),
    };
    query.then_order_by(guests::id.asc())
}

#[derive(Clone)]
pub struct GuestService {
    pool: DieselPool,
}

impl GuestService {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }

    /// Create a guest, or overwrite the tenant's existing guest with the same email
    ///
    /// Absent optional fields clear the stored values. Nothing in the schema
    /// prevents two concurrent upserts from both inserting.
    #[instrument(skip(self, request))]
    pub async fn upsert_guest(
        &self,
        tenant: Uuid,
        request: CreateGuestRequest,
    ) -> ServiceResult<Guest> {
        let request = request.normalized();
        request.validate()?;

        let new_guest = request.into_new_guest(tenant);
        let email = new_guest
            .email
            .clone()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ServiceError::ValidationError("Email is required".to_string()))?;

        let mut conn = self.pool.get().await?;
        let new_guest = &new_guest;
        let email = &email;

        let (guest, created) = conn
            .transaction::<_, ServiceError, _>(|conn| {
                Box::pin(async move {
                    match Guest::find_by_email(conn, tenant, email).await? {
                        Some(existing) => {
                            let changes = GuestChanges::from(new_guest);
                            let guest = Guest::replace(conn, existing.id, &changes).await?;
                            Ok((guest, false))
                        },
                        None => Ok((Guest::create(conn, new_guest).await?, true)),
                    }
                })
            })
            .await?;

        if created {
            info!("Created guest {} for tenant {}", guest.id, tenant);
        } else {
            info!("Updated existing guest {} for tenant {}", guest.id, tenant);
        }
        Ok(guest)
    }

    /// Resolve an additional-guest reference inside a caller's transaction
    ///
    /// Tries the id, then the identification number, then inserts a new row.
    pub async fn resolve_guest_ref(
        conn: &mut AsyncPgConnection,
        tenant: Uuid,
        guest_ref: &GuestRef,
    ) -> Result<Guest, GuestError> {
        for step in guest_ref.resolution_steps() {
            match step {
                ResolutionStep::ById(guest_id) => {
                    match Guest::find_for_tenant(conn, tenant, guest_id).await {
                        Ok(guest) => return Ok(guest),
                        Err(GuestError::NotFound) => {
                            warn!("Guest {} not found for tenant {}, trying other keys", guest_id, tenant);
                        },
                        Err(e) => return Err(e),
                    }
                },
                ResolutionStep::ByIdentification(identification) => {
                    if let Some(guest) =
                        Guest::find_by_identification(conn, tenant, &identification).await?
                    {
                        return Ok(guest);
                    }
                },
                ResolutionStep::Create => {
                    let guest = Guest::create(conn, &guest_ref.to_new_guest(tenant)).await?;
                    info!("Created additional guest {} for tenant {}", guest.id, tenant);
                    return Ok(guest);
                },
            }
        }

        Err(GuestError::Unresolvable(guest_ref.describe()))
    }

    /// Case-insensitive substring search over names and email
    #[instrument(skip(self))]
    pub async fn search_guests(
        &self,
        tenant: Uuid,
        query: SearchGuestsQuery,
    ) -> ServiceResult<Vec<Guest>> {
        let term = query
            .search_query
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ServiceError::ValidationError("Search query is required".to_string()))?;

        let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        let offset = query.offset.unwrap_or(0);
        if !(1..=MAX_SEARCH_LIMIT).contains(&limit) {
            return Err(ServiceError::ValidationError(format!(
                "Limit must be between 1 and {}",
                MAX_SEARCH_LIMIT
            )));
        }
        if offset < 0 {
            return Err(ServiceError::ValidationError(
                "Offset cannot be negative".to_string(),
            ));
        }

        let pattern = contains_pattern(term);
        let mut conn = self.pool.get().await?;

        let guests = guests::table
            .filter(guests::tenant_id.eq(tenant))
            .filter(
                guests::first_name
                    .ilike(&pattern)
                    .or(guests::last_name.ilike(&pattern))
                    .or(guests::email.ilike(&pattern)),
            )
            .order((guests::first_name.desc(), guests::id.asc()))
            .limit(limit)
            .offset(offset)
            .load::<Guest>(&mut conn)
            .await?;

        Ok(guests)
    }

    /// Delete a guest and its reservation links; reservations are kept
    #[instrument(skip(self))]
    pub async fn delete_guest(&self, tenant: Uuid, guest_id: Uuid) -> ServiceResult<()> {
        let mut conn = self.pool.get().await?;

        let removed_links = conn
            .transaction::<_, ServiceError, _>(|conn| {
                Box::pin(async move {
                    // Ownership check first so a foreign id writes nothing
                    Guest::find_for_tenant(conn, tenant, guest_id).await?;
                    let links = Guest::delete_links(conn, tenant, guest_id).await?;
                    Guest::delete(conn, tenant, guest_id).await?;
                    Ok(links)
                })
            })
            .await?;

        info!(
            "Deleted guest {} for tenant {} ({} reservation links removed)",
            guest_id, tenant, removed_links
        );
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_guest(&self, tenant: Uuid, guest_id: Uuid) -> ServiceResult<Guest> {
        let mut conn = self.pool.get().await?;
        Ok(Guest::find_for_tenant(&mut conn, tenant, guest_id).await?)
    }

    /// Paginated guests, each with every reservation it is linked to
    #[instrument(skip(self))]
    pub async fn list_guests(
        &self,
        tenant: Uuid,
        query: ListQuery,
    ) -> ServiceResult<(Vec<GuestWithReservations>, PageMeta)> {
        let page = query.pagination().map_err(ServiceError::ValidationError)?;
        let (key, direction) = query
            .sort::<GuestSortKey>()
            .map_err(ServiceError::ValidationError)?;

        let mut conn = self.pool.get().await?;

        let total: i64 = guests::table
            .filter(guests::tenant_id.eq(tenant))
            .count()
            .get_result(&mut conn)
            .await?;

        let base = guests::table
            .filter(guests::tenant_id.eq(tenant))
            .into_boxed();
        let guests: Vec<Guest> = sorted(base, key, direction)
            .limit(page.limit)
            .offset(page.offset())
            .load(&mut conn)
            .await?;

        let ids: Vec<Uuid> = guests.iter().map(|g| g.id).collect();
        let linked = Reservation::linked_to_guests(&mut conn, tenant, &ids, None).await?;

        Ok((attach_reservations(guests, linked), page.meta(total)))
    }

    /// Guest plus the linked reservations that have not checked out yet
    #[instrument(skip(self))]
    pub async fn guest_with_reservations(
        &self,
        tenant: Uuid,
        guest_id: Uuid,
    ) -> ServiceResult<GuestWithReservations> {
        let mut conn = self.pool.get().await?;
        let guest = Guest::find_for_tenant(&mut conn, tenant, guest_id).await?;

        let linked =
            Reservation::linked_to_guests(&mut conn, tenant, &[guest.id], Some(Utc::now())).await?;
        let reservations: Vec<Reservation> = linked.into_iter().map(|(_, r)| r).collect();

        Ok(GuestWithReservations {
            guest,
            reservations,
        })
    }
}

/// Nest `(guest_id, reservation)` pairs under their guests, keeping guest order
pub fn attach_reservations(
    guests: Vec<Guest>,
    linked: Vec<(Uuid, Reservation)>,
) -> Vec<GuestWithReservations> {
    let mut by_guest: HashMap<Uuid, Vec<Reservation>> = HashMap::new();
    for (guest_id, reservation) in linked {
        by_guest.entry(guest_id).or_default().push(reservation);
    }

    guests
        .into_iter()
        .map(|guest| {
            let reservations = by_guest.remove(&guest.id).unwrap_or_default();
            GuestWithReservations {
                guest,
                reservations,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GuestStatus, PaymentStatus};

    fn guest(first: &str) -> Guest {
        Guest {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            first_name: first.to_string(),
            last_name: "Test".to_string(),
            date_of_birth: None,
            nationality: None,
            identification_number: None,
            email: None,
            phone_number: None,
            address: None,
            emergency_contact: None,
            vehicle: None,
            created_date: Utc::now(),
            updated_date: Utc::now(),
        }
    }

    fn reservation(primary: Uuid) -> Reservation {
        let now = Utc::now();
        Reservation {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            primary_guest_id: primary,
            primary_guest_name: "Test".to_string(),
            check_in: now,
            check_out: now + chrono::Duration::days(1),
            room_numbers: vec!["1".to_string()],
            payment_method: None,
            total_amount: 0.0,
            payment_status: PaymentStatus::Pending,
            guest_status: GuestStatus::Active,
            created_date: now,
            updated_date: now,
        }
    }

    #[test]
    fn test_attach_reservations_keeps_guest_order() {
        let a = guest("A");
        let b = guest("B");
        let r1 = reservation(a.id);
        let r2 = reservation(a.id);

        let nested = attach_reservations(
            vec![b.clone(), a.clone()],
            vec![(a.id, r1.clone()), (a.id, r2.clone())],
        );

        assert_eq!(nested[0].guest.id, b.id);
        assert!(nested[0].reservations.is_empty());
        assert_eq!(nested[1].reservations, vec![r1, r2]);
    }
}
