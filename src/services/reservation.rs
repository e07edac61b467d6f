// Reservation engine
// Creation links the party and books rooms in one transaction; the read side
// answers current-guest, calendar and weekly analytics queries

use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::app_config::BusinessConfig;
use crate::db::DieselPool;
use crate::models::{
    AnalyticsQuery, CalendarQuery, CreateReservationRequest, CurrentGuest, CurrentGuestSortKey,
    Guest, GuestError, ListQuery, NewReservation, NewReservationGuest, PageMeta, Reservation,
    ReservationDetail, ReservationSortKey, ReservationWithGuests, Room, SortDirection,
};
use crate::schema::reservations;
use crate::services::analytics::{analysis_window, build_analytics, ReservationAnalytics};
use crate::services::guest::GuestService;
use crate::services::guest_status::{compute_guest_status, local_date, month_range};
use crate::utils::service_error::{ServiceError, ServiceResult};

fn sorted(
    query: reservations::BoxedQuery<'static, Pg>,
    key: ReservationSortKey,
    direction: SortDirection,
) -> reservations::BoxedQuery<'static, Pg> {
    use SortDirection::{Asc, Desc};

    let query = match (key, direction) {
        (ReservationSortKey::CreatedDate, Asc) => query.order(reservations::created_date.asc()),
        (ReservationSortKey::CreatedDate, Desc) => query.order(reservations::created_date.desc()),
        (ReservationSortKey::CheckIn, Asc) => query.order(reservations::check_in.asc()),
        (ReservationSortKey::CheckIn, Desc) => query.order(reservations::check_in.desc()),
        (ReservationSortKey::CheckOut, Asc) => query.order(reservations::check_out.asc()),
        (ReservationSortKey::CheckOut, Desc) => query.order(reservations::check_out.desc()),
        (ReservationSortKey::TotalAmount, Asc) => query.order(reservations::total_amount.asc()),
        (ReservationSortKey::TotalAmount, Desc) => query.order(reservations::total_amount.desc()),
    };
    query.then_order_by(reservations::id.asc())
}

#[derive(Clone)]
pub struct ReservationService {
    pool: DieselPool,
    business: BusinessConfig,
}

impl ReservationService {
    pub fn new(pool: DieselPool, business: BusinessConfig) -> Self {
        Self { pool, business }
    }

    /// Create a reservation, link its guests and mark its rooms occupied
    ///
    /// Everything happens in a single transaction; an unknown primary guest,
    /// an unresolvable additional guest or an unknown room number rolls back
    /// every write.
    #[instrument(skip(self, request), fields(primary_guest_id = %request.primary_guest_id))]
    pub async fn create_reservation(
        &self,
        tenant: Uuid,
        request: CreateReservationRequest,
    ) -> ServiceResult<ReservationDetail> {
        request.validate()?;
        request
            .validate_custom()
            .map_err(ServiceError::ValidationError)?;

        let room_numbers = request.normalized_room_numbers();
        let guest_status = compute_guest_status(request.check_out, Utc::now(), &self.business);

        let mut conn = self.pool.get().await?;
        let request = &request;
        let room_numbers = &room_numbers;

        let detail = conn
            .transaction::<_, ServiceError, _>(|conn| {
                Box::pin(async move {
                    let primary = match Guest::find_for_tenant(conn, tenant, request.primary_guest_id).await {
                        Ok(guest) => guest,
                        Err(GuestError::NotFound) => {
                            return Err(ServiceError::NotFound("Primary guest not found".to_string()));
                        },
                        Err(e) => return Err(e.into()),
                    };

                    let reservation = Reservation::create(
                        conn,
                        &NewReservation {
                            tenant_id: tenant,
                            primary_guest_id: primary.id,
                            primary_guest_name: primary.full_name(),
                            check_in: request.check_in,
                            check_out: request.check_out,
                            room_numbers: room_numbers.clone(),
                            payment_method: request.payment_method.clone(),
                            total_amount: request.total_amount,
                            payment_status: request.payment_status.unwrap_or_default(),
                            guest_status,
                        },
                    )
                    .await?;

                    Reservation::link_guest(
                        conn,
                        &NewReservationGuest {
                            reservation_id: reservation.id,
                            guest_id: primary.id,
                            tenant_id: tenant,
                        },
                    )
                    .await?;

                    let mut linked: HashSet<Uuid> = HashSet::from([primary.id]);
                    let mut additional_guests = Vec::with_capacity(request.additional_guests.len());

                    for guest_ref in &request.additional_guests {
                        let guest = GuestService::resolve_guest_ref(conn, tenant, guest_ref).await?;
                        if !linked.insert(guest.id) {
                            warn!(
                                "Guest {} already linked to reservation {}, skipping",
                                guest.id, reservation.id
                            );
                            continue;
                        }

                        Reservation::link_guest(
                            conn,
                            &NewReservationGuest {
                                reservation_id: reservation.id,
                                guest_id: guest.id,
                                tenant_id: tenant,
                            },
                        )
                        .await?;
                        additional_guests.push(guest);
                    }

                    Room::mark_occupied(conn, tenant, room_numbers).await?;

                    Ok(ReservationDetail {
                        reservation,
                        primary_guest: Some(primary),
                        additional_guests,
                    })
                })
            })
            .await?;

        info!(
            "Created reservation {} for tenant {} ({} additional guests, status {})",
            detail.reservation.id,
            tenant,
            detail.additional_guests.len(),
            detail.reservation.guest_status
        );
        Ok(detail)
    }

    #[instrument(skip(self))]
    pub async fn get_reservation(
        &self,
        tenant: Uuid,
        reservation_id: Uuid,
    ) -> ServiceResult<ReservationDetail> {
        let mut conn = self.pool.get().await?;
        let reservation = Reservation::find_for_tenant(&mut conn, tenant, reservation_id).await?;
        let linked = Reservation::linked_guests(&mut conn, tenant, &[reservation.id]).await?;

        let (primary, additional): (Vec<Guest>, Vec<Guest>) = linked
            .into_iter()
            .map(|(_, guest)| guest)
            .partition(|guest| guest.id == reservation.primary_guest_id);

        Ok(ReservationDetail {
            reservation,
            primary_guest: primary.into_iter().next(),
            additional_guests: additional,
        })
    }

    #[instrument(skip(self))]
    pub async fn list_reservations(
        &self,
        tenant: Uuid,
        query: ListQuery,
    ) -> ServiceResult<(Vec<Reservation>, PageMeta)> {
        let page = query.pagination().map_err(ServiceError::ValidationError)?;
        let (key, direction) = query
            .sort::<ReservationSortKey>()
            .map_err(ServiceError::ValidationError)?;

        let mut conn = self.pool.get().await?;

        let total: i64 = reservations::table
            .filter(reservations::tenant_id.eq(tenant))
            .count()
            .get_result(&mut conn)
            .await?;

        let base = reservations::table
            .filter(reservations::tenant_id.eq(tenant))
            .into_boxed();
        let rows: Vec<Reservation> = sorted(base, key, direction)
            .limit(page.limit)
            .offset(page.offset())
            .load(&mut conn)
            .await?;

        Ok((rows, page.meta(total)))
    }

    /// Guests on active reservations, one entry per guest
    #[instrument(skip(self))]
    pub async fn current_guests(
        &self,
        tenant: Uuid,
        query: ListQuery,
    ) -> ServiceResult<(Vec<CurrentGuest>, PageMeta)> {
        let page = query.pagination().map_err(ServiceError::ValidationError)?;
        let sort = query
            .sort::<CurrentGuestSortKey>()
            .map_err(ServiceError::ValidationError)?;

        let mut conn = self.pool.get().await?;
        let rows = Reservation::active_guest_rows(&mut conn, tenant).await?;

        let current = select_current_guests(rows, sort);
        let meta = page.meta(current.len() as i64);
        Ok((page.slice(current), meta))
    }

    /// Reservations checking in during a calendar month, local time
    #[instrument(skip(self))]
    pub async fn calendar(
        &self,
        tenant: Uuid,
        query: CalendarQuery,
    ) -> ServiceResult<Vec<ReservationWithGuests>> {
        let (start, end) = month_range(query.year, query.month, self.business.timezone)
            .map_err(ServiceError::ValidationError)?;

        let mut conn = self.pool.get().await?;
        let rows = Reservation::checking_in_between(&mut conn, tenant, start, end).await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let linked = Reservation::linked_guests(&mut conn, tenant, &ids).await?;

        Ok(attach_additional_guests(rows, linked))
    }

    /// Weekly buckets for the two months around the reference week
    #[instrument(skip(self))]
    pub async fn analytics(
        &self,
        tenant: Uuid,
        query: AnalyticsQuery,
    ) -> ServiceResult<ReservationAnalytics> {
        let key = match query.sort_by.as_deref().map(str::trim) {
            None | Some("") => ReservationSortKey::CheckIn,
            Some(raw) => raw.parse().map_err(ServiceError::ValidationError)?,
        };
        let direction = match query.order.as_deref().map(str::trim) {
            None | Some("") => SortDirection::Asc,
            Some(raw) => raw.parse().map_err(ServiceError::ValidationError)?,
        };

        let reference = query
            .date
            .unwrap_or_else(|| local_date(Utc::now(), self.business.timezone));
        let (start, end) = analysis_window(reference, self.business.timezone);

        let mut conn = self.pool.get().await?;
        let rows = Reservation::checking_in_between(&mut conn, tenant, start, end).await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let counts: HashMap<Uuid, i64> = Reservation::guest_counts(&mut conn, tenant, &ids)
            .await?
            .into_iter()
            .collect();

        let with_counts = rows
            .into_iter()
            .map(|r| {
                let count = counts.get(&r.id).copied().unwrap_or(0);
                (r, count)
            })
            .collect();

        Ok(build_analytics(
            reference,
            with_counts,
            (key, direction),
            &self.business,
        ))
    }
}

fn compare_current(
    a: &(Guest, Reservation),
    b: &(Guest, Reservation),
    key: CurrentGuestSortKey,
) -> Ordering {
    match key {
        CurrentGuestSortKey::CreatedDate => a.1.created_date.cmp(&b.1.created_date),
        CurrentGuestSortKey::CheckIn => a.1.check_in.cmp(&b.1.check_in),
        CurrentGuestSortKey::CheckOut => a.1.check_out.cmp(&b.1.check_out),
        CurrentGuestSortKey::FirstName => a.0.first_name.cmp(&b.0.first_name),
        CurrentGuestSortKey::LastName => a.0.last_name.cmp(&b.0.last_name),
    }
}

/// Sort the active (guest, reservation) rows and keep the first row per guest
pub fn select_current_guests(
    mut rows: Vec<(Guest, Reservation)>,
    sort: (CurrentGuestSortKey, SortDirection),
) -> Vec<CurrentGuest> {
    let (key, direction) = sort;
    rows.sort_by(|a, b| {
        let ordering = compare_current(a, b, key);
        let ordering = match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        ordering
            .then_with(|| a.0.id.cmp(&b.0.id))
            .then_with(|| a.1.id.cmp(&b.1.id))
    });

    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|(guest, _)| seen.insert(guest.id))
        .map(|(guest, reservation)| CurrentGuest { guest, reservation })
        .collect()
}

/// Nest each reservation's non-primary guests under it
pub fn attach_additional_guests(
    rows: Vec<Reservation>,
    linked: Vec<(Uuid, Guest)>,
) -> Vec<ReservationWithGuests> {
    let mut by_reservation: HashMap<Uuid, Vec<Guest>> = HashMap::new();
    for (reservation_id, guest) in linked {
        by_reservation.entry(reservation_id).or_default().push(guest);
    }

    rows.into_iter()
        .map(|reservation| {
            let additional_guests = by_reservation
                .remove(&reservation.id)
                .unwrap_or_default()
                .into_iter()
                .filter(|g| g.id != reservation.primary_guest_id)
                .collect();
            ReservationWithGuests {
                reservation,
                additional_guests,
            }
        })
        .collect()
}
