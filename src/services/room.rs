// Room inventory
// Tenant-scoped rooms; room numbers are unique within a tenant

use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::db::DieselPool;
use crate::models::{
    CreateRoomRequest, ListQuery, NewRoom, PageMeta, Room, RoomError, RoomSortKey, SortDirection,
    UpdateRoomRequest,
};
use crate::schema::rooms;
use crate::utils::service_error::{ServiceError, ServiceResult};
use crate::utils::validation::{normalize_optional, trim_required};

fn sorted(
    query: rooms::BoxedQuery<'static, Pg>,
    key: RoomSortKey,
    direction: SortDirection,
) -> rooms::BoxedQuery<'static, Pg> {
    use SortDirection::{Asc, Desc};

    let query = match (key, direction) {
        (RoomSortKey::CreatedDate, Asc) => query.order(rooms::created_date.asc()),
        (RoomSortKey::CreatedDate, Desc) => query.order(rooms::created_date.desc()),
        (RoomSortKey::Number, Asc) => query.order(rooms::number.asc()),
        (RoomSortKey::Number, Desc) => query.order(rooms::number.desc()),
        (RoomSortKey::Name, Asc) => query.order(rooms::name.asc()),
        (RoomSortKey::Name, Desc) => query.order(rooms::name.desc()),
    };
    query.then_order_by(rooms::id.asc())
}

#[derive(Clone)]
pub struct RoomService {
    pool: DieselPool,
}

impl RoomService {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self, request))]
    pub async fn create_room(&self, tenant: Uuid, request: CreateRoomRequest) -> ServiceResult<Room> {
        request.validate()?;
        let number = trim_required(&request.number, "Room number").map_err(ServiceError::ValidationError)?;

        let mut conn = self.pool.get().await?;
        if Room::number_taken(&mut conn, tenant, &number, None).await? {
            return Err(RoomError::DuplicateNumber(number).into());
        }

        let room = Room::create(
            &mut conn,
            &NewRoom {
                tenant_id: tenant,
                number,
                name: normalize_optional(request.name),
                occupied: request.occupied,
            },
        )
        .await?;

        info!("Created room {} ({}) for tenant {}", room.number, room.id, tenant);
        Ok(room)
    }

    #[instrument(skip(self))]
    pub async fn get_room(&self, tenant: Uuid, room_id: Uuid) -> ServiceResult<Room> {
        let mut conn = self.pool.get().await?;
        Ok(Room::find_for_tenant(&mut conn, tenant, room_id).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_rooms(&self, tenant: Uuid, query: ListQuery) -> ServiceResult<(Vec<Room>, PageMeta)> {
        let page = query.pagination().map_err(ServiceError::ValidationError)?;
        let (key, direction) = query
            .sort::<RoomSortKey>()
            .map_err(ServiceError::ValidationError)?;

        let mut conn = self.pool.get().await?;

        let total: i64 = rooms::table
            .filter(rooms::tenant_id.eq(tenant))
            .count()
            .get_result(&mut conn)
            .await?;

        let base = rooms::table.filter(rooms::tenant_id.eq(tenant)).into_boxed();
        let rooms: Vec<Room> = sorted(base, key, direction)
            .limit(page.limit)
            .offset(page.offset())
            .load(&mut conn)
            .await?;

        Ok((rooms, page.meta(total)))
    }

    #[instrument(skip(self, request))]
    pub async fn update_room(
        &self,
        tenant: Uuid,
        room_id: Uuid,
        request: UpdateRoomRequest,
    ) -> ServiceResult<Room> {
        request.validate()?;
        let update = request.into_update();

        let mut conn = self.pool.get().await?;
        let current = Room::find_for_tenant(&mut conn, tenant, room_id).await?;

        if let Some(number) = update.number.as_deref() {
            if number.is_empty() {
                return Err(ServiceError::ValidationError(
                    "Room number cannot be empty".to_string(),
                ));
            }
            if number != current.number
                && Room::number_taken(&mut conn, tenant, number, Some(room_id)).await?
            {
                return Err(RoomError::DuplicateNumber(number.to_string()).into());
            }
        }

        let room = Room::update(&mut conn, tenant, room_id, &update).await?;
        info!("Updated room {} for tenant {}", room.id, tenant);
        Ok(room)
    }

    #[instrument(skip(self))]
    pub async fn delete_room(&self, tenant: Uuid, room_id: Uuid) -> ServiceResult<()> {
        let mut conn = self.pool.get().await?;
        Room::delete(&mut conn, tenant, room_id).await?;
        info!("Deleted room {} for tenant {}", room_id, tenant);
        Ok(())
    }
}
