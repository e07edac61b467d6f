/// Store an enum with `as_str`/`FromStr` as a `Text` column
macro_rules! text_column_enum {
    ($ty:ty) => {
        impl<DB> diesel::deserialize::FromSql<diesel::sql_types::Text, DB> for $ty
        where
            DB: diesel::backend::Backend,
            String: diesel::deserialize::FromSql<diesel::sql_types::Text, DB>,
        {
            fn from_sql(bytes: DB::RawValue<'_>) -> diesel::deserialize::Result<Self> {
                let value = String::from_sql(bytes)?;
                <$ty as std::str::FromStr>::from_str(&value).map_err(|e| e.into())
            }
        }

        impl<DB> diesel::serialize::ToSql<diesel::sql_types::Text, DB> for $ty
        where
            DB: diesel::backend::Backend,
            str: diesel::serialize::ToSql<diesel::sql_types::Text, DB>,
        {
            fn to_sql<'b>(
                &'b self,
                out: &mut diesel::serialize::Output<'b, '_, DB>,
            ) -> diesel::serialize::Result {
                self.as_str().to_sql(out)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use text_column_enum;

pub mod auth;
pub mod guest;
pub mod pagination;
pub mod reservation;
pub mod room;
pub mod tenant;
pub mod user;

// Re-export common types
pub use auth::*;
pub use guest::{
    Address, CreateGuestRequest, EmergencyContact, Guest, GuestChanges, GuestError, GuestRef,
    GuestSortKey, NewGuest, ResolutionStep, SearchGuestsQuery, Vehicle,
};
pub use pagination::{ListQuery, PageMeta, Pagination, SortDirection};
pub use reservation::{
    AnalyticsQuery, CalendarQuery, CreateReservationRequest, CurrentGuest, CurrentGuestSortKey,
    GuestStatus, GuestWithReservations, NewReservation, NewReservationGuest, PaymentStatus,
    Reservation, ReservationDetail, ReservationError, ReservationGuest, ReservationSortKey,
    ReservationWithGuests,
};
pub use room::{CreateRoomRequest, NewRoom, Room, RoomError, RoomSortKey, RoomUpdate, UpdateRoomRequest};
pub use tenant::{
    CreateTenantRequest, NewTenant, Tenant, TenantError, TenantSortKey, TenantUpdate,
    UpdateTenantRequest,
};
pub use user::{
    CompleteRegistrationRequest, CreateUserRequest, NewUser, Role, UpdateProfilePictureRequest,
    UpdateUserRequest, User, UserError, UserResponse, UserSortKey, UserStatus, UserUpdate,
};
