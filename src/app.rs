// Application state shared across handlers
use std::sync::Arc;

use crate::{
    app_config::AppConfig,
    db::DieselPool,
    services::{
        AuthService, EmailService, GuestService, JwtService, PasswordResetService,
        ReservationService, RoomService, TenantService, UserService,
    },
};

// Cloned into every handler; services share the pool
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub diesel_pool: DieselPool,
    pub jwt_service: Arc<JwtService>,
    pub email_service: EmailService,
    pub auth_service: AuthService,
    pub password_reset_service: PasswordResetService,
    pub user_service: UserService,
    pub tenant_service: TenantService,
    pub guest_service: GuestService,
    pub room_service: RoomService,
    pub reservation_service: ReservationService,
}

impl AppState {
    /// Wire every service onto one pool
    pub fn new(
        config: Arc<AppConfig>,
        diesel_pool: DieselPool,
        jwt_service: Arc<JwtService>,
        email_service: EmailService,
    ) -> Self {
        Self {
            auth_service: AuthService::new(diesel_pool.clone(), jwt_service.clone()),
            password_reset_service: PasswordResetService::new(
                diesel_pool.clone(),
                email_service.clone(),
                jwt_service.clone(),
                config.security.clone(),
            ),
            user_service: UserService::new(
                diesel_pool.clone(),
                email_service.clone(),
                config.security.clone(),
            ),
            tenant_service: TenantService::new(diesel_pool.clone()),
            guest_service: GuestService::new(diesel_pool.clone()),
            room_service: RoomService::new(diesel_pool.clone()),
            reservation_service: ReservationService::new(
                diesel_pool.clone(),
                config.business.clone(),
            ),
            config,
            diesel_pool,
            jwt_service,
            email_service,
        }
    }
}
