// Services module
// Business logic layer; every service receives the pool at construction

pub mod analytics;
pub mod auth;
pub mod email;
pub mod guest;
pub mod guest_status;
pub mod jwt;
pub mod password_reset;
pub mod reservation;
pub mod room;
pub mod tenant;
pub mod user;

// Re-export commonly used services
pub use analytics::{AnalyticsReservation, ReservationAnalytics, WeekBucket};
pub use auth::{AuthService, LoginOutcome};
pub use email::{EmailError, EmailService};
pub use guest::GuestService;
pub use guest_status::compute_guest_status;
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use password_reset::PasswordResetService;
pub use reservation::ReservationService;
pub use room::RoomService;
pub use tenant::TenantService;
pub use user::UserService;
