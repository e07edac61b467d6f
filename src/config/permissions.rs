// Role permissions per resource
// Routes ask for a (resource, action) pair; the allowed roles live here

use crate::models::user::Role;

pub const ALL_ROLES: &[Role] = &[Role::SuperAdmin, Role::Admin, Role::Employee];
pub const ADMIN_ROLES: &[Role] = &[Role::SuperAdmin, Role::Admin];
pub const SUPER_ADMIN_ONLY: &[Role] = &[Role::SuperAdmin];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Guests,
    Rooms,
    Reservations,
    Users,
    Tenants,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    List,
    Read,
    Update,
    Delete,
}

pub struct PermissionConfig;

impl PermissionConfig {
    /// Roles allowed to perform `action` on `resource`
    pub fn allowed_roles(resource: Resource, action: Action) -> &'static [Role] {
        match (resource, action) {
            (Resource::Guests | Resource::Rooms | Resource::Reservations, _) => ALL_ROLES,
            // Reading or updating a single user is further limited to self or admin
            (Resource::Users, Action::Create | Action::List | Action::Delete) => ADMIN_ROLES,
            (Resource::Users, Action::Read | Action::Update) => ALL_ROLES,
            (Resource::Tenants, _) => SUPER_ADMIN_ONLY,
        }
    }

    pub fn is_allowed(role: Role, resource: Resource, action: Action) -> bool {
        Self::allowed_roles(resource, action).contains(&role)
    }
}
