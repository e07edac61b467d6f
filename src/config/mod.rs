// Authorization configuration

pub mod permissions;

pub use permissions::{Action, PermissionConfig, Resource};
