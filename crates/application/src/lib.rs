//! Application services and ports.

#![forbid(unsafe_code)]

mod navigation_service;
mod permission_cache;
mod permission_ports;
mod permissions_store;

pub use navigation_service::{NavigationSelector, NavigationService};
pub use permission_cache::PermissionCache;
pub use permission_ports::{AuthenticationState, UserRoleSource};
pub use permissions_store::{PermissionsPhase, PermissionsSnapshot, PermissionsStore};
