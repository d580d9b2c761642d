//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod layout;
mod navigation;
mod permission;

pub use layout::{
    COMPANY_LAYOUT_TENANT_ID, HostLayoutRule, LayoutCatalog, LayoutVariant,
};
pub use navigation::{
    CurrentSelection, EMPLOYEE_SURFACE_MODULES, ResolvedNavigationState, available_modules,
    module_functions, order_tab_modules, resolve_current, resolve_navigation, route_matches,
};
pub use permission::{Function, Module, SubFunction, UserRole};
