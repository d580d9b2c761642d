use serde::{Deserialize, Serialize};

use crate::{Function, Module, UserRole};

/// Module names reserved for the employee-only navigation surface.
///
/// These never appear in the main tab bar.
pub const EMPLOYEE_SURFACE_MODULES: [&str; 2] = ["Employee Self Service", "My Workspace"];

const MASTER_MODULE_NAMES: [&str; 2] = ["master", "masters"];
const SETTINGS_MODULE_NAME: &str = "settings";

/// Module/function pair matched for the active path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentSelection {
    /// Name of the module holding the matched function.
    pub module_name: String,
    /// Name of the matched function.
    pub function_name: String,
}

/// Navigation values derived from one permission tree and one path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedNavigationState {
    /// Current module name, empty when no route matched.
    pub current_module: String,
    /// Current function name, empty when no route matched.
    pub current_function: String,
    /// Modules holding at least one active function, in tree order.
    pub available_modules: Vec<Module>,
    /// Whether the action sidebar for the current function renders.
    pub is_action_sidebar_visible: bool,
}

/// Returns modules that hold at least one active function, in tree order.
///
/// The module-level active flag is not consulted.
#[must_use]
pub fn available_modules(role: &UserRole) -> Vec<Module> {
    role.modules()
        .iter()
        .filter(|module| module.has_active_function())
        .cloned()
        .collect()
}

/// Returns the active functions of the first module whose name matches
/// case-insensitively, or an empty list.
#[must_use]
pub fn module_functions(role: &UserRole, module_name: &str) -> Vec<Function> {
    let wanted = module_name.to_lowercase();
    role.modules()
        .iter()
        .find(|module| module.name().as_str().to_lowercase() == wanted)
        .map(|module| {
            module
                .functions()
                .iter()
                .filter(|function| function.is_active())
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

/// Returns whether `path` falls under `route_pattern`.
///
/// A pattern matches itself and any path nested below it. Empty patterns
/// never match.
#[must_use]
pub fn route_matches(route_pattern: &str, path: &str) -> bool {
    if route_pattern.is_empty() {
        return false;
    }

    path == route_pattern
        || path
            .strip_prefix(route_pattern)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Finds the current module/function pair for `path`.
///
/// Modules are walked in tree order and functions in module order; the first
/// active function whose pattern matches wins, even when a later pattern is
/// more specific. With overlapping patterns such as `/a` and `/a/b`, the path
/// `/a/b/c` resolves to whichever function appears first.
#[must_use]
pub fn resolve_current(role: &UserRole, path: &str) -> Option<CurrentSelection> {
    role.modules().iter().find_map(|module| {
        module
            .functions()
            .iter()
            .find(|function| function.is_active() && route_matches(function.route_pattern(), path))
            .map(|function| CurrentSelection {
                module_name: module.name().as_str().to_owned(),
                function_name: function.name().as_str().to_owned(),
            })
    })
}

/// Derives the full navigation state for a role and path.
#[must_use]
pub fn resolve_navigation(role: &UserRole, path: &str) -> ResolvedNavigationState {
    let available_modules = available_modules(role);
    match resolve_current(role, path) {
        Some(selection) => ResolvedNavigationState {
            current_module: selection.module_name,
            current_function: selection.function_name,
            available_modules,
            is_action_sidebar_visible: true,
        },
        None => ResolvedNavigationState {
            available_modules,
            ..ResolvedNavigationState::default()
        },
    }
}

/// Orders modules for the main tab bar.
///
/// Employee-surface modules are dropped. Master modules move to the end,
/// followed by Settings; every other module keeps its relative position.
#[must_use]
pub fn order_tab_modules(modules: &[Module]) -> Vec<Module> {
    let mut regular = Vec::with_capacity(modules.len());
    let mut masters = Vec::new();
    let mut settings = Vec::new();

    for module in modules {
        let name = module.name().as_str();
        if EMPLOYEE_SURFACE_MODULES.contains(&name) {
            continue;
        }

        let lowered = name.to_lowercase();
        if MASTER_MODULE_NAMES.contains(&lowered.as_str()) {
            masters.push(module.clone());
        } else if lowered == SETTINGS_MODULE_NAME {
            settings.push(module.clone());
        } else {
            regular.push(module.clone());
        }
    }

    regular.extend(masters);
    regular.extend(settings);
    regular
}
