use atrium_domain::{Function, Module, available_modules, module_functions, resolve_current};

use super::*;

impl PermissionsStore {
    /// Returns whether the module is enabled.
    pub fn is_module_enabled(&self, module_name: &str) -> bool {
        self.query(
            |cache| cache.is_module_enabled(module_name),
            |role| role.grants_module(module_name),
        )
    }

    /// Returns whether the function is enabled within the module.
    pub fn is_function_enabled(&self, module_name: &str, function_name: &str) -> bool {
        self.query(
            |cache| cache.is_function_enabled(module_name, function_name),
            |role| role.grants_function(module_name, function_name),
        )
    }

    /// Returns whether the sub-function is enabled within the function.
    pub fn is_sub_function_enabled(
        &self,
        module_name: &str,
        function_name: &str,
        sub_function_name: &str,
    ) -> bool {
        self.query(
            |cache| cache.is_sub_function_enabled(module_name, function_name, sub_function_name),
            |role| role.grants_sub_function(module_name, function_name, sub_function_name),
        )
    }

    /// Returns whether an active function's route covers `path`.
    pub fn has_permission_for_path(&self, path: &str) -> bool {
        self.state
            .borrow()
            .user_role
            .as_deref()
            .is_some_and(|role| resolve_current(role, path).is_some())
    }

    /// Returns modules holding at least one active function.
    pub fn available_modules(&self) -> Vec<Module> {
        self.state
            .borrow()
            .user_role
            .as_deref()
            .map(available_modules)
            .unwrap_or_default()
    }

    /// Returns active functions of the module, matched case-insensitively.
    pub fn module_functions(&self, module_name: &str) -> Vec<Function> {
        self.state
            .borrow()
            .user_role
            .as_deref()
            .map(|role| module_functions(role, module_name))
            .unwrap_or_default()
    }

    // A cached grant is trusted as is, and so is any answer while no tree is
    // loaded. A cached denial with a loaded tree is re-checked against it.
    fn query(
        &self,
        cached: impl FnOnce(&PermissionCache) -> bool,
        live: impl FnOnce(&UserRole) -> bool,
    ) -> bool {
        let snapshot = self.state.borrow();
        let cached_value = cached(&snapshot.cache);
        match snapshot.user_role.as_deref() {
            Some(role) if !cached_value => live(role),
            _ => cached_value,
        }
    }
}
