use atrium_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Permission tree granted to one authenticated principal.
///
/// Module order is significant: it drives route resolution and tab order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    modules: Vec<Module>,
}

impl UserRole {
    /// Creates a permission tree from modules in backend order.
    #[must_use]
    pub fn new(modules: Vec<Module>) -> Self {
        Self { modules }
    }

    /// Returns modules in tree order.
    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Returns whether any module with this exact name is active.
    #[must_use]
    pub fn grants_module(&self, module_name: &str) -> bool {
        self.modules
            .iter()
            .any(|module| module.name().as_str() == module_name && module.is_active())
    }

    /// Returns whether any matching module holds an active function with this name.
    #[must_use]
    pub fn grants_function(&self, module_name: &str, function_name: &str) -> bool {
        self.functions_named(module_name, function_name)
            .any(Function::is_active)
    }

    /// Returns whether any matching function holds an active and enabled sub-function.
    #[must_use]
    pub fn grants_sub_function(
        &self,
        module_name: &str,
        function_name: &str,
        sub_function_name: &str,
    ) -> bool {
        self.functions_named(module_name, function_name)
            .flat_map(Function::sub_functions)
            .any(|sub_function| {
                sub_function.display_name().as_str() == sub_function_name
                    && sub_function.is_granted()
            })
    }

    fn functions_named<'a>(
        &'a self,
        module_name: &'a str,
        function_name: &'a str,
    ) -> impl Iterator<Item = &'a Function> + 'a {
        self.modules
            .iter()
            .filter(move |module| module.name().as_str() == module_name)
            .flat_map(Module::functions)
            .filter(move |function| function.name().as_str() == function_name)
    }
}

/// Top-level functional grouping such as "Tickets".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    id: String,
    name: NonEmptyString,
    active: bool,
    functions: Vec<Function>,
}

impl Module {
    /// Creates a validated module.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        active: bool,
        functions: Vec<Function>,
    ) -> AppResult<Self> {
        Ok(Self {
            id: id.into(),
            name: NonEmptyString::new(name)?,
            active,
            functions,
        })
    }

    /// Returns the backend identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the module name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the module-level active flag.
    ///
    /// Availability does not consult this flag, only point queries do.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns functions in tree order.
    #[must_use]
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// Returns whether the module holds at least one active function.
    #[must_use]
    pub fn has_active_function(&self) -> bool {
        self.functions.iter().any(Function::is_active)
    }
}

/// Navigable action or page inside a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    id: String,
    name: NonEmptyString,
    route_pattern: String,
    action_name: String,
    active: bool,
    sub_functions: Vec<SubFunction>,
}

impl Function {
    /// Creates a validated function.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        route_pattern: impl Into<String>,
        action_name: impl Into<String>,
        active: bool,
        sub_functions: Vec<SubFunction>,
    ) -> AppResult<Self> {
        Ok(Self {
            id: id.into(),
            name: NonEmptyString::new(name)?,
            route_pattern: route_pattern.into().trim().to_owned(),
            action_name: action_name.into(),
            active,
            sub_functions,
        })
    }

    /// Returns the backend identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the function name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the route pattern, empty when the function is not routable.
    #[must_use]
    pub fn route_pattern(&self) -> &str {
        self.route_pattern.as_str()
    }

    /// Returns the action name used by UI consumers.
    #[must_use]
    pub fn action_name(&self) -> &str {
        self.action_name.as_str()
    }

    /// Returns the active flag.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns sub-functions in tree order.
    #[must_use]
    pub fn sub_functions(&self) -> &[SubFunction] {
        &self.sub_functions
    }
}

/// Finest-grained permission unit, used for point checks only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubFunction {
    id: String,
    display_name: NonEmptyString,
    active: bool,
    enabled: bool,
}

impl SubFunction {
    /// Creates a validated sub-function.
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        active: bool,
        enabled: bool,
    ) -> AppResult<Self> {
        Ok(Self {
            id: id.into(),
            display_name: NonEmptyString::new(display_name)?,
            active,
            enabled,
        })
    }

    /// Returns the backend identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the display name used as permission key.
    #[must_use]
    pub fn display_name(&self) -> &NonEmptyString {
        &self.display_name
    }

    /// Returns the active flag.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the enabled flag.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns whether both flags are set.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        self.active && self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::{Function, Module, SubFunction, UserRole};

    fn role() -> UserRole {
        let approve = SubFunction::new("s1", "Approve", true, true);
        let export = SubFunction::new("s2", "Export", true, false);
        let create = Function::new(
            "f1",
            "Create",
            "/tickets/create",
            "create",
            true,
            vec![approve.unwrap_or_else(|_| unreachable!()), export.unwrap_or_else(|_| unreachable!())],
        );
        let tickets = Module::new(
            "m1",
            "Tickets",
            true,
            vec![create.unwrap_or_else(|_| unreachable!())],
        );

        UserRole::new(vec![tickets.unwrap_or_else(|_| unreachable!())])
    }

    #[test]
    fn module_requires_non_empty_name() {
        assert!(Module::new("m1", "  ", true, Vec::new()).is_err());
    }

    #[test]
    fn function_route_pattern_is_trimmed() {
        let function = Function::new("f1", "List", " /assets ", "list", true, Vec::new());
        assert_eq!(
            function.map(|value| value.route_pattern().to_owned()).ok(),
            Some("/assets".to_owned())
        );
    }

    #[test]
    fn sub_function_requires_both_flags() {
        let role = role();
        assert!(role.grants_sub_function("Tickets", "Create", "Approve"));
        assert!(!role.grants_sub_function("Tickets", "Create", "Export"));
    }

    #[test]
    fn live_tree_lookups_are_case_sensitive() {
        let role = role();
        assert!(role.grants_function("Tickets", "Create"));
        assert!(!role.grants_function("tickets", "Create"));
    }
}
