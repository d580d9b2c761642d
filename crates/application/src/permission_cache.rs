use std::collections::HashMap;

use atrium_domain::UserRole;

type FunctionKey = (String, String);
type SubFunctionKey = (String, String, String);

/// Flattened lookup tables built from one permission tree.
///
/// Keys are exact names. A missing key reads as denied. When the tree holds
/// duplicate names, the entry that appears last in tree order wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionCache {
    modules: HashMap<String, bool>,
    functions: HashMap<FunctionKey, bool>,
    sub_functions: HashMap<SubFunctionKey, bool>,
}

impl PermissionCache {
    /// Creates an empty cache that denies everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cache from a permission tree.
    #[must_use]
    pub fn from_role(role: &UserRole) -> Self {
        let mut cache = Self::new();
        cache.store(role);
        cache
    }

    /// Replaces the whole cache content with the flattened tree.
    pub fn store(&mut self, role: &UserRole) {
        self.modules.clear();
        self.functions.clear();
        self.sub_functions.clear();

        for module in role.modules() {
            let module_name = module.name().as_str();
            self.modules.insert(module_name.to_owned(), module.is_active());

            for function in module.functions() {
                let function_name = function.name().as_str();
                self.functions.insert(
                    (module_name.to_owned(), function_name.to_owned()),
                    function.is_active(),
                );

                for sub_function in function.sub_functions() {
                    self.sub_functions.insert(
                        (
                            module_name.to_owned(),
                            function_name.to_owned(),
                            sub_function.display_name().as_str().to_owned(),
                        ),
                        sub_function.is_granted(),
                    );
                }
            }
        }
    }

    /// Returns the cached module flag.
    #[must_use]
    pub fn is_module_enabled(&self, module_name: &str) -> bool {
        self.modules.get(module_name).copied().unwrap_or(false)
    }

    /// Returns the cached function flag.
    #[must_use]
    pub fn is_function_enabled(&self, module_name: &str, function_name: &str) -> bool {
        self.functions
            .get(&(module_name.to_owned(), function_name.to_owned()))
            .copied()
            .unwrap_or(false)
    }

    /// Returns the cached sub-function grant.
    #[must_use]
    pub fn is_sub_function_enabled(
        &self,
        module_name: &str,
        function_name: &str,
        sub_function_name: &str,
    ) -> bool {
        self.sub_functions
            .get(&(
                module_name.to_owned(),
                function_name.to_owned(),
                sub_function_name.to_owned(),
            ))
            .copied()
            .unwrap_or(false)
    }

    /// Returns the number of cached entries across all three tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len() + self.functions.len() + self.sub_functions.len()
    }

    /// Returns whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use atrium_domain::{Function, Module, SubFunction, UserRole};

    use super::PermissionCache;

    fn role(function_active: bool) -> UserRole {
        let sub_functions = vec![
            SubFunction::new("s1", "Approve", true, true).unwrap_or_else(|_| unreachable!()),
            SubFunction::new("s2", "Reopen", true, false).unwrap_or_else(|_| unreachable!()),
        ];
        let functions = vec![
            Function::new("f1", "Create", "/tickets/create", "create", function_active, sub_functions)
                .unwrap_or_else(|_| unreachable!()),
        ];

        UserRole::new(vec![
            Module::new("m1", "Tickets", true, functions).unwrap_or_else(|_| unreachable!()),
        ])
    }

    #[test]
    fn flattens_every_level() {
        let cache = PermissionCache::from_role(&role(true));

        assert!(cache.is_module_enabled("Tickets"));
        assert!(cache.is_function_enabled("Tickets", "Create"));
        assert!(cache.is_sub_function_enabled("Tickets", "Create", "Approve"));
        assert!(!cache.is_sub_function_enabled("Tickets", "Create", "Reopen"));
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn unknown_keys_are_denied() {
        let cache = PermissionCache::from_role(&role(true));

        assert!(!cache.is_module_enabled("Assets"));
        assert!(!cache.is_function_enabled("Tickets", "Delete"));
        assert!(!cache.is_sub_function_enabled("Assets", "Create", "Approve"));
    }

    #[test]
    fn store_overwrites_previous_content() {
        let mut cache = PermissionCache::from_role(&role(true));
        cache.store(&UserRole::default());

        assert!(cache.is_empty());
        assert!(!cache.is_function_enabled("Tickets", "Create"));
    }

    #[test]
    fn rebuilding_from_equal_trees_yields_equal_caches() {
        let first = PermissionCache::from_role(&role(false));
        let second = PermissionCache::from_role(&role(false));

        assert_eq!(first, second);
        assert!(!first.is_function_enabled("Tickets", "Create"));
    }

    #[test]
    fn later_duplicate_module_overwrites_earlier_entry() {
        let role = UserRole::new(vec![
            Module::new("m1", "Assets", true, Vec::new()).unwrap_or_else(|_| unreachable!()),
            Module::new("m2", "Assets", false, Vec::new()).unwrap_or_else(|_| unreachable!()),
        ]);

        assert!(!PermissionCache::from_role(&role).is_module_enabled("Assets"));
    }
}
