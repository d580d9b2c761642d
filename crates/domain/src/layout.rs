use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Tenant id whose users get company-specific layouts.
///
/// Company layouts are only rolled out for this one tenant; every other
/// tenant falls through to the default variant.
pub const COMPANY_LAYOUT_TENANT_ID: &str = "1";

const DEFAULT_VARIANT_NAME: &str = "default";

/// Sidebar, header and theme combination rendered by the console shell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoutVariant {
    /// Sidebar implementation name.
    pub sidebar: String,
    /// Header implementation name.
    pub header: String,
    /// Theme name.
    pub theme: String,
}

impl LayoutVariant {
    /// Creates a variant from its three parts.
    #[must_use]
    pub fn new(
        sidebar: impl Into<String>,
        header: impl Into<String>,
        theme: impl Into<String>,
    ) -> Self {
        Self {
            sidebar: sidebar.into(),
            header: header.into(),
            theme: theme.into(),
        }
    }

    /// Creates a variant that uses the same name for every part.
    #[must_use]
    pub fn uniform(name: &str) -> Self {
        Self::new(name, name, name)
    }
}

impl Default for LayoutVariant {
    fn default() -> Self {
        Self::uniform(DEFAULT_VARIANT_NAME)
    }
}

/// Hostname override applied before any tenant rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostLayoutRule {
    host_fragment: String,
    variant: LayoutVariant,
}

impl HostLayoutRule {
    /// Creates a rule matching hostnames that contain `host_fragment`.
    #[must_use]
    pub fn new(host_fragment: impl Into<String>, variant: LayoutVariant) -> Self {
        Self {
            host_fragment: host_fragment.into().to_ascii_lowercase(),
            variant,
        }
    }

    /// Returns the lower-cased hostname fragment.
    #[must_use]
    pub fn host_fragment(&self) -> &str {
        self.host_fragment.as_str()
    }

    /// Returns the variant selected by this rule.
    #[must_use]
    pub fn variant(&self) -> &LayoutVariant {
        &self.variant
    }

    fn matches(&self, hostname: &str) -> bool {
        !self.host_fragment.is_empty() && hostname.contains(self.host_fragment.as_str())
    }
}

/// Static layout table consulted by [`LayoutCatalog::select_layout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutCatalog {
    host_rules: Vec<HostLayoutRule>,
    company_tenant_id: String,
    company_layouts: HashMap<String, LayoutVariant>,
    fallback: LayoutVariant,
}

impl LayoutCatalog {
    /// Creates a catalog from explicit rules.
    #[must_use]
    pub fn new(
        host_rules: Vec<HostLayoutRule>,
        company_tenant_id: impl Into<String>,
        company_layouts: HashMap<String, LayoutVariant>,
    ) -> Self {
        Self {
            host_rules,
            company_tenant_id: company_tenant_id.into(),
            company_layouts,
            fallback: LayoutVariant::default(),
        }
    }

    /// Returns the catalog shipped with the console.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(
            vec![
                HostLayoutRule::new("partnera", LayoutVariant::uniform("partnerA")),
                HostLayoutRule::new("partnerb", LayoutVariant::uniform("partnerB")),
            ],
            COMPANY_LAYOUT_TENANT_ID,
            HashMap::from([
                (
                    "101".to_owned(),
                    LayoutVariant::new("compact", "branded", "harbor"),
                ),
                (
                    "102".to_owned(),
                    LayoutVariant::new("compact", "default", "evergreen"),
                ),
                (
                    "205".to_owned(),
                    LayoutVariant::new("expanded", "branded", "slate"),
                ),
            ]),
        )
    }

    /// Returns hostname rules in precedence order.
    #[must_use]
    pub fn host_rules(&self) -> &[HostLayoutRule] {
        &self.host_rules
    }

    /// Selects the layout for a request.
    ///
    /// Hostname rules win unconditionally. Company layouts apply only to the
    /// company-layout tenant and only for companies listed in the table.
    /// Everything else renders the default variant.
    #[must_use]
    pub fn select_layout(
        &self,
        hostname: &str,
        tenant_id: &str,
        company_id: Option<&str>,
    ) -> LayoutVariant {
        let hostname = hostname.trim().to_ascii_lowercase();
        if let Some(rule) = self.host_rules.iter().find(|rule| rule.matches(&hostname)) {
            return rule.variant().clone();
        }

        if tenant_id.trim() == self.company_tenant_id
            && let Some(variant) = company_id.and_then(|id| self.company_layouts.get(id.trim()))
        {
            return variant.clone();
        }

        self.fallback.clone()
    }
}

impl Default for LayoutCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
