use atrium_application::PermissionsSnapshot;
use atrium_domain::{Function, LayoutVariant, Module, ResolvedNavigationState, SubFunction};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/sub-function-response.ts"
)]
pub struct SubFunctionResponse {
    pub id: String,
    pub display_name: String,
    pub active: bool,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/function-response.ts"
)]
pub struct FunctionResponse {
    pub id: String,
    pub name: String,
    pub route_pattern: String,
    pub action_name: String,
    pub active: bool,
    pub sub_functions: Vec<SubFunctionResponse>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/module-response.ts"
)]
pub struct ModuleResponse {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub functions: Vec<FunctionResponse>,
}

/// Load status of the permission tree behind a navigation response.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/permission-status-response.ts"
)]
pub struct PermissionStatusResponse {
    pub phase: String,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/navigation-state-response.ts"
)]
pub struct NavigationStateResponse {
    pub current_module: String,
    pub current_function: String,
    pub is_action_sidebar_visible: bool,
    pub available_modules: Vec<ModuleResponse>,
    pub permissions: PermissionStatusResponse,
}

#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/navigate-request.ts"
)]
pub struct NavigateRequest {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct PermissionCheckQuery {
    pub module: String,
    pub function: Option<String>,
    pub sub_function: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PathPermissionQuery {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/permission-check-response.ts"
)]
pub struct PermissionCheckResponse {
    pub allowed: bool,
}

#[derive(Debug, Deserialize)]
pub struct LayoutQuery {
    pub hostname: Option<String>,
    pub tenant_id: Option<String>,
    pub company_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/layout-response.ts"
)]
pub struct LayoutResponse {
    pub sidebar: String,
    pub header: String,
    pub theme: String,
}

impl From<&SubFunction> for SubFunctionResponse {
    fn from(value: &SubFunction) -> Self {
        Self {
            id: value.id().to_owned(),
            display_name: value.display_name().as_str().to_owned(),
            active: value.is_active(),
            enabled: value.is_enabled(),
        }
    }
}

impl From<&Function> for FunctionResponse {
    fn from(value: &Function) -> Self {
        Self {
            id: value.id().to_owned(),
            name: value.name().as_str().to_owned(),
            route_pattern: value.route_pattern().to_owned(),
            action_name: value.action_name().to_owned(),
            active: value.is_active(),
            sub_functions: value
                .sub_functions()
                .iter()
                .map(SubFunctionResponse::from)
                .collect(),
        }
    }
}

impl From<&Module> for ModuleResponse {
    fn from(value: &Module) -> Self {
        Self {
            id: value.id().to_owned(),
            name: value.name().as_str().to_owned(),
            active: value.is_active(),
            functions: value.functions().iter().map(FunctionResponse::from).collect(),
        }
    }
}

impl From<&PermissionsSnapshot> for PermissionStatusResponse {
    fn from(value: &PermissionsSnapshot) -> Self {
        Self {
            phase: value.phase.as_str().to_owned(),
            loading: value.is_loading(),
            error: value.error.clone(),
        }
    }
}

impl NavigationStateResponse {
    pub fn new(state: &ResolvedNavigationState, snapshot: &PermissionsSnapshot) -> Self {
        Self {
            current_module: state.current_module.clone(),
            current_function: state.current_function.clone(),
            is_action_sidebar_visible: state.is_action_sidebar_visible,
            available_modules: state
                .available_modules
                .iter()
                .map(ModuleResponse::from)
                .collect(),
            permissions: PermissionStatusResponse::from(snapshot),
        }
    }
}

impl From<LayoutVariant> for LayoutResponse {
    fn from(value: LayoutVariant) -> Self {
        Self {
            sidebar: value.sidebar,
            header: value.header,
            theme: value.theme,
        }
    }
}
