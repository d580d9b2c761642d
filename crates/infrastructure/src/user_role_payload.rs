use atrium_core::{AppError, AppResult};
use atrium_domain::{Function, Module, SubFunction, UserRole};
use serde::{Deserialize, Deserializer};
use tracing::warn;

/// Parses and validates a user-role response body.
///
/// The top-level object must carry a `modules` array and every field must
/// have a compatible type, otherwise the payload is rejected as malformed.
/// Entries without a usable name are dropped.
pub fn parse_user_role(body: &[u8]) -> AppResult<UserRole> {
    let payload = serde_json::from_slice::<UserRolePayload>(body).map_err(|error| {
        AppError::Malformed(format!("user role payload does not match schema: {error}"))
    })?;

    Ok(payload.into_user_role())
}

#[derive(Debug, Deserialize)]
struct UserRolePayload {
    modules: Vec<ModulePayload>,
}

#[derive(Debug, Deserialize)]
struct ModulePayload {
    #[serde(default, deserialize_with = "identifier")]
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    active: bool,
    #[serde(default)]
    functions: Option<Vec<FunctionPayload>>,
}

#[derive(Debug, Deserialize)]
struct FunctionPayload {
    #[serde(default, deserialize_with = "identifier")]
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "routePattern", alias = "route_pattern")]
    route: Option<String>,
    #[serde(default, alias = "actionName", alias = "action_name")]
    action: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    active: bool,
    #[serde(default, alias = "subFunctions")]
    sub_functions: Option<Vec<SubFunctionPayload>>,
}

#[derive(Debug, Deserialize)]
struct SubFunctionPayload {
    #[serde(default, deserialize_with = "identifier")]
    id: String,
    #[serde(default, alias = "displayName", alias = "display_name")]
    name: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    active: bool,
    #[serde(default, deserialize_with = "flag")]
    enabled: bool,
}

impl UserRolePayload {
    fn into_user_role(self) -> UserRole {
        UserRole::new(
            self.modules
                .into_iter()
                .filter_map(ModulePayload::into_module)
                .collect(),
        )
    }
}

impl ModulePayload {
    fn into_module(self) -> Option<Module> {
        let functions = self
            .functions
            .unwrap_or_default()
            .into_iter()
            .filter_map(FunctionPayload::into_function)
            .collect();
        let id = self.id;

        Module::new(id.clone(), self.name.unwrap_or_default(), self.active, functions)
            .map_err(|error| {
                warn!(module_id = %id, error = %error, "dropping permission module without name");
            })
            .ok()
    }
}

impl FunctionPayload {
    fn into_function(self) -> Option<Function> {
        let sub_functions = self
            .sub_functions
            .unwrap_or_default()
            .into_iter()
            .filter_map(SubFunctionPayload::into_sub_function)
            .collect();
        let id = self.id;

        Function::new(
            id.clone(),
            self.name.unwrap_or_default(),
            self.route.unwrap_or_default(),
            self.action.unwrap_or_default(),
            self.active,
            sub_functions,
        )
        .map_err(|error| {
            warn!(function_id = %id, error = %error, "dropping permission function without name");
        })
        .ok()
    }
}

impl SubFunctionPayload {
    fn into_sub_function(self) -> Option<SubFunction> {
        let id = self.id;

        SubFunction::new(
            id.clone(),
            self.name.unwrap_or_default(),
            self.active,
            self.enabled,
        )
        .map_err(|error| {
            warn!(sub_function_id = %id, error = %error, "dropping permission sub-function without name");
        })
        .ok()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

// Backends send flags as booleans, 0/1 integers or their string forms.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<FlagValue>::deserialize(deserializer)? {
        None => false,
        Some(FlagValue::Bool(value)) => value,
        Some(FlagValue::Integer(value)) => value != 0,
        Some(FlagValue::Text(value)) => {
            matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true")
        }
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdentifierValue {
    Integer(i64),
    Text(String),
}

fn identifier<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<IdentifierValue>::deserialize(deserializer)? {
        None => String::new(),
        Some(IdentifierValue::Integer(value)) => value.to_string(),
        Some(IdentifierValue::Text(value)) => value,
    })
}
