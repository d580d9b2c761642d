use atrium_application::PermissionsSnapshot;
use atrium_domain::ResolvedNavigationState;
use axum::extract::{Path, State};
use axum::{Extension, Json};

use crate::dto::{FunctionResponse, ModuleResponse, NavigateRequest, NavigationStateResponse};
use crate::error::ApiResult;
use crate::state::{AppState, RequestCredentials};

pub async fn navigation_state_handler(
    State(state): State<AppState>,
    Extension(credentials): Extension<RequestCredentials>,
) -> ApiResult<Json<NavigationStateResponse>> {
    let response = match state.session_for(&credentials).await {
        Some(session) => NavigationStateResponse::new(
            &session.navigation().state(),
            &session.store().snapshot(),
        ),
        None => anonymous_state(),
    };

    Ok(Json(response))
}

pub async fn navigate_handler(
    State(state): State<AppState>,
    Extension(credentials): Extension<RequestCredentials>,
    Json(payload): Json<NavigateRequest>,
) -> ApiResult<Json<NavigationStateResponse>> {
    let response = match state.session_for(&credentials).await {
        Some(session) => {
            let resolved = session.navigation().navigate(&payload.path).await;
            NavigationStateResponse::new(&resolved, &session.store().snapshot())
        }
        None => anonymous_state(),
    };

    Ok(Json(response))
}

pub async fn tab_modules_handler(
    State(state): State<AppState>,
    Extension(credentials): Extension<RequestCredentials>,
) -> ApiResult<Json<Vec<ModuleResponse>>> {
    let modules = match state.session_for(&credentials).await {
        Some(session) => session
            .navigation()
            .tab_modules()
            .iter()
            .map(ModuleResponse::from)
            .collect(),
        None => Vec::new(),
    };

    Ok(Json(modules))
}

pub async fn module_functions_handler(
    State(state): State<AppState>,
    Extension(credentials): Extension<RequestCredentials>,
    Path(module_name): Path<String>,
) -> ApiResult<Json<Vec<FunctionResponse>>> {
    let functions = match state.session_for(&credentials).await {
        Some(session) => session
            .navigation()
            .module_functions(&module_name)
            .iter()
            .map(FunctionResponse::from)
            .collect(),
        None => Vec::new(),
    };

    Ok(Json(functions))
}

fn anonymous_state() -> NavigationStateResponse {
    NavigationStateResponse::new(
        &ResolvedNavigationState::default(),
        &PermissionsSnapshot::unauthenticated(),
    )
}
