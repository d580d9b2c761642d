use atrium_core::AppError;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use tracing::debug;

use crate::dto::{PathPermissionQuery, PermissionCheckQuery, PermissionCheckResponse};
use crate::error::ApiResult;
use crate::state::{AppState, RequestCredentials};

pub async fn check_permission_handler(
    State(state): State<AppState>,
    Extension(credentials): Extension<RequestCredentials>,
    Query(query): Query<PermissionCheckQuery>,
) -> ApiResult<Json<PermissionCheckResponse>> {
    if query.function.is_none() && query.sub_function.is_some() {
        return Err(
            AppError::Validation("sub_function requires a function".to_owned()).into(),
        );
    }

    let Some(session) = state.session_for(&credentials).await else {
        return Ok(Json(PermissionCheckResponse { allowed: false }));
    };

    let store = session.store();
    let allowed = match (query.function.as_deref(), query.sub_function.as_deref()) {
        (Some(function), Some(sub_function)) => {
            store.is_sub_function_enabled(&query.module, function, sub_function)
        }
        (Some(function), None) => store.is_function_enabled(&query.module, function),
        _ => store.is_module_enabled(&query.module),
    };

    Ok(Json(PermissionCheckResponse { allowed }))
}

pub async fn check_path_permission_handler(
    State(state): State<AppState>,
    Extension(credentials): Extension<RequestCredentials>,
    Query(query): Query<PathPermissionQuery>,
) -> ApiResult<Json<PermissionCheckResponse>> {
    let allowed = match state.session_for(&credentials).await {
        Some(session) => session.store().has_permission_for_path(&query.path),
        None => false,
    };

    Ok(Json(PermissionCheckResponse { allowed }))
}

pub async fn refresh_permissions_handler(
    State(state): State<AppState>,
    Extension(credentials): Extension<RequestCredentials>,
) -> ApiResult<StatusCode> {
    let session = state
        .session_for(&credentials)
        .await
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let _ = session.store().spawn_refresh();
    debug!("permission refresh scheduled");

    Ok(StatusCode::ACCEPTED)
}
