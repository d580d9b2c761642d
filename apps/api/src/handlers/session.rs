use atrium_core::AppError;
use axum::Extension;
use axum::extract::State;
use axum::http::StatusCode;

use crate::error::ApiResult;
use crate::state::{AppState, RequestCredentials};

pub async fn end_session_handler(
    State(state): State<AppState>,
    Extension(credentials): Extension<RequestCredentials>,
) -> ApiResult<StatusCode> {
    let access_token = credentials
        .0
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    state.sessions.end(&access_token).await;
    Ok(StatusCode::NO_CONTENT)
}
