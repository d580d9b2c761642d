mod cors;

use atrium_core::AppError;
use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{delete, get, post};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let console_routes = Router::new()
        .route(
            "/api/navigation",
            get(handlers::navigation::navigation_state_handler)
                .post(handlers::navigation::navigate_handler),
        )
        .route(
            "/api/navigation/tabs",
            get(handlers::navigation::tab_modules_handler),
        )
        .route(
            "/api/modules/{module_name}/functions",
            get(handlers::navigation::module_functions_handler),
        )
        .route(
            "/api/permissions/check",
            get(handlers::permissions::check_permission_handler),
        )
        .route(
            "/api/permissions/path",
            get(handlers::permissions::check_path_permission_handler),
        )
        .route(
            "/api/permissions/refresh",
            post(handlers::permissions::refresh_permissions_handler),
        )
        .route(
            "/api/session",
            delete(handlers::session::end_session_handler),
        )
        .route_layer(from_fn(middleware::extract_credentials));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/api/layout", get(handlers::layout::layout_handler))
        .merge(console_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}

#[cfg(test)]
mod tests;
