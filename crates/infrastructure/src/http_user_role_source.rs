use std::sync::Arc;

use async_trait::async_trait;
use atrium_application::UserRoleSource;
use atrium_core::{AppError, AppResult};
use atrium_domain::UserRole;
use reqwest::StatusCode;
use reqwest::header;
use tracing::debug;
use url::Url;

use crate::{SessionCredentials, parse_user_role};

/// HTTP adapter loading the permission tree from the console backend.
pub struct HttpUserRoleSource {
    http_client: reqwest::Client,
    endpoint: Url,
    credentials: Arc<SessionCredentials>,
}

impl HttpUserRoleSource {
    /// Creates a source calling `endpoint` with the session's bearer token.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        endpoint: Url,
        credentials: Arc<SessionCredentials>,
    ) -> Self {
        Self {
            http_client,
            endpoint,
            credentials,
        }
    }
}

#[async_trait]
impl UserRoleSource for HttpUserRoleSource {
    async fn fetch_user_role(&self) -> AppResult<UserRole> {
        let access_token = self.credentials.access_token().ok_or_else(|| {
            AppError::Unauthorized("session has no access token".to_owned())
        })?;

        let response = self
            .http_client
            .get(self.endpoint.clone())
            .bearer_auth(access_token.expose())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| {
                AppError::Unavailable(format!("failed to call user role endpoint: {error}"))
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AppError::Unauthorized(format!(
                "user role endpoint rejected credentials with status {}",
                status.as_u16()
            )));
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(AppError::Unavailable(format!(
                "user role endpoint returned status {}: {body}",
                status.as_u16()
            )));
        }

        let body = response.bytes().await.map_err(|error| {
            AppError::Unavailable(format!("failed to read user role response body: {error}"))
        })?;
        let role = parse_user_role(&body)?;
        debug!(
            endpoint = %self.endpoint,
            module_count = role.modules().len(),
            "fetched user role"
        );

        Ok(role)
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use atrium_application::UserRoleSource;
    use atrium_core::{AccessToken, AppError};
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use url::Url;

    use crate::SessionCredentials;

    use super::HttpUserRoleSource;

    async fn user_role(headers: HeaderMap) -> (StatusCode, String) {
        let authorized = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            == Some("Bearer token-1");
        if !authorized {
            return (StatusCode::UNAUTHORIZED, String::new());
        }

        (
            StatusCode::OK,
            r#"{"modules":[{"id":1,"name":"Tickets","active":1,"functions":[
                {"id":2,"name":"Create","route":"/tickets/create","action":"create","active":1}
            ]}]}"#
                .to_owned(),
        )
    }

    async fn spawn_backend() -> SocketAddr {
        let router = Router::new()
            .route("/api/user-role", get(user_role))
            .route(
                "/api/broken",
                get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
            )
            .route("/api/garbage", get(|| async { "not json" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|_| unreachable!());
        let address = listener.local_addr().unwrap_or_else(|_| unreachable!());
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        address
    }

    fn source(address: SocketAddr, path: &str, token: &str) -> HttpUserRoleSource {
        let endpoint = Url::parse(&format!("http://{address}{path}"))
            .unwrap_or_else(|_| unreachable!());
        let token = AccessToken::new(token).unwrap_or_else(|_| unreachable!());

        HttpUserRoleSource::new(
            reqwest::Client::new(),
            endpoint,
            Arc::new(SessionCredentials::signed_in(token)),
        )
    }

    #[tokio::test]
    async fn fetches_and_parses_tree() {
        let address = spawn_backend().await;

        let role = source(address, "/api/user-role", "token-1")
            .fetch_user_role()
            .await;

        let role = role.unwrap_or_default();
        assert_eq!(role.modules().len(), 1);
        assert_eq!(role.modules()[0].functions()[0].route_pattern(), "/tickets/create");
    }

    #[tokio::test]
    async fn rejected_credentials_map_to_unauthorized() {
        let address = spawn_backend().await;

        let result = source(address, "/api/user-role", "stale")
            .fetch_user_role()
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn server_errors_map_to_unavailable() {
        let address = spawn_backend().await;

        let result = source(address, "/api/broken", "token-1")
            .fetch_user_role()
            .await;

        assert!(
            matches!(result, Err(AppError::Unavailable(message)) if message.contains("502"))
        );
    }

    #[tokio::test]
    async fn non_json_body_maps_to_malformed() {
        let address = spawn_backend().await;

        let result = source(address, "/api/garbage", "token-1")
            .fetch_user_role()
            .await;

        assert!(matches!(result, Err(AppError::Malformed(_))));
    }

    #[tokio::test]
    async fn signed_out_session_never_calls_backend() {
        let address = spawn_backend().await;
        let endpoint = Url::parse(&format!("http://{address}/api/user-role"))
            .unwrap_or_else(|_| unreachable!());
        let source = HttpUserRoleSource::new(
            reqwest::Client::new(),
            endpoint,
            Arc::new(SessionCredentials::default()),
        );

        let result = source.fetch_user_role().await;

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn unreachable_backend_maps_to_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|_| unreachable!());
        let address = listener.local_addr().unwrap_or_else(|_| unreachable!());
        drop(listener);

        let result = source(address, "/api/user-role", "token-1")
            .fetch_user_role()
            .await;

        assert!(matches!(result, Err(AppError::Unavailable(_))));
    }
}
