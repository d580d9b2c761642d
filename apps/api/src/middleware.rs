use atrium_core::AccessToken;
use axum::extract::Request;
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiResult;
use crate::state::RequestCredentials;

/// Reads the bearer token into [`RequestCredentials`].
///
/// Requests without an `Authorization` header continue as anonymous. A header
/// using another scheme is rejected.
pub async fn extract_credentials(mut request: Request, next: Next) -> ApiResult<Response> {
    let access_token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .map(AccessToken::from_authorization_header)
        .transpose()?;

    request
        .extensions_mut()
        .insert(RequestCredentials(access_token));
    Ok(next.run(request).await)
}
