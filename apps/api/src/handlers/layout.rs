use atrium_core::TenantId;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, header};

use crate::dto::{LayoutQuery, LayoutResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn layout_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LayoutQuery>,
) -> ApiResult<Json<LayoutResponse>> {
    let hostname = query
        .hostname
        .filter(|value| !value.trim().is_empty())
        .or_else(|| request_host(&headers))
        .unwrap_or_default();
    let tenant_id = query
        .tenant_id
        .filter(|value| !value.trim().is_empty())
        .map(TenantId::new)
        .transpose()?;

    let variant = state.layout_catalog.select_layout(
        &hostname,
        tenant_id.as_ref().map(TenantId::as_str).unwrap_or_default(),
        query.company_id.as_deref(),
    );

    Ok(Json(LayoutResponse::from(variant)))
}

fn request_host(headers: &HeaderMap) -> Option<String> {
    let host = headers.get(header::HOST)?.to_str().ok()?;
    let hostname = host
        .rsplit_once(':')
        .filter(|(_, port)| port.chars().all(|character| character.is_ascii_digit()))
        .map_or(host, |(hostname, _)| hostname);

    Some(hostname.to_owned())
}
