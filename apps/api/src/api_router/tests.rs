use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use atrium_domain::LayoutCatalog;
use axum::Router;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use serde_json::{Value, json};
use url::Url;

use crate::sessions::SessionRegistry;
use crate::state::AppState;

use super::build_router;

const USER_ROLE: &str = r#"{"modules":[
    {"id":1,"name":"Settings","active":1,"functions":[
        {"id":10,"name":"Preferences","route":"/settings","action":"open","active":1}
    ]},
    {"id":2,"name":"Tickets","active":1,"functions":[
        {"id":20,"name":"Create","route":"/tickets/create","action":"create","active":1,
         "sub_functions":[{"id":200,"name":"Approve","active":1,"enabled":1}]},
        {"id":21,"name":"Archive","route":"/tickets/archive","action":"archive","active":0}
    ]},
    {"id":3,"name":"Master","active":1,"functions":[
        {"id":30,"name":"Sites","route":"/master/sites","action":"open","active":1}
    ]},
    {"id":4,"name":"Visitors","active":1,"functions":[
        {"id":40,"name":"Invite","route":"/visitors/invite","action":"invite","active":1}
    ]}
]}"#;

async fn user_role(headers: HeaderMap) -> (StatusCode, String) {
    let token = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    match token {
        "Bearer token-1" => (StatusCode::OK, USER_ROLE.to_owned()),
        "Bearer flaky" => (StatusCode::SERVICE_UNAVAILABLE, "maintenance".to_owned()),
        _ => (StatusCode::UNAUTHORIZED, String::new()),
    }
}

async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap_or_else(|_| unreachable!());
    let address = listener.local_addr().unwrap_or_else(|_| unreachable!());
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    address
}

async fn spawn_api() -> String {
    let backend = spawn(Router::new().route("/api/user-role", get(user_role))).await;
    let endpoint = Url::parse(&format!("http://{backend}/api/user-role"))
        .unwrap_or_else(|_| unreachable!());
    let app_state = AppState {
        sessions: Arc::new(SessionRegistry::new(
            reqwest::Client::new(),
            endpoint,
            Duration::from_secs(5),
        )),
        layout_catalog: Arc::new(LayoutCatalog::builtin()),
    };
    let router =
        build_router(app_state, "http://localhost:3000").unwrap_or_else(|_| unreachable!());

    format!("http://{}", spawn(router).await)
}

async fn get_json(url: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut request = reqwest::Client::new().get(url);
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    let response = request.send().await.unwrap_or_else(|_| unreachable!());
    let status = StatusCode::from_u16(response.status().as_u16())
        .unwrap_or_else(|_| unreachable!());

    (status, response.json().await.unwrap_or_default())
}

async fn navigate(base: &str, token: &str, path: &str) -> Value {
    reqwest::Client::new()
        .post(format!("{base}/api/navigation"))
        .bearer_auth(token)
        .json(&json!({ "path": path }))
        .send()
        .await
        .unwrap_or_else(|_| unreachable!())
        .json()
        .await
        .unwrap_or_default()
}

#[tokio::test]
async fn health_reports_ok() {
    let base = spawn_api().await;

    let (status, body) = get_json(&format!("{base}/health"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn anonymous_requests_are_answered_as_unauthenticated() {
    let base = spawn_api().await;

    let (status, state) = get_json(&format!("{base}/api/navigation"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["permissions"]["phase"], "unauthenticated");
    assert_eq!(state["is_action_sidebar_visible"], false);

    let (_, check) =
        get_json(&format!("{base}/api/permissions/check?module=Tickets"), None).await;
    assert_eq!(check["allowed"], false);
}

#[tokio::test]
async fn navigation_resolves_current_selection() {
    let base = spawn_api().await;

    let state = navigate(&base, "token-1", "/tickets/create/42").await;

    assert_eq!(state["current_module"], "Tickets");
    assert_eq!(state["current_function"], "Create");
    assert_eq!(state["is_action_sidebar_visible"], true);
    assert_eq!(state["permissions"]["phase"], "ready");
    assert_eq!(state["available_modules"].as_array().map(Vec::len), Some(4));

    let state = navigate(&base, "token-1", "/unknown").await;
    assert_eq!(state["current_module"], "");
    assert_eq!(state["is_action_sidebar_visible"], false);
}

#[tokio::test]
async fn tabs_move_master_and_settings_to_the_end() {
    let base = spawn_api().await;
    navigate(&base, "token-1", "/visitors/invite").await;

    let (_, tabs) = get_json(&format!("{base}/api/navigation/tabs"), Some("token-1")).await;
    let names: Vec<&str> = tabs
        .as_array()
        .map(|modules| modules.iter().filter_map(|module| module["name"].as_str()).collect())
        .unwrap_or_default();

    assert_eq!(names, vec!["Tickets", "Visitors", "Master", "Settings"]);
}

#[tokio::test]
async fn point_queries_follow_loaded_tree() {
    let base = spawn_api().await;
    navigate(&base, "token-1", "/tickets/create").await;

    let check = |query: &str| {
        let url = format!("{base}/api/permissions/check?{query}");
        async move { get_json(&url, Some("token-1")).await.1["allowed"].clone() }
    };

    assert_eq!(check("module=Tickets").await, true);
    assert_eq!(check("module=tickets").await, false);
    assert_eq!(check("module=Tickets&function=Archive").await, false);
    assert_eq!(
        check("module=Tickets&function=Create&sub_function=Approve").await,
        true
    );
    assert_eq!(check("module=Payroll").await, false);

    let (_, path) = get_json(
        &format!("{base}/api/permissions/path?path=/master/sites/3"),
        Some("token-1"),
    )
    .await;
    assert_eq!(path["allowed"], true);

    let (_, functions) = get_json(
        &format!("{base}/api/modules/tickets/functions"),
        Some("token-1"),
    )
    .await;
    assert_eq!(functions.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn sub_function_without_function_is_rejected() {
    let base = spawn_api().await;

    let (status, body) = get_json(
        &format!("{base}/api/permissions/check?module=Tickets&sub_function=Approve"),
        Some("token-1"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().is_some());
}

#[tokio::test]
async fn failing_backend_never_blocks_navigation() {
    let base = spawn_api().await;

    let state = navigate(&base, "flaky", "/tickets/create").await;

    assert_eq!(state["permissions"]["phase"], "error");
    assert!(state["permissions"]["error"].as_str().is_some());
    assert_eq!(state["is_action_sidebar_visible"], false);
}

#[tokio::test]
async fn refresh_is_accepted() {
    let base = spawn_api().await;
    navigate(&base, "token-1", "/tickets/create").await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/permissions/refresh"))
        .bearer_auth("token-1")
        .send()
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(response.status().as_u16(), 202);
}

#[tokio::test]
async fn ending_session_requires_a_token() {
    let base = spawn_api().await;
    navigate(&base, "token-1", "/tickets/create").await;
    let client = reqwest::Client::new();

    let anonymous = client
        .delete(format!("{base}/api/session"))
        .send()
        .await
        .unwrap_or_else(|_| unreachable!());
    let signed_in = client
        .delete(format!("{base}/api/session"))
        .bearer_auth("token-1")
        .send()
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(anonymous.status().as_u16(), 401);
    assert_eq!(signed_in.status().as_u16(), 204);
}

#[tokio::test]
async fn unsupported_authorization_scheme_is_rejected() {
    let base = spawn_api().await;

    let response = reqwest::Client::new()
        .get(format!("{base}/api/navigation"))
        .header("authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn layout_prefers_hostname_then_company_table() {
    let base = spawn_api().await;

    let (_, partner) =
        get_json(&format!("{base}/api/layout?hostname=PartnerA.example.com"), None).await;
    assert_eq!(partner["theme"], "partnerA");

    let (_, company) =
        get_json(&format!("{base}/api/layout?tenant_id=1&company_id=101"), None).await;
    assert_eq!(company["sidebar"], "compact");

    let (_, other_tenant) =
        get_json(&format!("{base}/api/layout?tenant_id=2&company_id=101"), None).await;
    assert_eq!(other_tenant["theme"], "default");
}
