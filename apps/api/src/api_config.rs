use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use atrium_core::AppError;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_host: String,
    pub api_port: u16,
    pub frontend_url: String,
    pub permissions_endpoint: Url,
    pub permissions_fetch_timeout: Duration,
    pub session_idle_timeout: Duration,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3002);
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let base_url = required_non_empty_env("PERMISSIONS_API_BASE_URL")?;
        let endpoint_path = env::var("PERMISSIONS_ENDPOINT_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "/api/user-role".to_owned());
        let permissions_endpoint = permissions_endpoint(&base_url, &endpoint_path)?;

        let permissions_fetch_timeout =
            Duration::from_millis(optional_u64_env("PERMISSIONS_FETCH_TIMEOUT_MS", 15_000)?);
        let session_idle_timeout =
            Duration::from_secs(optional_u64_env("SESSION_IDLE_TIMEOUT_SECS", 1_800)?);

        Ok(Self {
            api_host,
            api_port,
            frontend_url,
            permissions_endpoint,
            permissions_fetch_timeout,
            session_idle_timeout,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn permissions_endpoint(base_url: &str, endpoint_path: &str) -> Result<Url, AppError> {
    let base = Url::parse(base_url).map_err(|error| {
        AppError::Validation(format!("invalid PERMISSIONS_API_BASE_URL: {error}"))
    })?;

    base.join(endpoint_path).map_err(|error| {
        AppError::Validation(format!("invalid PERMISSIONS_ENDPOINT_PATH: {error}"))
    })
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn optional_u64_env(name: &str, default: u64) -> Result<u64, AppError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<u64>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        _ => Ok(default),
    }
}
