//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_user_role_source;
mod session_credentials;
mod user_role_payload;

pub use http_user_role_source::HttpUserRoleSource;
pub use session_credentials::SessionCredentials;
pub use user_role_payload::parse_user_role;
