use async_trait::async_trait;
use atrium_core::AppResult;
use atrium_domain::UserRole;

/// Port for loading the permission tree of the signed-in user.
#[async_trait]
pub trait UserRoleSource: Send + Sync {
    /// Fetches the current permission tree.
    ///
    /// Transport failures surface as `AppError::Unavailable` and payloads of
    /// unexpected shape as `AppError::Malformed`.
    async fn fetch_user_role(&self) -> AppResult<UserRole>;
}

/// Port answering whether a user is currently signed in.
pub trait AuthenticationState: Send + Sync {
    /// Returns whether the session holds valid credentials.
    fn is_authenticated(&self) -> bool;
}
