use std::sync::Arc;

use atrium_core::AccessToken;
use atrium_domain::LayoutCatalog;

use crate::sessions::{ConsoleSession, SessionRegistry};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionRegistry>,
    pub layout_catalog: Arc<LayoutCatalog>,
}

impl AppState {
    /// Returns the caller's session, or `None` for anonymous requests.
    pub async fn session_for(
        &self,
        credentials: &RequestCredentials,
    ) -> Option<Arc<ConsoleSession>> {
        match &credentials.0 {
            Some(access_token) => Some(self.sessions.session(access_token.clone()).await),
            None => None,
        }
    }
}

/// Bearer token carried by the current request, if any.
#[derive(Debug, Clone, Default)]
pub struct RequestCredentials(pub Option<AccessToken>);
