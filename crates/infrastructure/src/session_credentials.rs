use std::sync::RwLock;

use atrium_application::AuthenticationState;
use atrium_core::AccessToken;
use tracing::debug;

/// Bearer credentials held by one console session.
///
/// The session counts as authenticated while a token is present.
#[derive(Debug, Default)]
pub struct SessionCredentials {
    access_token: RwLock<Option<AccessToken>>,
}

impl SessionCredentials {
    /// Creates credentials for a signed-in session.
    #[must_use]
    pub fn signed_in(access_token: AccessToken) -> Self {
        Self {
            access_token: RwLock::new(Some(access_token)),
        }
    }

    /// Returns the current token, if the session is signed in.
    ///
    /// A poisoned lock reads as signed out.
    #[must_use]
    pub fn access_token(&self) -> Option<AccessToken> {
        self.access_token
            .read()
            .ok()
            .and_then(|token| token.clone())
    }

    /// Replaces the token after a sign-in or token refresh.
    pub fn sign_in(&self, access_token: AccessToken) {
        match self.access_token.write() {
            Ok(mut token) => *token = Some(access_token),
            Err(poisoned) => *poisoned.into_inner() = Some(access_token),
        }
        debug!("session credentials replaced");
    }

    /// Drops the token.
    pub fn sign_out(&self) {
        match self.access_token.write() {
            Ok(mut token) => *token = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
        debug!("session credentials cleared");
    }
}

impl AuthenticationState for SessionCredentials {
    fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }
}

#[cfg(test)]
mod tests {
    use atrium_application::AuthenticationState;
    use atrium_core::AccessToken;

    use super::SessionCredentials;

    #[test]
    fn sign_out_revokes_authentication() {
        let token = AccessToken::new("token-1").unwrap_or_else(|_| unreachable!());
        let credentials = SessionCredentials::signed_in(token);
        assert!(credentials.is_authenticated());

        credentials.sign_out();
        assert!(!credentials.is_authenticated());
        assert!(credentials.access_token().is_none());
    }

    #[test]
    fn default_credentials_are_signed_out() {
        assert!(!SessionCredentials::default().is_authenticated());
    }
}
