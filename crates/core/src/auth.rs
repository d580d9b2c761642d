use std::fmt::{Debug, Formatter};

use crate::{AppError, AppResult};

/// Bearer credential issued to a signed-in console user.
///
/// The value is never printed; `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AccessToken(String);

impl AccessToken {
    /// Creates an access token from a raw bearer value.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Unauthorized(
                "access token must not be empty".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Parses the value of an `Authorization` header carrying a bearer token.
    pub fn from_authorization_header(value: &str) -> AppResult<Self> {
        let (scheme, token) = value.trim().split_once(' ').ok_or_else(|| {
            AppError::Unauthorized("authorization header must use the Bearer scheme".to_owned())
        })?;

        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(AppError::Unauthorized(format!(
                "unsupported authorization scheme '{scheme}'"
            )));
        }

        Self::new(token)
    }

    /// Returns the raw bearer value.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl Debug for AccessToken {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("AccessToken(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::AccessToken;

    #[test]
    fn parses_bearer_header_case_insensitively() {
        let token = AccessToken::from_authorization_header("bearer abc.def");
        assert_eq!(token.map(|value| value.expose().to_owned()), Ok("abc.def".to_owned()));
    }

    #[test]
    fn rejects_basic_scheme() {
        assert!(AccessToken::from_authorization_header("Basic dXNlcjpwYXNz").is_err());
    }

    #[test]
    fn debug_output_is_redacted() {
        let token = AccessToken::new("secret-value");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("secret-value"));
    }
}
