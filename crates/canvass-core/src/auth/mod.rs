//! Identity capability injected into request handlers.
//!
//! There is no session state anywhere: handlers hand the bearer token (if
//! any) to the provider and get back a user id. Stores scope every query by
//! that id.

use std::sync::Arc;

use crate::error::ServerError;

pub trait AuthProvider: Send + Sync {
    /// Resolve the calling user from an optional bearer token.
    fn authenticate(&self, bearer: Option<&str>) -> Result<String, ServerError>;
}

/// Single-token auth: one configured bearer token maps to one user id.
pub struct TokenAuth {
    token: String,
    user_id: String,
}

impl TokenAuth {
    pub fn new(token: String, user_id: String) -> Self {
        Self { token, user_id }
    }
}

impl AuthProvider for TokenAuth {
    fn authenticate(&self, bearer: Option<&str>) -> Result<String, ServerError> {
        match bearer {
            Some(token) if token == self.token => Ok(self.user_id.clone()),
            Some(_) => Err(ServerError::Unauthorized("Invalid API token".to_string())),
            None => Err(ServerError::Unauthorized("Missing bearer token".to_string())),
        }
    }
}

/// Fixed-identity auth for development and CLI use.
pub struct StaticAuth {
    user_id: String,
}

impl StaticAuth {
    pub fn new(user_id: String) -> Self {
        Self { user_id }
    }
}

impl AuthProvider for StaticAuth {
    fn authenticate(&self, _bearer: Option<&str>) -> Result<String, ServerError> {
        Ok(self.user_id.clone())
    }
}

/// Build the provider from the environment: token auth when
/// `CANVASS_API_TOKEN` is set, otherwise a static local identity.
pub fn from_env() -> Arc<dyn AuthProvider> {
    let user_id = std::env::var("CANVASS_USER_ID").unwrap_or_else(|_| "local".to_string());
    match std::env::var("CANVASS_API_TOKEN") {
        Ok(token) if !token.is_empty() => Arc::new(TokenAuth::new(token, user_id)),
        _ => Arc::new(StaticAuth::new(user_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_auth_accepts_configured_token() {
        let auth = TokenAuth::new("secret".to_string(), "alice".to_string());
        assert_eq!(auth.authenticate(Some("secret")).unwrap(), "alice");
    }

    #[test]
    fn test_token_auth_rejects_wrong_or_missing_token() {
        let auth = TokenAuth::new("secret".to_string(), "alice".to_string());
        assert!(matches!(
            auth.authenticate(Some("nope")),
            Err(ServerError::Unauthorized(_))
        ));
        assert!(matches!(
            auth.authenticate(None),
            Err(ServerError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_static_auth_ignores_token() {
        let auth = StaticAuth::new("local".to_string());
        assert_eq!(auth.authenticate(None).unwrap(), "local");
        assert_eq!(auth.authenticate(Some("anything")).unwrap(), "local");
    }
}
