//! Route guard for pages that need a signed-in user.
//!
//! A request is authorized when a token is stored and, if a role is required,
//! the stored user has exactly that role. Anything else (including unreadable
//! storage) sends the caller to the login route, remembering where it came from.

use crate::core::auth::AuthApi;
use crate::domain::model::{User, UserRole};
use crate::utils::error::{RentalError, Result};

pub fn require_auth(
    auth: &AuthApi<'_>,
    required_role: Option<UserRole>,
    from: &str,
) -> Result<Option<User>> {
    let denied = || RentalError::unauthorized(Some(from.to_string()));

    if !auth.is_authenticated() {
        tracing::debug!("No stored token, redirecting {} to login", from);
        return Err(denied());
    }

    let user = auth.current_user().map_err(|e| {
        tracing::error!("Failed to check authorization: {}", e);
        denied()
    })?;

    let Some(role) = required_role else {
        return Ok(user);
    };

    match user {
        Some(user) if user.role == role => Ok(Some(user)),
        Some(user) => {
            tracing::warn!(
                "User {} has role '{}', '{}' required for {}",
                user.email,
                user.role.as_str(),
                role.as_str(),
                from
            );
            Err(denied())
        }
        None => {
            tracing::debug!("Token present but no stored user for {}", from);
            Err(denied())
        }
    }
}

pub fn require_admin(auth: &AuthApi<'_>, from: &str) -> Result<User> {
    require_auth(auth, Some(UserRole::Admin), from)?
        .ok_or_else(|| RentalError::unauthorized(Some(from.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use crate::core::api::ApiClient;
    use crate::domain::ports::{KeyValueStore, AUTH_TOKEN_KEY, USER_KEY};
    use std::sync::Arc;

    fn client_with(token: Option<&str>, user: Option<&str>) -> ApiClient {
        let store = Arc::new(MemoryStore::new());
        if let Some(token) = token {
            store.set(AUTH_TOKEN_KEY, token).unwrap();
        }
        if let Some(user) = user {
            store.set(USER_KEY, user).unwrap();
        }
        ApiClient::new("http://localhost", store)
    }

    const ADMIN: &str = r#"{"id":"U1","name":"Admin","email":"admin@autorent.ru","role":"admin"}"#;
    const CUSTOMER: &str = r#"{"id":"U3","name":"Ivan","email":"ivan@example.com","role":"user"}"#;

    #[test]
    fn test_anonymous_is_redirected_with_origin() {
        let client = client_with(None, None);
        match require_auth(&client.auth(), None, "/checkout") {
            Err(RentalError::Unauthorized { redirect, from }) => {
                assert_eq!(redirect, "/login");
                assert_eq!(from.as_deref(), Some("/checkout"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_any_signed_in_user_passes_without_role() {
        let client = client_with(Some("t"), Some(CUSTOMER));
        let user = require_auth(&client.auth(), None, "/checkout").unwrap();
        assert_eq!(user.unwrap().id, "U3");
    }

    #[test]
    fn test_role_must_match_exactly() {
        let client = client_with(Some("t"), Some(CUSTOMER));
        match require_admin(&client.auth(), "/admin") {
            Err(RentalError::Unauthorized { redirect, from }) => {
                assert_eq!(redirect, "/login");
                assert_eq!(from.as_deref(), Some("/admin"));
            }
            other => panic!("unexpected: {:?}", other),
        }

        let auditor = r#"{"id":"U4","name":"Audit","email":"audit@example.com","role":"auditor"}"#;
        let client = client_with(Some("t"), Some(auditor));
        assert!(matches!(
            require_admin(&client.auth(), "/admin"),
            Err(RentalError::Unauthorized { .. })
        ));

        let client = client_with(Some("t"), Some(ADMIN));
        assert_eq!(require_admin(&client.auth(), "/admin").unwrap().role, UserRole::Admin);
        assert!(require_auth(&client.auth(), Some(UserRole::Manager), "/admin/bookings").is_err());
    }

    #[test]
    fn test_corrupt_user_is_treated_as_unauthorized() {
        let client = client_with(Some("t"), Some("{not json"));
        assert!(matches!(
            require_auth(&client.auth(), None, "/admin"),
            Err(RentalError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_token_without_user_passes_only_without_role() {
        let client = client_with(Some("t"), None);
        assert!(require_auth(&client.auth(), None, "/profile").unwrap().is_none());
        assert!(require_admin(&client.auth(), "/admin").is_err());
    }
}
