use crate::core::api::ApiClient;
use crate::domain::model::{AuthResponse, Credentials, Registration, User, UserRole};
use crate::domain::ports::{AUTH_TOKEN_KEY, USER_KEY};
use crate::utils::error::Result;

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Signs in and, when the answer carries a token, persists it together with
    /// the returned user.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        let response: AuthResponse = self.client.post("/auth/login", Some(credentials)).await?;

        if let Some(token) = &response.token {
            let store = self.client.store();
            store.set(AUTH_TOKEN_KEY, token)?;
            match &response.user {
                Some(user) => store.set(USER_KEY, &serde_json::to_string(user)?)?,
                None => store.remove(USER_KEY)?,
            }
            tracing::info!("✅ Signed in as {}", credentials.email);
        } else {
            tracing::warn!("Login answered without a token, nothing stored");
        }

        Ok(response)
    }

    pub async fn register(&self, registration: &Registration) -> Result<serde_json::Value> {
        tracing::info!("Registering {}", registration.email);
        self.client.post("/auth/register", Some(registration)).await
    }

    pub fn logout(&self) {
        self.client.clear_credentials();
        tracing::info!("Signed out");
    }

    pub fn current_user(&self) -> Result<Option<User>> {
        match self.client.store().get(USER_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.client.store().get(AUTH_TOKEN_KEY), Ok(Some(_)))
    }

    pub fn has_role(&self, role: UserRole) -> bool {
        matches!(self.current_user(), Ok(Some(user)) if user.role == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(UserRole::Admin)
    }
}

impl ApiClient {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use crate::domain::ports::KeyValueStore;
    use httpmock::prelude::*;
    use std::sync::Arc;

    fn credentials() -> Credentials {
        Credentials {
            email: "admin@autorent.ru".to_string(),
            password: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_persists_token_and_user() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/auth/login")
                .json_body(serde_json::json!({"email": "admin@autorent.ru", "password": "secret"}));
            then.status(200).json_body(serde_json::json!({
                "token": "jwt-123",
                "user": {"id": "U1", "name": "Admin", "email": "admin@autorent.ru", "role": "admin"}
            }));
        });

        let store = Arc::new(MemoryStore::new());
        let client = ApiClient::new(server.base_url(), store.clone());
        let auth = client.auth();

        assert!(!auth.is_authenticated());
        let response = auth.login(&credentials()).await.unwrap();

        mock.assert();
        assert_eq!(response.token.as_deref(), Some("jwt-123"));
        assert_eq!(store.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("jwt-123"));
        assert!(auth.is_authenticated());
        assert!(auth.is_admin());
        assert_eq!(auth.current_user().unwrap().unwrap().name, "Admin");

        auth.logout();
        assert!(!auth.is_authenticated());
        assert!(auth.current_user().unwrap().is_none());
        assert!(!auth.is_admin());
    }

    #[tokio::test]
    async fn test_login_without_token_stores_nothing() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/auth/login");
            then.status(200).json_body(serde_json::json!({"twoFactorRequired": true}));
        });

        let store = Arc::new(MemoryStore::new());
        let client = ApiClient::new(server.base_url(), store.clone());
        let response = client.auth().login(&credentials()).await.unwrap();

        assert!(response.token.is_none());
        assert!(store.get(AUTH_TOKEN_KEY).unwrap().is_none());
        assert!(store.get(USER_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_with_unlisted_role_keeps_token() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/auth/login");
            then.status(200).json_body(serde_json::json!({
                "token": "jwt-777",
                "user": {"id": "U9", "name": "Auditor", "email": "audit@autorent.ru", "role": "auditor"}
            }));
        });

        let store = Arc::new(MemoryStore::new());
        let client = ApiClient::new(server.base_url(), store.clone());
        let response = client.auth().login(&credentials()).await.unwrap();

        assert_eq!(response.user.unwrap().role, UserRole::Unknown);
        assert_eq!(store.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("jwt-777"));
        assert!(client.auth().is_authenticated());
        assert!(!client.auth().is_admin());
    }

    #[tokio::test]
    async fn test_failed_login_propagates_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/auth/login");
            then.status(422).json_body(serde_json::json!({"message": "invalid credentials"}));
        });

        let client = ApiClient::new(server.base_url(), Arc::new(MemoryStore::new()));
        let err = client.auth().login(&credentials()).await.unwrap_err();
        assert!(matches!(err, crate::RentalError::HttpStatus { status: 422, .. }));
    }

    #[test]
    fn test_manager_is_not_admin() {
        let store = Arc::new(MemoryStore::new());
        store.set(AUTH_TOKEN_KEY, "t").unwrap();
        store
            .set(USER_KEY, r#"{"id":"U2","name":"Maria","email":"m@autorent.ru","role":"manager"}"#)
            .unwrap();

        let client = ApiClient::new("http://localhost", store);
        assert!(client.auth().is_authenticated());
        assert!(client.auth().has_role(UserRole::Manager));
        assert!(!client.auth().is_admin());
    }
}
