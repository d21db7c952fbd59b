use serde::Serialize;

use crate::error::Result;
use crate::http::ApiClient;
use crate::models::LoginResponse;

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        AuthApi { client }
    }

    /// Exchanges credentials for a bearer token and persists both the token
    /// and the operator identity in the session store.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let response: LoginResponse = self
            .client
            .post("/auth/login", &LoginRequest { username, password })
            .await?;

        self.client.session().store_token(&response.token).await;
        self.client.session().store_identity(&response.user).await;
        Ok(response)
    }

    /// Local sign-out. The backend holds no revocable session state; the
    /// token simply stops being sent.
    pub async fn logout(&self) {
        self.client.session().clear().await;
    }
}
