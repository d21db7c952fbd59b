//! Authenticated HTTP client for the club management backend.
//!
//! One `ApiClient` is shared by every endpoint service. It attaches the
//! stored bearer token to outgoing requests and enforces the session
//! contract on responses: 401 wipes the session and announces the logout,
//! 403 raises an operator-facing alert. Resource-level failures surface as
//! typed errors for the caller to handle.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tracing::warn;

use crate::alerts::{Alert, AlertBus};
use crate::error::{AppError, Result};
use crate::session::{SessionEvent, SessionEvents, SessionStore};

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    store: Arc<dyn SessionStore>,
    alerts: AlertBus,
    events: SessionEvents,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        store: Arc<dyn SessionStore>,
        alerts: AlertBus,
        events: SessionEvents,
    ) -> Self {
        ApiClient {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
            alerts,
            events,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn alerts(&self) -> &AlertBus {
        &self.alerts
    }

    pub fn session_events(&self) -> &SessionEvents {
        &self.events
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self.client.request(method, self.url(path));
        if let Some(token) = self.store.token().await {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        self.check_status(response).await
    }

    /// Maps non-success statuses into the session contract. The 401 arm runs
    /// for any request, so an expired token is wiped no matter which screen
    /// triggered the call.
    async fn check_status(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = extract_message(response).await;
        match status {
            StatusCode::UNAUTHORIZED => {
                self.store.clear().await;
                self.events.emit(SessionEvent::LoggedOut);
                Err(AppError::Unauthorized)
            }
            StatusCode::FORBIDDEN => {
                self.alerts.publish(Alert::forbidden());
                Err(AppError::Forbidden)
            }
            StatusCode::NOT_FOUND => Err(AppError::NotFound(message)),
            _ => Err(AppError::Api {
                status: status.as_u16(),
                message,
            }),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let builder = self.request(Method::GET, path).await;
        let response = self.execute(builder).await?;
        Ok(response.json().await?)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::POST, path).await.json(body);
        let response = self.execute(builder).await?;
        Ok(response.json().await?)
    }

    pub async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let builder = self.request(Method::POST, path).await.json(body);
        self.execute(builder).await?;
        Ok(())
    }

    /// POST without a body, discarding the response payload.
    pub async fn post_empty(&self, path: &str) -> Result<()> {
        let builder = self.request(Method::POST, path).await;
        self.execute(builder).await?;
        Ok(())
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(Method::PUT, path).await.json(body);
        let response = self.execute(builder).await?;
        Ok(response.json().await?)
    }

    pub async fn put_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        let builder = self.request(Method::PUT, path).await.json(body);
        self.execute(builder).await?;
        Ok(())
    }

    /// PUT without a body, discarding the response payload.
    pub async fn put_empty(&self, path: &str) -> Result<()> {
        let builder = self.request(Method::PUT, path).await;
        self.execute(builder).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        let builder = self.request(Method::DELETE, path).await;
        self.execute(builder).await?;
        Ok(())
    }

    /// DELETE carrying a JSON body (role removal uses this shape).
    pub async fn delete_with_body<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<()> {
        let builder = self.request(Method::DELETE, path).await.json(body);
        self.execute(builder).await?;
        Ok(())
    }
}

/// Pulls a human-readable message out of an error response. The backend
/// usually answers `{"message": …}`; problem-details bodies carry `title`;
/// anything else is passed through raw.
async fn extract_message(response: Response) -> String {
    match response.text().await {
        Ok(text) if !text.is_empty() => serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("title"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or(text),
        _ => "Request failed".to_string(),
    }
}

/// Runs a fire-and-forget operation: an error is logged at warn level and
/// discarded. Call sites whose control flow must not depend on the outcome
/// route through here instead of `?`.
pub async fn best_effort<F, T>(operation: &str, fut: F) -> Option<T>
where
    F: Future<Output = Result<T>>,
{
    match fut.await {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{} failed: {}", operation, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(
            base,
            Arc::new(MemorySessionStore::new()),
            AlertBus::new(),
            SessionEvents::new(),
        )
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let c = client("http://localhost:5000/api/");
        assert_eq!(c.base_url(), "http://localhost:5000/api");
        assert_eq!(c.url("/clubs"), "http://localhost:5000/api/clubs");
    }

    #[tokio::test]
    async fn test_best_effort_swallows_errors() {
        let outcome: Option<()> =
            best_effort("doomed call", async { Err(AppError::NotFound("gone".into())) }).await;
        assert!(outcome.is_none());

        let outcome = best_effort("fine call", async { Ok(5) }).await;
        assert_eq!(outcome, Some(5));
    }
}
