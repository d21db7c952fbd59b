use crate::error::Result;
use crate::http::ApiClient;
use crate::models::UnreadNotification;

/// Server-side notification state. The live feed arrives over the hub; this
/// service covers the catch-up read on startup and the read receipts.
#[derive(Clone)]
pub struct NotificationApi {
    client: ApiClient,
}

impl NotificationApi {
    pub fn new(client: ApiClient) -> Self {
        NotificationApi { client }
    }

    /// Unread notifications for the authenticated account.
    pub async fn unread(&self) -> Result<Vec<UnreadNotification>> {
        self.client.get("/notification").await
    }

    /// Marks one notification read. Ids coming from the live feed are opaque
    /// strings, so the id is escaped into the path as-is; synthetic ids the
    /// server never issued simply 404.
    pub async fn mark_read(&self, id: &str) -> Result<()> {
        self.client
            .post_empty(&format!("/notification/read/{}", urlencoding::encode(id)))
            .await
    }
}
