use serde::Serialize;

use crate::error::Result;
use crate::http::ApiClient;
use crate::models::Club;

/// Partial update body; absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub founded_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Clone)]
pub struct ClubsApi {
    client: ApiClient,
}

impl ClubsApi {
    pub fn new(client: ApiClient) -> Self {
        ClubsApi { client }
    }

    pub async fn list(&self) -> Result<Vec<Club>> {
        self.client.get("/clubs").await
    }

    pub async fn get(&self, id: i64) -> Result<Club> {
        self.client.get(&format!("/clubs/{}", id)).await
    }

    pub async fn update(&self, id: i64, update: &ClubUpdate) -> Result<()> {
        self.client
            .put_unit(&format!("/clubs/{}", id), update)
            .await
    }

    pub async fn remove(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("/clubs/{}", id)).await
    }
}
