use serde::Serialize;

use crate::error::Result;
use crate::http::ApiClient;
use crate::models::Activity;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Clone)]
pub struct ActivitiesApi {
    client: ApiClient,
}

impl ActivitiesApi {
    pub fn new(client: ApiClient) -> Self {
        ActivitiesApi { client }
    }

    pub async fn list(&self) -> Result<Vec<Activity>> {
        self.client.get("/activities").await
    }

    pub async fn for_club(&self, club_id: i64) -> Result<Vec<Activity>> {
        self.client
            .get(&format!("/activities/club/{}", club_id))
            .await
    }

    pub async fn get(&self, id: i64) -> Result<Activity> {
        self.client.get(&format!("/activities/{}", id)).await
    }

    pub async fn update(&self, id: i64, update: &ActivityUpdate) -> Result<()> {
        self.client
            .put_unit(&format!("/activities/{}", id), update)
            .await
    }

    pub async fn remove(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("/activities/{}", id)).await
    }
}
