use serde::Serialize;

use crate::error::Result;
use crate::http::ApiClient;
use crate::models::{LeaderRequest, LeaderRequestStats};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApproveBody<'a> {
    admin_note: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RejectBody<'a> {
    reject_reason: &'a str,
}

/// Club-leader promotion requests reviewed by administrators.
#[derive(Clone)]
pub struct LeaderRequestsApi {
    client: ApiClient,
}

impl LeaderRequestsApi {
    pub fn new(client: ApiClient) -> Self {
        LeaderRequestsApi { client }
    }

    /// Pending requests awaiting review.
    pub async fn list(&self) -> Result<Vec<LeaderRequest>> {
        self.client.get("/club-leader-requests").await
    }

    pub async fn stats(&self) -> Result<LeaderRequestStats> {
        self.client
            .get("/admin/accounts/leader-requests/stats")
            .await
    }

    pub async fn approved(&self) -> Result<Vec<LeaderRequest>> {
        self.client
            .get("/admin/accounts/leader-requests/approved")
            .await
    }

    pub async fn rejected(&self) -> Result<Vec<LeaderRequest>> {
        self.client
            .get("/admin/accounts/leader-requests/rejected")
            .await
    }

    pub async fn approve(&self, id: i64, admin_note: &str) -> Result<()> {
        self.client
            .put_unit(
                &format!("/club-leader-requests/{}/approve", id),
                &ApproveBody { admin_note },
            )
            .await
    }

    pub async fn reject(&self, id: i64, reject_reason: &str) -> Result<()> {
        self.client
            .put_unit(
                &format!("/club-leader-requests/{}/reject", id),
                &RejectBody { reject_reason },
            )
            .await
    }
}
