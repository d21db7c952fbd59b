use serde::Serialize;

use crate::error::Result;
use crate::http::ApiClient;
use crate::models::{Club, ClubMember, MembershipRequest, RequestStatus};

#[derive(Debug, Serialize)]
struct RejectMembershipBody<'a> {
    reason: &'a str,
}

/// Club-scoped operations available to leaders of those clubs.
#[derive(Clone)]
pub struct LeaderClubsApi {
    client: ApiClient,
}

impl LeaderClubsApi {
    pub fn new(client: ApiClient) -> Self {
        LeaderClubsApi { client }
    }

    /// Clubs led by the authenticated account.
    pub async fn clubs(&self) -> Result<Vec<Club>> {
        self.client.get("/leader/clubs").await
    }

    pub async fn club(&self, club_id: i64) -> Result<Club> {
        self.client.get(&format!("/leader/clubs/{}", club_id)).await
    }

    pub async fn membership_requests(
        &self,
        club_id: i64,
        status: RequestStatus,
    ) -> Result<Vec<MembershipRequest>> {
        self.client
            .get(&format!(
                "/leader/clubs/{}/membership-requests?status={}",
                club_id,
                status.as_str()
            ))
            .await
    }

    pub async fn approve_membership(&self, club_id: i64, request_id: i64) -> Result<()> {
        self.client
            .post_empty(&format!(
                "/leader/clubs/{}/membership-requests/{}/approve",
                club_id, request_id
            ))
            .await
    }

    pub async fn reject_membership(
        &self,
        club_id: i64,
        request_id: i64,
        reason: &str,
    ) -> Result<()> {
        self.client
            .post_unit(
                &format!(
                    "/leader/clubs/{}/membership-requests/{}/reject",
                    club_id, request_id
                ),
                &RejectMembershipBody { reason },
            )
            .await
    }

    pub async fn members(&self, club_id: i64) -> Result<Vec<ClubMember>> {
        self.client
            .get(&format!("/leader/clubs/{}/members", club_id))
            .await
    }
}
