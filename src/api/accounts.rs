use serde::Serialize;

use crate::error::Result;
use crate::http::ApiClient;
use crate::models::Account;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordRequest<'a> {
    new_password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RoleRequest<'a> {
    role_name: &'a str,
}

#[derive(Clone)]
pub struct AccountsApi {
    client: ApiClient,
}

impl AccountsApi {
    pub fn new(client: ApiClient) -> Self {
        AccountsApi { client }
    }

    pub async fn list(&self) -> Result<Vec<Account>> {
        self.client.get("/admin/accounts").await
    }

    pub async fn get(&self, id: i64) -> Result<Account> {
        self.client.get(&format!("/admin/accounts/{}", id)).await
    }

    pub async fn lock(&self, id: i64) -> Result<()> {
        self.client
            .put_empty(&format!("/admin/accounts/{}/lock", id))
            .await
    }

    pub async fn activate(&self, id: i64) -> Result<()> {
        self.client
            .put_empty(&format!("/admin/accounts/{}/activate", id))
            .await
    }

    pub async fn reset_password(&self, id: i64, new_password: &str) -> Result<()> {
        self.client
            .put_unit(
                &format!("/admin/accounts/{}/reset-password", id),
                &ResetPasswordRequest { new_password },
            )
            .await
    }

    pub async fn add_role(&self, id: i64, role_name: &str) -> Result<()> {
        self.client
            .post_unit(
                &format!("/admin/accounts/{}/roles", id),
                &RoleRequest { role_name },
            )
            .await
    }

    pub async fn remove_role(&self, id: i64, role_name: &str) -> Result<()> {
        self.client
            .delete_with_body(
                &format!("/admin/accounts/{}/roles", id),
                &RoleRequest { role_name },
            )
            .await
    }
}
