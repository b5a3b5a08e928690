//! Staff account administration (admin role only)

use hisris_domain::constants::ADMIN_USERS_PATH;
use hisris_domain::{CreateUser, UpdateUser, UserProfile};
use tracing::instrument;

use super::client::ApiClient;
use super::errors::ApiError;

#[derive(Debug, Clone, Copy)]
pub struct AdminApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn admin(&self) -> AdminApi<'_> {
        AdminApi { client: self }
    }
}

impl AdminApi<'_> {
    /// All staff accounts, ordered by username
    pub async fn users(&self) -> Result<Vec<UserProfile>, ApiError> {
        self.client.get(ADMIN_USERS_PATH).await
    }

    pub async fn user(&self, id: i64) -> Result<UserProfile, ApiError> {
        self.client.get(&format!("{ADMIN_USERS_PATH}/{id}")).await
    }

    #[instrument(skip(self, user), fields(username = %user.username, role = %user.role))]
    pub async fn create_user(&self, user: &CreateUser) -> Result<UserProfile, ApiError> {
        self.client.post(ADMIN_USERS_PATH, user).await
    }

    #[instrument(skip(self, changes))]
    pub async fn update_user(
        &self,
        id: i64,
        changes: &UpdateUser,
    ) -> Result<UserProfile, ApiError> {
        self.client.put(&format!("{ADMIN_USERS_PATH}/{id}"), changes).await
    }

    /// Deactivate an account; the server refuses to deactivate the caller.
    #[instrument(skip(self))]
    pub async fn deactivate_user(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("{ADMIN_USERS_PATH}/{id}")).await
    }
}
