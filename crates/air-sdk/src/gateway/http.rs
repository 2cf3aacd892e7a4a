//! Hosted backend gateway over HTTP.

use crate::config::BackendSettings;
use air_backend_client::{
    AuthSession, AuthUser, BackendClient, BackendConfig, BackendError, MemberProfileRow,
    MentorCheckinPatch, MentorCheckinRow, OpportunityRow, PipelineItemPatch, PipelineItemRow,
    Result, SavedOpportunityRow,
};
use async_trait::async_trait;
use std::sync::{Arc, OnceLock};
use tracing::info;

use super::traits::RemoteGateway;

/// Process-wide backend client, built on first use
static CLIENT: OnceLock<Arc<BackendClient>> = OnceLock::new();

/// Shared backend client.
///
/// The first call builds the client from `settings`; later calls return the
/// same instance regardless of their argument.
pub fn shared_client(settings: &BackendSettings) -> Result<Arc<BackendClient>> {
    if let Some(client) = CLIENT.get() {
        return Ok(client.clone());
    }

    let client = Arc::new(BackendClient::new(BackendConfig {
        base_url: settings.url.clone(),
        anon_key: settings.anon_key.clone(),
        timeout_secs: settings.timeout_secs,
    })?);
    info!(url = %settings.url, "backend client initialised");

    // A concurrent first call may have won the race; keep whichever landed.
    let _ = CLIENT.set(client);
    CLIENT
        .get()
        .cloned()
        .ok_or_else(|| BackendError::Config("backend client unavailable".into()))
}

/// Gateway backed by the hosted REST/auth API
pub struct HttpGateway {
    client: Arc<BackendClient>,
}

impl HttpGateway {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }

    /// Gateway over the process-wide client
    pub fn shared(settings: &BackendSettings) -> Result<Self> {
        Ok(Self::new(shared_client(settings)?))
    }
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        self.client.sign_in_with_password(email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        self.client.sign_up(email, password).await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession> {
        self.client.refresh_session(refresh_token).await
    }

    async fn current_user(&self, access_token: &str) -> Result<AuthUser> {
        self.client.get_user(access_token).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        self.client.sign_out(access_token).await
    }

    async fn list_opportunities(&self, access_token: &str) -> Result<Vec<OpportunityRow>> {
        self.client.list_opportunities(access_token).await
    }

    async fn list_saved_ids(&self, access_token: &str, user_id: &str) -> Result<Vec<String>> {
        let rows = self.client.list_saved_opportunities(access_token, user_id).await?;
        Ok(rows.into_iter().map(|r| r.opportunity_id).collect())
    }

    async fn insert_saved(&self, access_token: &str, user_id: &str, opportunity_id: &str) -> Result<()> {
        let row = SavedOpportunityRow {
            user_id: user_id.to_string(),
            opportunity_id: opportunity_id.to_string(),
        };
        self.client.insert_saved_opportunity(access_token, &row).await
    }

    async fn delete_saved(&self, access_token: &str, user_id: &str, opportunity_id: &str) -> Result<()> {
        self.client
            .delete_saved_opportunity(access_token, user_id, opportunity_id)
            .await
    }

    async fn list_pipeline(&self, access_token: &str, user_id: &str) -> Result<Vec<PipelineItemRow>> {
        self.client.list_pipeline_items(access_token, user_id).await
    }

    async fn insert_pipeline(&self, access_token: &str, row: &PipelineItemRow) -> Result<()> {
        self.client.insert_pipeline_item(access_token, row).await
    }

    async fn update_pipeline(
        &self,
        access_token: &str,
        id: &str,
        user_id: &str,
        patch: &PipelineItemPatch,
    ) -> Result<()> {
        self.client
            .update_pipeline_item(access_token, id, user_id, patch)
            .await
    }

    async fn delete_pipeline(&self, access_token: &str, id: &str, user_id: &str) -> Result<()> {
        self.client.delete_pipeline_item(access_token, id, user_id).await
    }

    async fn get_profile(&self, access_token: &str, user_id: &str) -> Result<Option<MemberProfileRow>> {
        self.client.get_member_profile(access_token, user_id).await
    }

    async fn upsert_profile(&self, access_token: &str, row: &MemberProfileRow) -> Result<()> {
        self.client.upsert_member_profile(access_token, row).await
    }

    async fn list_checkins(&self, access_token: &str, user_id: &str) -> Result<Vec<MentorCheckinRow>> {
        self.client.list_mentor_checkins(access_token, user_id).await
    }

    async fn insert_checkin(&self, access_token: &str, row: &MentorCheckinRow) -> Result<()> {
        self.client.insert_mentor_checkin(access_token, row).await
    }

    async fn update_checkin(
        &self,
        access_token: &str,
        id: &str,
        user_id: &str,
        patch: &MentorCheckinPatch,
    ) -> Result<()> {
        self.client
            .update_mentor_checkin(access_token, id, user_id, patch)
            .await
    }

    async fn delete_checkin(&self, access_token: &str, id: &str, user_id: &str) -> Result<()> {
        self.client.delete_mentor_checkin(access_token, id, user_id).await
    }
}
