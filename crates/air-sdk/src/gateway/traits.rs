//! Core trait for the hosted backend.
//!
//! `RemoteGateway` is the seam between the member core and whatever serves
//! the remote tables: the HTTP backend in production, the in-memory gateway
//! in tests. Every per-user call carries the identity id and implementations
//! must scope reads and writes to it.

use air_backend_client::{
    AuthSession, AuthUser, MemberProfileRow, MentorCheckinPatch, MentorCheckinRow,
    OpportunityRow, PipelineItemPatch, PipelineItemRow, Result,
};
use async_trait::async_trait;

#[async_trait]
pub trait RemoteGateway: Send + Sync {
    // ==================== Auth ====================

    /// Password sign-in
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// Account creation
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser>;

    /// Exchange a refresh token for a new session
    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession>;

    /// User behind a stored access token
    async fn current_user(&self, access_token: &str) -> Result<AuthUser>;

    /// Revoke an access token
    async fn sign_out(&self, access_token: &str) -> Result<()>;

    // ==================== Opportunities ====================

    /// All opportunities ordered by ascending deadline
    async fn list_opportunities(&self, access_token: &str) -> Result<Vec<OpportunityRow>>;

    // ==================== Saved opportunities ====================

    async fn list_saved_ids(&self, access_token: &str, user_id: &str) -> Result<Vec<String>>;

    async fn insert_saved(&self, access_token: &str, user_id: &str, opportunity_id: &str) -> Result<()>;

    async fn delete_saved(&self, access_token: &str, user_id: &str, opportunity_id: &str) -> Result<()>;

    // ==================== Pipeline ====================

    /// Ordered by ascending due date
    async fn list_pipeline(&self, access_token: &str, user_id: &str) -> Result<Vec<PipelineItemRow>>;

    async fn insert_pipeline(&self, access_token: &str, row: &PipelineItemRow) -> Result<()>;

    async fn update_pipeline(
        &self,
        access_token: &str,
        id: &str,
        user_id: &str,
        patch: &PipelineItemPatch,
    ) -> Result<()>;

    async fn delete_pipeline(&self, access_token: &str, id: &str, user_id: &str) -> Result<()>;

    // ==================== Profile ====================

    async fn get_profile(&self, access_token: &str, user_id: &str) -> Result<Option<MemberProfileRow>>;

    async fn upsert_profile(&self, access_token: &str, row: &MemberProfileRow) -> Result<()>;

    // ==================== Mentor check-ins ====================

    /// Ordered by ascending next check-in date
    async fn list_checkins(&self, access_token: &str, user_id: &str) -> Result<Vec<MentorCheckinRow>>;

    async fn insert_checkin(&self, access_token: &str, row: &MentorCheckinRow) -> Result<()>;

    async fn update_checkin(
        &self,
        access_token: &str,
        id: &str,
        user_id: &str,
        patch: &MentorCheckinPatch,
    ) -> Result<()>;

    async fn delete_checkin(&self, access_token: &str, id: &str, user_id: &str) -> Result<()>;
}
