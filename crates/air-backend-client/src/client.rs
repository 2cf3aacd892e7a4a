//! HTTP client for the hosted backend
//!
//! Two surfaces share one `reqwest::Client`: the auth service under
//! `/auth/v1` and the table API under `/rest/v1/{table}`.

use crate::error::{BackendError, Result};
use crate::query::Query;
use crate::types::*;
use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// HTTP client for the backend auth and table APIs
///
/// # Example
///
/// ```rust,no_run
/// use air_backend_client::{BackendClient, BackendConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = BackendClient::new(BackendConfig::new(
///     "https://abc.supabase.co",
///     "public-anon-key",
/// ))?;
///
/// let session = client.sign_in_with_password("me@example.org", "secret").await?;
/// let items = client
///     .list_pipeline_items(&session.access_token, &session.user.id)
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct BackendClient {
    config: BackendConfig,
    client: Client,
}

impl BackendClient {
    /// Create a new backend client
    pub fn new(config: BackendConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        let api_key = header::HeaderValue::from_str(&config.anon_key)
            .map_err(|e| BackendError::Config(format!("anon key is not a valid header: {}", e)))?;
        headers.insert("apikey", api_key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    // ==================== Auth API ====================

    /// Password grant; returns the new session
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.config.base_url);
        let body = PasswordCredentials {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self.client.post(&url).json(&body).send().await?;
        self.handle_response(response).await
    }

    /// Exchange a refresh token for a new session. The old refresh token is
    /// spent.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession> {
        let url = format!("{}/auth/v1/token?grant_type=refresh_token", self.config.base_url);
        let body = RefreshTokenGrant {
            refresh_token: refresh_token.to_string(),
        };

        let response = self.client.post(&url).json(&body).send().await?;
        self.handle_response(response).await
    }

    /// Create an account. Depending on backend settings the user may need
    /// to confirm their email before signing in.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        let url = format!("{}/auth/v1/signup", self.config.base_url);
        let body = PasswordCredentials {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self.client.post(&url).json(&body).send().await?;
        let value: serde_json::Value = self.handle_response(response).await?;

        // Sign-up answers with either a bare user or a session wrapping one.
        let user = value.get("user").cloned().unwrap_or(value);
        Ok(serde_json::from_value(user)?)
    }

    /// Resolve the user behind an access token
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser> {
        let url = format!("{}/auth/v1/user", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Revoke an access token
    pub async fn sign_out(&self, access_token: &str) -> Result<()> {
        let url = format!("{}/auth/v1/logout", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .send()
            .await?;
        self.handle_empty(response).await
    }

    // ==================== Table API ====================

    /// Select rows from a table
    pub async fn select<T: DeserializeOwned>(
        &self,
        access_token: &str,
        table: &str,
        query: &Query,
    ) -> Result<Vec<T>> {
        let url = format!(
            "{}/rest/v1/{}?{}",
            self.config.base_url,
            table,
            query.to_select_string()
        );
        debug!(table, "select");

        let response = self.authed(self.client.get(&url), access_token).send().await?;
        self.handle_response(response).await
    }

    /// Insert one row
    pub async fn insert<T: Serialize + ?Sized>(
        &self,
        access_token: &str,
        table: &str,
        row: &T,
    ) -> Result<()> {
        let url = format!("{}/rest/v1/{}", self.config.base_url, table);
        debug!(table, "insert");

        let response = self
            .authed(self.client.post(&url), access_token)
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;
        self.handle_empty(response).await
    }

    /// Insert or merge one row on its primary key
    pub async fn upsert<T: Serialize + ?Sized>(
        &self,
        access_token: &str,
        table: &str,
        row: &T,
    ) -> Result<()> {
        let url = format!("{}/rest/v1/{}", self.config.base_url, table);
        debug!(table, "upsert");

        let response = self
            .authed(self.client.post(&url), access_token)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(row)
            .send()
            .await?;
        self.handle_empty(response).await
    }

    /// Patch the rows matching `query`
    pub async fn update<T: Serialize + ?Sized>(
        &self,
        access_token: &str,
        table: &str,
        query: &Query,
        patch: &T,
    ) -> Result<()> {
        let url = format!(
            "{}/rest/v1/{}?{}",
            self.config.base_url,
            table,
            query.to_filter_string()
        );
        debug!(table, "update");

        let response = self
            .authed(self.client.patch(&url), access_token)
            .header("Prefer", "return=minimal")
            .json(patch)
            .send()
            .await?;
        self.handle_empty(response).await
    }

    /// Delete the rows matching `query`
    pub async fn delete(&self, access_token: &str, table: &str, query: &Query) -> Result<()> {
        let url = format!(
            "{}/rest/v1/{}?{}",
            self.config.base_url,
            table,
            query.to_filter_string()
        );
        debug!(table, "delete");

        let response = self
            .authed(self.client.delete(&url), access_token)
            .send()
            .await?;
        self.handle_empty(response).await
    }

    // ==================== Typed tables ====================

    /// All opportunities, soonest deadline first
    pub async fn list_opportunities(&self, access_token: &str) -> Result<Vec<OpportunityRow>> {
        let query = Query::new().order_asc("deadline");
        self.select(access_token, OPPORTUNITIES, &query).await
    }

    /// Pipeline items of one user, soonest due first
    pub async fn list_pipeline_items(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Vec<PipelineItemRow>> {
        let query = Query::new()
            .eq("user_id", user_id)
            .order_asc("due_date");
        self.select(access_token, PIPELINE_ITEMS, &query).await
    }

    pub async fn insert_pipeline_item(&self, access_token: &str, row: &PipelineItemRow) -> Result<()> {
        self.insert(access_token, PIPELINE_ITEMS, row).await
    }

    pub async fn update_pipeline_item(
        &self,
        access_token: &str,
        id: &str,
        user_id: &str,
        patch: &PipelineItemPatch,
    ) -> Result<()> {
        let query = Query::new().eq("id", id).eq("user_id", user_id);
        self.update(access_token, PIPELINE_ITEMS, &query, patch).await
    }

    pub async fn delete_pipeline_item(&self, access_token: &str, id: &str, user_id: &str) -> Result<()> {
        let query = Query::new().eq("id", id).eq("user_id", user_id);
        self.delete(access_token, PIPELINE_ITEMS, &query).await
    }

    /// Opportunity ids saved by one user
    pub async fn list_saved_opportunities(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Vec<SavedOpportunityRow>> {
        let query = Query::new().eq("user_id", user_id);
        self.select(access_token, SAVED_OPPORTUNITIES, &query).await
    }

    pub async fn insert_saved_opportunity(
        &self,
        access_token: &str,
        row: &SavedOpportunityRow,
    ) -> Result<()> {
        self.insert(access_token, SAVED_OPPORTUNITIES, row).await
    }

    pub async fn delete_saved_opportunity(
        &self,
        access_token: &str,
        user_id: &str,
        opportunity_id: &str,
    ) -> Result<()> {
        let query = Query::new()
            .eq("user_id", user_id)
            .eq("opportunity_id", opportunity_id);
        self.delete(access_token, SAVED_OPPORTUNITIES, &query).await
    }

    /// The user's profile row, if one was ever saved
    pub async fn get_member_profile(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Option<MemberProfileRow>> {
        let query = Query::new().eq("user_id", user_id).limit(1);
        let rows: Vec<MemberProfileRow> = self.select(access_token, MEMBER_PROFILES, &query).await?;
        Ok(rows.into_iter().next())
    }

    pub async fn upsert_member_profile(&self, access_token: &str, row: &MemberProfileRow) -> Result<()> {
        self.upsert(access_token, MEMBER_PROFILES, row).await
    }

    /// Mentor check-ins of one user, next meeting first
    pub async fn list_mentor_checkins(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Vec<MentorCheckinRow>> {
        let query = Query::new()
            .eq("user_id", user_id)
            .order_asc("next_check_in");
        self.select(access_token, MENTOR_CHECKINS, &query).await
    }

    pub async fn insert_mentor_checkin(&self, access_token: &str, row: &MentorCheckinRow) -> Result<()> {
        self.insert(access_token, MENTOR_CHECKINS, row).await
    }

    pub async fn update_mentor_checkin(
        &self,
        access_token: &str,
        id: &str,
        user_id: &str,
        patch: &MentorCheckinPatch,
    ) -> Result<()> {
        let query = Query::new().eq("id", id).eq("user_id", user_id);
        self.update(access_token, MENTOR_CHECKINS, &query, patch).await
    }

    pub async fn delete_mentor_checkin(&self, access_token: &str, id: &str, user_id: &str) -> Result<()> {
        let query = Query::new().eq("id", id).eq("user_id", user_id);
        self.delete(access_token, MENTOR_CHECKINS, &query).await
    }

    // ==================== Helper Methods ====================

    fn authed(&self, request: RequestBuilder, access_token: &str) -> RequestBuilder {
        request.bearer_auth(access_token)
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = self.check_status(response).await?;
        let body = response.json().await?;
        Ok(body)
    }

    async fn handle_empty(&self, response: reqwest::Response) -> Result<()> {
        self.check_status(response).await?;
        Ok(())
    }

    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or(body);

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Unauthorized(message),
            StatusCode::NOT_FOUND => BackendError::NotFound(message),
            _ => BackendError::Server {
                status: status.as_u16(),
                message,
            },
        })
    }
}
