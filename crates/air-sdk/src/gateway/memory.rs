//! In-memory gateway for tests and offline development.

use air_backend_client::{
    AuthSession, AuthUser, BackendError, MemberProfileRow, MentorCheckinPatch, MentorCheckinRow,
    OpportunityRow, PipelineItemPatch, PipelineItemRow, Result, SavedOpportunityRow,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tokio::sync::Mutex;

use super::traits::RemoteGateway;

#[derive(Default)]
struct Tables {
    /// email -> (password, user id)
    accounts: HashMap<String, (String, String)>,
    /// access token -> user
    tokens: HashMap<String, AuthUser>,
    /// unspent refresh token -> user
    refresh_tokens: HashMap<String, AuthUser>,
    opportunities: Vec<OpportunityRow>,
    saved: Vec<SavedOpportunityRow>,
    pipeline: Vec<PipelineItemRow>,
    profiles: HashMap<String, MemberProfileRow>,
    checkins: Vec<MentorCheckinRow>,
}

impl Tables {
    /// Token must exist and belong to `user_id`
    fn authorize(&self, access_token: &str, user_id: &str) -> Result<()> {
        match self.tokens.get(access_token) {
            Some(user) if user.id == user_id => Ok(()),
            Some(_) => Err(BackendError::Unauthorized("row belongs to another user".into())),
            None => Err(BackendError::Unauthorized("invalid access token".into())),
        }
    }
}

/// Gateway holding all tables in memory.
///
/// Enforces the same per-user scoping as the hosted backend: a token may
/// only touch rows carrying its own user id. `set_failing(true)` makes every
/// call fail with a server error.
#[derive(Default)]
pub struct MemoryGateway {
    tables: Mutex<Tables>,
    failing: AtomicBool,
    call_count: AtomicU32,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the global opportunity listing
    pub fn with_opportunities(mut self, rows: Vec<OpportunityRow>) -> Self {
        self.tables.get_mut().opportunities = rows;
        self
    }

    /// Register an account and issue it an access token
    pub async fn add_account(&self, email: &str, password: &str, user_id: &str) -> AuthSession {
        let mut tables = self.tables.lock().await;
        tables
            .accounts
            .insert(email.to_string(), (password.to_string(), user_id.to_string()));
        issue_token(&mut tables, email, user_id)
    }

    /// Invalidate every issued access token (simulates expiry). Refresh
    /// tokens stay usable.
    pub async fn expire_tokens(&self) {
        self.tables.lock().await.tokens.clear();
    }

    /// Invalidate every refresh token
    pub async fn revoke_refresh_tokens(&self) {
        self.tables.lock().await.refresh_tokens.clear();
    }

    /// Make subsequent calls fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of gateway calls made
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Raw pipeline rows, for assertions
    pub async fn pipeline_rows(&self) -> Vec<PipelineItemRow> {
        self.tables.lock().await.pipeline.clone()
    }

    /// Raw check-in rows, for assertions
    pub async fn checkin_rows(&self) -> Vec<MentorCheckinRow> {
        self.tables.lock().await.checkins.clone()
    }

    fn enter(&self) -> Result<()> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(BackendError::Server {
                status: 503,
                message: "memory gateway set to fail".into(),
            });
        }
        Ok(())
    }
}

fn issue_token(tables: &mut Tables, email: &str, user_id: &str) -> AuthSession {
    let user = AuthUser {
        id: user_id.to_string(),
        email: Some(email.to_string()),
    };
    issue_for(tables, user)
}

fn issue_for(tables: &mut Tables, user: AuthUser) -> AuthSession {
    let token = format!("mem-{}", uuid::Uuid::new_v4());
    let refresh = format!("mem-refresh-{}", uuid::Uuid::new_v4());
    tables.tokens.insert(token.clone(), user.clone());
    tables.refresh_tokens.insert(refresh.clone(), user.clone());
    AuthSession {
        access_token: token,
        refresh_token: Some(refresh),
        expires_in: Some(3600),
        user,
    }
}

#[async_trait]
impl RemoteGateway for MemoryGateway {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession> {
        self.enter()?;
        let mut tables = self.tables.lock().await;
        let user_id = match tables.accounts.get(email) {
            Some((pw, id)) if pw == password => id.clone(),
            _ => {
                return Err(BackendError::Server {
                    status: 400,
                    message: "Invalid login credentials".into(),
                })
            }
        };
        Ok(issue_token(&mut tables, email, &user_id))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        self.enter()?;
        let mut tables = self.tables.lock().await;
        if tables.accounts.contains_key(email) {
            return Err(BackendError::Server {
                status: 422,
                message: "User already registered".into(),
            });
        }
        let id = uuid::Uuid::new_v4().to_string();
        tables
            .accounts
            .insert(email.to_string(), (password.to_string(), id.clone()));
        Ok(AuthUser {
            id,
            email: Some(email.to_string()),
        })
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession> {
        self.enter()?;
        let mut tables = self.tables.lock().await;
        // Refresh tokens are single use
        match tables.refresh_tokens.remove(refresh_token) {
            Some(user) => Ok(issue_for(&mut tables, user)),
            None => Err(BackendError::Server {
                status: 400,
                message: "Invalid Refresh Token".into(),
            }),
        }
    }

    async fn current_user(&self, access_token: &str) -> Result<AuthUser> {
        self.enter()?;
        let tables = self.tables.lock().await;
        tables
            .tokens
            .get(access_token)
            .cloned()
            .ok_or_else(|| BackendError::Unauthorized("invalid access token".into()))
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        self.enter()?;
        self.tables.lock().await.tokens.remove(access_token);
        Ok(())
    }

    async fn list_opportunities(&self, _access_token: &str) -> Result<Vec<OpportunityRow>> {
        self.enter()?;
        let mut rows = self.tables.lock().await.opportunities.clone();
        rows.sort_by_key(|r| r.deadline);
        Ok(rows)
    }

    async fn list_saved_ids(&self, access_token: &str, user_id: &str) -> Result<Vec<String>> {
        self.enter()?;
        let tables = self.tables.lock().await;
        tables.authorize(access_token, user_id)?;
        Ok(tables
            .saved
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.opportunity_id.clone())
            .collect())
    }

    async fn insert_saved(&self, access_token: &str, user_id: &str, opportunity_id: &str) -> Result<()> {
        self.enter()?;
        let mut tables = self.tables.lock().await;
        tables.authorize(access_token, user_id)?;
        let row = SavedOpportunityRow {
            user_id: user_id.to_string(),
            opportunity_id: opportunity_id.to_string(),
        };
        if !tables.saved.contains(&row) {
            tables.saved.push(row);
        }
        Ok(())
    }

    async fn delete_saved(&self, access_token: &str, user_id: &str, opportunity_id: &str) -> Result<()> {
        self.enter()?;
        let mut tables = self.tables.lock().await;
        tables.authorize(access_token, user_id)?;
        tables
            .saved
            .retain(|r| !(r.user_id == user_id && r.opportunity_id == opportunity_id));
        Ok(())
    }

    async fn list_pipeline(&self, access_token: &str, user_id: &str) -> Result<Vec<PipelineItemRow>> {
        self.enter()?;
        let tables = self.tables.lock().await;
        tables.authorize(access_token, user_id)?;
        let mut rows: Vec<_> = tables
            .pipeline
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.due_date);
        Ok(rows)
    }

    async fn insert_pipeline(&self, access_token: &str, row: &PipelineItemRow) -> Result<()> {
        self.enter()?;
        let mut tables = self.tables.lock().await;
        tables.authorize(access_token, &row.user_id)?;
        if tables.pipeline.iter().any(|r| r.id == row.id) {
            return Err(BackendError::Server {
                status: 409,
                message: format!("duplicate key {}", row.id),
            });
        }
        tables.pipeline.push(row.clone());
        Ok(())
    }

    async fn update_pipeline(
        &self,
        access_token: &str,
        id: &str,
        user_id: &str,
        patch: &PipelineItemPatch,
    ) -> Result<()> {
        self.enter()?;
        let mut tables = self.tables.lock().await;
        tables.authorize(access_token, user_id)?;
        // Filters that match nothing are not an error, as with the REST API.
        for row in tables
            .pipeline
            .iter_mut()
            .filter(|r| r.id == id && r.user_id == user_id)
        {
            if let Some(title) = &patch.title {
                row.title = title.clone();
            }
            if let Some(client) = &patch.client {
                row.client = client.clone();
            }
            if let Some(due_date) = patch.due_date {
                row.due_date = due_date;
            }
            if let Some(value) = patch.value {
                row.value = value;
            }
            if let Some(stage) = patch.stage {
                row.stage = stage;
            }
        }
        Ok(())
    }

    async fn delete_pipeline(&self, access_token: &str, id: &str, user_id: &str) -> Result<()> {
        self.enter()?;
        let mut tables = self.tables.lock().await;
        tables.authorize(access_token, user_id)?;
        tables
            .pipeline
            .retain(|r| !(r.id == id && r.user_id == user_id));
        Ok(())
    }

    async fn get_profile(&self, access_token: &str, user_id: &str) -> Result<Option<MemberProfileRow>> {
        self.enter()?;
        let tables = self.tables.lock().await;
        tables.authorize(access_token, user_id)?;
        Ok(tables.profiles.get(user_id).cloned())
    }

    async fn upsert_profile(&self, access_token: &str, row: &MemberProfileRow) -> Result<()> {
        self.enter()?;
        let mut tables = self.tables.lock().await;
        tables.authorize(access_token, &row.user_id)?;
        // Merge on the key: columns left out of the body keep their value
        let mut merged = row.clone();
        if merged.notify_daily.is_none() {
            merged.notify_daily = tables
                .profiles
                .get(&row.user_id)
                .and_then(|existing| existing.notify_daily);
        }
        tables.profiles.insert(row.user_id.clone(), merged);
        Ok(())
    }

    async fn list_checkins(&self, access_token: &str, user_id: &str) -> Result<Vec<MentorCheckinRow>> {
        self.enter()?;
        let tables = self.tables.lock().await;
        tables.authorize(access_token, user_id)?;
        let mut rows: Vec<_> = tables
            .checkins
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.next_check_in);
        Ok(rows)
    }

    async fn insert_checkin(&self, access_token: &str, row: &MentorCheckinRow) -> Result<()> {
        self.enter()?;
        let mut tables = self.tables.lock().await;
        tables.authorize(access_token, &row.user_id)?;
        tables.checkins.push(row.clone());
        Ok(())
    }

    async fn update_checkin(
        &self,
        access_token: &str,
        id: &str,
        user_id: &str,
        patch: &MentorCheckinPatch,
    ) -> Result<()> {
        self.enter()?;
        let mut tables = self.tables.lock().await;
        tables.authorize(access_token, user_id)?;
        for row in tables
            .checkins
            .iter_mut()
            .filter(|r| r.id == id && r.user_id == user_id)
        {
            if let Some(name) = &patch.mentor_name {
                row.mentor_name = name.clone();
            }
            if let Some(topic) = &patch.topic {
                row.topic = topic.clone();
            }
            if let Some(date) = patch.next_check_in {
                row.next_check_in = date;
            }
            if let Some(notes) = &patch.notes {
                row.notes = Some(notes.clone());
            }
            if let Some(status) = patch.status {
                row.status = status;
            }
        }
        Ok(())
    }

    async fn delete_checkin(&self, access_token: &str, id: &str, user_id: &str) -> Result<()> {
        self.enter()?;
        let mut tables = self.tables.lock().await;
        tables.authorize(access_token, user_id)?;
        tables
            .checkins
            .retain(|r| !(r.id == id && r.user_id == user_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use air_backend_client::{CheckinStatus, PipelineStage};
    use chrono::NaiveDate;

    fn row(id: &str, user_id: &str, due: (i32, u32, u32)) -> PipelineItemRow {
        PipelineItemRow {
            id: id.into(),
            user_id: user_id.into(),
            title: "Feature".into(),
            client: "Client".into(),
            due_date: NaiveDate::from_ymd_opt(due.0, due.1, due.2).unwrap(),
            value: 1000.0,
            stage: PipelineStage::ToPitch,
        }
    }

    #[tokio::test]
    async fn test_pipeline_is_scoped_and_sorted() {
        let gateway = MemoryGateway::new();
        let ana = gateway.add_account("ana@example.org", "pw", "ana").await;
        let ben = gateway.add_account("ben@example.org", "pw", "ben").await;

        gateway.insert_pipeline(&ana.access_token, &row("p2", "ana", (2026, 4, 1))).await.unwrap();
        gateway.insert_pipeline(&ana.access_token, &row("p1", "ana", (2026, 3, 1))).await.unwrap();
        gateway.insert_pipeline(&ben.access_token, &row("p3", "ben", (2026, 1, 1))).await.unwrap();

        let rows = gateway.list_pipeline(&ana.access_token, "ana").await.unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_cross_user_access_rejected() {
        let gateway = MemoryGateway::new();
        let ana = gateway.add_account("ana@example.org", "pw", "ana").await;
        gateway.add_account("ben@example.org", "pw", "ben").await;

        let err = gateway.list_pipeline(&ana.access_token, "ben").await.unwrap_err();
        assert!(matches!(err, BackendError::Unauthorized(_)));

        let err = gateway
            .insert_pipeline(&ana.access_token, &row("p9", "ben", (2026, 1, 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Unauthorized(_)));
    }

    fn checkin(id: &str, user_id: &str) -> MentorCheckinRow {
        MentorCheckinRow {
            id: id.into(),
            user_id: user_id.into(),
            mentor_name: "Rosa".into(),
            topic: "Rates".into(),
            next_check_in: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            notes: None,
            status: CheckinStatus::Scheduled,
        }
    }

    #[tokio::test]
    async fn test_delete_pipeline_leaves_other_users_rows() {
        let gateway = MemoryGateway::new();
        let ana = gateway.add_account("ana@example.org", "pw", "ana").await;
        let ben = gateway.add_account("ben@example.org", "pw", "ben").await;
        gateway.insert_pipeline(&ana.access_token, &row("p1", "ana", (2026, 3, 1))).await.unwrap();
        gateway.insert_pipeline(&ben.access_token, &row("p2", "ben", (2026, 3, 1))).await.unwrap();

        // Ben's id under Ana's identity matches nothing
        gateway.delete_pipeline(&ana.access_token, "p2", "ana").await.unwrap();
        gateway.delete_pipeline(&ana.access_token, "p1", "ana").await.unwrap();

        let ids: Vec<_> = gateway.pipeline_rows().await.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["p2"]);
    }

    #[tokio::test]
    async fn test_checkin_update_and_delete_are_scoped() {
        let gateway = MemoryGateway::new();
        let ana = gateway.add_account("ana@example.org", "pw", "ana").await;
        let ben = gateway.add_account("ben@example.org", "pw", "ben").await;
        gateway.insert_checkin(&ana.access_token, &checkin("m1", "ana")).await.unwrap();
        gateway.insert_checkin(&ben.access_token, &checkin("m2", "ben")).await.unwrap();

        let done = MentorCheckinPatch {
            status: Some(CheckinStatus::Completed),
            notes: Some("sent rate sheet".into()),
            ..Default::default()
        };
        gateway.update_checkin(&ana.access_token, "m1", "ana", &done).await.unwrap();
        gateway.update_checkin(&ana.access_token, "m2", "ana", &done).await.unwrap();

        let rows = gateway.checkin_rows().await;
        let m1 = rows.iter().find(|r| r.id == "m1").unwrap();
        let m2 = rows.iter().find(|r| r.id == "m2").unwrap();
        assert_eq!(m1.status, CheckinStatus::Completed);
        assert_eq!(m1.notes.as_deref(), Some("sent rate sheet"));
        assert_eq!(m2.status, CheckinStatus::Scheduled);

        gateway.delete_checkin(&ana.access_token, "m2", "ana").await.unwrap();
        gateway.delete_checkin(&ana.access_token, "m1", "ana").await.unwrap();
        let ids: Vec<_> = gateway.checkin_rows().await.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["m2"]);

        let err = gateway.delete_checkin(&ana.access_token, "m2", "ben").await.unwrap_err();
        assert!(matches!(err, BackendError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_profile_upsert_keeps_unsent_columns() {
        let gateway = MemoryGateway::new();
        let ana = gateway.add_account("ana@example.org", "pw", "ana").await;
        let mut profile = MemberProfileRow {
            user_id: "ana".into(),
            display_name: Some("Ana".into()),
            location: None,
            skills: vec![],
            beats: vec![],
            pay_floor: None,
            notify_daily: Some(true),
        };
        gateway.upsert_profile(&ana.access_token, &profile).await.unwrap();

        profile.display_name = Some("Ana R.".into());
        profile.notify_daily = None;
        gateway.upsert_profile(&ana.access_token, &profile).await.unwrap();

        let stored = gateway.get_profile(&ana.access_token, "ana").await.unwrap().unwrap();
        assert_eq!(stored.display_name.as_deref(), Some("Ana R."));
        assert_eq!(stored.notify_daily, Some(true));
    }

    #[tokio::test]
    async fn test_refresh_token_is_single_use() {
        let gateway = MemoryGateway::new();
        let ana = gateway.add_account("ana@example.org", "pw", "ana").await;
        let refresh = ana.refresh_token.unwrap();
        gateway.expire_tokens().await;

        let renewed = gateway.refresh_session(&refresh).await.unwrap();
        assert_eq!(gateway.current_user(&renewed.access_token).await.unwrap().id, "ana");
        assert!(gateway.refresh_session(&refresh).await.is_err());
    }

    #[tokio::test]
    async fn test_failing_switch() {
        let gateway = MemoryGateway::new();
        gateway.set_failing(true);
        assert!(gateway.list_opportunities("any").await.is_err());
        gateway.set_failing(false);
        assert!(gateway.list_opportunities("any").await.is_ok());
        assert_eq!(gateway.call_count(), 2);
    }

    #[tokio::test]
    async fn test_sign_in_checks_password() {
        let gateway = MemoryGateway::new();
        gateway.add_account("ana@example.org", "right", "ana").await;

        assert!(gateway.sign_in("ana@example.org", "wrong").await.is_err());
        let session = gateway.sign_in("ana@example.org", "right").await.unwrap();
        let user = gateway.current_user(&session.access_token).await.unwrap();
        assert_eq!(user.id, "ana");

        gateway.sign_out(&session.access_token).await.unwrap();
        assert!(gateway.current_user(&session.access_token).await.is_err());
    }
}
