//! Member data dispatcher
//!
//! `MemberData` binds one resolved [`Session`] to the local store and the
//! remote gateway. Each call dispatches once on the session:
//!
//! - **Guest**: seed opportunities and seed pipeline, read-only
//! - **Demo**: local mirror store
//! - **Remote**: hosted backend, scoped to the signed-in user
//!
//! Writes are two-phase. The in-memory copy changes first, then the change
//! is persisted. A failed persist is reported as a notice on the result and
//! the in-memory change stays. A failed remote read keeps the last in-memory
//! value and reports it as stale.

use crate::catalog::{seed_opportunities, seed_pipeline};
use crate::engine::estimate_value;
use crate::error::{Result, SdkError};
use crate::gateway::RemoteGateway;
use crate::models::{
    MemberProfile, MentorCheckin, NewCheckin, NewPipelineItem, Opportunity, PipelineItem,
    PipelineSummary,
};
use crate::session::{Session, SessionResolver};
use crate::store::LocalStore;
use air_backend_client::{CheckinStatus, PipelineItemPatch, PipelineStage};
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

/// Result of a read or write, with an optional status notice for the member
#[derive(Debug, Clone, PartialEq)]
pub struct Synced<T> {
    pub value: T,
    /// Set when the value could not be confirmed against its backing store
    pub notice: Option<String>,
}

impl<T> Synced<T> {
    pub fn fresh(value: T) -> Self {
        Self {
            value,
            notice: None,
        }
    }

    pub fn with_notice(value: T, notice: Option<String>) -> Self {
        Self { value, notice }
    }

    pub fn is_confirmed(&self) -> bool {
        self.notice.is_none()
    }
}

/// Last values seen, per entity. `None` until first loaded.
#[derive(Default)]
struct Cache {
    opportunities: Option<Vec<Opportunity>>,
    saved_ids: Option<Vec<String>>,
    pipeline: Option<Vec<PipelineItem>>,
    profile: Option<MemberProfile>,
    checkins: Option<Vec<MentorCheckin>>,
}

/// Where an operation goes, decided once per call
enum Target<'a> {
    Guest,
    Local,
    Remote {
        gateway: &'a dyn RemoteGateway,
        user_id: &'a str,
        token: &'a str,
    },
}

fn failure_notice(action: &str, err: impl Display) -> String {
    warn!(action, error = %err, "member data sync failed");
    format!("Could not {}. Showing local changes; refresh to verify.", action)
}

fn stale_notice(what: &str, err: impl Display) -> String {
    warn!(what, error = %err, "remote read failed, keeping last known value");
    format!("Could not load {}. Showing last known data.", what)
}

pub struct MemberData {
    session: Session,
    store: LocalStore,
    gateway: Option<Arc<dyn RemoteGateway>>,
    cache: Mutex<Cache>,
}

impl MemberData {
    pub fn new(session: Session, store: LocalStore, gateway: Option<Arc<dyn RemoteGateway>>) -> Self {
        Self {
            session,
            store,
            gateway,
            cache: Mutex::new(Cache::default()),
        }
    }

    /// Bind to whatever session the resolver currently sees
    pub async fn resolve(resolver: &SessionResolver) -> Self {
        let session = resolver.session().await;
        debug!(user_id = ?session.user_id(), "member data bound");
        Self::new(session, resolver.store().clone(), resolver.gateway())
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn target(&self) -> Result<Target<'_>> {
        match &self.session {
            Session::Guest => Ok(Target::Guest),
            Session::Demo { .. } => Ok(Target::Local),
            Session::Remote {
                id, access_token, ..
            } => {
                let gateway = self.gateway.as_deref().ok_or(SdkError::BackendNotConfigured)?;
                Ok(Target::Remote {
                    gateway,
                    user_id: id,
                    token: access_token,
                })
            }
        }
    }

    fn write_target(&self) -> Result<Target<'_>> {
        match self.target()? {
            Target::Guest => Err(SdkError::SignInRequired),
            target => Ok(target),
        }
    }

    // ==================== Reads ====================

    /// Listing, falling back to the seed list when the backend has none
    pub async fn opportunities(&self) -> Result<Synced<Vec<Opportunity>>> {
        let (value, notice) = match self.target()? {
            Target::Guest | Target::Local => (seed_opportunities(), None),
            Target::Remote { gateway, token, .. } => match gateway.list_opportunities(token).await {
                Ok(rows) if !rows.is_empty() => (rows.into_iter().map(Opportunity::from).collect(), None),
                Ok(_) => (seed_opportunities(), None),
                Err(e) => {
                    let last = self.cache.lock().await.opportunities.clone();
                    (
                        last.unwrap_or_else(seed_opportunities),
                        Some(stale_notice("opportunities", e)),
                    )
                }
            },
        };

        self.cache.lock().await.opportunities = Some(value.clone());
        Ok(Synced::with_notice(value, notice))
    }

    pub async fn saved_ids(&self) -> Result<Synced<Vec<String>>> {
        let (value, notice) = match self.target()? {
            Target::Guest => (Vec::new(), None),
            Target::Local => (self.store.saved_ids().await, None),
            Target::Remote {
                gateway,
                user_id,
                token,
            } => match gateway.list_saved_ids(token, user_id).await {
                Ok(ids) => (ids, None),
                Err(e) => {
                    let last = self.cache.lock().await.saved_ids.clone();
                    (last.unwrap_or_default(), Some(stale_notice("saved opportunities", e)))
                }
            },
        };

        self.cache.lock().await.saved_ids = Some(value.clone());
        Ok(Synced::with_notice(value, notice))
    }

    /// Pipeline items. Demo shows the seed pipeline until something is
    /// stored; a remote account with no rows shows an empty board.
    pub async fn pipeline(&self) -> Result<Synced<Vec<PipelineItem>>> {
        let (value, notice) = match self.target()? {
            Target::Guest => (seed_pipeline(), None),
            Target::Local => {
                let stored = self.store.pipeline_items().await;
                if stored.is_empty() {
                    (seed_pipeline(), None)
                } else {
                    (stored, None)
                }
            }
            Target::Remote {
                gateway,
                user_id,
                token,
            } => match gateway.list_pipeline(token, user_id).await {
                Ok(rows) => (rows.into_iter().map(PipelineItem::from).collect(), None),
                Err(e) => {
                    let last = self.cache.lock().await.pipeline.clone();
                    (last.unwrap_or_else(seed_pipeline), Some(stale_notice("pipeline", e)))
                }
            },
        };

        self.cache.lock().await.pipeline = Some(value.clone());
        Ok(Synced::with_notice(value, notice))
    }

    pub async fn profile(&self) -> Result<Synced<MemberProfile>> {
        let (value, notice) = match self.target()? {
            Target::Guest => (MemberProfile::default(), None),
            Target::Local => (self.store.demo_profile().await.unwrap_or_default(), None),
            Target::Remote {
                gateway,
                user_id,
                token,
            } => match gateway.get_profile(token, user_id).await {
                Ok(row) => (row.map(MemberProfile::from).unwrap_or_default(), None),
                Err(e) => {
                    let last = self.cache.lock().await.profile.clone();
                    (last.unwrap_or_default(), Some(stale_notice("profile", e)))
                }
            },
        };

        self.cache.lock().await.profile = Some(value.clone());
        Ok(Synced::with_notice(value, notice))
    }

    pub async fn checkins(&self) -> Result<Synced<Vec<MentorCheckin>>> {
        let (value, notice) = match self.target()? {
            Target::Guest => (Vec::new(), None),
            Target::Local => (self.store.checkins().await, None),
            Target::Remote {
                gateway,
                user_id,
                token,
            } => match gateway.list_checkins(token, user_id).await {
                Ok(rows) => (rows.into_iter().map(MentorCheckin::from).collect(), None),
                Err(e) => {
                    let last = self.cache.lock().await.checkins.clone();
                    (last.unwrap_or_default(), Some(stale_notice("mentor check-ins", e)))
                }
            },
        };

        self.cache.lock().await.checkins = Some(value.clone());
        Ok(Synced::with_notice(value, notice))
    }

    /// Totals over the in-memory pipeline
    pub async fn pipeline_summary(&self) -> Result<PipelineSummary> {
        self.ensure_pipeline().await?;
        let cache = self.cache.lock().await;
        Ok(PipelineSummary::from_items(
            cache.pipeline.as_deref().unwrap_or_default(),
        ))
    }

    async fn ensure_saved_ids(&self) -> Result<()> {
        if self.cache.lock().await.saved_ids.is_none() {
            self.saved_ids().await?;
        }
        Ok(())
    }

    async fn ensure_pipeline(&self) -> Result<()> {
        if self.cache.lock().await.pipeline.is_none() {
            self.pipeline().await?;
        }
        Ok(())
    }

    async fn ensure_checkins(&self) -> Result<()> {
        if self.cache.lock().await.checkins.is_none() {
            self.checkins().await?;
        }
        Ok(())
    }

    // ==================== Writes ====================

    /// Save or unsave an opportunity; returns whether it is now saved
    pub async fn toggle_saved(&self, opportunity_id: &str) -> Result<Synced<bool>> {
        let target = self.write_target()?;
        self.ensure_saved_ids().await?;

        let (saved, snapshot) = {
            let mut cache = self.cache.lock().await;
            let ids = cache.saved_ids.get_or_insert_with(Vec::new);
            let saved = match ids.iter().position(|id| id == opportunity_id) {
                Some(pos) => {
                    ids.remove(pos);
                    false
                }
                None => {
                    ids.push(opportunity_id.to_string());
                    true
                }
            };
            (saved, ids.clone())
        };

        let outcome = match target {
            Target::Remote {
                gateway,
                user_id,
                token,
            } if saved => gateway.insert_saved(token, user_id, opportunity_id).await.map_err(SdkError::from),
            Target::Remote {
                gateway,
                user_id,
                token,
            } => gateway.delete_saved(token, user_id, opportunity_id).await.map_err(SdkError::from),
            _ => self.store.write_saved_ids(&snapshot).await,
        };

        let notice = outcome.err().map(|e| failure_notice("update saved opportunities", e));
        Ok(Synced::with_notice(saved, notice))
    }

    /// Add a new item in `To Pitch`, newest first
    pub async fn add_pipeline_item(&self, input: NewPipelineItem) -> Result<Synced<PipelineItem>> {
        let target = self.write_target()?;
        input.validate().map_err(SdkError::Validation)?;
        self.ensure_pipeline().await?;

        let item = PipelineItem {
            id: format!("pipe-{}", Uuid::new_v4()),
            title: input.title.trim().to_string(),
            client: input.client.trim().to_string(),
            due_date: input.due_date,
            value: input.value,
            stage: PipelineStage::ToPitch,
        };

        let snapshot = {
            let mut cache = self.cache.lock().await;
            let items = cache.pipeline.get_or_insert_with(Vec::new);
            items.insert(0, item.clone());
            items.clone()
        };

        let outcome = match target {
            Target::Remote {
                gateway,
                user_id,
                token,
            } => gateway
                .insert_pipeline(token, &item.to_row(user_id))
                .await
                .map_err(SdkError::from),
            _ => self.store.write_pipeline_items(&snapshot).await,
        };

        debug!(id = %item.id, "pipeline item added");
        let notice = outcome.err().map(|e| failure_notice("save the pipeline item", e));
        Ok(Synced::with_notice(item, notice))
    }

    /// Start tracking an opportunity as a pipeline item, valued from its
    /// compensation text
    pub async fn track_opportunity(&self, opportunity: &Opportunity) -> Result<Synced<PipelineItem>> {
        self.add_pipeline_item(NewPipelineItem {
            title: opportunity.title.clone(),
            client: opportunity.org.clone(),
            due_date: opportunity.deadline,
            value: estimate_value(&opportunity.compensation),
        })
        .await
    }

    /// Move an item to any stage
    pub async fn set_stage(&self, id: &str, stage: PipelineStage) -> Result<Synced<PipelineItem>> {
        let target = self.write_target()?;
        self.ensure_pipeline().await?;

        let (item, snapshot) = {
            let mut cache = self.cache.lock().await;
            let items = cache.pipeline.get_or_insert_with(Vec::new);
            let item = items
                .iter_mut()
                .find(|i| i.id == id)
                .ok_or_else(|| SdkError::NotFound(format!("pipeline item {}", id)))?;
            item.stage = stage;
            (item.clone(), items.clone())
        };

        let outcome = match target {
            Target::Remote {
                gateway,
                user_id,
                token,
            } => gateway
                .update_pipeline(token, id, user_id, &PipelineItemPatch::stage(stage))
                .await
                .map_err(SdkError::from),
            _ => self.store.write_pipeline_items(&snapshot).await,
        };

        let notice = outcome.err().map(|e| failure_notice("update the stage", e));
        Ok(Synced::with_notice(item, notice))
    }

    pub async fn save_profile(&self, profile: MemberProfile) -> Result<Synced<MemberProfile>> {
        let target = self.write_target()?;
        if matches!(profile.pay_floor, Some(floor) if !floor.is_finite() || floor < 0.0) {
            return Err(SdkError::Validation("pay floor must be a non-negative number".into()));
        }

        self.cache.lock().await.profile = Some(profile.clone());

        let outcome = match target {
            Target::Remote {
                gateway,
                user_id,
                token,
            } => gateway
                .upsert_profile(token, &profile.to_row(user_id))
                .await
                .map_err(SdkError::from),
            _ => self.store.write_demo_profile(&profile).await,
        };

        let notice = outcome.err().map(|e| failure_notice("save the profile", e));
        Ok(Synced::with_notice(profile, notice))
    }

    /// Schedule a mentor check-in
    pub async fn add_checkin(&self, input: NewCheckin) -> Result<Synced<MentorCheckin>> {
        let target = self.write_target()?;
        let mentor_name = input.mentor_name.trim();
        let topic = input.topic.trim();
        let next_check_in = match input.next_check_in {
            Some(date) if !mentor_name.is_empty() && !topic.is_empty() => date,
            _ => {
                return Err(SdkError::Validation(
                    "mentor name, topic and date are required".into(),
                ))
            }
        };
        self.ensure_checkins().await?;

        let checkin = MentorCheckin {
            id: format!("mentor-{}", Uuid::new_v4()),
            mentor_name: mentor_name.to_string(),
            topic: topic.to_string(),
            next_check_in,
            notes: input
                .notes
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            status: CheckinStatus::Scheduled,
        };

        let snapshot = {
            let mut cache = self.cache.lock().await;
            let checkins = cache.checkins.get_or_insert_with(Vec::new);
            checkins.push(checkin.clone());
            checkins.sort_by_key(|c| c.next_check_in);
            checkins.clone()
        };

        let outcome = match target {
            Target::Remote {
                gateway,
                user_id,
                token,
            } => gateway
                .insert_checkin(token, &checkin.to_row(user_id))
                .await
                .map_err(SdkError::from),
            _ => self.store.write_checkins(&snapshot).await,
        };

        let notice = outcome.err().map(|e| failure_notice("schedule the check-in", e));
        Ok(Synced::with_notice(checkin, notice))
    }
}
