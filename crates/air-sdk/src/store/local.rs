//! JSON key-value store scoped to one profile directory
//!
//! One file per key. Reads never fail: a missing or undecodable payload
//! yields the caller's fallback. Writes replace the whole value via a
//! temporary file and rename.

use super::keys;
use crate::advocacy::{AdvocacyIssue, Pledge};
use crate::error::Result;
use crate::models::{MemberProfile, MentorCheckin, PipelineItem};
use serde::de::DeserializeOwned;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Local mirror store
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    /// Decode the value under `key`, or `None` if absent or corrupt
    pub async fn read_optional<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path_for(key);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(key, error = %e, "local store read failed, using fallback");
                return None;
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "local store payload undecodable, using fallback");
                None
            }
        }
    }

    /// Decode the value under `key`, or return `fallback`
    pub async fn read<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        self.read_optional(key).await.unwrap_or(fallback)
    }

    /// Replace the value under `key`
    pub async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let payload = serde_json::to_vec(value)?;
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.path_for(key);
        let tmp = self.root.join(format!(".{}.json.tmp", key));
        tokio::fs::write(&tmp, &payload).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(key, bytes = payload.len(), "local store write");
        Ok(())
    }

    /// Delete the value under `key`; absent keys are not an error
    pub async fn remove(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    // ==================== Demo-mode accessors ====================

    pub async fn saved_ids(&self) -> Vec<String> {
        self.read(keys::SAVED_IDS, Vec::new()).await
    }

    pub async fn write_saved_ids(&self, ids: &[String]) -> Result<()> {
        self.write(keys::SAVED_IDS, ids).await
    }

    pub async fn pipeline_items(&self) -> Vec<PipelineItem> {
        self.read(keys::PIPELINE_ITEMS, Vec::new()).await
    }

    pub async fn write_pipeline_items(&self, items: &[PipelineItem]) -> Result<()> {
        self.write(keys::PIPELINE_ITEMS, items).await
    }

    pub async fn demo_profile(&self) -> Option<MemberProfile> {
        self.read_optional(keys::DEMO_PROFILE).await
    }

    pub async fn write_demo_profile(&self, profile: &MemberProfile) -> Result<()> {
        self.write(keys::DEMO_PROFILE, profile).await
    }

    pub async fn checkins(&self) -> Vec<MentorCheckin> {
        self.read(keys::CHECKINS, Vec::new()).await
    }

    pub async fn write_checkins(&self, checkins: &[MentorCheckin]) -> Result<()> {
        self.write(keys::CHECKINS, checkins).await
    }

    // ==================== Advocacy ====================

    pub async fn advocacy_issues(&self) -> Vec<AdvocacyIssue> {
        self.read(keys::ADVOCACY_ISSUES, Vec::new()).await
    }

    pub async fn write_advocacy_issues(&self, issues: &[AdvocacyIssue]) -> Result<()> {
        self.write(keys::ADVOCACY_ISSUES, issues).await
    }

    pub async fn pledge(&self) -> Pledge {
        self.read(keys::ADVOCACY_PLEDGE, Pledge::default()).await
    }

    pub async fn write_pledge(&self, pledge: &Pledge) -> Result<()> {
        self.write(keys::ADVOCACY_PLEDGE, pledge).await
    }

    // ==================== Dashboard checklist ====================

    pub async fn task_done(&self, day: NaiveDate) -> BTreeMap<String, bool> {
        self.read(&keys::task_done(day), BTreeMap::new()).await
    }

    pub async fn write_task_done(&self, day: NaiveDate, done: &BTreeMap<String, bool>) -> Result<()> {
        self.write(&keys::task_done(day), done).await
    }

    pub async fn reminder_done(&self, day: NaiveDate) -> BTreeMap<String, bool> {
        self.read(&keys::reminder_done(day), BTreeMap::new()).await
    }

    pub async fn write_reminder_done(&self, day: NaiveDate, done: &BTreeMap<String, bool>) -> Result<()> {
        self.write(&keys::reminder_done(day), done).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use air_backend_client::PipelineStage;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_key_returns_fallback() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());

        let value: Vec<String> = store.read("nothing-here", vec!["x".to_string()]).await;
        assert_eq!(value, vec!["x"]);
    }

    #[tokio::test]
    async fn test_write_then_read_pipeline() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path().join("nested/profile"));

        let items = vec![PipelineItem {
            id: "pipe-1".into(),
            title: "Soundwalk".into(),
            client: "Northline Radio".into(),
            due_date: NaiveDate::from_ymd_opt(2026, 2, 24).unwrap(),
            value: 1800.0,
            stage: PipelineStage::Applied,
        }];
        store.write_pipeline_items(&items).await.unwrap();

        assert_eq!(store.pipeline_items().await, items);
    }

    #[tokio::test]
    async fn test_corrupt_payload_returns_fallback() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());
        std::fs::write(dir.path().join(format!("{}.json", keys::SAVED_IDS)), b"{not json").unwrap();

        assert!(store.saved_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_write_replaces_previous_value() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());

        store.write_saved_ids(&["opp-001".into(), "opp-002".into()]).await.unwrap();
        store.write_saved_ids(&["opp-003".into()]).await.unwrap();

        assert_eq!(store.saved_ids().await, vec!["opp-003"]);
    }

    #[tokio::test]
    async fn test_daily_flags_are_keyed_by_date() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());
        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

        let mut done = BTreeMap::new();
        done.insert("Send 2 pitch follow-ups".to_string(), true);
        store.write_task_done(day, &done).await.unwrap();

        assert!(dir.path().join("air-task-done-2026-03-01.json").exists());
        assert_eq!(store.task_done(day).await, done);
        assert!(store.reminder_done(day).await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::new(dir.path());

        store.write(keys::DEMO_SESSION, &serde_json::json!({"id": "demo-user"})).await.unwrap();
        store.remove(keys::DEMO_SESSION).await.unwrap();
        store.remove(keys::DEMO_SESSION).await.unwrap();

        let gone: Option<serde_json::Value> = store.read_optional(keys::DEMO_SESSION).await;
        assert!(gone.is_none());
    }
}
