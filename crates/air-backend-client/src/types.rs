//! Types for the backend REST and auth APIs
//!
//! Row structs mirror the hosted tables column for column, so they
//! serialize straight into insert bodies and deserialize from selects.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Client configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the hosted backend (e.g. "https://abc.supabase.co")
    pub base_url: String,
    /// Public anonymous key, sent as `apikey` on every request
    pub anon_key: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            anon_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            ..Default::default()
        }
    }
}

// ==================== Table names ====================

pub const OPPORTUNITIES: &str = "opportunities";
pub const PIPELINE_ITEMS: &str = "pipeline_items";
pub const MEMBER_PROFILES: &str = "member_profiles";
pub const SAVED_OPPORTUNITIES: &str = "saved_opportunities";
pub const MENTOR_CHECKINS: &str = "mentor_checkins";

// ==================== Enumerations ====================

/// Kind of listed opportunity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpportunityType {
    Job,
    Grant,
    #[serde(rename = "Pitch Call")]
    PitchCall,
    Fellowship,
}

impl OpportunityType {
    pub const ALL: [OpportunityType; 4] = [
        OpportunityType::Job,
        OpportunityType::Grant,
        OpportunityType::PitchCall,
        OpportunityType::Fellowship,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OpportunityType::Job => "Job",
            OpportunityType::Grant => "Grant",
            OpportunityType::PitchCall => "Pitch Call",
            OpportunityType::Fellowship => "Fellowship",
        }
    }
}

impl std::fmt::Display for OpportunityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for OpportunityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['-', '_'], " ");
        OpportunityType::ALL
            .into_iter()
            .find(|t| t.label().to_lowercase() == wanted)
            .ok_or_else(|| format!("unknown opportunity type: {}", s))
    }
}

/// Pipeline stage, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PipelineStage {
    #[serde(rename = "To Pitch")]
    ToPitch,
    Applied,
    Interview,
    Booked,
    Invoiced,
    Paid,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 6] = [
        PipelineStage::ToPitch,
        PipelineStage::Applied,
        PipelineStage::Interview,
        PipelineStage::Booked,
        PipelineStage::Invoiced,
        PipelineStage::Paid,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PipelineStage::ToPitch => "To Pitch",
            PipelineStage::Applied => "Applied",
            PipelineStage::Interview => "Interview",
            PipelineStage::Booked => "Booked",
            PipelineStage::Invoiced => "Invoiced",
            PipelineStage::Paid => "Paid",
        }
    }

    /// Work has been won (booked or later)
    pub fn is_booked(&self) -> bool {
        matches!(
            self,
            PipelineStage::Booked | PipelineStage::Invoiced | PipelineStage::Paid
        )
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for PipelineStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['-', '_'], " ");
        PipelineStage::ALL
            .into_iter()
            .find(|st| st.label().to_lowercase() == wanted)
            .ok_or_else(|| format!("unknown pipeline stage: {}", s))
    }
}

/// Mentor check-in status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CheckinStatus {
    #[default]
    Scheduled,
    Completed,
}

// ==================== Table rows ====================

/// Row of `opportunities`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityRow {
    pub id: String,
    pub title: String,
    pub org: String,
    #[serde(rename = "type")]
    pub kind: OpportunityType,
    pub location: String,
    pub compensation: String,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub tags: Vec<String>,
    pub match_reason: String,
}

/// Row of `pipeline_items`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineItemRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub client: String,
    pub due_date: NaiveDate,
    pub value: f64,
    pub stage: PipelineStage,
}

/// Partial update for `pipeline_items`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineItemPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<PipelineStage>,
}

impl PipelineItemPatch {
    pub fn stage(stage: PipelineStage) -> Self {
        Self {
            stage: Some(stage),
            ..Default::default()
        }
    }
}

/// Row of `member_profiles`, one per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberProfileRow {
    pub user_id: String,
    pub display_name: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub beats: Vec<String>,
    pub pay_floor: Option<f64>,
    /// Left out of upserts when unset so the stored value is kept
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_daily: Option<bool>,
}

/// Row of `saved_opportunities`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedOpportunityRow {
    pub user_id: String,
    pub opportunity_id: String,
}

/// Row of `mentor_checkins`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentorCheckinRow {
    pub id: String,
    pub user_id: String,
    pub mentor_name: String,
    pub topic: String,
    pub next_check_in: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: CheckinStatus,
}

/// Partial update for `mentor_checkins`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MentorCheckinPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_check_in: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CheckinStatus>,
}

// ==================== Auth ====================

/// Email/password pair for the password grant and sign-up
#[derive(Debug, Clone, Serialize)]
pub struct PasswordCredentials {
    pub email: String,
    pub password: String,
}

/// Body of the refresh-token grant
#[derive(Debug, Clone, Serialize)]
pub struct RefreshTokenGrant {
    pub refresh_token: String,
}

/// Authenticated user as reported by the auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Session returned by the password and refresh-token grants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

/// Error body returned by the auth and REST services
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default, alias = "msg", alias = "error_description")]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_wire_names() {
        let json = serde_json::to_string(&PipelineStage::ToPitch).unwrap();
        assert_eq!(json, "\"To Pitch\"");
        let stage: PipelineStage = serde_json::from_str("\"Invoiced\"").unwrap();
        assert_eq!(stage, PipelineStage::Invoiced);
    }

    #[test]
    fn test_stage_parse_is_lenient() {
        assert_eq!("to-pitch".parse::<PipelineStage>().unwrap(), PipelineStage::ToPitch);
        assert_eq!("PAID".parse::<PipelineStage>().unwrap(), PipelineStage::Paid);
        assert!("shipped".parse::<PipelineStage>().is_err());
    }

    #[test]
    fn test_opportunity_row_column_names() {
        let row: OpportunityRow = serde_json::from_value(serde_json::json!({
            "id": "opp-003",
            "title": "Open Pitch: Culture and Place",
            "org": "National Audio Review",
            "type": "Pitch Call",
            "location": "Remote",
            "compensation": "$1.25 per published word",
            "deadline": "2026-02-28",
            "match_reason": "Fast-turn pitch",
            "created_at": "2026-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(row.kind, OpportunityType::PitchCall);
        assert_eq!(row.deadline, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
        assert!(row.tags.is_empty());
    }

    #[test]
    fn test_profile_upsert_omits_unset_notify_daily() {
        let row = MemberProfileRow {
            user_id: "user-1".into(),
            display_name: Some("Kim".into()),
            location: None,
            skills: vec![],
            beats: vec![],
            pay_floor: None,
            notify_daily: None,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert!(json.get("notify_daily").is_none());

        let stored: MemberProfileRow = serde_json::from_value(serde_json::json!({
            "user_id": "user-1",
            "display_name": null,
            "location": null,
            "pay_floor": null,
            "notify_daily": true
        }))
        .unwrap();
        assert_eq!(stored.notify_daily, Some(true));
    }

    #[test]
    fn test_patch_skips_unset_columns() {
        let patch = PipelineItemPatch::stage(PipelineStage::Booked);
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "stage": "Booked" }));
    }
}
