//! Member-facing records
//!
//! These are the shapes the front end works with and the shapes persisted
//! by the local mirror store. Conversions to and from the backend rows live
//! here so the gateway stays a thin transport.

use air_backend_client::{
    CheckinStatus, MemberProfileRow, MentorCheckinRow, OpportunityRow, OpportunityType,
    PipelineItemRow, PipelineStage,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A listed job, grant, pitch call or fellowship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    pub org: String,
    #[serde(rename = "type")]
    pub kind: OpportunityType,
    pub location: String,
    pub compensation: String,
    pub deadline: NaiveDate,
    pub tags: Vec<String>,
    pub match_reason: String,
}

impl From<OpportunityRow> for Opportunity {
    fn from(row: OpportunityRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            org: row.org,
            kind: row.kind,
            location: row.location,
            compensation: row.compensation,
            deadline: row.deadline,
            tags: row.tags,
            match_reason: row.match_reason,
        }
    }
}

/// A tracked piece of work moving through the sales pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineItem {
    pub id: String,
    pub title: String,
    pub client: String,
    pub due_date: NaiveDate,
    pub value: f64,
    pub stage: PipelineStage,
}

impl PipelineItem {
    pub fn to_row(&self, user_id: &str) -> PipelineItemRow {
        PipelineItemRow {
            id: self.id.clone(),
            user_id: user_id.to_string(),
            title: self.title.clone(),
            client: self.client.clone(),
            due_date: self.due_date,
            value: self.value,
            stage: self.stage,
        }
    }
}

impl From<PipelineItemRow> for PipelineItem {
    fn from(row: PipelineItemRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            client: row.client,
            due_date: row.due_date,
            value: row.value,
            stage: row.stage,
        }
    }
}

/// Input for a new pipeline item
#[derive(Debug, Clone, PartialEq)]
pub struct NewPipelineItem {
    pub title: String,
    pub client: String,
    pub due_date: NaiveDate,
    pub value: f64,
}

impl NewPipelineItem {
    /// Presence and value checks
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() || self.client.trim().is_empty() {
            return Err("title and client are required".into());
        }
        if !self.value.is_finite() || self.value <= 0.0 {
            return Err("value must be a positive number".into());
        }
        Ok(())
    }
}

/// Input for a new mentor check-in
#[derive(Debug, Clone, PartialEq)]
pub struct NewCheckin {
    pub mentor_name: String,
    pub topic: String,
    pub next_check_in: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Totals shown above the pipeline board
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PipelineSummary {
    pub total_value: f64,
    pub booked_count: usize,
    pub paid_count: usize,
}

impl PipelineSummary {
    pub fn from_items(items: &[PipelineItem]) -> Self {
        items.iter().fold(Self::default(), |mut acc, item| {
            acc.total_value += item.value;
            if item.stage.is_booked() {
                acc.booked_count += 1;
            }
            if item.stage == PipelineStage::Paid {
                acc.paid_count += 1;
            }
            acc
        })
    }
}

/// Member preferences used as ranking input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfile {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub beats: Vec<String>,
    #[serde(default)]
    pub pay_floor: Option<f64>,
}

impl MemberProfile {
    pub fn to_row(&self, user_id: &str) -> MemberProfileRow {
        MemberProfileRow {
            user_id: user_id.to_string(),
            display_name: non_blank(&self.display_name),
            location: non_blank(&self.location),
            skills: self.skills.clone(),
            beats: self.beats.clone(),
            pay_floor: self.pay_floor,
            notify_daily: None,
        }
    }
}

impl From<MemberProfileRow> for MemberProfile {
    fn from(row: MemberProfileRow) -> Self {
        Self {
            display_name: row.display_name.unwrap_or_default(),
            location: row.location.unwrap_or_default(),
            skills: row.skills,
            beats: row.beats,
            pay_floor: row.pay_floor,
        }
    }
}

/// A scheduled conversation with a mentor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorCheckin {
    pub id: String,
    pub mentor_name: String,
    pub topic: String,
    pub next_check_in: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: CheckinStatus,
}

impl MentorCheckin {
    pub fn to_row(&self, user_id: &str) -> MentorCheckinRow {
        MentorCheckinRow {
            id: self.id.clone(),
            user_id: user_id.to_string(),
            mentor_name: self.mentor_name.clone(),
            topic: self.topic.clone(),
            next_check_in: self.next_check_in,
            notes: self.notes.clone(),
            status: self.status,
        }
    }
}

impl From<MentorCheckinRow> for MentorCheckin {
    fn from(row: MentorCheckinRow) -> Self {
        Self {
            id: row.id,
            mentor_name: row.mentor_name,
            topic: row.topic,
            next_check_in: row.next_check_in,
            notes: row.notes,
            status: row.status,
        }
    }
}

/// Split a comma-separated form field into trimmed, non-empty entries
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(stage: PipelineStage, value: f64) -> PipelineItem {
        PipelineItem {
            id: format!("pipe-{}", stage),
            title: "t".into(),
            client: "c".into(),
            due_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            value,
            stage,
        }
    }

    #[test]
    fn test_summary_counts_booked_and_paid() {
        let items = vec![
            item(PipelineStage::Applied, 1800.0),
            item(PipelineStage::Booked, 2500.0),
            item(PipelineStage::Invoiced, 1000.0),
            item(PipelineStage::Paid, 700.0),
        ];
        let summary = PipelineSummary::from_items(&items);

        assert_eq!(summary.total_value, 6000.0);
        assert_eq!(summary.booked_count, 3);
        assert_eq!(summary.paid_count, 1);
    }

    #[test]
    fn test_new_item_validation() {
        let mut input = NewPipelineItem {
            title: "Soundwalk".into(),
            client: "Northline Radio".into(),
            due_date: NaiveDate::from_ymd_opt(2026, 2, 24).unwrap(),
            value: 1800.0,
        };
        assert!(input.validate().is_ok());

        input.client = "  ".into();
        assert!(input.validate().is_err());

        input.client = "Northline Radio".into();
        input.value = 0.0;
        assert!(input.validate().is_err());
        input.value = f64::NAN;
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list(" Audio, Editing ,, "), vec!["Audio", "Editing"]);
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_profile_row_blanks_become_null() {
        let profile = MemberProfile {
            display_name: "  ".into(),
            location: "Chicago".into(),
            ..Default::default()
        };
        let row = profile.to_row("user-1");
        assert_eq!(row.display_name, None);
        assert_eq!(row.location.as_deref(), Some("Chicago"));
    }

    #[test]
    fn test_profile_upsert_body_leaves_notify_daily_alone() {
        let profile = MemberProfile {
            display_name: "Kim".into(),
            ..Default::default()
        };
        let body = serde_json::to_value(profile.to_row("ana")).unwrap();
        assert!(body.get("notify_daily").is_none());
        assert_eq!(body["display_name"], "Kim");
    }

    #[test]
    fn test_pipeline_item_local_json_is_camel_case() {
        let json = serde_json::to_value(item(PipelineStage::ToPitch, 1.0)).unwrap();
        assert_eq!(json["dueDate"], "2026-03-01");
        assert_eq!(json["stage"], "To Pitch");
    }
}
