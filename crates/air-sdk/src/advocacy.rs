//! Advocacy issue log and fair-practice pledge
//!
//! Kept in the local mirror store whatever the session mode.

use crate::error::{Result, SdkError};
use crate::store::LocalStore;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Organisation recorded when none was given
pub const UNKNOWN_ORG: &str = "Not provided";

/// A reported workplace problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvocacyIssue {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub org: String,
    pub details: String,
    pub created_at: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PledgeItem {
    FairRate,
    WrittenTerms,
    PaymentFollowup,
}

impl PledgeItem {
    pub const ALL: [PledgeItem; 3] = [
        PledgeItem::FairRate,
        PledgeItem::WrittenTerms,
        PledgeItem::PaymentFollowup,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PledgeItem::FairRate => "Quote at or above my rate floor",
            PledgeItem::WrittenTerms => "Get terms in writing before starting",
            PledgeItem::PaymentFollowup => "Follow up on late payments within a week",
        }
    }
}

impl std::str::FromStr for PledgeItem {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
            "fair-rate" => Ok(PledgeItem::FairRate),
            "written-terms" => Ok(PledgeItem::WrittenTerms),
            "payment-followup" => Ok(PledgeItem::PaymentFollowup),
            other => Err(SdkError::Validation(format!("unknown pledge item: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pledge {
    #[serde(default)]
    pub fair_rate: bool,
    #[serde(default)]
    pub written_terms: bool,
    #[serde(default)]
    pub payment_followup: bool,
}

impl Pledge {
    pub fn is_checked(&self, item: PledgeItem) -> bool {
        match item {
            PledgeItem::FairRate => self.fair_rate,
            PledgeItem::WrittenTerms => self.written_terms,
            PledgeItem::PaymentFollowup => self.payment_followup,
        }
    }

    fn flag_mut(&mut self, item: PledgeItem) -> &mut bool {
        match item {
            PledgeItem::FairRate => &mut self.fair_rate,
            PledgeItem::WrittenTerms => &mut self.written_terms,
            PledgeItem::PaymentFollowup => &mut self.payment_followup,
        }
    }

    /// Number of checked items
    pub fn count(&self) -> usize {
        PledgeItem::ALL.iter().filter(|i| self.is_checked(**i)).count()
    }
}

/// Advocacy tracker over a local store
pub struct Advocacy {
    store: LocalStore,
}

impl Advocacy {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Logged issues, newest first
    pub async fn issues(&self) -> Vec<AdvocacyIssue> {
        self.store.advocacy_issues().await
    }

    pub async fn log_issue(&self, kind: &str, org: &str, details: &str) -> Result<AdvocacyIssue> {
        let details = details.trim();
        if details.is_empty() {
            return Err(SdkError::Validation("issue details are required".into()));
        }
        let org = match org.trim() {
            "" => UNKNOWN_ORG,
            org => org,
        };

        let issue = AdvocacyIssue {
            id: Uuid::new_v4().to_string(),
            kind: kind.trim().to_string(),
            org: org.to_string(),
            details: details.to_string(),
            created_at: Utc::now().date_naive(),
        };

        let mut issues = self.issues().await;
        issues.insert(0, issue.clone());
        self.store.write_advocacy_issues(&issues).await?;

        debug!(id = %issue.id, kind = %issue.kind, "advocacy issue logged");
        Ok(issue)
    }

    pub async fn pledge(&self) -> Pledge {
        self.store.pledge().await
    }

    /// Flip one pledge item and return the new state
    pub async fn toggle_pledge(&self, item: PledgeItem) -> Result<Pledge> {
        let mut pledge = self.pledge().await;
        let flag = pledge.flag_mut(item);
        *flag = !*flag;
        self.store.write_pledge(&pledge).await?;
        Ok(pledge)
    }

    pub async fn pledge_count(&self) -> usize {
        self.pledge().await.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_log_issue_newest_first() {
        let dir = TempDir::new().unwrap();
        let advocacy = Advocacy::new(LocalStore::new(dir.path()));

        advocacy.log_issue("Low pay", "Northline Radio", "Rate cut mid-project").await.unwrap();
        let second = advocacy.log_issue("Late payment", "  ", " 90 days overdue ").await.unwrap();

        assert_eq!(second.org, UNKNOWN_ORG);
        assert_eq!(second.details, "90 days overdue");

        let issues = advocacy.issues().await;
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].id, second.id);
    }

    #[tokio::test]
    async fn test_blank_details_rejected() {
        let dir = TempDir::new().unwrap();
        let advocacy = Advocacy::new(LocalStore::new(dir.path()));

        let err = advocacy.log_issue("Low pay", "Org", "   ").await.unwrap_err();
        assert!(matches!(err, SdkError::Validation(_)));
        assert!(advocacy.issues().await.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_pledge() {
        let dir = TempDir::new().unwrap();
        let advocacy = Advocacy::new(LocalStore::new(dir.path()));
        assert_eq!(advocacy.pledge_count().await, 0);

        advocacy.toggle_pledge(PledgeItem::FairRate).await.unwrap();
        advocacy.toggle_pledge(PledgeItem::WrittenTerms).await.unwrap();
        let pledge = advocacy.toggle_pledge(PledgeItem::FairRate).await.unwrap();

        assert!(!pledge.fair_rate);
        assert!(pledge.written_terms);
        assert_eq!(advocacy.pledge_count().await, 1);
    }

    #[test]
    fn test_pledge_item_parsing() {
        assert_eq!("fair_rate".parse::<PledgeItem>().unwrap(), PledgeItem::FairRate);
        assert_eq!("Payment Followup".parse::<PledgeItem>().unwrap(), PledgeItem::PaymentFollowup);
        assert!("dental".parse::<PledgeItem>().is_err());
    }

    #[test]
    fn test_pledge_json_matches_stored_shape() {
        let json = serde_json::to_value(Pledge {
            fair_rate: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"fairRate": true, "writtenTerms": false, "paymentFollowup": false})
        );
    }
}
