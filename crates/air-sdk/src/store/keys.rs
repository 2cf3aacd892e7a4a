//! Key names for the local mirror store

use chrono::NaiveDate;

pub const SAVED_IDS: &str = "air-demo-saved-ids-v1";
pub const PIPELINE_ITEMS: &str = "air-demo-pipeline-items-v1";
pub const DEMO_PROFILE: &str = "air-demo-profile-v1";
pub const CHECKINS: &str = "air-demo-checkins-v1";
pub const DEMO_SESSION: &str = "air-demo-session-v1";
pub const REMOTE_SESSION: &str = "air-remote-session-v1";
pub const ADVOCACY_ISSUES: &str = "air-advocacy-issues-v1";
pub const ADVOCACY_PLEDGE: &str = "air-advocacy-pledge-v1";

/// Dashboard task flags for one day
pub fn task_done(day: NaiveDate) -> String {
    format!("air-task-done-{}", day)
}

/// Dashboard reminder flags for one day
pub fn reminder_done(day: NaiveDate) -> String {
    format!("air-reminder-done-{}", day)
}
