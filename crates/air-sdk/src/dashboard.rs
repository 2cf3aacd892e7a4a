//! Home dashboard
//!
//! A daily snapshot built from the pipeline, the opportunity listing and
//! mentor check-ins, plus a checklist whose done state is kept per day in
//! the local store. Building the snapshot is pure; `today` is passed in.

use crate::error::{Result, SdkError};
use crate::models::{MentorCheckin, Opportunity, PipelineItem};
use crate::store::LocalStore;
use air_backend_client::{CheckinStatus, PipelineStage};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Anything due within this many days (or overdue) is urgent
pub const REMINDER_WINDOW_DAYS: i64 = 7;

const DUE_SOON_LIMIT: usize = 3;
const CHECKIN_REMINDER_LIMIT: usize = 2;
const UPCOMING_CHECKIN_LIMIT: usize = 3;

/// Id of the placeholder shown when nothing is urgent
pub const NO_URGENT_REMINDER: &str = "no-urgent";

/// Fixed daily to-do list
pub const DAILY_TASKS: [&str; 3] = [
    "Send 2 pitch follow-ups",
    "Review one contract with rate floor",
    "Schedule or confirm coaching check-in",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub text: String,
}

/// Done flags for one day, keyed by task text and reminder id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyProgress {
    pub tasks: BTreeMap<String, bool>,
    pub reminders: BTreeMap<String, bool>,
}

impl DailyProgress {
    pub fn task_done(&self, task: &str) -> bool {
        self.tasks.get(task).copied().unwrap_or(false)
    }

    pub fn reminder_done(&self, id: &str) -> bool {
        self.reminders.get(id).copied().unwrap_or(false)
    }
}

/// Snapshot shown on the home screen
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub today: NaiveDate,
    pub opportunity_count: usize,
    /// Earliest deadline in the listing
    pub next_deadline: Option<NaiveDate>,
    pub pipeline_value: f64,
    /// Every stage in display order, including empty ones
    pub stage_counts: Vec<(PipelineStage, usize)>,
    /// Unpaid items due within the window, in pipeline order
    pub due_soon: Vec<PipelineItem>,
    /// Scheduled check-ins, soonest first
    pub upcoming_checkins: Vec<MentorCheckin>,
    /// Never empty
    pub reminders: Vec<Reminder>,
}

fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}

impl Dashboard {
    pub fn build(
        pipeline: &[PipelineItem],
        opportunities: &[Opportunity],
        checkins: &[MentorCheckin],
        today: NaiveDate,
    ) -> Self {
        let stage_counts = PipelineStage::ALL
            .into_iter()
            .map(|stage| (stage, pipeline.iter().filter(|i| i.stage == stage).count()))
            .collect();

        let due_soon: Vec<PipelineItem> = pipeline
            .iter()
            .filter(|i| i.stage != PipelineStage::Paid)
            .filter(|i| days_until(i.due_date, today) <= REMINDER_WINDOW_DAYS)
            .take(DUE_SOON_LIMIT)
            .cloned()
            .collect();

        let mut scheduled: Vec<MentorCheckin> = checkins
            .iter()
            .filter(|c| c.status == CheckinStatus::Scheduled)
            .cloned()
            .collect();
        scheduled.sort_by_key(|c| c.next_check_in);

        let next_deadline = opportunities.iter().map(|o| o.deadline).min();

        let mut reminders = Vec::new();
        if let Some(deadline) = next_deadline {
            let days = days_until(deadline, today);
            if days <= REMINDER_WINDOW_DAYS {
                reminders.push(Reminder {
                    id: format!("opp-deadline-{}", deadline),
                    text: format!("Opportunity deadline in {} day(s) ({}).", days, deadline),
                });
            }
        }
        for item in &due_soon {
            reminders.push(Reminder {
                id: format!("pipeline-{}", item.id),
                text: format!("Work follow-up: {} is due by {}.", item.title, item.due_date),
            });
        }
        for checkin in scheduled.iter().take(CHECKIN_REMINDER_LIMIT) {
            let days = days_until(checkin.next_check_in, today);
            if days <= REMINDER_WINDOW_DAYS {
                reminders.push(Reminder {
                    id: format!("mentor-{}", checkin.id),
                    text: format!(
                        "Coaching check-in with {} in {} day(s).",
                        checkin.mentor_name, days
                    ),
                });
            }
        }
        if reminders.is_empty() {
            reminders.push(Reminder {
                id: NO_URGENT_REMINDER.to_string(),
                text: "No urgent reminders. Use today for outreach and profile updates.".into(),
            });
        }

        scheduled.truncate(UPCOMING_CHECKIN_LIMIT);

        Self {
            today,
            opportunity_count: opportunities.len(),
            next_deadline,
            pipeline_value: pipeline.iter().map(|i| i.value).sum(),
            stage_counts,
            due_soon,
            upcoming_checkins: scheduled,
            reminders,
        }
    }

    /// Percentage of today's tasks and current reminders marked done,
    /// rounded half up. Flags for reminders no longer shown do not count.
    pub fn focus_score(&self, progress: &DailyProgress) -> u8 {
        let total = DAILY_TASKS.len() + self.reminders.len();
        let done = DAILY_TASKS.iter().filter(|t| progress.task_done(t)).count()
            + self
                .reminders
                .iter()
                .filter(|r| progress.reminder_done(&r.id))
                .count();
        ((done * 100 + total / 2) / total) as u8
    }
}

/// Per-day done state for the dashboard checklist
pub struct DailyChecklist {
    store: LocalStore,
}

impl DailyChecklist {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub async fn progress(&self, day: NaiveDate) -> DailyProgress {
        DailyProgress {
            tasks: self.store.task_done(day).await,
            reminders: self.store.reminder_done(day).await,
        }
    }

    /// Flip one of [`DAILY_TASKS`] for `day`
    pub async fn toggle_task(&self, day: NaiveDate, task: &str) -> Result<DailyProgress> {
        if !DAILY_TASKS.contains(&task) {
            return Err(SdkError::Validation(format!("unknown daily task: {}", task)));
        }
        let mut progress = self.progress(day).await;
        let done = !progress.task_done(task);
        progress.tasks.insert(task.to_string(), done);
        self.store.write_task_done(day, &progress.tasks).await?;

        debug!(%day, task, done, "daily task toggled");
        Ok(progress)
    }

    /// Flip a reminder by id for `day`
    pub async fn toggle_reminder(&self, day: NaiveDate, id: &str) -> Result<DailyProgress> {
        let id = id.trim();
        if id.is_empty() {
            return Err(SdkError::Validation("reminder id is required".into()));
        }
        let mut progress = self.progress(day).await;
        let done = !progress.reminder_done(id);
        progress.reminders.insert(id.to_string(), done);
        self.store.write_reminder_done(day, &progress.reminders).await?;

        debug!(%day, id, done, "reminder toggled");
        Ok(progress)
    }
}
