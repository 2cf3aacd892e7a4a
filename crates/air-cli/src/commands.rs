//! Subcommands
//!
//! Each command resolves the session once, performs one member operation
//! and prints the result. Sync notices go to the same output so the member
//! sees them next to the data they qualify.

use air_sdk::catalog::{
    contract_template, negotiation_script, role_or_default, CONTRACT_TEMPLATES,
    NEGOTIATION_SCRIPTS,
};
use air_sdk::{
    parse_list, quote, rank, Advocacy, DailyChecklist, DailyProgress, Dashboard, MemberData,
    NewCheckin, NewPipelineItem, OpportunityFilter, OpportunityType, PipelineStage,
    PipelineSummary, PledgeItem, QuoteInput, SdkError, SessionMode, SessionResolver, Synced,
    DAILY_TASKS,
};
use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use std::io::Write;
use tracing::debug;

use crate::config::Args;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the active session
    Status,

    /// Local demo sign-in
    #[command(subcommand)]
    Demo(DemoCommand),

    /// Sign in to the hosted backend
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long, env = "AIR_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create a hosted account
    SignUp {
        #[arg(long)]
        email: String,
        #[arg(long, env = "AIR_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out of every session
    SignOut,

    /// Daily briefing: focus score, reminders and stage counts
    Dashboard {
        #[command(subcommand)]
        action: Option<DashboardCommand>,
    },

    /// List opportunities ranked by fit
    Opportunities {
        /// Only this type (Job, Grant, "Pitch Call", Fellowship)
        #[arg(long = "type")]
        kind: Option<OpportunityType>,
        /// Search title, organisation and tags
        #[arg(long, default_value = "")]
        query: String,
        /// Only saved opportunities
        #[arg(long)]
        saved: bool,
    },

    /// Save or unsave an opportunity
    Save { id: String },

    /// Add an opportunity to the pipeline
    Track { id: String },

    #[command(subcommand)]
    Pipeline(PipelineCommand),

    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Mentor check-ins
    #[command(subcommand)]
    Checkin(CheckinCommand),

    /// Rate calculator
    Quote {
        /// Role preset id
        #[arg(long, default_value = "producer")]
        role: String,
        #[arg(long, default_value = "1")]
        days: String,
        #[arg(long, default_value = "0")]
        revisions: String,
        #[arg(long)]
        rush: bool,
        #[arg(long, default_value = "0")]
        travel: String,
    },

    /// Contract templates and negotiation scripts
    #[command(subcommand)]
    Toolkit(ToolkitCommand),

    #[command(subcommand)]
    Advocacy(AdvocacyCommand),
}

#[derive(Subcommand, Debug, Clone)]
pub enum DemoCommand {
    Start {
        #[arg(long)]
        email: Option<String>,
    },
    Stop,
}

#[derive(Subcommand, Debug, Clone)]
pub enum DashboardCommand {
    /// Mark a daily task done or open again (1-3)
    Task { number: usize },
    /// Mark a reminder done or open again
    Reminder { id: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum PipelineCommand {
    List,
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        client: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: NaiveDate,
        #[arg(long)]
        value: f64,
    },
    /// Move an item to a stage
    Stage { id: String, stage: PipelineStage },
    Summary,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProfileCommand {
    Show,
    /// Update fields; omitted fields keep their value
    Set {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// Comma-separated
        #[arg(long)]
        skills: Option<String>,
        /// Comma-separated
        #[arg(long)]
        beats: Option<String>,
        #[arg(long)]
        pay_floor: Option<f64>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum CheckinCommand {
    List,
    Add {
        #[arg(long)]
        mentor: String,
        #[arg(long)]
        topic: String,
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ToolkitCommand {
    Templates,
    Scripts,
    /// Print one template or script
    Show { id: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum AdvocacyCommand {
    Log {
        #[arg(long = "type", default_value = "Low pay")]
        kind: String,
        #[arg(long, default_value = "")]
        org: String,
        #[arg(long)]
        details: String,
    },
    Issues,
    /// Show the pledge, or toggle one item
    Pledge { item: Option<PledgeItem> },
}

fn print_notice<T>(out: &mut impl Write, synced: &Synced<T>) -> Result<()> {
    if let Some(notice) = &synced.notice {
        writeln!(out, "! {}", notice)?;
    }
    Ok(())
}

fn print_summary(out: &mut impl Write, summary: &PipelineSummary) -> Result<()> {
    writeln!(
        out,
        "total ${:.0}  booked {}  paid {}",
        summary.total_value, summary.booked_count, summary.paid_count
    )?;
    Ok(())
}

/// Run one command against the configured profile
pub async fn run(args: &Args, out: &mut impl Write) -> Result<()> {
    let config = args.member_config();
    let resolver = SessionResolver::from_config(config.clone())?;
    debug!(data_dir = %config.data_dir.display(), "profile directory");

    match &args.command {
        Command::Status => {
            if config.auth_unavailable() {
                writeln!(
                    out,
                    "! Sign-in is unavailable: no backend is configured and demo mode is off."
                )?;
            }
            match resolver.resolve_session().await {
                Some(identity) => {
                    let mode = match identity.mode {
                        SessionMode::Remote => "remote",
                        SessionMode::Demo => "demo",
                    };
                    writeln!(out, "{} ({}, {})", identity.email, identity.id, mode)?;
                }
                None => writeln!(out, "guest")?,
            }
        }

        Command::Demo(DemoCommand::Start { email }) => {
            let identity = resolver
                .begin_demo_session(email.as_deref())
                .await?
                .ok_or(SdkError::DemoDisabled)?;
            writeln!(out, "demo session started for {}", identity.email)?;
        }
        Command::Demo(DemoCommand::Stop) => {
            resolver.end_demo_session().await?;
            writeln!(out, "demo session ended")?;
        }

        Command::SignIn { email, password } => {
            let identity = resolver.sign_in(email, password).await?;
            writeln!(out, "signed in as {}", identity.email)?;
        }
        Command::SignUp { email, password } => {
            let user = resolver.sign_up(email, password).await?;
            writeln!(out, "account created ({}); sign in to continue", user.id)?;
        }
        Command::SignOut => {
            resolver.sign_out().await?;
            writeln!(out, "signed out")?;
        }

        Command::Dashboard { action } => {
            let data = MemberData::resolve(&resolver).await;
            let checklist = DailyChecklist::new(resolver.store().clone());
            run_dashboard(&data, &checklist, action.as_ref(), out).await?;
        }

        Command::Opportunities { kind, query, saved } => {
            let data = MemberData::resolve(&resolver).await;
            let listing = data.opportunities().await?;
            let saved_ids = data.saved_ids().await?;
            let profile = data.profile().await?;
            print_notice(out, &listing)?;

            let filter = OpportunityFilter {
                kind: *kind,
                query: query.clone(),
                saved_only: *saved,
            };
            for entry in rank(&listing.value, &profile.value.skills, &filter, &saved_ids.value) {
                let o = &entry.opportunity;
                writeln!(
                    out,
                    "{:>3}  {}{}  {} | {} | {} | due {}",
                    entry.score,
                    if entry.saved { "* " } else { "" },
                    o.title,
                    o.org,
                    o.kind,
                    o.compensation,
                    o.deadline
                )?;
                writeln!(out, "     {}  [{}]", o.match_reason, o.id)?;
            }
        }

        Command::Save { id } => {
            let data = MemberData::resolve(&resolver).await;
            let result = data.toggle_saved(id).await?;
            print_notice(out, &result)?;
            writeln!(out, "{} {}", if result.value { "saved" } else { "removed" }, id)?;
        }

        Command::Track { id } => {
            let data = MemberData::resolve(&resolver).await;
            let listing = data.opportunities().await?;
            let opportunity = listing
                .value
                .iter()
                .find(|o| &o.id == id)
                .ok_or_else(|| anyhow!("no opportunity with id {}", id))?;
            let result = data.track_opportunity(opportunity).await?;
            print_notice(out, &result)?;
            writeln!(
                out,
                "tracking {} at ${:.0} [{}]",
                result.value.title, result.value.value, result.value.id
            )?;
        }

        Command::Pipeline(cmd) => {
            let data = MemberData::resolve(&resolver).await;
            run_pipeline(&data, cmd, out).await?;
        }

        Command::Profile(cmd) => {
            let data = MemberData::resolve(&resolver).await;
            run_profile(&data, cmd, out).await?;
        }

        Command::Checkin(cmd) => {
            let data = MemberData::resolve(&resolver).await;
            run_checkin(&data, cmd, out).await?;
        }

        Command::Quote {
            role,
            days,
            revisions,
            rush,
            travel,
        } => {
            let preset = role_or_default(role);
            let input = QuoteInput::parse(days, revisions, *rush, travel);
            let q = quote(&preset, &input);
            writeln!(
                out,
                "{} at ${}/day x {} day(s)",
                preset.label, preset.day_rate, input.days
            )?;
            writeln!(out, "min ${}  target ${}  stretch ${}", q.min, q.target, q.stretch)?;
        }

        Command::Toolkit(cmd) => run_toolkit(cmd, out)?,

        Command::Advocacy(cmd) => {
            let advocacy = Advocacy::new(resolver.store().clone());
            run_advocacy(&advocacy, cmd, out).await?;
        }
    }

    Ok(())
}

async fn run_dashboard(
    data: &MemberData,
    checklist: &DailyChecklist,
    action: Option<&DashboardCommand>,
    out: &mut impl Write,
) -> Result<()> {
    let today = Utc::now().date_naive();
    let progress: DailyProgress = match action {
        Some(DashboardCommand::Task { number }) => {
            let task = number
                .checked_sub(1)
                .and_then(|i| DAILY_TASKS.get(i))
                .ok_or_else(|| anyhow!("task number must be 1-{}", DAILY_TASKS.len()))?;
            checklist.toggle_task(today, task).await?
        }
        Some(DashboardCommand::Reminder { id }) => checklist.toggle_reminder(today, id).await?,
        None => checklist.progress(today).await,
    };

    let pipeline = data.pipeline().await?;
    let opportunities = data.opportunities().await?;
    let checkins = data.checkins().await?;
    let saved = data.saved_ids().await?;
    print_notice(out, &pipeline)?;
    print_notice(out, &opportunities)?;
    print_notice(out, &checkins)?;

    let dashboard = Dashboard::build(&pipeline.value, &opportunities.value, &checkins.value, today);
    let mark = |done: bool| if done { "x" } else { " " };

    writeln!(out, "focus {}%", dashboard.focus_score(&progress))?;
    writeln!(
        out,
        "opportunities {}  saved {}  expected ${:.0}",
        dashboard.opportunity_count,
        saved.value.len(),
        dashboard.pipeline_value
    )?;
    if let Some(deadline) = dashboard.next_deadline {
        writeln!(out, "next deadline {}", deadline)?;
    }

    writeln!(out, "tasks")?;
    for (i, task) in DAILY_TASKS.iter().enumerate() {
        writeln!(out, "  [{}] {}. {}", mark(progress.task_done(task)), i + 1, task)?;
    }
    writeln!(out, "reminders")?;
    for reminder in &dashboard.reminders {
        writeln!(
            out,
            "  [{}] {}  [{}]",
            mark(progress.reminder_done(&reminder.id)),
            reminder.text,
            reminder.id
        )?;
    }

    writeln!(out, "stages")?;
    for (stage, count) in &dashboard.stage_counts {
        writeln!(out, "  {:<10} {}", stage.label(), count)?;
    }

    writeln!(out, "check-ins")?;
    if dashboard.upcoming_checkins.is_empty() {
        writeln!(out, "  none scheduled")?;
    }
    for c in &dashboard.upcoming_checkins {
        writeln!(out, "  {} - {} on {}", c.mentor_name, c.topic, c.next_check_in)?;
    }
    Ok(())
}

async fn run_pipeline(data: &MemberData, cmd: &PipelineCommand, out: &mut impl Write) -> Result<()> {
    match cmd {
        PipelineCommand::List => {
            let items = data.pipeline().await?;
            print_notice(out, &items)?;
            for stage in PipelineStage::ALL {
                let in_stage: Vec<_> = items.value.iter().filter(|i| i.stage == stage).collect();
                if in_stage.is_empty() {
                    continue;
                }
                writeln!(out, "{} ({})", stage, in_stage.len())?;
                for item in in_stage {
                    writeln!(
                        out,
                        "  {} - {}  ${:.0}  due {}  [{}]",
                        item.title, item.client, item.value, item.due_date, item.id
                    )?;
                }
            }
        }
        PipelineCommand::Add {
            title,
            client,
            due,
            value,
        } => {
            let result = data
                .add_pipeline_item(NewPipelineItem {
                    title: title.clone(),
                    client: client.clone(),
                    due_date: *due,
                    value: *value,
                })
                .await?;
            print_notice(out, &result)?;
            writeln!(out, "added {} [{}]", result.value.title, result.value.id)?;
        }
        PipelineCommand::Stage { id, stage } => {
            let result = data.set_stage(id, *stage).await?;
            print_notice(out, &result)?;
            writeln!(out, "{} is now {}", result.value.title, result.value.stage)?;
        }
        PipelineCommand::Summary => {
            let summary = data.pipeline_summary().await?;
            print_summary(out, &summary)?;
        }
    }
    Ok(())
}

async fn run_profile(data: &MemberData, cmd: &ProfileCommand, out: &mut impl Write) -> Result<()> {
    let current = data.profile().await?;
    print_notice(out, &current)?;
    let mut profile = current.value;

    if let ProfileCommand::Set {
        name,
        location,
        skills,
        beats,
        pay_floor,
    } = cmd
    {
        if let Some(name) = name {
            profile.display_name = name.trim().to_string();
        }
        if let Some(location) = location {
            profile.location = location.trim().to_string();
        }
        if let Some(skills) = skills {
            profile.skills = parse_list(skills);
        }
        if let Some(beats) = beats {
            profile.beats = parse_list(beats);
        }
        if pay_floor.is_some() {
            profile.pay_floor = *pay_floor;
        }
        let saved = data.save_profile(profile).await?;
        print_notice(out, &saved)?;
        profile = saved.value;
    }

    writeln!(out, "name:      {}", profile.display_name)?;
    writeln!(out, "location:  {}", profile.location)?;
    writeln!(out, "skills:    {}", profile.skills.join(", "))?;
    writeln!(out, "beats:     {}", profile.beats.join(", "))?;
    match profile.pay_floor {
        Some(floor) => writeln!(out, "pay floor: ${:.0}", floor)?,
        None => writeln!(out, "pay floor: -")?,
    }
    Ok(())
}

async fn run_checkin(data: &MemberData, cmd: &CheckinCommand, out: &mut impl Write) -> Result<()> {
    match cmd {
        CheckinCommand::List => {
            let checkins = data.checkins().await?;
            print_notice(out, &checkins)?;
            for c in &checkins.value {
                writeln!(out, "{}  {} - {} ({:?})", c.next_check_in, c.mentor_name, c.topic, c.status)?;
                if let Some(notes) = &c.notes {
                    writeln!(out, "            {}", notes)?;
                }
            }
        }
        CheckinCommand::Add {
            mentor,
            topic,
            date,
            notes,
        } => {
            let result = data
                .add_checkin(NewCheckin {
                    mentor_name: mentor.clone(),
                    topic: topic.clone(),
                    next_check_in: *date,
                    notes: notes.clone(),
                })
                .await?;
            print_notice(out, &result)?;
            writeln!(
                out,
                "check-in with {} on {} scheduled",
                result.value.mentor_name, result.value.next_check_in
            )?;
        }
    }
    Ok(())
}

fn run_toolkit(cmd: &ToolkitCommand, out: &mut impl Write) -> Result<()> {
    match cmd {
        ToolkitCommand::Templates => {
            for t in CONTRACT_TEMPLATES.iter() {
                writeln!(out, "{:<16} {} - {}", t.id, t.title, t.purpose)?;
            }
        }
        ToolkitCommand::Scripts => {
            for s in NEGOTIATION_SCRIPTS.iter() {
                writeln!(out, "{:<16} {}", s.id, s.title)?;
            }
        }
        ToolkitCommand::Show { id } => {
            if let Some(t) = contract_template(id) {
                writeln!(out, "{}\n\n{}", t.title, t.clause)?;
            } else if let Some(s) = negotiation_script(id) {
                writeln!(out, "{}\n\n{}", s.title, s.script)?;
            } else {
                return Err(anyhow!("no template or script named {}", id));
            }
        }
    }
    Ok(())
}

async fn run_advocacy(advocacy: &Advocacy, cmd: &AdvocacyCommand, out: &mut impl Write) -> Result<()> {
    match cmd {
        AdvocacyCommand::Log { kind, org, details } => {
            let issue = advocacy.log_issue(kind, org, details).await?;
            writeln!(out, "logged {} at {} on {}", issue.kind, issue.org, issue.created_at)?;
        }
        AdvocacyCommand::Issues => {
            for issue in advocacy.issues().await {
                writeln!(out, "{}  {} - {}: {}", issue.created_at, issue.kind, issue.org, issue.details)?;
            }
        }
        AdvocacyCommand::Pledge { item } => {
            let pledge = match item {
                Some(item) => advocacy.toggle_pledge(*item).await?,
                None => advocacy.pledge().await,
            };
            for item in PledgeItem::ALL {
                let mark = if pledge.is_checked(item) { "x" } else { " " };
                writeln!(out, "[{}] {}", mark, item.label())?;
            }
            writeln!(out, "{}/{} commitments", pledge.count(), PledgeItem::ALL.len())?;
        }
    }
    Ok(())
}
