//! AIR Members SDK - session, sync and ranking core
//!
//! Core of the member dashboard for independent media professionals.
//!
//! # Architecture
//!
//! Every member operation runs against exactly one backend:
//! - **Remote**: the hosted REST/auth backend, for signed-in members
//! - **Demo**: a local JSON mirror store, when demo sign-in is enabled
//! - **Guest**: read-only seed data
//!
//! [`SessionResolver`] decides which applies; [`MemberData`] dispatches each
//! read and write accordingly. The ranking and quoting engine is pure and
//! session-agnostic.
//!
//! # Example
//!
//! ```rust,ignore
//! use air_sdk::{MemberConfig, MemberData, SessionResolver};
//!
//! let resolver = SessionResolver::from_config(MemberConfig::new("/tmp/air"))?;
//! resolver.begin_demo_session(None).await?;
//!
//! let data = MemberData::resolve(&resolver).await;
//! let pipeline = data.pipeline().await?;
//! println!("{} items", pipeline.value.len());
//! ```

// Configuration handed in by the front end
pub mod config;

// Member-facing records
pub mod models;

// Seed data, role presets, toolkit snippets
pub mod catalog;

// Local mirror store
pub mod store;

// Remote data gateway
pub mod gateway;

// Session resolution
pub mod session;

// Per-session data dispatch
pub mod member;

// Ranking and quoting
pub mod engine;

// Advocacy tracker
pub mod advocacy;

// Home dashboard snapshot and daily checklist
pub mod dashboard;

// Error types
pub mod error;

pub use config::{parse_demo_flag, BackendSettings, MemberConfig};
pub use models::{
    parse_list, MemberProfile, MentorCheckin, NewCheckin, NewPipelineItem, Opportunity,
    PipelineItem, PipelineSummary,
};
pub use store::LocalStore;
pub use gateway::{HttpGateway, MemoryGateway, RemoteGateway};
pub use session::{Session, SessionIdentity, SessionMode, SessionResolver};
pub use member::{MemberData, Synced};
pub use engine::{estimate_value, fit_score, quote, rank, OpportunityFilter, Quote, QuoteInput, RankedOpportunity};
pub use advocacy::{Advocacy, AdvocacyIssue, Pledge, PledgeItem};
pub use dashboard::{DailyChecklist, DailyProgress, Dashboard, Reminder, DAILY_TASKS};
pub use error::{Result, SdkError};

// Re-export shared wire enums from the backend client
pub use air_backend_client::{CheckinStatus, OpportunityType, PipelineStage};
