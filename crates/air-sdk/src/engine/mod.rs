//! Ranking and quoting engine.
//!
//! Pure functions over member data: no I/O, no session awareness.

mod quote;
mod ranking;

pub use quote::{quote, Quote, QuoteInput, REVISION_FEE, TRAVEL_FEE};
pub use ranking::{
    estimate_value, fit_score, rank, OpportunityFilter, RankedOpportunity, BASE_SCORE,
    DEFAULT_TRACKED_VALUE, MAX_SCORE, SCORE_STEP,
};
