//! Local mirror store
//!
//! Browser-profile-style persistence used by demo mode, the advocacy
//! tracker, and the saved session records.

pub mod keys;
mod local;

pub use local::LocalStore;
