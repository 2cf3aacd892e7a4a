//! Rust client for the AIR Members hosted backend
//!
//! # Example
//!
//! ```rust,no_run
//! use air_backend_client::{BackendClient, BackendConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = BackendClient::new(BackendConfig::new(
//!     "https://abc.supabase.co",
//!     "public-anon-key",
//! ))?;
//!
//! // Opportunities are readable with the anon key alone
//! let anon = client.config().anon_key.clone();
//! let opportunities = client.list_opportunities(&anon).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod query;
pub mod types;

// Re-export main types
pub use client::BackendClient;
pub use error::{BackendError, Result};
pub use query::Query;
pub use types::*;
