//! Remote data gateway.
//!
//! Provides a trait-based interface over the hosted tables:
//! - HTTP gateway against the real backend (process-wide client)
//! - In-memory gateway for tests and offline development

pub mod http;
pub mod memory;
pub mod traits;

pub use http::{shared_client, HttpGateway};
pub use memory::MemoryGateway;
pub use traits::RemoteGateway;
