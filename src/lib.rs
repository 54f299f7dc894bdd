//! Vertical-farm advisor: typed AI feature calls behind input validation,
//! with the last good result of each feature kept as a fallback.

pub mod alerts;
pub mod config;
pub mod errors;
pub mod feature;
pub mod invoker;
pub mod log;
pub mod pipeline;
pub mod poll;
pub mod prompt;
pub mod provider;
pub mod schema;
pub mod sensors;
pub mod session;
pub mod store;
pub mod wire;

pub use errors::{FieldErrors, ServiceError, StoreError};
pub use pipeline::{Orchestrator, Outcome, Reply};
