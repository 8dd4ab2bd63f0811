//! Per-upload analysis sessions and their HTTP surface.

pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use repository::{
    InMemorySessionStore, SessionId, SessionRecord, SessionStore, SessionSummaryView, StoreError,
};
pub use router::session_router;
pub use service::{AnalysisError, AnalysisService};
