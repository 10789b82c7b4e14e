//! crates/resume_coach_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AnalysisRecord, ChatMessage, ResumeSession};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Persistence for resume sessions and their chat transcripts.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Creates a session under a freshly generated identifier and returns it.
    /// The analysis is serialized to JSON text at rest.
    async fn create_session(
        &self,
        text: &str,
        analysis: &AnalysisRecord,
        file_name: &str,
    ) -> PortResult<Uuid>;

    /// Fetches a session by id. Absence is `Ok(None)`, never an error, so
    /// callers can render a 404 — and so a session evicted between a check
    /// and a read is handled the same way as one that never existed.
    async fn get_session(&self, id: Uuid) -> PortResult<Option<ResumeSession>>;

    /// Appends one message to a session's transcript. Deliberately does not
    /// verify that the session exists; see DESIGN.md.
    async fn append_chat_message(&self, message: &ChatMessage) -> PortResult<()>;

    /// Lists a session's transcript in ascending creation-time order.
    /// A session with no messages yields an empty vec.
    async fn list_chat_messages(&self, session_id: Uuid) -> PortResult<Vec<ChatMessage>>;

    /// Deletes every session older than the retention window, along with any
    /// chat messages left without a session. Returns the number of sessions
    /// removed. Safe to call on demand as well as from the recurring sweep.
    async fn evict_expired(&self) -> PortResult<u64>;
}

/// Turns extracted resume text into a structured analysis.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Always yields a well-formed record for any model output; fails only
    /// when the model call itself fails.
    async fn analyze_resume(&self, resume_text: &str) -> PortResult<AnalysisRecord>;
}

/// Produces one career-coach reply per user turn.
#[async_trait]
pub trait CoachingService: Send + Sync {
    async fn coach_reply(
        &self,
        analysis: &AnalysisRecord,
        history: &[ChatMessage],
        user_message: &str,
    ) -> PortResult<String>;
}
