//! services/api/src/pipeline.rs
//!
//! Orchestration of the two request flows: turning an uploaded resume into a
//! stored session, and producing one coach reply per chat turn. Handlers stay
//! thin; everything here works against the core ports so the flows are
//! testable with mock adapters.

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract;
use resume_coach_core::domain::{AnalysisRecord, ChatMessage, ChatRole};
use resume_coach_core::ports::{AnalysisService, CoachingService, SessionStore};

/// Returned (and persisted) as the assistant's reply when the model call for
/// a chat turn fails, so the stored transcript matches what the user saw.
pub const CHAT_FAILURE_APOLOGY: &str =
    "I'm sorry, I encountered an error processing your request. Please try again.";

/// Runs extraction, analysis, and session creation for one uploaded resume.
///
/// Any failure before the store write propagates as an error; no partial
/// session is persisted. The uploaded binary is dropped after extraction.
pub async fn run_analysis_pipeline(
    store: &dyn SessionStore,
    analyzer: &dyn AnalysisService,
    bytes: &[u8],
    media_type: &str,
    file_name: &str,
) -> Result<Uuid, ApiError> {
    let text = extract::extract_text(bytes, media_type)?;

    let analysis = analyzer
        .analyze_resume(&text)
        .await
        .map_err(|e| ApiError::ModelCall(e.to_string()))?;

    let session_id = store.create_session(&text, &analysis, file_name).await?;
    info!(%session_id, file_name, "resume analyzed and session created");
    Ok(session_id)
}

/// One chat round-trip: the user's new message plus the context the caller
/// already holds (prior transcript and the session's analysis).
pub struct ChatTurn {
    pub session_id: Uuid,
    pub user_message: String,
    /// Caller-chosen id for the user turn, so the UI can keep the key it
    /// already rendered with. Generated server-side when absent.
    pub user_message_id: Option<String>,
    pub history: Vec<ChatMessage>,
    pub analysis: AnalysisRecord,
}

/// Persists the user turn, asks the coach for a reply, and persists the
/// assistant turn — substituting a canned apology when the model call fails,
/// rather than propagating an error to the user mid-conversation.
pub async fn run_chat_turn(
    store: &dyn SessionStore,
    coach: &dyn CoachingService,
    turn: ChatTurn,
) -> Result<String, ApiError> {
    let user_turn = ChatMessage {
        id: turn
            .user_message_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        session_id: turn.session_id,
        role: ChatRole::User,
        content: turn.user_message.clone(),
        created_at: Utc::now(),
    };
    store.append_chat_message(&user_turn).await?;

    let reply = match coach
        .coach_reply(&turn.analysis, &turn.history, &turn.user_message)
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            error!(session_id = %turn.session_id, error = %e, "coach model call failed, replying with apology");
            CHAT_FAILURE_APOLOGY.to_string()
        }
    };

    let assistant_turn = ChatMessage {
        id: Uuid::new_v4().to_string(),
        session_id: turn.session_id,
        role: ChatRole::Assistant,
        content: reply.clone(),
        created_at: Utc::now(),
    };
    store.append_chat_message(&assistant_turn).await?;

    Ok(reply)
}
