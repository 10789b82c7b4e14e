//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::{MEDIA_TYPE_DOC, MEDIA_TYPE_DOCX, MEDIA_TYPE_PDF};
use crate::pipeline::{self, ChatTurn};
use crate::web::state::AppState;
use resume_coach_core::domain::{AnalysisRecord, ChatMessage, ChatRole};
use resume_coach_core::ports::PortError;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        upload_resume_handler,
        get_session_handler,
        list_chat_messages_handler,
        append_chat_message_handler,
        chat_turn_handler,
    ),
    components(
        schemas(
            UploadResumeResponse,
            SessionResponse,
            MessagesResponse,
            ChatMessageDto,
            AppendMessageRequest,
            IncomingMessage,
            SuccessResponse,
            ChatTurnRequest,
            HistoryMessage,
            ChatTurnResponse,
        )
    ),
    tags(
        (name = "Resume Coach API", description = "Upload a resume, get an AI analysis, and chat with a career coach about it.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The response payload sent after successfully analyzing an upload.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResumeResponse {
    session_id: Uuid,
}

/// A stored session: extracted text, its analysis, and the original file name.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    text: String,
    #[schema(value_type = Object)]
    analysis: AnalysisRecord,
    file_name: String,
}

#[derive(Serialize, ToSchema)]
pub struct MessagesResponse {
    messages: Vec<ChatMessageDto>,
}

/// One persisted transcript message.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageDto {
    id: String,
    session_id: Uuid,
    #[schema(value_type = String)]
    role: ChatRole,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<ChatMessage> for ChatMessageDto {
    fn from(m: ChatMessage) -> Self {
        Self {
            id: m.id,
            session_id: m.session_id,
            role: m.role,
            content: m.content,
            created_at: m.created_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppendMessageRequest {
    message: Option<IncomingMessage>,
    session_id: Option<Uuid>,
}

/// A message as supplied by the client; the id is caller-chosen so the UI
/// can keep stable keys.
#[derive(Deserialize, ToSchema)]
pub struct IncomingMessage {
    id: String,
    #[schema(value_type = String)]
    role: ChatRole,
    content: String,
}

#[derive(Serialize, ToSchema)]
pub struct SuccessResponse {
    success: bool,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurnRequest {
    message: Option<String>,
    /// Optional caller-chosen id for the user turn; generated when absent.
    message_id: Option<String>,
    session_id: Option<Uuid>,
    #[serde(default)]
    messages: Vec<HistoryMessage>,
    #[schema(value_type = Object)]
    resume_analysis: Option<AnalysisRecord>,
}

/// A prior turn as the client holds it (no timestamp; ordering is positional).
#[derive(Deserialize, ToSchema)]
pub struct HistoryMessage {
    id: String,
    #[schema(value_type = String)]
    role: ChatRole,
    content: String,
}

#[derive(Serialize, ToSchema)]
pub struct ChatTurnResponse {
    response: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesParams {
    session_id: Option<Uuid>,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Upload a resume and create an analysis session.
///
/// Accepts a multipart/form-data request whose `resume` field holds one PDF
/// or Word document of at most 5MB. The binary is discarded once its text is
/// extracted.
#[utoipa::path(
    post,
    path = "/resumes",
    request_body(content_type = "multipart/form-data", description = "The resume document to upload."),
    responses(
        (status = 201, description = "Resume analyzed and session created", body = UploadResumeResponse),
        (status = 400, description = "Missing file, unsupported media type, or file too large"),
        (status = 422, description = "The document could not be decoded into text"),
        (status = 502, description = "The analysis model could not be reached")
    )
)]
pub async fn upload_resume_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    // The document must arrive under the `resume` field; other form fields
    // are skipped.
    let field = loop {
        match multipart
            .next_field()
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to read multipart data: {}", e)))?
        {
            Some(field) if field.name() == Some("resume") => break field,
            Some(_) => continue,
            None => return Err(ApiError::Validation("No file provided".to_string())),
        }
    };

    let media_type = field
        .content_type()
        .map(str::to_string)
        .ok_or_else(|| ApiError::Validation("Uploaded file has no content type".to_string()))?;
    let file_name = field.file_name().unwrap_or("untitled").to_string();

    let data = field
        .bytes()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to read file bytes: {}", e)))?;

    // Client-side checks are re-validated here: never trust the form.
    if !matches!(media_type.as_str(), MEDIA_TYPE_PDF | MEDIA_TYPE_DOCX | MEDIA_TYPE_DOC) {
        return Err(ApiError::Validation(
            "Please upload a PDF or Word document".to_string(),
        ));
    }
    if data.len() > app_state.config.max_upload_bytes {
        return Err(ApiError::Validation(
            "File size should be less than 5MB".to_string(),
        ));
    }

    let session_id = pipeline::run_analysis_pipeline(
        app_state.store.as_ref(),
        app_state.analyzer.as_ref(),
        &data,
        &media_type,
        &file_name,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(UploadResumeResponse { session_id })))
}

/// Fetch a session's extracted text, analysis, and file name.
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    params(
        ("id" = Uuid, Path, description = "The session identifier.")
    ),
    responses(
        (status = 200, description = "The stored session", body = SessionResponse),
        (status = 404, description = "No session with this id (possibly evicted)")
    )
)]
pub async fn get_session_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = app_state
        .store
        .get_session(id)
        .await?
        .ok_or_else(|| PortError::NotFound(format!("Session {} not found", id)))?;

    Ok(Json(SessionResponse {
        text: session.text,
        analysis: session.analysis,
        file_name: session.file_name,
    }))
}

/// List a session's chat transcript in creation order.
#[utoipa::path(
    get,
    path = "/chat/messages",
    params(
        ("sessionId" = Uuid, Query, description = "The session identifier.")
    ),
    responses(
        (status = 200, description = "The ordered transcript (empty if none yet)", body = MessagesResponse),
        (status = 400, description = "Missing session id")
    )
)]
pub async fn list_chat_messages_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<ListMessagesParams>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let session_id = params
        .session_id
        .ok_or_else(|| ApiError::Validation("Session ID is required".to_string()))?;

    let messages = app_state
        .store
        .list_chat_messages(session_id)
        .await?
        .into_iter()
        .map(ChatMessageDto::from)
        .collect();

    Ok(Json(MessagesResponse { messages }))
}

/// Append one message to a session's transcript.
///
/// Fire-and-forget from the caller's perspective, and deliberately permissive:
/// the session id is not checked against existing sessions.
#[utoipa::path(
    post,
    path = "/chat/messages",
    request_body = AppendMessageRequest,
    responses(
        (status = 200, description = "Message persisted", body = SuccessResponse),
        (status = 400, description = "Missing message or session id")
    )
)]
pub async fn append_chat_message_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<AppendMessageRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let (message, session_id) = match (request.message, request.session_id) {
        (Some(message), Some(session_id)) => (message, session_id),
        _ => {
            return Err(ApiError::Validation(
                "Message and session ID are required".to_string(),
            ))
        }
    };

    app_state
        .store
        .append_chat_message(&ChatMessage {
            id: message.id,
            session_id,
            role: message.role,
            content: message.content,
            created_at: Utc::now(),
        })
        .await?;

    Ok(Json(SuccessResponse { success: true }))
}

/// Run one coaching turn: reply to the user's message in the context of
/// their resume analysis and the conversation so far.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatTurnRequest,
    responses(
        (status = 200, description = "The coach's reply", body = ChatTurnResponse),
        (status = 400, description = "Missing message, session id, or analysis")
    )
)]
pub async fn chat_turn_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<ChatTurnRequest>,
) -> Result<Json<ChatTurnResponse>, ApiError> {
    let (message, session_id) = match (request.message, request.session_id) {
        (Some(message), Some(session_id)) => (message, session_id),
        _ => {
            return Err(ApiError::Validation(
                "Message and session ID are required".to_string(),
            ))
        }
    };
    let analysis = request
        .resume_analysis
        .ok_or_else(|| ApiError::Validation("Resume analysis is required".to_string()))?;

    let history = request
        .messages
        .into_iter()
        .map(|m| ChatMessage {
            id: m.id,
            session_id,
            role: m.role,
            content: m.content,
            created_at: Utc::now(),
        })
        .collect();

    let response = pipeline::run_chat_turn(
        app_state.store.as_ref(),
        app_state.coach.as_ref(),
        ChatTurn {
            session_id,
            user_message: message,
            user_message_id: request.message_id,
            history,
            analysis,
        },
    )
    .await?;

    Ok(Json(ChatTurnResponse { response }))
}
