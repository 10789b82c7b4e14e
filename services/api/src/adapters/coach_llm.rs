//! services/api/src/adapters/coach_llm.rs
//!
//! This module contains the adapter for the career-coach chat LLM.
//! It implements the `CoachingService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;

use resume_coach_core::{
    domain::{AnalysisRecord, ChatMessage, ChatRole},
    ports::{CoachingService, PortError, PortResult},
};

/// Id of the synthetic greeting the UI seeds a fresh transcript with. It is
/// stored like any other message but excluded from the prompt history.
pub const WELCOME_MESSAGE_ID: &str = "welcome";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CoachingService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiCoachAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCoachAdapter {
    /// Creates a new `OpenAiCoachAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

/// Serializes every field of the analysis into the human-readable briefing
/// that seeds the coach's system prompt.
pub fn build_system_briefing(analysis: &AnalysisRecord) -> String {
    format!(
        "You are a career coach and resume expert. You have analyzed the user's resume and have the following information:\n\n\
         Profile Summary: {}\n\n\
         Key Skills: {}\n\n\
         Experience Highlights:\n{}\n\n\
         Education:\n{}\n\n\
         Strengths:\n{}\n\n\
         Areas for Improvement:\n{}\n\n\
         Suggested Career Paths:\n{}\n\n\
         Recommended Skills to Develop:\n{}\n\n\
         Recommended Certifications:\n{}\n\n\
         Your job is to help the user understand their career options, provide guidance on skill development, \
         and answer questions about their resume or career path. Be supportive, specific, and actionable in your advice.",
        analysis.profile_summary,
        analysis.key_skills.join(", "),
        analysis.experience_highlights.join("\n"),
        analysis.education.join("\n"),
        analysis.strengths.join("\n"),
        analysis.areas_for_improvement.join("\n"),
        analysis.suggested_career_paths.join("\n"),
        analysis.recommended_skills.join("\n"),
        analysis.recommended_certifications.join("\n"),
    )
}

//=========================================================================================
// `CoachingService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CoachingService for OpenAiCoachAdapter {
    /// Produces one non-streaming coach reply for the user's latest message,
    /// with the analysis briefing as system context and the prior transcript
    /// (minus the synthetic welcome) replayed as conversation history.
    async fn coach_reply(
        &self,
        analysis: &AnalysisRecord,
        history: &[ChatMessage],
        user_message: &str,
    ) -> PortResult<String> {
        let mut messages: Vec<ChatCompletionRequestMessage> =
            vec![ChatCompletionRequestSystemMessageArgs::default()
            .content(build_system_briefing(analysis))
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into()];

        for turn in history.iter().filter(|m| m.id != WELCOME_MESSAGE_ID) {
            let message = match turn.role {
                ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.content.as_str())
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?
                    .into(),
                ChatRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.content.as_str())
                    .build()
                    .map_err(|e| PortError::Unexpected(e.to_string()))?
                    .into(),
            };
            messages.push(message);
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_message)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.7)
            .max_completion_tokens(1000u32)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Coach LLM response contained no text content.".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn briefing_includes_every_analysis_field() {
        let analysis = AnalysisRecord {
            profile_summary: "SUMMARY".to_string(),
            key_skills: vec!["SKILL_A".to_string(), "SKILL_B".to_string()],
            experience_highlights: vec!["HIGHLIGHT".to_string()],
            education: vec!["EDUCATION".to_string()],
            strengths: vec!["STRENGTH".to_string()],
            areas_for_improvement: vec!["IMPROVEMENT".to_string()],
            suggested_career_paths: vec!["PATH".to_string()],
            recommended_skills: vec!["REC_SKILL".to_string()],
            recommended_certifications: vec!["CERT".to_string()],
            error: None,
        };

        let briefing = build_system_briefing(&analysis);
        for needle in [
            "SUMMARY",
            "SKILL_A, SKILL_B",
            "HIGHLIGHT",
            "EDUCATION",
            "STRENGTH",
            "IMPROVEMENT",
            "PATH",
            "REC_SKILL",
            "CERT",
        ] {
            assert!(briefing.contains(needle), "briefing is missing {needle}");
        }
        assert!(briefing.starts_with("You are a career coach and resume expert."));
    }
}
