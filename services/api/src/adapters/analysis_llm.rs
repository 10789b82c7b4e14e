//! services/api/src/adapters/analysis_llm.rs
//!
//! This module contains the adapter for the resume-analysis LLM.
//! It implements the `AnalysisService` port from the `core` crate.

const ANALYSIS_PROMPT_TEMPLATE: &str = r#"
You are an expert resume reviewer and career coach. Analyze the following resume and provide:
1. A summary of the candidate's profile
2. Key skills identified
3. Experience highlights
4. Education details (format each education entry as a single string, e.g. "Bachelor of Science in Computer Science, Stanford University, 3.8 GPA, 2020")
5. Strengths of the resume
6. Areas for improvement
7. Suggested career paths based on their experience and skills
8. Recommended skills to develop
9. Potential certifications to pursue

Resume:
{resume_text}

Format your response as a JSON object with the following keys:
- profileSummary (string)
- keySkills (array of strings)
- experienceHighlights (array of strings)
- education (array of strings, each string containing the full education details)
- strengths (array of strings)
- areasForImprovement (array of strings)
- suggestedCareerPaths (array of strings)
- recommendedSkills (array of strings)
- recommendedCertifications (array of strings)

IMPORTANT:
- Return ONLY the JSON object with no markdown formatting, no code blocks, and no additional text
- Make sure education entries are strings, not objects
- Example education entry: "Master of Science in Data Science, MIT, 3.9 GPA, 2021"
"#;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::warn;

use resume_coach_core::{
    analysis::{parse_analysis, AnalysisOutcome},
    domain::AnalysisRecord,
    ports::{AnalysisService, PortError, PortResult},
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `AnalysisService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiAnalysisAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAnalysisAdapter {
    /// Creates a new `OpenAiAnalysisAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `AnalysisService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AnalysisService for OpenAiAnalysisAdapter {
    /// Asks the model for a fixed-shape JSON analysis of the resume text.
    ///
    /// The prompt is a contract the model is asked, not guaranteed, to honor:
    /// whatever comes back goes through the tolerant parser, so malformed
    /// output degrades into the fallback record. Only a failed model call is
    /// an error.
    async fn analyze_resume(&self, resume_text: &str) -> PortResult<AnalysisRecord> {
        let prompt = ANALYSIS_PROMPT_TEMPLATE.replace("{resume_text}", resume_text);

        let messages: Vec<ChatCompletionRequestMessage> = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let raw = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Analysis LLM response contained no text content.".to_string())
            })?;

        let outcome = parse_analysis(&raw);
        if let AnalysisOutcome::Fallback { reason } = &outcome {
            warn!(%reason, "analysis output was not parseable, substituting fallback record");
        }
        Ok(outcome.into_record())
    }
}
