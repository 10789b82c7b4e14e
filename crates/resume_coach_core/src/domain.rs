//! crates/resume_coach_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database; serde is used only because
//! the analysis record's JSON shape is part of the model contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The fixed-shape structured output describing a resume's strengths, gaps,
/// and career recommendations.
///
/// Field names serialize in camelCase because that is the exact key set the
/// model is instructed to emit and the shape the API returns. Every array
/// field is mandatory: a payload missing one fails strict parsing and is
/// replaced by the fallback record, so consumers never see an absent field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub profile_summary: String,
    pub key_skills: Vec<String>,
    pub experience_highlights: Vec<String>,
    pub education: Vec<String>,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub suggested_career_paths: Vec<String>,
    pub recommended_skills: Vec<String>,
    pub recommended_certifications: Vec<String>,
    /// Set when the record is the fallback substituted for unparseable
    /// model output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The unit of state tying one uploaded resume's extracted text, its
/// analysis, and its chat transcript together under one identifier.
///
/// Sessions are never updated in place; re-uploading creates a new id, and
/// the eviction sweep deletes rows past the retention window.
#[derive(Debug, Clone)]
pub struct ResumeSession {
    pub id: Uuid,
    pub text: String,
    pub analysis: AnalysisRecord,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
}

/// The author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

impl std::str::FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(ChatRole::User),
            "assistant" => Ok(ChatRole::Assistant),
            other => Err(format!("'{}' is not a valid chat role", other)),
        }
    }
}

/// A single turn in a session's transcript. Append-only and ordered by
/// creation time; ids are strings because user-turn ids are caller-supplied
/// for stable UI keys.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: String,
    pub session_id: Uuid,
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_record_uses_camel_case_keys() {
        let record = AnalysisRecord {
            profile_summary: "A software engineer.".to_string(),
            key_skills: vec!["Rust".to_string()],
            experience_highlights: vec![],
            education: vec![],
            strengths: vec![],
            areas_for_improvement: vec![],
            suggested_career_paths: vec![],
            recommended_skills: vec![],
            recommended_certifications: vec![],
            error: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["profileSummary"], "A software engineer.");
        assert_eq!(json["keySkills"][0], "Rust");
        // The error marker is omitted entirely when unset.
        assert!(json.get("error").is_none());
    }

    #[test]
    fn chat_role_round_trips_through_str() {
        assert_eq!("user".parse::<ChatRole>().unwrap(), ChatRole::User);
        assert_eq!(ChatRole::Assistant.as_str(), "assistant");
        assert!("system".parse::<ChatRole>().is_err());
    }
}
