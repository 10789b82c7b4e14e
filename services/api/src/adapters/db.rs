//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `SessionStore` port from the `core` crate. It handles all interactions
//! with the SQLite database using `sqlx`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use resume_coach_core::domain::{AnalysisRecord, ChatMessage, ChatRole, ResumeSession};
use resume_coach_core::ports::{PortError, PortResult, SessionStore};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A SQLite-backed adapter that implements the `SessionStore` port.
///
/// Ids are stored as hyphenated UUID text and the analysis as a JSON text
/// blob, decoded on read. All operations are single-row statements; there is
/// no cross-row consistency requirement, so no transactions are needed.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    retention: Duration,
}

impl SqliteStore {
    /// Creates a new `SqliteStore` retaining sessions for `retention`.
    pub fn new(pool: SqlitePool, retention: Duration) -> Self {
        Self { pool, retention }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct SessionRecord {
    id: String,
    text: String,
    analysis: String,
    file_name: String,
    created_at: DateTime<Utc>,
}

impl SessionRecord {
    fn to_domain(self) -> PortResult<ResumeSession> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| PortError::Unexpected(format!("Corrupt session id: {}", e)))?;
        let analysis: AnalysisRecord = serde_json::from_str(&self.analysis)
            .map_err(|e| PortError::Unexpected(format!("Corrupt analysis blob: {}", e)))?;
        Ok(ResumeSession {
            id,
            text: self.text,
            analysis,
            file_name: self.file_name,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct ChatMessageRecord {
    id: String,
    session_id: String,
    role: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl ChatMessageRecord {
    fn to_domain(self) -> PortResult<ChatMessage> {
        let session_id = Uuid::parse_str(&self.session_id)
            .map_err(|e| PortError::Unexpected(format!("Corrupt session id: {}", e)))?;
        let role = self
            .role
            .parse::<ChatRole>()
            .map_err(PortError::Unexpected)?;
        Ok(ChatMessage {
            id: self.id,
            session_id,
            role,
            content: self.content,
            created_at: self.created_at,
        })
    }
}

//=========================================================================================
// `SessionStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl SessionStore for SqliteStore {
    async fn create_session(
        &self,
        text: &str,
        analysis: &AnalysisRecord,
        file_name: &str,
    ) -> PortResult<Uuid> {
        let id = Uuid::new_v4();
        let analysis_json = serde_json::to_string(analysis)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        sqlx::query(
            "INSERT OR REPLACE INTO sessions (id, text, analysis, file_name, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(text)
        .bind(analysis_json)
        .bind(file_name)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(id)
    }

    async fn get_session(&self, id: Uuid) -> PortResult<Option<ResumeSession>> {
        let record = sqlx::query_as::<_, SessionRecord>(
            "SELECT id, text, analysis, file_name, created_at FROM sessions WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        record.map(SessionRecord::to_domain).transpose()
    }

    async fn append_chat_message(&self, message: &ChatMessage) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO chat_messages (id, session_id, role, content, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&message.id)
        .bind(message.session_id.to_string())
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn list_chat_messages(&self, session_id: Uuid) -> PortResult<Vec<ChatMessage>> {
        let records = sqlx::query_as::<_, ChatMessageRecord>(
            "SELECT id, session_id, role, content, created_at FROM chat_messages \
             WHERE session_id = ? ORDER BY created_at ASC",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        records.into_iter().map(ChatMessageRecord::to_domain).collect()
    }

    async fn evict_expired(&self) -> PortResult<u64> {
        let retention = chrono::Duration::from_std(self.retention)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let cutoff = Utc::now() - retention;

        let deleted = sqlx::query("DELETE FROM sessions WHERE created_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .rows_affected();

        // Messages are only ever removed here, together with their session.
        sqlx::query(
            "DELETE FROM chat_messages WHERE session_id NOT IN (SELECT id FROM sessions)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resume_coach_core::analysis::fallback_record;
    use sqlx::sqlite::SqlitePoolOptions;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    async fn test_store() -> SqliteStore {
        // A single connection keeps every query on the same in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = SqliteStore::new(pool, DAY);
        store.run_migrations().await.unwrap();
        store
    }

    fn sample_analysis() -> AnalysisRecord {
        AnalysisRecord {
            profile_summary: "Backend engineer with five years of experience.".to_string(),
            key_skills: vec!["Rust".to_string(), "PostgreSQL".to_string()],
            experience_highlights: vec!["Scaled an ingest pipeline".to_string()],
            education: vec!["BSc Computer Science, UCL, 2018".to_string()],
            strengths: vec!["Quantified impact".to_string()],
            areas_for_improvement: vec!["Add a summary section".to_string()],
            suggested_career_paths: vec!["Platform engineering".to_string()],
            recommended_skills: vec!["Kubernetes".to_string()],
            recommended_certifications: vec!["CKA".to_string()],
            error: None,
        }
    }

    fn message(session_id: Uuid, id: &str, role: ChatRole, at: DateTime<Utc>) -> ChatMessage {
        ChatMessage {
            id: id.to_string(),
            session_id,
            role,
            content: format!("message {}", id),
            created_at: at,
        }
    }

    /// Rewrites a session's creation timestamp; tests use this to simulate age.
    async fn backdate_session(store: &SqliteStore, id: Uuid, to: DateTime<Utc>) {
        sqlx::query("UPDATE sessions SET created_at = ? WHERE id = ?")
            .bind(to)
            .bind(id.to_string())
            .execute(&store.pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn session_round_trips() {
        let store = test_store().await;
        let analysis = sample_analysis();

        let id = store
            .create_session("Jane Doe, Software Engineer", &analysis, "resume.pdf")
            .await
            .unwrap();

        let session = store.get_session(id).await.unwrap().expect("session exists");
        assert_eq!(session.id, id);
        assert_eq!(session.text, "Jane Doe, Software Engineer");
        assert_eq!(session.analysis, analysis);
        assert_eq!(session.file_name, "resume.pdf");
    }

    #[tokio::test]
    async fn fallback_analysis_round_trips_with_error_marker() {
        let store = test_store().await;
        let id = store
            .create_session("text", &fallback_record(), "resume.docx")
            .await
            .unwrap();

        let session = store.get_session(id).await.unwrap().unwrap();
        assert!(session.analysis.error.is_some());
    }

    #[tokio::test]
    async fn unknown_session_is_absent_not_an_error() {
        let store = test_store().await;
        assert!(store.get_session(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn messages_list_in_creation_order() {
        let store = test_store().await;
        let session_id = store
            .create_session("text", &sample_analysis(), "resume.pdf")
            .await
            .unwrap();

        let base = Utc::now();
        // Insert out of order; listing must still sort by creation time.
        for (id, role, offset_secs) in [
            ("m3", ChatRole::User, 20),
            ("m1", ChatRole::Assistant, 0),
            ("m2", ChatRole::User, 10),
        ] {
            let at = base + chrono::Duration::seconds(offset_secs);
            store
                .append_chat_message(&message(session_id, id, role, at))
                .await
                .unwrap();
        }

        let listed = store.list_chat_messages(session_id).await.unwrap();
        let ids: Vec<&str> = listed.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2", "m3"]);
        assert!(listed.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[tokio::test]
    async fn empty_transcript_is_an_empty_vec() {
        let store = test_store().await;
        let session_id = store
            .create_session("text", &sample_analysis(), "resume.pdf")
            .await
            .unwrap();
        assert!(store.list_chat_messages(session_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_to_unknown_session_is_permitted() {
        // Referential integrity is intentionally not enforced at this layer.
        let store = test_store().await;
        let orphan = Uuid::new_v4();
        store
            .append_chat_message(&message(orphan, "m1", ChatRole::User, Utc::now()))
            .await
            .unwrap();
        assert_eq!(store.list_chat_messages(orphan).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn eviction_respects_the_retention_boundary() {
        let store = test_store().await;
        let analysis = sample_analysis();

        let fresh = store.create_session("fresh", &analysis, "a.pdf").await.unwrap();
        let stale = store.create_session("stale", &analysis, "b.pdf").await.unwrap();

        let now = Utc::now();
        backdate_session(&store, fresh, now - chrono::Duration::minutes(23 * 60 + 59)).await;
        backdate_session(&store, stale, now - chrono::Duration::minutes(24 * 60 + 1)).await;

        let removed = store.evict_expired().await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.get_session(fresh).await.unwrap().is_some());
        assert!(store.get_session(stale).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn eviction_sweeps_orphaned_messages() {
        let store = test_store().await;
        let analysis = sample_analysis();

        let keep = store.create_session("keep", &analysis, "a.pdf").await.unwrap();
        let drop = store.create_session("drop", &analysis, "b.pdf").await.unwrap();
        for session in [keep, drop] {
            store
                .append_chat_message(&message(session, &format!("m-{}", session), ChatRole::User, Utc::now()))
                .await
                .unwrap();
        }

        backdate_session(&store, drop, Utc::now() - chrono::Duration::hours(25)).await;
        store.evict_expired().await.unwrap();

        assert_eq!(store.list_chat_messages(keep).await.unwrap().len(), 1);
        assert!(store.list_chat_messages(drop).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn eviction_with_nothing_expired_is_a_no_op() {
        let store = test_store().await;
        let id = store
            .create_session("text", &sample_analysis(), "resume.pdf")
            .await
            .unwrap();
        assert_eq!(store.evict_expired().await.unwrap(), 0);
        assert!(store.get_session(id).await.unwrap().is_some());
    }
}
