pub mod analysis_llm;
pub mod coach_llm;
pub mod db;

pub use analysis_llm::OpenAiAnalysisAdapter;
pub use coach_llm::OpenAiCoachAdapter;
pub use db::SqliteStore;
