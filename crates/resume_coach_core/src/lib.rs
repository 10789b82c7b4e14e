pub mod analysis;
pub mod domain;
pub mod ports;

pub use analysis::{parse_analysis, AnalysisOutcome};
pub use domain::{AnalysisRecord, ChatMessage, ChatRole, ResumeSession};
pub use ports::{AnalysisService, CoachingService, PortError, PortResult, SessionStore};
